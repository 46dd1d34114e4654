use crate::config::ProgramCollectionConfig;
use crate::options::{BooleanOption, EXTERNAL_CATEGORY, OptionStore, StringOption};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One user-editable parameter of an external program.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OptionDescription {
    pub option_name: String,
    pub display_name: String,
    #[serde(default)]
    pub default_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Program {
    pub name: String,
    #[serde(default)]
    pub options: Vec<OptionDescription>,
}

impl Program {
    /// Persisted value of one parameter, or its default.
    pub fn parameter(&self, store: &OptionStore, option_name: &str) -> Option<String> {
        let description = self
            .options
            .iter()
            .find(|option| option.option_name == option_name)?;
        Some(parameter_option(store, &self.name, description).value())
    }
}

pub(crate) fn parameter_option(
    store: &OptionStore,
    program: &str,
    description: &OptionDescription,
) -> StringOption {
    StringOption::new(
        store,
        EXTERNAL_CATEGORY,
        program,
        &description.option_name,
        &description.default_value,
    )
}

/// A family of interchangeable helper programs, e.g. dictionaries.
#[derive(Debug, Clone)]
pub struct ProgramCollection {
    name: String,
    store: OptionStore,
    programs: Vec<Program>,
    names: Vec<String>,
    pub enable_collection_option: BooleanOption,
    pub current_name_option: StringOption,
}

impl ProgramCollection {
    pub fn new(store: &OptionStore, name: &str, programs: Vec<Program>, enabled: bool) -> Self {
        let mut unique: Vec<Program> = Vec::with_capacity(programs.len());
        for program in programs {
            if unique.iter().any(|p| p.name == program.name) {
                warn!(collection = %name, program = %program.name, "Ignoring duplicate program");
                continue;
            }
            unique.push(program);
        }
        let names: Vec<String> = unique.iter().map(|p| p.name.clone()).collect();
        let default_name = names.first().cloned().unwrap_or_default();
        debug!(collection = %name, programs = names.len(), "Built program collection");
        Self {
            name: name.to_string(),
            store: store.clone(),
            enable_collection_option: BooleanOption::new(
                store,
                EXTERNAL_CATEGORY,
                name,
                "Enabled",
                enabled,
            ),
            current_name_option: StringOption::new(
                store,
                EXTERNAL_CATEGORY,
                name,
                "Name",
                &default_name,
            ),
            programs: unique,
            names,
        }
    }

    pub fn from_config(store: &OptionStore, config: &ProgramCollectionConfig) -> Self {
        Self::new(store, &config.name, config.programs.clone(), config.enabled)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &OptionStore {
        &self.store
    }

    /// Program names in configuration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn program(&self, name: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.name == name)
    }

    /// The selected program, if integration is enabled and the persisted
    /// name still refers to a known program.
    pub fn current_program(&self) -> Option<&Program> {
        if !self.enable_collection_option.value() {
            return None;
        }
        self.program(&self.current_name_option.value())
    }
}

/// All configured collections, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct ProgramCollectionMap {
    collections: Vec<ProgramCollection>,
}

impl ProgramCollectionMap {
    pub fn from_config(store: &OptionStore, configs: &[ProgramCollectionConfig]) -> Self {
        Self {
            collections: configs
                .iter()
                .map(|config| ProgramCollection::from_config(store, config))
                .collect(),
        }
    }

    pub fn collection(&self, name: &str) -> Option<&ProgramCollection> {
        self.collections.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProgramCollection> {
        self.collections.iter()
    }
}
