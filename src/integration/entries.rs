use super::program::ProgramCollection;
use crate::dialog::{
    BooleanEntry, ComboEntry, EntryBase, EntryId, EntryWidget, OptionEntry, OptionKind,
    Propagation, ToggleBooleanEntry,
};
use crate::options::{BooleanOption, StringOption};
use std::collections::BTreeMap;
use tracing::debug;

/// Combo listing the programs of a collection. Parameter rows registered under
/// a program name are shown only while that program is selected.
pub struct ProgramChoiceEntry {
    base: EntryBase,
    name: String,
    names: Vec<String>,
    current_name_option: StringOption,
    value: String,
    dependents: BTreeMap<EntryId, String>,
}

impl ProgramChoiceEntry {
    pub fn new(name: &str, collection: &ProgramCollection) -> Self {
        let current_name_option = collection.current_name_option.clone();
        Self {
            base: EntryBase::default(),
            name: name.to_string(),
            names: collection.names().to_vec(),
            value: current_name_option.value(),
            current_name_option,
            dependents: BTreeMap::new(),
        }
    }

    pub fn add_dependent_entry(&mut self, program: &str, id: EntryId) {
        self.dependents.insert(id, program.to_string());
    }

    /// Currently selected program name (not yet persisted).
    pub fn selected(&self) -> &str {
        &self.value
    }
}

impl OptionEntry for ProgramChoiceEntry {
    fn kind(&self) -> OptionKind {
        OptionKind::Combo
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn base(&self) -> &EntryBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntryBase {
        &mut self.base
    }

    fn widget(&mut self) -> EntryWidget<'_> {
        EntryWidget::Combo(self)
    }

    fn update_dependents(&self, visible: bool) -> Vec<Propagation> {
        self.dependents
            .iter()
            .map(|(id, program)| Propagation::SetVisible(*id, visible && *program == self.value))
            .collect()
    }
}

impl ComboEntry for ProgramChoiceEntry {
    fn initial_value(&self) -> String {
        self.current_name_option.value()
    }

    fn values(&self) -> &[String] {
        &self.names
    }

    fn on_value_selected(&mut self, index: usize) -> Vec<Propagation> {
        let Some(value) = self.names.get(index) else {
            return Vec::new();
        };
        self.value = value.clone();
        debug!(choice = %self.name, program = %self.value, "Program selected");
        // Hidden only while integration is off, so this tracks the enable flag.
        self.update_dependents(self.is_visible())
    }

    fn on_accept(&mut self, value: &str) {
        self.current_name_option.set_value(value);
    }
}

/// Master switch of an integration tab.
pub struct EnableIntegrationEntry {
    toggle: ToggleBooleanEntry,
    program_choice: Option<EntryId>,
}

impl EnableIntegrationEntry {
    pub fn new(name: &str, option: BooleanOption) -> Self {
        Self {
            toggle: ToggleBooleanEntry::new(name, option),
            program_choice: None,
        }
    }

    pub fn add_dependent_entry(&mut self, id: EntryId) {
        self.toggle.add_dependent_entry(id);
    }

    pub fn set_program_choice_entry(&mut self, id: EntryId) {
        self.toggle.add_dependent_entry(id);
        self.program_choice = Some(id);
    }

    pub fn program_choice_entry(&self) -> Option<EntryId> {
        self.program_choice
    }
}

impl OptionEntry for EnableIntegrationEntry {
    fn kind(&self) -> OptionKind {
        OptionKind::Boolean
    }

    fn name(&self) -> &str {
        self.toggle.name()
    }

    fn base(&self) -> &EntryBase {
        self.toggle.base()
    }

    fn base_mut(&mut self) -> &mut EntryBase {
        self.toggle.base_mut()
    }

    fn widget(&mut self) -> EntryWidget<'_> {
        EntryWidget::Boolean(self)
    }

    fn update_dependents(&self, visible: bool) -> Vec<Propagation> {
        let mut out = self.toggle.update_dependents(visible);
        if let Some(choice) = self.program_choice {
            out.push(Propagation::UpdateDependents(choice, visible));
        }
        out
    }
}

impl BooleanEntry for EnableIntegrationEntry {
    fn initial_state(&self) -> bool {
        self.toggle.initial_state()
    }

    fn on_value_change(&mut self, state: bool) -> Vec<Propagation> {
        self.update_dependents(state)
    }

    fn on_accept(&mut self, state: bool) {
        self.toggle.on_accept(state);
    }
}
