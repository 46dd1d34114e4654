//! External program integration tabs.
//!
//! Each configured [`ProgramCollection`] (dictionaries, library managers, ...)
//! gets a tab with a master switch, an optional program chooser, and one text
//! row per program parameter. Parameter rows follow the chooser; everything
//! follows the switch.

mod entries;
mod program;

use crate::dialog::{
    BooleanEntry, EntryId, EntryWidget, OptionEntry, OptionsDialog, SimpleStringEntry,
    format_resource,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub use entries::{EnableIntegrationEntry, ProgramChoiceEntry};
pub use program::{OptionDescription, Program, ProgramCollection, ProgramCollectionMap};

/// Where the rows of a freshly built integration tab ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationTab {
    pub enable: EntryId,
    pub choice: Option<EntryId>,
    pub parameters: BTreeMap<String, Vec<EntryId>>,
    pub additional: Vec<EntryId>,
}

/// Build the integration tab for `collection` under the tab `key`.
///
/// `additional_options` are extra rows owned by the caller's feature (for
/// example "open links in the external browser"). They are shown under the
/// master switch; when there is nothing to integrate with they are dropped
/// and no tab is created.
pub fn create_integration_tab(
    dialog: &mut OptionsDialog,
    collection: Option<&ProgramCollection>,
    key: &str,
    additional_options: Vec<Box<dyn OptionEntry>>,
) -> Option<IntegrationTab> {
    let Some(collection) = collection.filter(|c| !c.names().is_empty()) else {
        debug!(
            tab = %key,
            discarded = additional_options.len(),
            "No programs to integrate; skipping tab"
        );
        drop(additional_options);
        return None;
    };

    let program_names = collection.names();
    let tab = dialog.create_tab(key);
    let start = tab.len();

    let display_name = if program_names.len() == 1 {
        program_names[0].clone()
    } else {
        tab.value("defaultName")
    };
    let option_name = format_resource(&tab.value("enableIntegration"), &display_name);

    let enable_id = EntryId(start);
    let mut next = start + 1;
    let mut enable =
        EnableIntegrationEntry::new(&option_name, collection.enable_collection_option.clone());

    let mut choice = None;
    if program_names.len() > 1 {
        let id = EntryId(next);
        next += 1;
        enable.set_program_choice_entry(id);
        choice = Some((id, ProgramChoiceEntry::new(&tab.value("choice"), collection)));
    }

    let mut rows: Vec<(String, Box<dyn OptionEntry>)> = Vec::new();
    let mut parameters: BTreeMap<String, Vec<EntryId>> = BTreeMap::new();
    for program_name in program_names {
        let Some(program) = collection.program(program_name) else {
            continue;
        };
        for description in &program.options {
            let id = EntryId(next);
            next += 1;
            let option = program::parameter_option(collection.store(), program_name, description);
            let entry: Box<dyn OptionEntry> =
                Box::new(SimpleStringEntry::new(&description.display_name, option));
            match choice.as_mut() {
                Some((_, choice)) => choice.add_dependent_entry(program_name, id),
                None => enable.add_dependent_entry(id),
            }
            parameters.entry(program_name.clone()).or_default().push(id);
            rows.push((description.display_name.clone(), entry));
        }
    }

    let mut additional = Vec::with_capacity(additional_options.len());
    for entry in additional_options {
        let id = EntryId(next);
        next += 1;
        enable.add_dependent_entry(id);
        additional.push(id);
        rows.push((String::new(), entry));
    }

    let initial_state = enable.initial_state();
    let choice_id = choice.as_ref().map(|(id, _)| *id);
    let added = tab.add_option(&option_name, "", Box::new(enable));
    debug_assert_eq!(added, enable_id);
    if let Some((id, choice)) = choice {
        let added = tab.add_option_by_key("choice", Box::new(choice));
        debug_assert_eq!(added, id);
    }
    for (label, entry) in rows {
        tab.add_option(&label, "", entry);
    }
    debug_assert_eq!(tab.len(), next);

    let propagations = match tab.entry_mut(enable_id).map(|entry| entry.widget()) {
        Some(EntryWidget::Boolean(entry)) => entry.on_value_change(initial_state),
        _ => Vec::new(),
    };
    tab.apply(propagations);

    info!(
        tab = %key,
        collection = %collection.name(),
        programs = program_names.len(),
        enabled = initial_state,
        "Built integration tab"
    );
    Some(IntegrationTab {
        enable: enable_id,
        choice: choice_id,
        parameters,
        additional,
    })
}
