//! Entries that edit exactly one persisted option.

use super::entry::{
    BooleanEntry, ChoiceEntry, ColorEntry, ComboEntry, EntryBase, EntryId, EntryWidget, KeyEntry,
    OptionEntry, OptionKind, Propagation, SpinEntry, StringEntry,
};
use crate::options::{
    Boolean3, Boolean3Option, BooleanOption, Color, ColorOption, IntegerRangeOption, KEYS_CATEGORY,
    OptionStore, StringOption,
};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use tracing::debug;

macro_rules! entry_common {
    ($kind:expr, $variant:ident) => {
        fn kind(&self) -> OptionKind {
            $kind
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
            EntryWidget::$variant(self)
        }
    };
}

pub struct SimpleStringEntry {
    base: EntryBase,
    name: String,
    option: StringOption,
}

impl SimpleStringEntry {
    pub fn new(name: &str, option: StringOption) -> Self {
        Self {
            base: EntryBase::default(),
            name: name.to_string(),
            option,
        }
    }
}

impl OptionEntry for SimpleStringEntry {
    entry_common!(OptionKind::String, String);
}

impl StringEntry for SimpleStringEntry {
    fn initial_value(&self) -> String {
        self.option.value()
    }

    fn on_accept(&mut self, value: &str) {
        self.option.set_value(value);
    }
}

pub struct SimpleBooleanEntry {
    base: EntryBase,
    name: String,
    option: BooleanOption,
}

impl SimpleBooleanEntry {
    pub fn new(name: &str, option: BooleanOption) -> Self {
        Self {
            base: EntryBase::default(),
            name: name.to_string(),
            option,
        }
    }
}

impl OptionEntry for SimpleBooleanEntry {
    entry_common!(OptionKind::Boolean, Boolean);
}

impl BooleanEntry for SimpleBooleanEntry {
    fn initial_state(&self) -> bool {
        self.option.value()
    }

    fn on_accept(&mut self, state: bool) {
        self.option.set_value(state);
    }
}

/// Boolean entry that shows its dependents only while it is checked.
pub struct ToggleBooleanEntry {
    base: EntryBase,
    name: String,
    option: BooleanOption,
    dependents: Vec<EntryId>,
}

impl ToggleBooleanEntry {
    pub fn new(name: &str, option: BooleanOption) -> Self {
        Self {
            base: EntryBase::default(),
            name: name.to_string(),
            option,
            dependents: Vec::new(),
        }
    }

    pub fn add_dependent_entry(&mut self, id: EntryId) {
        if !self.dependents.contains(&id) {
            self.dependents.push(id);
        }
    }

    pub fn dependents(&self) -> &[EntryId] {
        &self.dependents
    }
}

impl OptionEntry for ToggleBooleanEntry {
    entry_common!(OptionKind::Boolean, Boolean);

    fn update_dependents(&self, visible: bool) -> Vec<Propagation> {
        self.dependents
            .iter()
            .map(|id| Propagation::SetVisible(*id, visible))
            .collect()
    }
}

impl BooleanEntry for ToggleBooleanEntry {
    fn initial_state(&self) -> bool {
        self.option.value()
    }

    fn on_value_change(&mut self, state: bool) -> Vec<Propagation> {
        self.update_dependents(state)
    }

    fn on_accept(&mut self, state: bool) {
        self.option.set_value(state);
    }
}

pub struct SimpleSpinEntry {
    base: EntryBase,
    name: String,
    option: IntegerRangeOption,
    step: i32,
}

impl SimpleSpinEntry {
    pub fn new(name: &str, option: IntegerRangeOption, step: i32) -> Self {
        Self {
            base: EntryBase::default(),
            name: name.to_string(),
            option,
            step: step.max(1),
        }
    }
}

impl OptionEntry for SimpleSpinEntry {
    entry_common!(OptionKind::Spin, Spin);
}

impl SpinEntry for SimpleSpinEntry {
    fn initial_value(&self) -> i32 {
        self.option.value()
    }

    fn min_value(&self) -> i32 {
        self.option.min_value()
    }

    fn max_value(&self) -> i32 {
        self.option.max_value()
    }

    fn step(&self) -> i32 {
        self.step
    }

    fn on_accept(&mut self, value: i32) {
        self.option.set_value(value);
    }
}

/// Combo over a string option restricted to a fixed list of values.
pub struct SimpleComboEntry {
    base: EntryBase,
    name: String,
    option: StringOption,
    values: Vec<String>,
}

impl SimpleComboEntry {
    pub fn new(name: &str, option: StringOption, values: Vec<String>) -> Self {
        Self {
            base: EntryBase::default(),
            name: name.to_string(),
            option,
            values,
        }
    }
}

impl OptionEntry for SimpleComboEntry {
    entry_common!(OptionKind::Combo, Combo);
}

impl ComboEntry for SimpleComboEntry {
    fn initial_value(&self) -> String {
        self.option.value()
    }

    fn values(&self) -> &[String] {
        &self.values
    }

    fn on_accept(&mut self, value: &str) {
        self.option.set_value(value);
    }
}

pub static BOOLEAN3_VALUES: Lazy<Vec<String>> = Lazy::new(|| {
    vec![
        "on".to_string(),
        "off".to_string(),
        "unchanged".to_string(),
    ]
});

pub struct SimpleBoolean3Entry {
    base: EntryBase,
    name: String,
    option: Boolean3Option,
}

impl SimpleBoolean3Entry {
    pub fn new(name: &str, option: Boolean3Option) -> Self {
        Self {
            base: EntryBase::default(),
            name: name.to_string(),
            option,
        }
    }
}

impl OptionEntry for SimpleBoolean3Entry {
    entry_common!(OptionKind::Combo, Combo);
}

impl ComboEntry for SimpleBoolean3Entry {
    fn initial_value(&self) -> String {
        let index = match self.option.value() {
            Boolean3::True => 0,
            Boolean3::False => 1,
            Boolean3::Undefined => 2,
        };
        BOOLEAN3_VALUES[index].clone()
    }

    fn values(&self) -> &[String] {
        &BOOLEAN3_VALUES
    }

    fn on_accept(&mut self, value: &str) {
        let state = match BOOLEAN3_VALUES.iter().position(|v| v == value) {
            Some(0) => Boolean3::True,
            Some(1) => Boolean3::False,
            _ => Boolean3::Undefined,
        };
        self.option.set_value(state);
    }
}

pub struct SimpleColorEntry {
    base: EntryBase,
    name: String,
    option: ColorOption,
}

impl SimpleColorEntry {
    pub fn new(name: &str, option: ColorOption) -> Self {
        Self {
            base: EntryBase::default(),
            name: name.to_string(),
            option,
        }
    }
}

impl OptionEntry for SimpleColorEntry {
    entry_common!(OptionKind::Color, Color);
}

impl ColorEntry for SimpleColorEntry {
    fn color(&self) -> Color {
        self.option.value()
    }

    fn on_accept(&mut self, color: Color) {
        self.option.set_value(color);
    }
}

/// Labelled choices stored as the index of the checked one.
pub struct SimpleChoiceEntry {
    base: EntryBase,
    name: String,
    option: IntegerRangeOption,
    texts: Vec<String>,
}

impl SimpleChoiceEntry {
    pub fn new(name: &str, option: IntegerRangeOption, texts: Vec<String>) -> Self {
        Self {
            base: EntryBase::default(),
            name: name.to_string(),
            option,
            texts,
        }
    }
}

impl OptionEntry for SimpleChoiceEntry {
    entry_common!(OptionKind::Choice, Choice);
}

impl ChoiceEntry for SimpleChoiceEntry {
    fn text(&self, index: usize) -> &str {
        self.texts.get(index).map(String::as_str).unwrap_or("")
    }

    fn choice_number(&self) -> usize {
        self.texts.len()
    }

    fn initial_checked_index(&self) -> usize {
        let index = usize::try_from(self.option.value()).unwrap_or(0);
        index.min(self.texts.len().saturating_sub(1))
    }

    fn on_accept(&mut self, index: usize) {
        self.option
            .set_value(i32::try_from(index).unwrap_or(i32::MAX));
    }
}

/// Key bindings for one keymap, persisted as `Keys.<keymap>.<key> = action`.
///
/// Action index 0 is the "no action" slot; binding a key to it removes the
/// stored binding.
pub struct KeyBindingEntry {
    base: EntryBase,
    name: String,
    store: OptionStore,
    action_names: Vec<String>,
    changes: BTreeMap<String, usize>,
}

impl KeyBindingEntry {
    pub fn new(store: &OptionStore, keymap: &str, none_action: &str) -> Self {
        Self {
            base: EntryBase::default(),
            name: keymap.to_string(),
            store: store.clone(),
            action_names: vec![none_action.to_string()],
            changes: BTreeMap::new(),
        }
    }

    fn stored_index(&self, key: &str) -> usize {
        self.store
            .get(KEYS_CATEGORY, &self.name, key)
            .and_then(|action| self.action_names.iter().position(|a| *a == action))
            .unwrap_or(0)
    }
}

impl OptionEntry for KeyBindingEntry {
    entry_common!(OptionKind::Key, Key);
}

impl KeyEntry for KeyBindingEntry {
    fn add_action_name(&mut self, action_name: &str) {
        self.action_names.push(action_name.to_string());
    }

    fn action_names(&self) -> &[String] {
        &self.action_names
    }

    fn on_accept(&mut self) {
        for (key, index) in std::mem::take(&mut self.changes) {
            match self.action_names.get(index) {
                Some(action) if index > 0 => {
                    self.store.set(KEYS_CATEGORY, &self.name, &key, action)
                }
                _ => self.store.unset(KEYS_CATEGORY, &self.name, &key),
            }
            debug!(keymap = %self.name, %key, index, "Committed key binding");
        }
    }

    fn action_index(&self, key: &str) -> usize {
        self.changes
            .get(key)
            .copied()
            .unwrap_or_else(|| self.stored_index(key))
    }

    fn on_value_change(&mut self, key: &str, index: usize) {
        self.changes.insert(key.to_string(), index);
    }
}
