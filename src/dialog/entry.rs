//! The option-entry contract shared by every settings widget.
//!
//! An entry is the model side of one row in an options tab: it knows its
//! label, whether it is shown and enabled, and how to commit a value back to
//! its persisted option. The kind-specific half of the contract is reached
//! through [`OptionEntry::widget`], which hands out the capability trait that
//! matches the entry's [`OptionKind`].

use super::view::{EntryValue, OptionView};
use crate::options::Color;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Choice,
    Boolean,
    String,
    Spin,
    Combo,
    Color,
    Key,
    Unknown,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OptionKind::Choice => "choice",
            OptionKind::Boolean => "boolean",
            OptionKind::String => "string",
            OptionKind::Spin => "spin",
            OptionKind::Combo => "combo",
            OptionKind::Color => "color",
            OptionKind::Key => "key",
            OptionKind::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// Position of an entry inside its tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A visibility change requested by a controlling entry.
///
/// Controllers never touch other entries directly; they return these and the
/// owning tab applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    SetVisible(EntryId, bool),
    /// Ask another controller to recompute its own dependents.
    UpdateDependents(EntryId, bool),
}

/// UI state shared by all entries: flags plus the bound view, if any.
pub struct EntryBase {
    view: Option<Box<dyn OptionView>>,
    visible: bool,
    active: bool,
}

impl Default for EntryBase {
    fn default() -> Self {
        EntryBase {
            view: None,
            visible: true,
            active: true,
        }
    }
}

impl fmt::Debug for EntryBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryBase")
            .field("has_view", &self.view.is_some())
            .field("visible", &self.visible)
            .field("active", &self.active)
            .finish()
    }
}

impl EntryBase {
    /// Bind a view and bring it up to date with the current flags.
    pub fn set_view(&mut self, mut view: Box<dyn OptionView>) {
        view.set_visible(self.visible);
        view.set_active(self.active);
        self.view = Some(view);
    }

    pub fn has_view(&self) -> bool {
        self.view.is_some()
    }

    pub(crate) fn take_view(&mut self) -> Option<Box<dyn OptionView>> {
        self.view.take()
    }

    pub(crate) fn restore_view(&mut self, view: Box<dyn OptionView>) {
        self.view = Some(view);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        if let Some(view) = self.view.as_mut() {
            view.set_visible(visible);
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if let Some(view) = self.view.as_mut() {
            view.set_active(active);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn notify_value(&mut self, value: &EntryValue) {
        if let Some(view) = self.view.as_mut() {
            view.show_value(value);
        }
    }
}

/// Kind-specific access to an entry.
pub enum EntryWidget<'a> {
    Choice(&'a mut dyn ChoiceEntry),
    Boolean(&'a mut dyn BooleanEntry),
    String(&'a mut dyn StringEntry),
    Spin(&'a mut dyn SpinEntry),
    Combo(&'a mut dyn ComboEntry),
    Color(&'a mut dyn ColorEntry),
    Key(&'a mut dyn KeyEntry),
    UserDefined(&'a mut dyn UserDefinedEntry),
}

impl EntryWidget<'_> {
    pub fn kind(&self) -> OptionKind {
        match self {
            EntryWidget::Choice(_) => OptionKind::Choice,
            EntryWidget::Boolean(_) => OptionKind::Boolean,
            EntryWidget::String(_) => OptionKind::String,
            EntryWidget::Spin(_) => OptionKind::Spin,
            EntryWidget::Combo(_) => OptionKind::Combo,
            EntryWidget::Color(_) => OptionKind::Color,
            EntryWidget::Key(_) => OptionKind::Key,
            EntryWidget::UserDefined(_) => OptionKind::Unknown,
        }
    }
}

pub trait OptionEntry {
    fn kind(&self) -> OptionKind;
    fn name(&self) -> &str;
    fn base(&self) -> &EntryBase;
    fn base_mut(&mut self) -> &mut EntryBase;
    fn widget(&mut self) -> EntryWidget<'_>;

    fn set_view(&mut self, view: Box<dyn OptionView>) {
        self.base_mut().set_view(view);
    }

    fn set_visible(&mut self, visible: bool) {
        self.base_mut().set_visible(visible);
    }

    fn is_visible(&self) -> bool {
        self.base().is_visible()
    }

    fn set_active(&mut self, active: bool) {
        self.base_mut().set_active(active);
    }

    fn is_active(&self) -> bool {
        self.base().is_active()
    }

    /// Recompute visibility of the entries this one controls.
    fn update_dependents(&self, _visible: bool) -> Vec<Propagation> {
        Vec::new()
    }
}

/// Radio-button style selection among a fixed number of labelled choices.
pub trait ChoiceEntry {
    fn text(&self, index: usize) -> &str;
    fn choice_number(&self) -> usize;
    fn initial_checked_index(&self) -> usize;
    fn on_accept(&mut self, index: usize);
}

pub trait StringEntry {
    fn initial_value(&self) -> String;
    fn on_accept(&mut self, value: &str);
}

pub trait BooleanEntry {
    fn initial_state(&self) -> bool;

    /// Called while the dialog is open, before any accept.
    fn on_value_change(&mut self, _state: bool) -> Vec<Propagation> {
        Vec::new()
    }

    fn on_accept(&mut self, state: bool);
}

pub trait SpinEntry {
    fn initial_value(&self) -> i32;
    fn min_value(&self) -> i32;
    fn max_value(&self) -> i32;
    fn step(&self) -> i32;
    fn on_accept(&mut self, value: i32);
}

pub trait ComboEntry {
    fn initial_value(&self) -> String;
    fn values(&self) -> &[String];

    fn on_value_change(&mut self, _value: &str) -> Vec<Propagation> {
        Vec::new()
    }

    fn on_value_selected(&mut self, index: usize) -> Vec<Propagation> {
        match self.values().get(index).cloned() {
            Some(value) => self.on_value_change(&value),
            None => Vec::new(),
        }
    }

    fn on_accept(&mut self, value: &str);
}

pub trait ColorEntry {
    fn color(&self) -> Color;
    fn on_accept(&mut self, color: Color);
}

/// Key-binding editor: maps key names to indices into `action_names`.
pub trait KeyEntry {
    fn add_action_name(&mut self, action_name: &str);
    fn action_names(&self) -> &[String];
    fn on_accept(&mut self);
    fn action_index(&self, key: &str) -> usize;
    fn on_value_change(&mut self, key: &str, index: usize);
}

/// Entry whose widget is supplied by the caller rather than the dialog.
pub trait UserDefinedEntry {
    fn create_view(&self) -> Box<dyn OptionView>;
}
