//! Views: the widget side of an option entry.

use super::entry::EntryWidget;
use crate::options::Color;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

/// A value as a widget would hold it while the dialog is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntryValue {
    Bool(bool),
    Text(String),
    Int(i32),
    Index(usize),
    Color(Color),
    Key { key: String, action: usize },
}

/// Observer bound to exactly one entry.
pub trait OptionView {
    fn set_visible(&mut self, visible: bool);
    fn set_active(&mut self, active: bool);

    /// The user changed the widget's value.
    fn show_value(&mut self, _value: &EntryValue) {}

    /// Commit whatever the widget currently shows into the entry.
    fn on_accept(&mut self, entry: EntryWidget<'_>);
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub visible: bool,
    pub active: bool,
    pub pending: Option<EntryValue>,
    pub accepted: bool,
}

/// Shared read access to a [`HeadlessView`] after it has been handed to an
/// entry.
#[derive(Debug, Clone, Default)]
pub struct ViewHandle(Rc<RefCell<ViewState>>);

impl ViewHandle {
    pub fn is_visible(&self) -> bool {
        self.0.borrow().visible
    }

    pub fn is_active(&self) -> bool {
        self.0.borrow().active
    }

    pub fn pending(&self) -> Option<EntryValue> {
        self.0.borrow().pending.clone()
    }

    pub fn was_accepted(&self) -> bool {
        self.0.borrow().accepted
    }
}

/// View without a toolkit behind it. Used by the command line front end and
/// by tests; it keeps the last user edit and commits it on accept.
#[derive(Debug, Default)]
pub struct HeadlessView {
    state: ViewHandle,
}

impl HeadlessView {
    pub fn new() -> (Self, ViewHandle) {
        let view = HeadlessView::default();
        let handle = view.state.clone();
        (view, handle)
    }
}

impl OptionView for HeadlessView {
    fn set_visible(&mut self, visible: bool) {
        self.state.0.borrow_mut().visible = visible;
    }

    fn set_active(&mut self, active: bool) {
        self.state.0.borrow_mut().active = active;
    }

    fn show_value(&mut self, value: &EntryValue) {
        if matches!(value, EntryValue::Key { .. }) {
            return;
        }
        self.state.0.borrow_mut().pending = Some(value.clone());
    }

    fn on_accept(&mut self, entry: EntryWidget<'_>) {
        let pending = {
            let mut state = self.state.0.borrow_mut();
            state.accepted = true;
            state.pending.take()
        };
        let kind = entry.kind();
        match (entry, pending) {
            (EntryWidget::Boolean(e), Some(EntryValue::Bool(state))) => e.on_accept(state),
            (EntryWidget::Boolean(e), other) => {
                warn_mismatch(kind, other.as_ref());
                let state = e.initial_state();
                e.on_accept(state);
            }
            (EntryWidget::String(e), Some(EntryValue::Text(text))) => e.on_accept(&text),
            (EntryWidget::String(e), other) => {
                warn_mismatch(kind, other.as_ref());
                let text = e.initial_value();
                e.on_accept(&text);
            }
            (EntryWidget::Spin(e), Some(EntryValue::Int(value))) => {
                let value = value.clamp(e.min_value(), e.max_value());
                e.on_accept(value);
            }
            (EntryWidget::Spin(e), other) => {
                warn_mismatch(kind, other.as_ref());
                let value = e.initial_value();
                e.on_accept(value);
            }
            (EntryWidget::Combo(e), Some(EntryValue::Text(text))) => e.on_accept(&text),
            (EntryWidget::Combo(e), Some(EntryValue::Index(index)))
                if index < e.values().len() =>
            {
                let text = e.values()[index].clone();
                e.on_accept(&text);
            }
            (EntryWidget::Combo(e), other) => {
                warn_mismatch(kind, other.as_ref());
                let text = e.initial_value();
                e.on_accept(&text);
            }
            (EntryWidget::Choice(e), Some(EntryValue::Index(index)))
                if index < e.choice_number() =>
            {
                e.on_accept(index)
            }
            (EntryWidget::Choice(e), other) => {
                warn_mismatch(kind, other.as_ref());
                let index = e.initial_checked_index();
                e.on_accept(index);
            }
            (EntryWidget::Color(e), Some(EntryValue::Color(color))) => e.on_accept(color),
            (EntryWidget::Color(e), other) => {
                warn_mismatch(kind, other.as_ref());
                let color = e.color();
                e.on_accept(color);
            }
            (EntryWidget::Key(e), _) => e.on_accept(),
            (EntryWidget::UserDefined(_), _) => {
                debug!("User-defined entry commits through its own view");
            }
        }
    }
}

fn warn_mismatch(kind: super::OptionKind, pending: Option<&EntryValue>) {
    if let Some(value) = pending {
        warn!(%kind, ?value, "Discarding edit that does not fit the entry kind");
    }
}
