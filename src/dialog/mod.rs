//! Options dialog model.
//!
//! A dialog is a list of named tabs; a tab is an arena of option entries in
//! display order. Entries refer to each other only by [`EntryId`], and all
//! cross-entry effects flow through [`Propagation`] values that the tab
//! applies, so there is no shared mutable aliasing between entries.

mod entry;
mod resources;
mod simple;
mod view;

use anyhow::{Result, anyhow, bail};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

pub use entry::{
    BooleanEntry, ChoiceEntry, ColorEntry, ComboEntry, EntryBase, EntryId, EntryWidget, KeyEntry,
    OptionEntry, OptionKind, Propagation, SpinEntry, StringEntry, UserDefinedEntry,
};
pub use resources::{COMMON_SECTION, Resources, format_resource};
pub use simple::{
    BOOLEAN3_VALUES, KeyBindingEntry, SimpleBoolean3Entry, SimpleBooleanEntry, SimpleChoiceEntry,
    SimpleColorEntry, SimpleComboEntry, SimpleSpinEntry, SimpleStringEntry, ToggleBooleanEntry,
};
pub use view::{EntryValue, HeadlessView, OptionView, ViewHandle, ViewState};

struct TabItem {
    name: String,
    tooltip: String,
    entry: Box<dyn OptionEntry>,
    view: Option<ViewHandle>,
}

pub struct DialogTab {
    key: String,
    resources: Resources,
    items: Vec<TabItem>,
}

impl DialogTab {
    fn new(key: &str, resources: Resources) -> Self {
        Self {
            key: key.to_string(),
            resources,
            items: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resource string from this tab's section.
    pub fn value(&self, resource_key: &str) -> String {
        self.resources.value(&self.key, resource_key)
    }

    /// Append an entry. Entries without a bound view get a headless one.
    pub fn add_option(
        &mut self,
        name: &str,
        tooltip: &str,
        mut entry: Box<dyn OptionEntry>,
    ) -> EntryId {
        let id = EntryId(self.items.len());
        let view = if entry.base().has_view() {
            None
        } else {
            let (view, handle) = HeadlessView::new();
            entry.set_view(Box::new(view));
            Some(handle)
        };
        debug!(tab = %self.key, %id, %name, kind = %entry.kind(), "Added option entry");
        self.items.push(TabItem {
            name: name.to_string(),
            tooltip: tooltip.to_string(),
            entry,
            view,
        });
        id
    }

    /// Append an entry labelled by a resource string of this tab.
    pub fn add_option_by_key(
        &mut self,
        resource_key: &str,
        entry: Box<dyn OptionEntry>,
    ) -> EntryId {
        let name = self.value(resource_key);
        self.add_option(&name, "", entry)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        (0..self.items.len()).map(EntryId)
    }

    pub fn entry(&self, id: EntryId) -> Option<&dyn OptionEntry> {
        self.items.get(id.0).map(|item| item.entry.as_ref())
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut (dyn OptionEntry + 'static)> {
        self.items.get_mut(id.0).map(|item| item.entry.as_mut())
    }

    /// Label the entry was added under.
    pub fn label(&self, id: EntryId) -> Option<&str> {
        self.items.get(id.0).map(|item| item.name.as_str())
    }

    pub fn view(&self, id: EntryId) -> Option<&ViewHandle> {
        self.items.get(id.0).and_then(|item| item.view.as_ref())
    }

    pub fn find(&self, label: &str) -> Option<EntryId> {
        self.items
            .iter()
            .position(|item| item.name == label)
            .map(EntryId)
    }

    pub fn visible_labels(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| item.entry.is_visible())
            .map(|item| item.name.as_str())
            .collect()
    }

    /// Feed a user edit to an entry, as the entry's widget would.
    pub fn edit(&mut self, id: EntryId, value: EntryValue) -> Result<()> {
        let item = self
            .items
            .get_mut(id.0)
            .ok_or_else(|| anyhow!("no entry {id} in tab {}", self.key))?;
        let kind = item.entry.kind();
        let propagations = match (item.entry.widget(), &value) {
            (EntryWidget::Boolean(e), EntryValue::Bool(state)) => e.on_value_change(*state),
            (EntryWidget::Combo(e), EntryValue::Index(index)) => e.on_value_selected(*index),
            (EntryWidget::Combo(e), EntryValue::Text(text)) => {
                match e.values().iter().position(|v| v == text) {
                    Some(index) => e.on_value_selected(index),
                    None => e.on_value_change(text),
                }
            }
            (EntryWidget::Key(e), EntryValue::Key { key, action }) => {
                if *action >= e.action_names().len() {
                    bail!("action index {action} out of range for {}", item.name);
                }
                e.on_value_change(key, *action);
                Vec::new()
            }
            (EntryWidget::Choice(_), EntryValue::Index(_))
            | (EntryWidget::String(_), EntryValue::Text(_))
            | (EntryWidget::Spin(_), EntryValue::Int(_))
            | (EntryWidget::Color(_), EntryValue::Color(_)) => Vec::new(),
            (_, value) => bail!("{value:?} is not a valid edit for {kind} entry {}", item.name),
        };
        item.entry.base_mut().notify_value(&value);
        self.apply(propagations);
        Ok(())
    }

    /// Apply visibility changes, following controller cascades.
    pub fn apply(&mut self, propagations: Vec<Propagation>) {
        let mut queue: VecDeque<Propagation> = propagations.into();
        let mut cascaded = HashSet::new();
        while let Some(step) = queue.pop_front() {
            match step {
                Propagation::SetVisible(id, visible) => match self.items.get_mut(id.0) {
                    Some(item) => item.entry.set_visible(visible),
                    None => warn!(tab = %self.key, %id, "Visibility change for unknown entry"),
                },
                Propagation::UpdateDependents(id, visible) => {
                    if !cascaded.insert((id, visible)) {
                        continue;
                    }
                    match self.items.get(id.0) {
                        Some(item) => queue.extend(item.entry.update_dependents(visible)),
                        None => warn!(tab = %self.key, %id, "Cascade to unknown entry"),
                    }
                }
            }
        }
    }

    fn accept(&mut self) {
        for item in &mut self.items {
            let Some(mut view) = item.entry.base_mut().take_view() else {
                continue;
            };
            view.on_accept(item.entry.widget());
            item.entry.base_mut().restore_view(view);
        }
    }

    pub fn snapshot(&self) -> TabSnapshot {
        TabSnapshot {
            key: self.key.clone(),
            entries: self
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| EntrySnapshot {
                    id: index,
                    name: item.name.clone(),
                    tooltip: item.tooltip.clone(),
                    kind: item.entry.kind(),
                    visible: item.entry.is_visible(),
                    active: item.entry.is_active(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TabSnapshot {
    pub key: String,
    pub entries: Vec<EntrySnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntrySnapshot {
    pub id: usize,
    pub name: String,
    pub tooltip: String,
    pub kind: OptionKind,
    pub visible: bool,
    pub active: bool,
}

/// A settings dialog: named tabs plus the resource strings that label them.
#[derive(Default)]
pub struct OptionsDialog {
    resources: Resources,
    tabs: Vec<DialogTab>,
}

impl OptionsDialog {
    pub fn new(resources: Resources) -> Self {
        Self {
            resources,
            tabs: Vec::new(),
        }
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    /// Create the tab named `key`, or return it if it already exists.
    pub fn create_tab(&mut self, key: &str) -> &mut DialogTab {
        let index = match self.tabs.iter().position(|tab| tab.key == key) {
            Some(index) => index,
            None => {
                info!(tab = %key, "Creating options tab");
                self.tabs.push(DialogTab::new(key, self.resources.clone()));
                self.tabs.len() - 1
            }
        };
        &mut self.tabs[index]
    }

    pub fn tab(&self, key: &str) -> Option<&DialogTab> {
        self.tabs.iter().find(|tab| tab.key == key)
    }

    pub fn tab_mut(&mut self, key: &str) -> Option<&mut DialogTab> {
        self.tabs.iter_mut().find(|tab| tab.key == key)
    }

    pub fn tabs(&self) -> &[DialogTab] {
        &self.tabs
    }

    /// Commit every entry of every tab through its view.
    pub fn accept(&mut self) {
        for tab in &mut self.tabs {
            tab.accept();
        }
        info!(tabs = self.tabs.len(), "Accepted options dialog");
    }

    pub fn snapshot(&self) -> Vec<TabSnapshot> {
        self.tabs.iter().map(DialogTab::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{
        BooleanOption, Color, ColorOption, IntegerRangeOption, LOOK_AND_FEEL_CATEGORY, OptionStore,
        StringOption,
    };
    use std::cell::Cell;
    use std::rc::Rc;

    fn dialog() -> OptionsDialog {
        OptionsDialog::new(Resources::default())
    }

    #[test]
    fn create_tab_reuses_existing_key() {
        let mut dialog = dialog();
        dialog.create_tab("Text");
        dialog.create_tab("Text");
        assert_eq!(dialog.tabs().len(), 1);
    }

    #[test]
    fn combo_commits_the_selected_value() {
        let store = OptionStore::in_memory();
        let font = StringOption::new(&store, LOOK_AND_FEEL_CATEGORY, "Text", "Font", "Serif");
        let fonts = vec!["Serif".to_string(), "Sans".to_string(), "Mono".to_string()];

        let mut dialog = dialog();
        let tab = dialog.create_tab("Look");
        let id = tab.add_option(
            "Font",
            "",
            Box::new(SimpleComboEntry::new("Font", font.clone(), fonts)),
        );
        tab.edit(id, EntryValue::Index(2)).expect("combo edit");
        assert!(tab.edit(id, EntryValue::Bool(true)).is_err());
        dialog.accept();

        assert_eq!(font.value(), "Mono");
        assert_eq!(store.get(LOOK_AND_FEEL_CATEGORY, "Text", "Font").as_deref(), Some("Mono"));
    }

    #[test]
    fn accept_commits_pending_edits_and_initial_values() {
        let store = OptionStore::in_memory();
        let title = StringOption::new(&store, LOOK_AND_FEEL_CATEGORY, "Window", "Title", "Leaf");
        let size =
            IntegerRangeOption::new(&store, LOOK_AND_FEEL_CATEGORY, "Text", "Size", 8, 36, 16);

        let mut dialog = dialog();
        let tab = dialog.create_tab("Look");
        let title_id = tab.add_option(
            "Title",
            "",
            Box::new(SimpleStringEntry::new("Title", title.clone())),
        );
        let size_id = tab.add_option(
            "Size",
            "",
            Box::new(SimpleSpinEntry::new("Size", size.clone(), 2)),
        );
        tab.edit(size_id, EntryValue::Int(120)).expect("spin edit");

        dialog.accept();

        assert_eq!(title.value(), "Leaf");
        assert_eq!(size.value(), 36);
        let tab = dialog.tab("Look").expect("tab exists");
        assert!(tab.view(title_id).expect("headless view").was_accepted());
    }

    #[test]
    fn edit_rejects_values_of_the_wrong_kind() {
        let store = OptionStore::in_memory();
        let flag = BooleanOption::new(&store, LOOK_AND_FEEL_CATEGORY, "Text", "Bold", false);
        let mut dialog = dialog();
        let tab = dialog.create_tab("Look");
        let id = tab.add_option("Bold", "", Box::new(SimpleBooleanEntry::new("Bold", flag)));
        assert!(tab.edit(id, EntryValue::Text("yes".into())).is_err());
        assert!(tab.edit(EntryId(9), EntryValue::Bool(true)).is_err());
    }

    #[test]
    fn visibility_reaches_the_bound_view() {
        let store = OptionStore::in_memory();
        let flag = BooleanOption::new(&store, LOOK_AND_FEEL_CATEGORY, "Text", "Bold", false);
        let mut dialog = dialog();
        let tab = dialog.create_tab("Look");
        let id = tab.add_option("Bold", "", Box::new(SimpleBooleanEntry::new("Bold", flag)));
        let handle = tab.view(id).cloned().expect("headless view");
        assert!(handle.is_visible());

        tab.apply(vec![Propagation::SetVisible(id, false)]);
        assert!(!handle.is_visible());
        assert!(tab.visible_labels().is_empty());

        let entry = tab.entry_mut(id).expect("entry");
        entry.set_active(false);
        assert!(!handle.is_active());
    }

    #[test]
    fn color_edit_is_committed() {
        let store = OptionStore::in_memory();
        let background = ColorOption::new(
            &store,
            LOOK_AND_FEEL_CATEGORY,
            "Colors",
            "Background",
            Color::rgb(255, 255, 255),
        );
        let mut dialog = dialog();
        let tab = dialog.create_tab("Colors");
        let id = tab.add_option(
            "Background",
            "",
            Box::new(SimpleColorEntry::new("Background", background.clone())),
        );
        tab.edit(id, EntryValue::Color(Color::rgb(0, 0, 0))).expect("color edit");
        dialog.accept();
        assert_eq!(background.value(), Color::rgb(0, 0, 0));
    }

    struct CountingView {
        accepts: Rc<Cell<usize>>,
    }

    impl OptionView for CountingView {
        fn set_visible(&mut self, _visible: bool) {}
        fn set_active(&mut self, _active: bool) {}
        fn on_accept(&mut self, _entry: EntryWidget<'_>) {
            self.accepts.set(self.accepts.get() + 1);
        }
    }

    struct Preview {
        base: EntryBase,
        accepts: Rc<Cell<usize>>,
    }

    impl OptionEntry for Preview {
        fn kind(&self) -> OptionKind {
            OptionKind::Unknown
        }
        fn name(&self) -> &str {
            "preview"
        }
        fn base(&self) -> &EntryBase {
            &self.base
        }
        fn base_mut(&mut self) -> &mut EntryBase {
            &mut self.base
        }
        fn widget(&mut self) -> EntryWidget<'_> {
            EntryWidget::UserDefined(self)
        }
    }

    impl UserDefinedEntry for Preview {
        fn create_view(&self) -> Box<dyn OptionView> {
            Box::new(CountingView {
                accepts: self.accepts.clone(),
            })
        }
    }

    #[test]
    fn user_defined_entry_keeps_its_own_view() {
        let accepts = Rc::new(Cell::new(0));
        let mut preview = Preview {
            base: EntryBase::default(),
            accepts: accepts.clone(),
        };
        let view = preview.create_view();
        preview.set_view(view);

        let mut dialog = dialog();
        let tab = dialog.create_tab("Look");
        let id = tab.add_option("Preview", "", Box::new(preview));
        assert!(tab.view(id).is_none());
        assert_eq!(tab.entry(id).map(|e| e.kind()), Some(OptionKind::Unknown));

        dialog.accept();
        dialog.accept();
        assert_eq!(accepts.get(), 2);
    }
}
