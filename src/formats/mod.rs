//! Format plugins and the collection that picks one per book file.
//!
//! Plugins are consulted in registration order; the first one that accepts a
//! file wins. A "strong" lookup additionally requires the plugin to read real
//! meta info, which lets callers skip formats that can only guess a title.

mod book;
pub mod detect;
mod epub;
mod markdown;
mod txt;

pub use book::{Book, BookFile, BookModel, CoverImage};
pub use self::epub::EpubPlugin;
pub use markdown::MarkdownPlugin;
pub use txt::{BreakType, PlainTextFormat, PlainTextPlugin};

use crate::config::FormatsConfig;
use crate::dialog::{EntryId, OptionsDialog};
use crate::options::{BooleanOption, FORMATS_CATEGORY, OptionStore, StringOption};
use anyhow::Result;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, info};

const GLOBAL_GROUP: &str = "Global";

/// Options shared by every plugin that has to guess encoding or language.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub language_auto_detect: BooleanOption,
    pub default_language: StringOption,
    pub default_encoding: StringOption,
}

impl FormatOptions {
    pub fn new(store: &OptionStore, default_language: &str, default_encoding: &str) -> Self {
        Self {
            language_auto_detect: BooleanOption::new(
                store,
                FORMATS_CATEGORY,
                GLOBAL_GROUP,
                "LanguageAutoDetect",
                true,
            ),
            default_language: StringOption::new(
                store,
                FORMATS_CATEGORY,
                GLOBAL_GROUP,
                "DefaultLanguage",
                default_language,
            ),
            default_encoding: StringOption::new(
                store,
                FORMATS_CATEGORY,
                GLOBAL_GROUP,
                "DefaultEncoding",
                default_encoding,
            ),
        }
    }

    /// Config values become the option defaults, so saved choices still win.
    pub fn from_config(store: &OptionStore, config: &FormatsConfig) -> Self {
        let mut options = Self::new(store, &config.default_language, &config.default_encoding);
        options.language_auto_detect = BooleanOption::new(
            store,
            FORMATS_CATEGORY,
            GLOBAL_GROUP,
            "LanguageAutoDetect",
            config.language_auto_detect,
        );
        options
    }
}

/// Entries a plugin added to the book info dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatInfoPage {
    pub tab: String,
    pub entries: Vec<EntryId>,
}

pub trait FormatPlugin {
    fn name(&self) -> &str;

    /// Whether `read_meta_info` extracts declared metadata rather than guessing.
    fn provides_meta_info(&self) -> bool;

    fn accepts_file(&self, file: &BookFile) -> bool;

    /// Add per-file settings to the book info dialog.
    fn create_info_page(
        &self,
        _dialog: &mut OptionsDialog,
        _path: &Path,
    ) -> Option<FormatInfoPage> {
        None
    }

    /// Cheap check that the file can be opened at all.
    fn try_open(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn read_meta_info(&self, book: &mut Book) -> Result<()>;

    fn read_model(&self, model: &mut BookModel) -> Result<()>;

    fn cover_image(&self, _book: &Book) -> Option<CoverImage> {
        None
    }
}

pub struct PluginCollection {
    options: FormatOptions,
    plugins: Vec<Box<dyn FormatPlugin>>,
}

thread_local! {
    static INSTANCE: RefCell<Option<Rc<PluginCollection>>> = const { RefCell::new(None) };
}

impl PluginCollection {
    /// Collection with the built-in plugins.
    pub fn new(store: &OptionStore, config: &FormatsConfig) -> Self {
        let options = FormatOptions::from_config(store, config);
        let mut collection = Self {
            options: options.clone(),
            plugins: Vec::new(),
        };
        collection.add_plugin(Box::new(EpubPlugin::new(options.clone())));
        collection.add_plugin(Box::new(PlainTextPlugin::new(store, options)));
        collection.add_plugin(Box::new(MarkdownPlugin::new()));
        collection
    }

    /// The shared collection of this thread, created on first use.
    pub fn instance(store: &OptionStore, config: &FormatsConfig) -> Rc<PluginCollection> {
        INSTANCE.with(|slot| {
            slot.borrow_mut()
                .get_or_insert_with(|| {
                    info!("Creating plugin collection");
                    Rc::new(PluginCollection::new(store, config))
                })
                .clone()
        })
    }

    /// Drop the shared collection; the next `instance` call builds a new one.
    pub fn delete_instance() {
        let dropped = INSTANCE.with(|slot| slot.borrow_mut().take());
        if dropped.is_some() {
            debug!("Deleted plugin collection");
        }
    }

    pub fn add_plugin(&mut self, plugin: Box<dyn FormatPlugin>) {
        debug!(plugin = plugin.name(), "Registered format plugin");
        self.plugins.push(plugin);
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn plugins(&self) -> impl Iterator<Item = &dyn FormatPlugin> + '_ {
        self.plugins.iter().map(|plugin| plugin.as_ref())
    }

    pub fn plugin(&self, file: &BookFile, strong: bool) -> Option<&dyn FormatPlugin> {
        let found = self
            .plugins()
            .find(|plugin| (!strong || plugin.provides_meta_info()) && plugin.accepts_file(file));
        debug!(
            path = %file.path().display(),
            strong,
            plugin = found.map(|plugin| plugin.name()).unwrap_or("none"),
            "Resolved format plugin"
        );
        found
    }

    pub fn plugin_for_book(&self, book: &Book) -> Option<&dyn FormatPlugin> {
        self.plugin(&book.file(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats_config() -> FormatsConfig {
        FormatsConfig::default()
    }

    #[test]
    fn options_default_from_config() {
        let store = OptionStore::in_memory();
        let config = FormatsConfig {
            language_auto_detect: false,
            default_language: "de".to_string(),
            default_encoding: detect::LATIN1.to_string(),
        };
        let options = FormatOptions::from_config(&store, &config);
        assert!(!options.language_auto_detect.value());
        assert_eq!(options.default_language.value(), "de");
        assert_eq!(options.default_encoding.value(), detect::LATIN1);
    }

    #[test]
    fn saved_choice_beats_config() {
        let store = OptionStore::in_memory();
        store.set(FORMATS_CATEGORY, GLOBAL_GROUP, "LanguageAutoDetect", "true");
        let config = FormatsConfig {
            language_auto_detect: false,
            ..formats_config()
        };
        let options = FormatOptions::from_config(&store, &config);
        assert!(options.language_auto_detect.value());
    }

    #[test]
    fn resolves_plugins_by_extension() {
        let store = OptionStore::in_memory();
        let collection = PluginCollection::new(&store, &formats_config());

        let epub = BookFile::new("/books/a.epub");
        let text = BookFile::new("/books/a.TXT");
        let markdown = BookFile::new("/books/notes.md");
        let unknown = BookFile::new("/books/a.pdf");

        assert_eq!(collection.plugin(&epub, true).map(|p| p.name()), Some("epub"));
        assert_eq!(collection.plugin(&text, false).map(|p| p.name()), Some("plain text"));
        assert_eq!(collection.plugin(&markdown, false).map(|p| p.name()), Some("markdown"));
        assert!(collection.plugin(&unknown, false).is_none());
    }

    #[test]
    fn strong_lookup_needs_meta_info() {
        let store = OptionStore::in_memory();
        let collection = PluginCollection::new(&store, &formats_config());
        assert!(collection.plugin(&BookFile::new("/books/a.txt"), true).is_none());
        let book = Book::new("/books/a.txt");
        assert_eq!(
            collection.plugin_for_book(&book).map(|p| p.name()),
            Some("plain text")
        );
    }

    #[test]
    fn first_accepting_plugin_wins() {
        struct Greedy;
        impl FormatPlugin for Greedy {
            fn name(&self) -> &str {
                "greedy"
            }
            fn provides_meta_info(&self) -> bool {
                false
            }
            fn accepts_file(&self, _file: &BookFile) -> bool {
                true
            }
            fn read_meta_info(&self, _book: &mut Book) -> Result<()> {
                Ok(())
            }
            fn read_model(&self, _model: &mut BookModel) -> Result<()> {
                Ok(())
            }
        }

        let store = OptionStore::in_memory();
        let mut collection = PluginCollection::new(&store, &formats_config());
        collection.add_plugin(Box::new(Greedy));
        let file = BookFile::new("/books/a.txt");
        assert_eq!(collection.plugin(&file, false).map(|p| p.name()), Some("plain text"));
        let pdf = BookFile::new("/books/a.pdf");
        assert_eq!(collection.plugin(&pdf, false).map(|p| p.name()), Some("greedy"));
        assert!(collection.plugin(&pdf, true).is_none());
    }

    #[test]
    fn instance_is_shared_until_deleted() {
        let store = OptionStore::in_memory();
        let config = formats_config();
        let first = PluginCollection::instance(&store, &config);
        let second = PluginCollection::instance(&store, &config);
        assert!(Rc::ptr_eq(&first, &second));

        PluginCollection::delete_instance();
        let third = PluginCollection::instance(&store, &config);
        assert!(!Rc::ptr_eq(&first, &third));
        PluginCollection::delete_instance();
    }
}
