//! Command-line front end for the options subsystem.
//!
//! - `tabs [--json]`: build every integration tab and print its entries.
//! - `set <collection> <program>`: enable a collection with the given program.
//! - `inspect <book>`: resolve the format plugin and print the book's meta info.

use anyhow::{Context, Result, anyhow, bail};
use leaf_options::config::{AppConfig, load_config};
use leaf_options::dialog::{EntryValue, OptionsDialog, Resources};
use leaf_options::formats::{Book, BookModel, PluginCollection};
use leaf_options::integration::{ProgramCollectionMap, create_integration_tab};
use leaf_options::options::OptionStore;
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const USAGE: &str =
    "Usage: leaf-options [--config PATH] <tabs [--json] | set <collection> <program> | inspect <book>>";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Tabs { json: bool },
    Set { collection: String, program: String },
    Inspect { book: PathBuf },
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    config: PathBuf,
    command: Command,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let config = load_config(&args.config);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        config = %args.config.display(),
        store = %config.option_store_path.display(),
        level = %config.log_level,
        "Starting leaf-options"
    );
    let store = OptionStore::load(&config.option_store_path)?;

    match args.command {
        Command::Tabs { json } => print_tabs(&config, &store, json),
        Command::Set {
            collection,
            program,
        } => select_program(&config, &store, &collection, &program),
        Command::Inspect { book } => inspect_book(&config, &store, book),
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = args.into_iter();
    let mut config = PathBuf::from("conf/config.toml");
    let mut command = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or_else(|| anyhow!("--config needs a path\n{USAGE}"))?;
                config = PathBuf::from(path);
            }
            "tabs" => {
                let json = match args.next().as_deref() {
                    None => false,
                    Some("--json") => true,
                    Some(other) => bail!("Unexpected argument {other:?}\n{USAGE}"),
                };
                command = Some(Command::Tabs { json });
            }
            "set" => {
                let (Some(collection), Some(program)) = (args.next(), args.next()) else {
                    bail!("set needs a collection and a program\n{USAGE}");
                };
                command = Some(Command::Set {
                    collection,
                    program,
                });
            }
            "inspect" => {
                let book = args.next().ok_or_else(|| anyhow!("inspect needs a path\n{USAGE}"))?;
                command = Some(Command::Inspect {
                    book: PathBuf::from(book),
                });
            }
            other => bail!("Unknown argument {other:?}\n{USAGE}"),
        }
    }

    let command = command.ok_or_else(|| anyhow!(USAGE))?;
    Ok(Args { config, command })
}

fn build_dialog(config: &AppConfig, collections: &ProgramCollectionMap) -> OptionsDialog {
    let mut dialog = OptionsDialog::new(Resources::new(config.resources.clone()));
    for collection in collections.iter() {
        create_integration_tab(&mut dialog, Some(collection), collection.name(), Vec::new());
    }
    dialog
}

fn print_tabs(config: &AppConfig, store: &OptionStore, json: bool) -> Result<()> {
    let collections = ProgramCollectionMap::from_config(store, &config.integration);
    let dialog = build_dialog(config, &collections);
    let snapshot = dialog.snapshot();

    if json {
        let text = serde_json::to_string_pretty(&snapshot).context("Failed to encode tabs")?;
        println!("{text}");
        return Ok(());
    }
    for tab in snapshot {
        println!("[{}]", tab.key);
        for entry in tab.entries {
            let marker = if entry.visible { ' ' } else { '-' };
            println!("{marker} {:>2} {:<8} {}", entry.id, entry.kind.to_string(), entry.name);
        }
    }
    Ok(())
}

fn select_program(
    config: &AppConfig,
    store: &OptionStore,
    collection_name: &str,
    program: &str,
) -> Result<()> {
    let collections = ProgramCollectionMap::from_config(store, &config.integration);
    let collection = collections
        .collection(collection_name)
        .ok_or_else(|| anyhow!("No integration collection named {collection_name:?}"))?;
    if collection.program(program).is_none() {
        bail!(
            "{program:?} is not one of {:?} in {collection_name}",
            collection.names()
        );
    }

    let mut dialog = OptionsDialog::new(Resources::new(config.resources.clone()));
    let integration =
        create_integration_tab(&mut dialog, Some(collection), collection_name, Vec::new())
            .ok_or_else(|| anyhow!("Collection {collection_name:?} has no programs"))?;
    let tab = dialog
        .tab_mut(collection_name)
        .ok_or_else(|| anyhow!("Tab {collection_name:?} was not created"))?;

    tab.edit(integration.enable, EntryValue::Bool(true))?;
    if let Some(choice) = integration.choice {
        tab.edit(choice, EntryValue::Text(program.to_string()))?;
    }
    dialog.accept();
    store.save()?;
    info!(collection = %collection_name, %program, "Selected integration program");
    println!("{collection_name}: {program}");
    Ok(())
}

fn inspect_book(config: &AppConfig, store: &OptionStore, path: PathBuf) -> Result<()> {
    if !path.exists() {
        bail!("File not found: {}", path.display());
    }
    let plugins = PluginCollection::instance(store, &config.formats);
    let mut book = Book::new(path);
    let plugin = plugins
        .plugin_for_book(&book)
        .ok_or_else(|| anyhow!("No format plugin accepts {}", book.path.display()))?;
    plugin.try_open(&book.path)?;
    plugin.read_meta_info(&mut book)?;

    let cover = plugin.cover_image(&book);
    let mut model = BookModel::new(book);
    plugin.read_model(&mut model)?;
    if !plugin.provides_meta_info() {
        warn!(plugin = plugin.name(), "Meta info is guessed for this format");
    }

    let book = &model.book;
    println!("format:     {}", plugin.name());
    println!("title:      {}", book.title);
    println!("authors:    {}", book.authors.join(", "));
    println!("language:   {}", book.language);
    println!("encoding:   {}", book.encoding);
    println!("paragraphs: {}", model.paragraphs.len());
    println!("characters: {}", model.char_count());
    if let Some(cover) = cover {
        println!("cover:      {} ({} bytes)", cover.mime, cover.data.len());
    }
    drop(plugins);
    PluginCollection::delete_instance();
    Ok(())
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_commands() {
        let parsed = args(&["tabs", "--json"]).expect("tabs");
        assert_eq!(parsed.command, Command::Tabs { json: true });
        assert_eq!(parsed.config, PathBuf::from("conf/config.toml"));

        let parsed =
            args(&["--config", "/etc/leaf.toml", "set", "Dictionary", "sdcv"]).expect("set");
        assert_eq!(parsed.config, PathBuf::from("/etc/leaf.toml"));
        assert_eq!(
            parsed.command,
            Command::Set {
                collection: "Dictionary".to_string(),
                program: "sdcv".to_string(),
            }
        );

        let parsed = args(&["inspect", "book.epub"]).expect("inspect");
        assert_eq!(
            parsed.command,
            Command::Inspect {
                book: PathBuf::from("book.epub")
            }
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(args(&[]).is_err());
        assert!(args(&["set", "Dictionary"]).is_err());
        assert!(args(&["tabs", "--yaml"]).is_err());
        assert!(args(&["--config"]).is_err());
        assert!(args(&["frobnicate"]).is_err());
    }

    #[test]
    fn set_persists_the_selection() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let path = std::env::temp_dir().join(format!("leaf_options_test_cli_{nanos}/options.toml"));
        let config = AppConfig {
            option_store_path: path.clone(),
            ..AppConfig::default()
        };
        let store = OptionStore::load(&path).expect("missing store is empty");
        select_program(&config, &store, "Dictionary", "goldendict").expect("select");
        assert!(select_program(&config, &store, "Dictionary", "missing").is_err());

        let reloaded = OptionStore::load(&path).expect("saved store");
        let collections = ProgramCollectionMap::from_config(&reloaded, &config.integration);
        let dictionary = collections.collection("Dictionary").expect("dictionary");
        assert_eq!(
            dictionary.current_program().map(|p| p.name.as_str()),
            Some("goldendict")
        );
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}
