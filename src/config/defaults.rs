use super::models::{LogLevel, ProgramCollectionConfig, ResourceSections};
use crate::dialog::COMMON_SECTION;
use crate::integration::{OptionDescription, Program};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub(crate) fn default_log_level() -> LogLevel {
    LogLevel::Debug
}

pub(crate) fn default_option_store_path() -> PathBuf {
    PathBuf::from("conf/options.toml")
}

pub(crate) fn default_language_auto_detect() -> bool {
    true
}

pub(crate) fn default_language() -> String {
    "en".to_string()
}

pub(crate) fn default_encoding() -> String {
    "utf-8".to_string()
}

fn section(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub(crate) fn default_resources() -> ResourceSections {
    let mut sections = BTreeMap::new();
    sections.insert(
        COMMON_SECTION.to_string(),
        section(&[
            ("defaultName", "external program"),
            ("enableIntegration", "Enable %s integration"),
            ("choice", "Use"),
        ]),
    );
    sections.insert(
        "Dictionary".to_string(),
        section(&[
            ("defaultName", "dictionary"),
            ("enableIntegration", "Look words up in %s"),
            ("choice", "Dictionary program"),
        ]),
    );
    sections.insert(
        "Text".to_string(),
        section(&[
            ("breakType", "Break paragraph at"),
            ("breakNewLine", "New line"),
            ("breakEmptyLine", "Empty line"),
            ("breakLineWithIndent", "Line with leading indent"),
            ("encoding", "Encoding"),
        ]),
    );
    sections
}

fn program(name: &str, options: &[(&str, &str, &str)]) -> Program {
    Program {
        name: name.to_string(),
        options: options
            .iter()
            .map(|(option_name, display_name, default_value)| OptionDescription {
                option_name: option_name.to_string(),
                display_name: display_name.to_string(),
                default_value: default_value.to_string(),
            })
            .collect(),
    }
}

pub(crate) fn default_collections() -> Vec<ProgramCollectionConfig> {
    vec![
        ProgramCollectionConfig {
            name: "Dictionary".to_string(),
            enabled: false,
            programs: vec![
                program("sdcv", &[("dataDir", "Dictionary directory", "/usr/share/stardict/dic")]),
                program("goldendict", &[("window", "Popup window", "scan")]),
            ],
        },
        ProgramCollectionConfig {
            name: "Library".to_string(),
            enabled: false,
            programs: vec![program(
                "calibre",
                &[("libraryPath", "Library path", "~/Calibre Library")],
            )],
        },
    ]
}
