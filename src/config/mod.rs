//! Configuration loading for the options tool.
//!
//! Settings are loaded from `conf/config.toml` if present. Any missing or
//! invalid entries fall back to defaults. The config only describes the
//! environment (where the option store lives, which helper programs exist,
//! UI strings); user choices live in the option store itself.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{AppConfig, FormatsConfig, LogLevel, ProgramCollectionConfig, ResourceSections};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::COMMON_SECTION;
    use std::path::{Path, PathBuf};

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").expect("empty config parses");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.option_store_path, PathBuf::from("conf/options.toml"));
        assert_eq!(config.integration[0].name, "Dictionary");
    }

    #[test]
    fn parses_all_tables() {
        let toml = r#"
[logging]
log_level = "warn"

[options]
store_path = "/tmp/leaf/options.toml"

[formats]
default_language = "ru"

[resources.common]
choice = "Program"

[resources.Translate]
enableIntegration = "Translate with %s"

[[integration.collections]]
name = "Translate"
enabled = true

[[integration.collections.programs]]
name = "crow"

[[integration.collections.programs.options]]
option_name = "target"
display_name = "Target language"
default_value = "en"
"#;
        let config = parse_config(toml).expect("config parses");
        assert_eq!(config.log_level, LogLevel::Warn);
        assert_eq!(config.option_store_path, Path::new("/tmp/leaf/options.toml"));
        assert_eq!(config.formats.default_language, "ru");
        assert_eq!(config.formats.default_encoding, "utf-8");
        assert!(config.formats.language_auto_detect);

        let common = &config.resources[COMMON_SECTION];
        assert_eq!(common["choice"], "Program");
        assert_eq!(common["enableIntegration"], "Enable %s integration");
        assert_eq!(config.resources["Translate"]["enableIntegration"], "Translate with %s");

        assert_eq!(config.integration.len(), 1);
        let collection = &config.integration[0];
        assert!(collection.enabled);
        assert_eq!(collection.programs[0].name, "crow");
        assert_eq!(collection.programs[0].options[0].default_value, "en");
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(parse_config("[logging]\nlog_level = \"loud\"").is_err());
        assert!(parse_config("[[integration.collections]]\nenabled = true").is_err());
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = AppConfig::default();
        config.log_level = LogLevel::Info;
        config.integration[0].enabled = true;
        let text = serialize_config(&config).expect("serialize");
        assert_eq!(parse_config(&text).expect("parse"), config);
    }

    #[test]
    fn unreadable_file_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/leaf-options/config.toml"));
        assert_eq!(config, AppConfig::default());
    }
}
