use crate::integration::Program;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Resource sections keyed by tab name, then by resource key.
pub type ResourceSections = BTreeMap<String, BTreeMap<String, String>>;

/// High-level app configuration; the on-disk form is split into tables.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub option_store_path: PathBuf,
    pub formats: FormatsConfig,
    pub resources: ResourceSections,
    pub integration: Vec<ProgramCollectionConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: crate::config::defaults::default_log_level(),
            option_store_path: crate::config::defaults::default_option_store_path(),
            formats: FormatsConfig::default(),
            resources: crate::config::defaults::default_resources(),
            integration: crate::config::defaults::default_collections(),
        }
    }
}

/// Seeds for the global format options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FormatsConfig {
    #[serde(default = "crate::config::defaults::default_language_auto_detect")]
    pub language_auto_detect: bool,
    #[serde(default = "crate::config::defaults::default_language")]
    pub default_language: String,
    #[serde(default = "crate::config::defaults::default_encoding")]
    pub default_encoding: String,
}

impl Default for FormatsConfig {
    fn default() -> Self {
        FormatsConfig {
            language_auto_detect: crate::config::defaults::default_language_auto_detect(),
            default_language: crate::config::defaults::default_language(),
            default_encoding: crate::config::defaults::default_encoding(),
        }
    }
}

/// One `[[integration.collections]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProgramCollectionConfig {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub programs: Vec<Program>,
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
