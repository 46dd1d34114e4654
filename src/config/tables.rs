use super::defaults;
use super::models::{AppConfig, FormatsConfig, LogLevel, ProgramCollectionConfig, ResourceSections};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    options: OptionsConfig,
    #[serde(default)]
    formats: FormatsConfig,
    #[serde(default)]
    resources: ResourceSections,
    #[serde(default)]
    integration: IntegrationConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        // User resource strings override the built-in ones key by key.
        let mut resources = defaults::default_resources();
        for (name, section) in tables.resources {
            resources.entry(name).or_default().extend(section);
        }
        AppConfig {
            log_level: tables.logging.log_level,
            option_store_path: tables.options.store_path,
            formats: tables.formats,
            resources,
            integration: tables.integration.collections,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            options: OptionsConfig {
                store_path: config.option_store_path.clone(),
            },
            formats: config.formats.clone(),
            resources: config.resources.clone(),
            integration: IntegrationConfig {
                collections: config.integration.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct OptionsConfig {
    #[serde(default = "defaults::default_option_store_path")]
    store_path: PathBuf,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        OptionsConfig {
            store_path: defaults::default_option_store_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct IntegrationConfig {
    #[serde(default = "defaults::default_collections")]
    collections: Vec<ProgramCollectionConfig>,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        IntegrationConfig {
            collections: defaults::default_collections(),
        }
    }
}
