// used to layer a settings file and the environment over the defaults
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::text::BuildOptions;

/// Base name of the optional settings file, any format `config` understands.
pub const SETTINGS_FILE: &str = "xtdb-query";
/// Environment variables override the file, e.g. XTDB_QUERY_LUCENE_ENABLED=true.
pub const ENVIRONMENT_PREFIX: &str = "XTDB_QUERY";

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Whether the store maintains a full-text index that text searches may use.
    pub lucene_enabled: bool,
    pub case_sensitive: bool,
    /// Zero means pages are unbounded.
    pub max_page_size: usize,
    pub bind_address: String,
    #[serde(default)]
    pub types_path: Option<String>,
    pub log_level: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_file(SETTINGS_FILE)
    }
    pub fn from_file(name: &str) -> Result<Self> {
        let config = Config::builder()
            .set_default("lucene_enabled", false)?
            .set_default("case_sensitive", true)?
            .set_default("max_page_size", 1000_i64)?
            .set_default("bind_address", "127.0.0.1:8080")?
            .set_default("log_level", "info")?
            .add_source(File::with_name(name).required(false))
            .add_source(Environment::with_prefix(ENVIRONMENT_PREFIX).try_parsing(true))
            .build()?;
        Ok(config.try_deserialize()?)
    }
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            optimize_for_index: self.lucene_enabled,
            case_sensitive: self.case_sensitive,
        }
    }
}
