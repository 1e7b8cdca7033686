use crate::analysis::sequence::SequenceValidator;
use crate::error::Error;
use crate::rename::RenameOptions;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub prefix: String,
    pub digits: usize,
    pub start_number: u64,
    pub backup: bool,
    pub dry_run: bool,
    pub enable_comparison_cache: bool,
    pub number_pattern: String,
    pub extensions: Vec<String>,
    /// Opaque settings handed to the oracle collaborator untouched.
    #[serde(default)]
    pub oracle: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prefix: "page_".to_string(),
            digits: 3,
            start_number: 1,
            backup: true,
            dry_run: false,
            enable_comparison_cache: true,
            number_pattern: r"\d+".to_string(),
            extensions: [".jpg", ".jpeg", ".png", ".webp", ".gif", ".bmp"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            oracle: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn rename_options(&self, target_dir: Option<PathBuf>) -> RenameOptions {
        RenameOptions {
            target_dir,
            prefix: self.prefix.clone(),
            digits: self.digits,
            start_number: self.start_number,
            backup: self.backup,
            dry_run: self.dry_run,
        }
    }

    pub fn validator(&self) -> Result<SequenceValidator, Error> {
        SequenceValidator::new(&self.number_pattern)
    }

    /// Extensions lowercased with a leading dot.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| {
                let e = e.to_lowercase();
                if e.starts_with('.') {
                    e
                } else {
                    format!(".{}", e)
                }
            })
            .collect()
    }
}

/// Defaults, overlaid by an optional `PageOrder` file in the working
/// directory, overlaid by `PAGE_ORDER_*` environment variables.
pub fn load_configuration() -> Result<EngineConfig, ConfigError> {
    load_from("PageOrder")
}

pub fn load_from(file_stem: &str) -> Result<EngineConfig, ConfigError> {
    let defaults = EngineConfig::default();
    let builder = Config::builder()
        .set_default("prefix", defaults.prefix)?
        .set_default("digits", defaults.digits as i64)?
        .set_default("start_number", defaults.start_number as i64)?
        .set_default("backup", defaults.backup)?
        .set_default("dry_run", defaults.dry_run)?
        .set_default("enable_comparison_cache", defaults.enable_comparison_cache)?
        .set_default("number_pattern", defaults.number_pattern)?
        .set_default("extensions", defaults.extensions)?
        .add_source(ConfigFile::with_name(file_stem).required(false))
        .add_source(
            Environment::with_prefix("PAGE_ORDER")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("extensions"),
        )
        .build()?;
    builder.try_deserialize::<EngineConfig>()
}
