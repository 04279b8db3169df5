use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use thiserror::Error;

use crate::parser::extract::date::{MonthTable, RU_MONTHS};
use crate::parser::extract::{ExtractConfig, MESSAGE_CLASS, MESSAGE_HEADER_CLASS, SELF_LABEL};

const ENV_PREFIX: &str = "VKARCH";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("month table needs 12 comma-separated entries, found {found}")]
    MonthTable { found: usize },
}

/// Startup configuration: code defaults, overridden by `VKARCH_*` variables,
/// then by command-line flags.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub messages_dir: String,
    pub encoding: String,
    pub message_class: String,
    pub header_class: String,
    pub link_tag: String,
    pub self_label: String,
    /// Comma-separated month abbreviations, January first.
    pub months: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_config(Config::builder().add_source(Environment::with_prefix(ENV_PREFIX)))
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .set_default("messages_dir", "messages")?
            .set_default("encoding", "windows-1251")?
            .set_default("message_class", MESSAGE_CLASS)?
            .set_default("header_class", MESSAGE_HEADER_CLASS)?
            .set_default("link_tag", "a")?
            .set_default("self_label", SELF_LABEL)?
            .set_default("months", RU_MONTHS.join(","))?
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Failed to read settings")
    }

    pub fn month_table(&self) -> Result<MonthTable, SettingsError> {
        let names: Vec<String> = self
            .months
            .split(',')
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        let found = names.len();
        let names: [String; 12] = names
            .try_into()
            .map_err(|_| SettingsError::MonthTable { found })?;
        Ok(MonthTable::new(names))
    }

    pub fn extract_config(&self) -> Result<ExtractConfig, SettingsError> {
        Ok(ExtractConfig {
            message_class: self.message_class.clone(),
            header_class: self.header_class.clone(),
            link_tag: self.link_tag.clone(),
            self_label: self.self_label.clone(),
            months: self.month_table()?,
        })
    }
}
