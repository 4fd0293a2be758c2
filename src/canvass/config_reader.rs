use crate::canvass::*;

use log::debug;
use padron_roster::SearchRules;
use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "campaignName")]
    pub campaign_name: String,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Sources {
    pub padron: FileSource,
    pub coordinadores: Option<FileSource>,
    pub subcoordinadores: Option<FileSource>,
    pub votantes: Option<FileSource>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    pub directory: Option<String>,
    pub enabled: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(rename = "pageSize")]
    pub page_size: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CanvassConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub sources: Sources,
    pub cache: Option<CacheSettings>,
    pub search: Option<SearchSettings>,
}

impl CanvassConfig {
    pub const DEFAULT_CACHE_DIRECTORY: &'static str = ".padron-cache";

    /// The cache directory, relative to the configuration file, when the cache is enabled.
    pub fn cache_directory(&self) -> Option<String> {
        match &self.cache {
            Some(c) if c.enabled.unwrap_or(true) => Some(
                c.directory
                    .clone()
                    .unwrap_or_else(|| CanvassConfig::DEFAULT_CACHE_DIRECTORY.to_string()),
            ),
            _ => None,
        }
    }

    pub fn search_rules(&self) -> SearchRules {
        match self.search.as_ref().and_then(|s| s.page_size) {
            Some(page_size) if page_size > 0 => SearchRules { page_size },
            _ => SearchRules::DEFAULT_RULES,
        }
    }
}

pub fn read_config(path: &str) -> CanvassResult<CanvassConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: {:?}", contents);
    let config: CanvassConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

pub fn read_summary(path: &str) -> CanvassResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(js)
}
