use serde_derive::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::error::*;

pub const DEFAULT_LIMIT: usize = 5;

/// Lookup settings; every field may be omitted from a JSON config file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    // Maximum number of characters returned
    pub limit: usize,
    // Reference files are named <prefix><stroke count>.<extension>
    pub file_prefix: String,
    pub file_extension: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        LookupConfig {
            limit: DEFAULT_LIMIT,
            file_prefix: "strokes-".to_string(),
            file_extension: "txt".to_string(),
        }
    }
}

impl LookupConfig {
    pub fn from_json_str(json: &str) -> LookupResult<LookupConfig> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> LookupResult<LookupConfig> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}
