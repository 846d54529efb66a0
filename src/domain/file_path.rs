//! Raw image file paths
//!
//! Image files are named `{dir}telescope_{band}_{field}_{target}_{epoch}_{tail}.fits`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

static FILE_PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?s)(?P<dir>.*)telescope_(?P<band>[rg])_(?P<field>.*?)_(?P<target>.*?)_(?P<epoch>[0-9]+(?:\.[0-9]+)?)_(?P<tail>.*)\.fits$",
    )
    .expect("file path pattern is valid")
});

/// Photometric filter an image was taken through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterBand {
    R,
    G,
}

/// A validated image file path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilePath {
    raw: String,
    band: FilterBand,
    epoch: f64,
}

impl FilePath {
    pub fn parse(raw: &str) -> Result<Self> {
        let captures = FILE_PATH_PATTERN
            .captures(raw)
            .ok_or_else(|| Error::InvalidFilePath(raw.to_string()))?;

        let band = match &captures["band"] {
            "r" => FilterBand::R,
            _ => FilterBand::G,
        };
        let epoch = captures["epoch"]
            .parse::<f64>()
            .map_err(|_| Error::InvalidFilePath(raw.to_string()))?;

        Ok(Self {
            raw: raw.to_string(),
            band,
            epoch,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn band(&self) -> FilterBand {
        self.band
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for FilePath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<FilePath> for String {
    fn from(path: FilePath) -> Self {
        path.raw
    }
}
