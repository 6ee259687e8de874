//! Target records: the `{name, url, content}` list read from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// One replay target. Names and URLs need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    /// Label used in log lines.
    pub name: String,
    /// Absolute destination URL.
    pub url: String,
    /// Raw request body, sent as-is (pre-encode form data yourself).
    pub content: String,
}

impl TargetRecord {
    pub fn destination(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.url)
    }
}

#[derive(Debug, Error)]
pub enum TargetsError {
    #[error("reading targets file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing targets: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("target #{index} ({name}): invalid url {url:?}: {source}")]
    InvalidUrl {
        index: usize,
        name: String,
        url: String,
        source: url::ParseError,
    },
}

/// Parse a JSON array of target records and check every URL is absolute.
pub fn parse_targets(json: &str) -> Result<Vec<TargetRecord>, TargetsError> {
    let targets: Vec<TargetRecord> = serde_json::from_str(json)?;
    for (index, target) in targets.iter().enumerate() {
        if let Err(source) = target.destination() {
            return Err(TargetsError::InvalidUrl {
                index,
                name: target.name.clone(),
                url: target.url.clone(),
                source,
            });
        }
    }
    Ok(targets)
}

pub fn load_targets(path: &Path) -> Result<Vec<TargetRecord>, TargetsError> {
    let data = std::fs::read_to_string(path).map_err(|source| TargetsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let targets = parse_targets(&data)?;
    tracing::debug!("loaded {} target(s) from {}", targets.len(), path.display());
    Ok(targets)
}
