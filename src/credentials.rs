//! Client credentials read from a line-oriented secrets file.
//!
//! The file is not parsed: the client id and secret are taken from fixed
//! (0-based) line indices. Any reordering of the file silently selects the
//! wrong lines.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::error::HeatmapsError;

/// 0-based line indices of the client id and secret in the secrets file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CredentialLines {
    pub client_id: usize,
    pub client_secret: usize,
}

impl Default for CredentialLines {
    /// The heatmaps credential set: third and fifth lines.
    fn default() -> Self {
        CredentialLines {
            client_id: 2,
            client_secret: 4,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Credentials {
            client_id,
            client_secret,
        }
    }

    /// Reads the secrets file and picks the two configured lines, trailing
    /// whitespace stripped.
    pub fn from_file(path: &Path, lines: CredentialLines) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(HeatmapsError::Io)
            .with_context(|| format!("reading secrets file {}", path.display()))?;

        Self::from_lines(&contents, lines)
    }

    pub fn from_lines(contents: &str, lines: CredentialLines) -> anyhow::Result<Self> {
        let all: Vec<&str> = contents.lines().collect();

        let pick = |idx: usize| -> Result<String, HeatmapsError> {
            all.get(idx)
                .map(|l| l.trim_end().to_string())
                .ok_or(HeatmapsError::MissingCredentialLine {
                    line: idx,
                    found: all.len(),
                })
        };

        Ok(Credentials {
            client_id: pick(lines.client_id)?,
            client_secret: pick(lines.client_secret)?,
        })
    }
}
