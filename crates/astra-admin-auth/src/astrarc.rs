//! Reader for the `~/.astrarc` credentials file.
//!
//! The file is INI-like:
//!
//! ```text
//! [default]
//! ASTRA_DB_APPLICATION_TOKEN=AstraCS:...
//!
//! [staging]
//! ASTRA_DB_APPLICATION_TOKEN=AstraCS:...
//! ```
//!
//! Blank lines and lines starting with `#` or `;` are ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AuthError, Result};

/// File name of the credentials file in the user's home directory.
pub const ASTRARC_FILE: &str = ".astrarc";

/// Section read when none is specified.
pub const DEFAULT_SECTION: &str = "default";

/// Parsed contents of an `.astrarc` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AstraRc {
    sections: HashMap<String, HashMap<String, String>>,
}

impl AstraRc {
    /// Default location of the file (`$HOME/.astrarc`).
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(ASTRARC_FILE))
    }

    /// Load the file at `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ConfigRead` if the file exists but cannot be read,
    /// or `AuthError::ConfigParse` if it is malformed.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(content) => content.parse().map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(AuthError::ConfigRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Look up a key in a section.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }
}

impl FromStr for AstraRc {
    type Err = AuthError;

    fn from_str(content: &str) -> Result<Self> {
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current: Option<String> = None;

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| AuthError::ConfigParse {
                    line: index + 1,
                    message: "unterminated section header".to_string(),
                })?;
                let name = name.trim().to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| AuthError::ConfigParse {
                line: index + 1,
                message: "expected KEY=VALUE".to_string(),
            })?;

            let section = current.as_ref().ok_or_else(|| AuthError::ConfigParse {
                line: index + 1,
                message: "entry outside of a section".to_string(),
            })?;

            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_string(), unquote(value.trim()).to_string());
        }

        Ok(Self { sections })
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
