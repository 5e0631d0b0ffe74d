//! The secret store.
//!
//! A flat YAML mapping read once at startup.  The only key llmchat consults is
//! `api_key`, which seeds the session's credential.  The `LLMCHAT_API_KEY`
//! environment variable overrides the file.
//!
//! ```yaml
//! api_key: sk-...
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{Error, Result};

/// Key holding the default API key.
pub const API_KEY: &str = "api_key";

/// Environment variable that overrides [`API_KEY`].
pub const API_KEY_ENV: &str = "LLMCHAT_API_KEY";

/// Secrets file location relative to the home directory.
const SECRETS_FILE: &str = ".llmchat/secrets.yaml";

/// Read-only key/value secrets.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretStore {
    values: BTreeMap<String, String>,
}

impl SecretStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a YAML mapping.
    ///
    /// Only string values are kept.  Numbers and booleans would lose their
    /// spelling in conversion (`1e5`, `007`), so a non-string [`API_KEY`] is an
    /// error and any other non-string value is skipped.  Quote such keys.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::new());
        }
        let raw: BTreeMap<String, Value> = serde_yaml::from_str(yaml)?;
        let mut values = BTreeMap::new();
        for (key, value) in raw {
            match value {
                Value::String(s) => {
                    values.insert(key, s);
                }
                Value::Number(_) | Value::Bool(_) if key == API_KEY => {
                    return Err(Error::secrets(format!(
                        "{API_KEY} must be a quoted string"
                    )));
                }
                _ => {}
            }
        }
        Ok(Self { values })
    }

    /// Loads the store from `path`.  A missing file is an empty store.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_yaml_str(&contents).map_err(|err| {
                Error::secrets(format!("failed to parse {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no secrets file");
                Ok(Self::new())
            }
            Err(err) => Err(Error::io(
                format!("failed to read {}", path.display()),
                err,
            )),
        }
    }

    /// `~/.llmchat/secrets.yaml`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(SECRETS_FILE))
    }

    /// Replaces `key` with `value` when `value` is present and non-empty.
    pub fn with_override(mut self, key: &str, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.values.insert(key.to_string(), value);
        }
        self
    }

    /// Applies the `LLMCHAT_API_KEY` override from the environment.
    pub fn with_env_override(self) -> Self {
        let value = env::var(API_KEY_ENV).ok();
        self.with_override(API_KEY, value)
    }

    /// Looks up a secret.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The default API key, or empty if none is stored.
    pub fn api_key(&self) -> String {
        self.get(API_KEY).unwrap_or_default().to_string()
    }

    /// Returns the number of stored secrets.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keys only.
        f.debug_set().entries(self.values.keys()).finish()
    }
}
