use crate::error::WalletError;
use anyhow::{Context, Result};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use zeroize::Zeroizing;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    JsonFile(PathBuf),
    TextFile(PathBuf),
    Env(String),
}

/// Collects private keys for one run. Keys stay in zeroizing buffers and are never logged.
pub struct WalletManager {
    source: Option<KeySource>,
    keys: Vec<Zeroizing<String>>,
}

impl fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletManager")
            .field("source", &self.source)
            .field("keys", &format_args!("{} redacted", self.keys.len()))
            .finish()
    }
}

impl WalletManager {
    const KEYS_JSON: &'static str = "privateKeys.json";
    const PV_FILE: &'static str = "pv.txt";
    const ENV_KEY: &'static str = "PRIVATE_KEY";

    /// Load from the current directory, falling back to the `PRIVATE_KEY` env var.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// First match wins: `privateKeys.json`, then `pv.txt`, then `PRIVATE_KEY`.
    pub fn load_from(dir: &Path) -> Result<Self> {
        let json_path = dir.join(Self::KEYS_JSON);
        if json_path.exists() {
            let keys = Self::read_json_keys(&json_path)?;
            info!("[WalletManager] Loaded {} keys from {:?}", keys.len(), json_path);
            return Ok(Self {
                source: Some(KeySource::JsonFile(json_path)),
                keys,
            });
        }

        let pv_path = dir.join(Self::PV_FILE);
        if pv_path.exists() {
            let keys = Self::read_text_keys(&pv_path)?;
            info!("[WalletManager] Loaded {} keys from {:?}", keys.len(), pv_path);
            return Ok(Self {
                source: Some(KeySource::TextFile(pv_path)),
                keys,
            });
        }

        if let Ok(value) = env::var(Self::ENV_KEY) {
            let value = Zeroizing::new(value);
            if !value.trim().is_empty() {
                info!("[WalletManager] Using key from {}", Self::ENV_KEY);
                return Ok(Self {
                    source: Some(KeySource::Env(Self::ENV_KEY.to_string())),
                    keys: vec![Zeroizing::new(value.trim().to_string())],
                });
            }
        }

        Ok(Self {
            source: None,
            keys: Vec::new(),
        })
    }

    /// Returns the number of loaded keys
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    pub fn source(&self) -> Option<&KeySource> {
        self.source.as_ref()
    }

    pub fn private_keys(&self) -> &[Zeroizing<String>] {
        &self.keys
    }

    fn read_json_keys(path: &Path) -> Result<Vec<Zeroizing<String>>> {
        let content = Zeroizing::new(
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?,
        );
        let keys: Vec<Zeroizing<String>> =
            serde_json::from_str(&content).map_err(|e| WalletError::MalformedKeyFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Ok(keys
            .into_iter()
            .map(|k| Zeroizing::new(k.trim().to_string()))
            .filter(|k| !k.is_empty())
            .collect())
    }

    fn read_text_keys(path: &Path) -> Result<Vec<Zeroizing<String>>> {
        let content = Zeroizing::new(
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?,
        );
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| Zeroizing::new(line.to_string()))
            .collect())
    }
}
