//! Layered credential storage and resolution.
//!
//! A credential resolves from two layers: the process environment (the
//! variable named by the descriptor) always wins, then the persisted
//! credential file, a flat JSON object of `{provider_id: secret}`. The file
//! is re-read on every resolution and replaced atomically on every write,
//! so sequential process invocations never observe a half-written document.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use log::warn;

use crate::catalog::{ModelCatalog, ModelDescriptor};
use crate::error::{Error, Result};

/// Secrets shorter than this are treated as unfilled templates.
const MIN_SECRET_LEN: usize = 20;

/// Fragments that mark a secret as a copied placeholder.
const PLACEHOLDER_FRAGMENTS: &[&str] = &["your_", "replace_", "example"];

/// Prefixes used by documentation templates for unfilled keys.
const PLACEHOLDER_PREFIXES: &[&str] = &["sk_", "key_"];

/// Per-provider credential state for display.
#[derive(Debug, Clone)]
pub struct CredentialStatus {
    pub provider_id: String,
    pub display_name: String,
    pub pricing_tier: String,
    pub has_credential: bool,
}

/// Durable store for provider credentials.
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store backed by the given file. The file does not need to exist yet.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the per-user default location, `~/.webpilot/credentials.json`.
    pub fn open_default() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::WriteFailed("could not determine home directory".to_string()))?;
        Ok(Self::new(home.join(".webpilot").join("credentials.json")))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Resolve the secret for a descriptor.
    ///
    /// The environment variable takes precedence over the file; both layers
    /// trim whitespace and treat blank values as absent.
    pub fn resolve(&self, descriptor: &ModelDescriptor) -> Option<String> {
        if let Ok(value) = std::env::var(&descriptor.credential_env_var) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }

        let entries = self.load();
        entries
            .get(&descriptor.provider_id)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Validate a secret against the placeholder/length heuristics.
    pub fn validate(secret: &str) -> Result<()> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(Error::InvalidCredential("credential is empty".to_string()));
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::InvalidCredential(format!(
                "credential is too short ({} characters, need at least {})",
                secret.len(),
                MIN_SECRET_LEN
            )));
        }
        let lower = secret.to_lowercase();
        let looks_like_placeholder = PLACEHOLDER_FRAGMENTS.iter().any(|f| lower.contains(f))
            || PLACEHOLDER_PREFIXES.iter().any(|p| lower.starts_with(p));
        if looks_like_placeholder {
            return Err(Error::InvalidCredential(
                "credential looks like an unfilled placeholder".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate, trim and persist a secret for a provider.
    ///
    /// On I/O failure the previous file contents are left intact.
    pub fn store(&self, provider_id: &str, secret: &str) -> Result<()> {
        let secret = secret.trim();
        Self::validate(secret)?;

        let mut entries = self.load();
        entries.insert(provider_id.to_string(), secret.to_string());
        self.save(&entries)
    }

    /// Remove a provider's secret. Removing an absent entry is a success.
    pub fn remove(&self, provider_id: &str) -> Result<()> {
        let mut entries = self.load();
        if entries.remove(provider_id).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    /// Credential state for every catalog entry, in catalog order.
    pub fn list_status(&self, catalog: &ModelCatalog) -> Vec<CredentialStatus> {
        catalog
            .all()
            .map(|d| CredentialStatus {
                provider_id: d.provider_id.clone(),
                display_name: d.display_name.clone(),
                pricing_tier: d.pricing_tier.clone(),
                has_credential: self.resolve(d).is_some(),
            })
            .collect()
    }

    /// Read the credential file. An absent or malformed file reads as empty.
    fn load(&self) -> BTreeMap<String, String> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "credential file {} is not valid JSON ({}), treating as empty",
                    self.path.display(),
                    e
                );
                BTreeMap::new()
            }
        }
    }

    /// Replace the credential file atomically: write a sibling temp file,
    /// then rename it over the target.
    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::WriteFailed(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let body = serde_json::to_string_pretty(entries)
            .map_err(|e| Error::WriteFailed(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .map_err(|e| Error::WriteFailed(format!("failed to write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            Error::WriteFailed(format!("failed to replace {}: {}", self.path.display(), e))
        })
    }
}
