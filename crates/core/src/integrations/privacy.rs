//! PII-masking vault boundary. Resume text would be tokenized through
//! the vault before leaving the process; without credentials the client
//! is inert and text passes through unchanged.

use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct PrivacyVault {
    vault_id: String,
    vault_url: String,
}

impl PrivacyVault {
    pub fn new(vault_id: impl Into<String>, vault_url: impl Into<String>) -> Self {
        Self {
            vault_id: vault_id.into(),
            vault_url: vault_url.into(),
        }
    }

    pub fn enabled(&self) -> bool {
        !self.vault_id.is_empty() && !self.vault_url.is_empty()
    }

    /// Mask PII in the given text. Pass-through until a vault is wired in.
    pub fn mask(&self, text: &str) -> String {
        if !self.enabled() {
            debug!("privacy vault not configured, passing text through");
        }
        text.to_string()
    }
}
