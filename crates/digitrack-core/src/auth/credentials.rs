use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "mrf-digitrack";

/// Opt-in storage of the login password in the OS keychain, keyed by the
/// account email. Only touched when the user picks "remember me" on the
/// login form; the session token itself never goes through here.
pub struct CredentialStore;

impl CredentialStore {
    /// Remember the password for an account in the OS keychain
    pub fn remember(email: &str, password: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(password)
            .context("Failed to store password in keychain")?;
        Ok(())
    }

    /// Retrieve the remembered password for an account
    pub fn recall(email: &str) -> Result<String> {
        let entry = Entry::new(SERVICE_NAME, email)
            .context("Failed to create keyring entry")?;
        entry
            .get_password()
            .context("No remembered password for this account")
    }

    /// Forget the remembered password for an account
    pub fn forget(email: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, email)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete credential from keychain")?;
        Ok(())
    }

    /// Whether a password is remembered for an account
    pub fn is_remembered(email: &str) -> bool {
        Entry::new(SERVICE_NAME, email)
            .map(|entry| entry.get_password().is_ok())
            .unwrap_or(false)
    }
}
