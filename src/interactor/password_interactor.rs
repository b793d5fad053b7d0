use crate::entity::{PasswordRecord, PayLinkError};
use crate::storage::AddressRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use rand::{rng, RngCore};
use sha2::{Digest, Sha256};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// SHA-256 over password, salt and lowercased address, hex encoded.
///
/// Single digest, no key stretching.
pub fn hash_password(password: &str, salt: &str, address: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(address.to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn generate_salt() -> String {
    let mut salt = [0u8; 32];
    rng().fill_bytes(&mut salt);
    hex::encode(salt)
}

/// Local spending password gating payments.
#[async_trait]
pub trait PasswordInteractor: Send + Sync {
    async fn is_password_set(&self, address: &str) -> Result<bool>;
    async fn set_password(&self, address: &str, password: &str) -> Result<()>;
    async fn verify_password(&self, address: &str, password: &str) -> Result<bool>;
    async fn change_password(&self, address: &str, current: &str, new_password: &str) -> Result<()>;
    async fn remove_password(&self, address: &str, password: &str) -> Result<()>;
}

pub struct PasswordInteractorImpl {
    records: AddressRecord<PasswordRecord>,
}

impl PasswordInteractorImpl {
    pub fn new(records: AddressRecord<PasswordRecord>) -> Self {
        Self { records }
    }
}

fn require_address(address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(PayLinkError::WalletNotConnected.into());
    }
    Ok(())
}

#[async_trait]
impl PasswordInteractor for PasswordInteractorImpl {
    async fn is_password_set(&self, address: &str) -> Result<bool> {
        if address.is_empty() {
            return Ok(false);
        }
        Ok(self.records.get(address).await?.is_some())
    }

    async fn set_password(&self, address: &str, password: &str) -> Result<()> {
        require_address(address)?;

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(PayLinkError::PasswordTooShort.into());
        }

        let salt = generate_salt();
        let record = PasswordRecord {
            hash: hash_password(password, &salt, address),
            salt,
            timestamp: Utc::now().timestamp_millis(),
        };

        self.records.set(address, &record).await?;
        info!("Password set for {}", address);
        Ok(())
    }

    async fn verify_password(&self, address: &str, password: &str) -> Result<bool> {
        require_address(address)?;

        let record = self
            .records
            .get(address)
            .await?
            .ok_or(PayLinkError::PasswordNotSet)?;

        Ok(hash_password(password, &record.salt, address) == record.hash)
    }

    async fn change_password(&self, address: &str, current: &str, new_password: &str) -> Result<()> {
        if !self.verify_password(address, current).await? {
            return Err(PayLinkError::Validation("Current password is incorrect".to_string()).into());
        }

        self.set_password(address, new_password).await
    }

    async fn remove_password(&self, address: &str, password: &str) -> Result<()> {
        if !self.verify_password(address, password).await? {
            return Err(PayLinkError::IncorrectPassword.into());
        }

        self.records.remove(address).await?;
        info!("Password removed for {}", address);
        Ok(())
    }
}
