use crate::entity::SessionUser;
use crate::storage::{KeyValueStore, SESSION_USER_KEY};
use anyhow::Result;
use async_trait::async_trait;
use log::{error, info};
use std::sync::Arc;

#[async_trait]
pub trait AuthInteractor: Send + Sync {
    async fn signin(&self, user: &SessionUser) -> Result<()>;
    async fn current_user(&self) -> Result<Option<SessionUser>>;
    async fn is_authenticated(&self) -> Result<bool>;
    async fn logout(&self) -> Result<()>;
}

pub struct AuthInteractorImpl {
    store: Arc<dyn KeyValueStore>,
}

impl AuthInteractorImpl {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthInteractor for AuthInteractorImpl {
    async fn signin(&self, user: &SessionUser) -> Result<()> {
        self.store
            .set(SESSION_USER_KEY, &serde_json::to_string(user)?)
            .await?;
        info!("Signed in {}", user.email);
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<SessionUser>> {
        let raw = match self.store.get(SESSION_USER_KEY).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match serde_json::from_str::<SessionUser>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                error!("Failed to parse stored user data: {}", e);
                self.store.remove(SESSION_USER_KEY).await?;
                Ok(None)
            }
        }
    }

    async fn is_authenticated(&self) -> Result<bool> {
        Ok(self
            .current_user()
            .await?
            .map(|user| user.is_authenticated)
            .unwrap_or(false))
    }

    async fn logout(&self) -> Result<()> {
        self.store.remove(SESSION_USER_KEY).await
    }
}
