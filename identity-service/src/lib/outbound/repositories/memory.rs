use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::identity::errors::IdentityError;
use crate::identity::models::EmailAddress;
use crate::identity::models::Identity;
use crate::identity::models::IdentityId;
use crate::identity::models::StoredCredential;
use crate::identity::ports::CredentialStore;

/// Process-local credential store. Contents are lost on restart.
pub struct InMemoryCredentialStore {
    inner: RwLock<Registry>,
}

#[derive(Default)]
struct Registry {
    next_id: i64,
    by_id: HashMap<IdentityId, StoredCredential>,
    id_by_email: HashMap<EmailAddress, IdentityId>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Registry {
                next_id: 1,
                ..Registry::default()
            }),
        }
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn register(
        &self,
        email: EmailAddress,
        password_hash: String,
    ) -> Result<Identity, IdentityError> {
        // Lookup and insert under one write lock.
        let mut registry = self.inner.write().await;

        if registry.id_by_email.contains_key(&email) {
            return Err(IdentityError::DuplicateEmail(email.to_string()));
        }

        let id = IdentityId(registry.next_id);
        registry.next_id += 1;

        let identity = Identity {
            id,
            email: email.clone(),
            created_at: Utc::now(),
        };

        registry.id_by_email.insert(email, id);
        registry.by_id.insert(
            id,
            StoredCredential {
                identity: identity.clone(),
                password_hash,
            },
        );

        Ok(identity)
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Identity>, IdentityError> {
        Ok(self
            .find_credential_by_email(email)
            .await?
            .map(|credential| credential.identity))
    }

    async fn find_credential_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredential>, IdentityError> {
        let registry = self.inner.read().await;

        Ok(registry
            .id_by_email
            .get(email)
            .and_then(|id| registry.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Identity>, IdentityError> {
        let registry = self.inner.read().await;

        Ok(registry
            .by_id
            .get(&id)
            .map(|credential| credential.identity.clone()))
    }
}
