use std::sync::Arc;
use std::sync::OnceLock;

use async_trait::async_trait;
use auth::Authenticator;

use crate::identity::errors::IdentityError;
use crate::identity::models::AuthenticatedIdentity;
use crate::identity::models::Identity;
use crate::identity::models::LoginCommand;
use crate::identity::models::RegisterCommand;
use crate::identity::models::Session;
use crate::identity::ports::CredentialStore;
use crate::identity::ports::IdentityServicePort;

/// Verified against when a login names an unknown email.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-emails";

/// Domain service implementation for identity operations.
///
/// Concrete implementation of IdentityServicePort with dependency injection.
pub struct IdentityService<CS>
where
    CS: CredentialStore,
{
    store: Arc<CS>,
    authenticator: Arc<Authenticator>,
    dummy_hash: OnceLock<String>,
}

impl<CS> IdentityService<CS>
where
    CS: CredentialStore,
{
    /// Create a new identity service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential persistence implementation
    /// * `authenticator` - Password hashing and token issuing
    pub fn new(store: Arc<CS>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            store,
            authenticator,
            dummy_hash: OnceLock::new(),
        }
    }

    async fn hash_password(&self, plaintext: String) -> Result<String, IdentityError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(&plaintext))
            .await
            .map_err(|e| IdentityError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(IdentityError::from)
    }

    async fn verify_password(
        &self,
        plaintext: String,
        stored_hash: String,
    ) -> Result<bool, IdentityError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.verify_password(&plaintext, &stored_hash))
            .await
            .map_err(|e| {
                IdentityError::Unknown(format!("Password verification task failed: {}", e))
            })?
            .map_err(IdentityError::from)
    }

    async fn dummy_hash(&self) -> Result<String, IdentityError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash.clone());
        }

        let hash = self.hash_password(DUMMY_PASSWORD.to_string()).await?;
        Ok(self.dummy_hash.get_or_init(|| hash).clone())
    }

    fn open_session(&self, identity: Identity) -> Result<Session, IdentityError> {
        let issued = self
            .authenticator
            .issue_token(identity.id.0, identity.email.as_str())?;

        let expires_at = issued
            .claims
            .expires_at()
            .ok_or_else(|| IdentityError::Unknown("Token expiration out of range".to_string()))?;

        Ok(Session {
            identity,
            token: issued.access_token,
            expires_at,
        })
    }
}

#[async_trait]
impl<CS> IdentityServicePort for IdentityService<CS>
where
    CS: CredentialStore,
{
    async fn register(&self, command: RegisterCommand) -> Result<Session, IdentityError> {
        let RegisterCommand { email, password } = command;

        // Cheap early rejection; the store insert below is the authoritative check.
        if self.store.find_by_email(&email).await?.is_some() {
            tracing::info!("Registration rejected: email already registered");
            return Err(IdentityError::DuplicateEmail(email.to_string()));
        }

        let password_hash = self.hash_password(password.expose().to_string()).await?;
        let identity = self.store.register(email, password_hash).await?;
        let session = self.open_session(identity)?;

        tracing::info!(identity_id = %session.identity.id, "Identity registered");

        Ok(session)
    }

    async fn login(&self, command: LoginCommand) -> Result<Session, IdentityError> {
        let LoginCommand { email, password } = command;

        let Some(credential) = self.store.find_credential_by_email(&email).await? else {
            // Unknown emails still pay for one verification.
            let dummy_hash = self.dummy_hash().await?;
            let _ = self.verify_password(password, dummy_hash).await?;

            tracing::warn!("Login rejected: invalid credentials");
            return Err(IdentityError::InvalidCredentials);
        };

        if !self
            .verify_password(password, credential.password_hash)
            .await?
        {
            tracing::warn!(
                identity_id = %credential.identity.id,
                "Login rejected: invalid credentials"
            );
            return Err(IdentityError::InvalidCredentials);
        }

        let session = self.open_session(credential.identity)?;

        tracing::info!(identity_id = %session.identity.id, "Identity logged in");

        Ok(session)
    }

    async fn get_identity(
        &self,
        authenticated: &AuthenticatedIdentity,
    ) -> Result<Identity, IdentityError> {
        self.store
            .find_by_id(authenticated.id)
            .await?
            .filter(|identity| identity.email == authenticated.email)
            .ok_or(IdentityError::NotFound(authenticated.id.to_string()))
    }
}
