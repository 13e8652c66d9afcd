use async_trait::async_trait;

use crate::identity::errors::IdentityError;
use crate::identity::models::AuthenticatedIdentity;
use crate::identity::models::EmailAddress;
use crate::identity::models::Identity;
use crate::identity::models::IdentityId;
use crate::identity::models::LoginCommand;
use crate::identity::models::RegisterCommand;
use crate::identity::models::Session;
use crate::identity::models::StoredCredential;

/// Port for identity domain service operations.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Register a new identity and open a session for it.
    ///
    /// # Arguments
    /// * `command` - Validated email and policy-checked password
    ///
    /// # Returns
    /// Session carrying the new identity and its first token
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered
    /// * `Password` / `Token` / `Storage` - Internal failure
    async fn register(&self, command: RegisterCommand) -> Result<Session, IdentityError>;

    /// Verify credentials and open a session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (not distinguished)
    /// * `Password` / `Token` / `Storage` - Internal failure
    async fn login(&self, command: LoginCommand) -> Result<Session, IdentityError>;

    /// Resolve the identity behind a verified token.
    ///
    /// # Errors
    /// * `NotFound` - No stored identity matches the token's id and email
    /// * `Storage` - Store lookup failed
    async fn get_identity(
        &self,
        authenticated: &AuthenticatedIdentity,
    ) -> Result<Identity, IdentityError>;
}

/// Storage of registered credentials.
///
/// Implementations must make `register` an atomic insert-if-absent: of two
/// concurrent registrations for the same email exactly one succeeds.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new identity under the next sequential id.
    ///
    /// # Errors
    /// * `DuplicateEmail` - Email is already registered; nothing is written
    /// * `Storage` - Backing store failed
    async fn register(
        &self,
        email: EmailAddress,
        password_hash: String,
    ) -> Result<Identity, IdentityError>;

    /// Retrieve identity by email address.
    ///
    /// # Errors
    /// * `Storage` - Backing store failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Identity>, IdentityError>;

    /// Retrieve identity and password hash by email address, for login.
    ///
    /// # Errors
    /// * `Storage` - Backing store failed
    async fn find_credential_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredential>, IdentityError>;

    /// Retrieve identity by identifier.
    ///
    /// # Errors
    /// * `Storage` - Backing store failed
    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Identity>, IdentityError>;
}
