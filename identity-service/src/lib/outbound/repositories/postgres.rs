use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::identity::errors::IdentityError;
use crate::identity::models::EmailAddress;
use crate::identity::models::Identity;
use crate::identity::models::IdentityId;
use crate::identity::models::StoredCredential;
use crate::identity::ports::CredentialStore;

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CredentialRow {
    id: i64,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CredentialRow> for StoredCredential {
    type Error = IdentityError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        Ok(StoredCredential {
            identity: Identity {
                id: IdentityId(row.id),
                email: EmailAddress::new(row.email).map_err(|e| {
                    IdentityError::Storage(format!(
                        "Stored email for identity {} is invalid: {}",
                        row.id, e
                    ))
                })?,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        })
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn register(
        &self,
        email: EmailAddress,
        password_hash: String,
    ) -> Result<Identity, IdentityError> {
        // The unique constraint decides races; a conflict returns no row.
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            INSERT INTO identities (email, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdentityError::Storage(e.to_string()))?;

        match row {
            Some(r) => Ok(StoredCredential::try_from(r)?.identity),
            None => Err(IdentityError::DuplicateEmail(email.to_string())),
        }
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
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM identities
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdentityError::Storage(e.to_string()))?;

        row.map(StoredCredential::try_from).transpose()
    }

    async fn find_by_id(&self, id: IdentityId) -> Result<Option<Identity>, IdentityError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM identities
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| IdentityError::Storage(e.to_string()))?;

        Ok(row
            .map(StoredCredential::try_from)
            .transpose()?
            .map(|credential| credential.identity))
    }
}
