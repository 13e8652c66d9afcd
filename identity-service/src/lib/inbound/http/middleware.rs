use auth::Authenticator;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use thiserror::Error;

use crate::identity::models::AuthenticatedIdentity;
use crate::identity::models::EmailAddress;
use crate::identity::models::IdentityId;
use crate::inbound::http::handlers::ApiResponseBody;
use crate::inbound::http::router::AppState;

/// Why the gate refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthRejection {
    #[error("Authentication token missing or malformed")]
    MissingOrMalformedToken,

    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let status = StatusCode::UNAUTHORIZED;
        (
            status,
            Json(ApiResponseBody::new_error(status, self.to_string())),
        )
            .into_response()
    }
}

/// Middleware that validates bearer tokens and adds the caller to request extensions.
///
/// Rejected requests never reach the inner handler.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let authenticated = authorize(req.headers(), &state.authenticator).map_err(|rejection| {
        tracing::warn!(reason = %rejection, uri = %req.uri(), "Request rejected by auth gate");
        rejection
    })?;

    req.extensions_mut().insert(authenticated);

    Ok(next.run(req).await)
}

/// Decide whether a request's headers carry a valid session.
pub fn authorize(
    headers: &HeaderMap,
    authenticator: &Authenticator,
) -> Result<AuthenticatedIdentity, AuthRejection> {
    let token = extract_bearer_token(headers)?;

    let claims = authenticator.validate_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Token validation failed");
        AuthRejection::InvalidOrExpiredToken
    })?;

    let email =
        EmailAddress::new(claims.email).map_err(|_| AuthRejection::InvalidOrExpiredToken)?;

    Ok(AuthenticatedIdentity {
        id: IdentityId(claims.id),
        email,
    })
}

/// Extract `<token>` from `Authorization: Bearer <token>`.
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthRejection> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthRejection::MissingOrMalformedToken)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthRejection::MissingOrMalformedToken);
    }

    Ok(token)
}
