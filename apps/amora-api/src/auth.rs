use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
}

/// Authenticated user id, injected into request extensions by `authenticate`.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i64);

pub fn issue_token(user_id: i64, secret: &str) -> Result<String, ApiError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::days(7))
        .map(|t| t.timestamp() as usize)
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("token expiry overflow")))?;

    let claims = Claims { sub: user_id, exp: expiration };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))
}

pub fn decode_user_id(token: &str, secret: &str) -> Result<i64, ApiError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| ApiError::Unauthorized("invalid or expired token".into()))?;
    Ok(token_data.claims.sub)
}

/// Bearer-token middleware: validates the JWT and stores the user id for
/// handlers downstream.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(value) if value.starts_with("Bearer ") => &value[7..],
        _ => {
            return Err(ApiError::Unauthorized(
                "missing or invalid Authorization header".into(),
            ));
        }
    };

    let user_id = decode_user_id(token, &state.config.jwt_secret)?;
    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}

/// Access gate for the messaging endpoints. Runs after `authenticate` and
/// reads the entitlement fresh on every request; expired grants are denied
/// with the PAYMENT_REQUIRED code.
pub async fn require_chat_access(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized("authentication required".into()))?;

    state.billing.ensure_chat_access(user.0).await?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_roundtrip() {
        let token = issue_token(42, "secret").unwrap();
        assert_eq!(decode_user_id(&token, "secret").unwrap(), 42);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(42, "secret").unwrap();
        assert!(decode_user_id(&token, "other").is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(decode_user_id("not.a.jwt", "secret").is_err());
    }
}
