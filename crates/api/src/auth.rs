//! Token issuing and the identity middleware. Every protected route sees an
//! `Identity` extension; tenancy flows from its `company_id` and nowhere else.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::users;
use crate::error::{ApiError, ApiResult};
use crate::repo::Repository;
use crate::state::AppState;

pub const DEMO_TOKEN_MARKER: &str = "demo_signature";
pub const DEMO_COMPANY_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_de01);
pub const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_de02);

const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

pub struct AuthConfig {
    secret: String,
    token_ttl_secs: i64,
    demo_login_enabled: bool,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            demo_login_enabled: false,
        }
    }

    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using an insecure development secret");
            "insecure-dev-secret".to_string()
        });
        let token_ttl_secs = std::env::var("JWT_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        Self {
            secret,
            token_ttl_secs,
            demo_login_enabled: env_flag("DEMO_LOGIN_ENABLED"),
        }
    }

    pub fn with_demo_login(mut self, enabled: bool) -> Self {
        self.demo_login_enabled = enabled;
        self
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub company_id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller, injected as a request extension by
/// `require_identity`.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
}

pub fn issue_token(user_id: Uuid, company_id: Uuid, config: &AuthConfig) -> ApiResult<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        company_id,
        iat: now,
        exp: now + config.token_ttl_secs,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(ApiError::storage)
}

pub fn decode_token(token: &str, config: &AuthConfig) -> ApiResult<Claims> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Auth("Invalid or expired token".to_string()))
}

pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(ApiError::storage)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() != Some(0),
        _ => false,
    }
}

async fn resolve_identity(state: &AppState, headers: &HeaderMap) -> ApiResult<Identity> {
    let token =
        bearer_token(headers).ok_or_else(|| ApiError::Auth("No token provided".to_string()))?;

    if state.auth.demo_login_enabled && token.contains(DEMO_TOKEN_MARKER) {
        return Ok(Identity {
            user_id: DEMO_USER_ID,
            company_id: DEMO_COMPANY_ID,
            name: "Demo User".to_string(),
        });
    }

    let claims = decode_token(token, &state.auth)?;
    let user = Repository::new(state.store.clone(), &users::SCHEMA)
        .find_one_global("id", &claims.sub.to_string())
        .await?
        .ok_or_else(|| ApiError::Auth("Invalid or expired token".to_string()))?;

    if !truthy(user.get("is_active")) {
        return Err(ApiError::Auth("Account is inactive".to_string()));
    }

    let name = [user.get("first_name"), user.get("last_name")]
        .into_iter()
        .filter_map(|v| v.and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join(" ");

    Ok(Identity {
        user_id: claims.sub,
        company_id: claims.company_id,
        name,
    })
}

pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_identity(&state, request.headers()).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips() {
        let config = AuthConfig::new("test-secret");
        let user = Uuid::new_v4();
        let company = Uuid::new_v4();
        let token = issue_token(user, company, &config).unwrap();
        let claims = decode_token(&token, &config).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.company_id, company);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = AuthConfig::new("test-secret");
        let token = issue_token(Uuid::new_v4(), Uuid::new_v4(), &config).unwrap();
        let other = AuthConfig::new("other-secret");
        assert!(decode_token(&token, &other).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter22hunter22").unwrap();
        assert!(verify_password("hunter22hunter22", &hash));
        assert!(!verify_password("hunter23hunter23", &hash));
        assert!(!verify_password("hunter22hunter22", "not-a-phc-string"));
    }

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());
        headers.insert(AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
    }
}
