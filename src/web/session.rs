use crate::db;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, HeaderValue, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid token format")]
    Invalid,
    #[error("signature mismatch")]
    Signature,
    #[error("expired")]
    Expired,
}

pub fn sign_session(user_id: Uuid, key: &[u8]) -> Result<String, SessionError> {
    sign_session_until(user_id, Utc::now() + Duration::hours(SESSION_TTL_HOURS), key)
}

fn sign_session_until(user_id: Uuid, exp: DateTime<Utc>, key: &[u8]) -> Result<String, SessionError> {
    let payload = format!("{}|{}", user_id, exp.timestamp());
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(payload.as_bytes());
    let sig = mac.finalize().into_bytes();
    Ok(format!(
        "{}.{}",
        general_purpose::STANDARD.encode(payload.as_bytes()),
        general_purpose::STANDARD.encode(sig)
    ))
}

pub fn verify_session(token: &str, key: &[u8]) -> Result<SessionClaims, SessionError> {
    let (payload_b64, sig_b64) = token.split_once('.').ok_or(SessionError::Invalid)?;
    let payload_bytes = general_purpose::STANDARD
        .decode(payload_b64)
        .map_err(|_| SessionError::Invalid)?;
    let sig_bytes = general_purpose::STANDARD
        .decode(sig_b64)
        .map_err(|_| SessionError::Invalid)?;

    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(&payload_bytes);
    mac.verify_slice(&sig_bytes)
        .map_err(|_| SessionError::Signature)?;

    let payload = String::from_utf8(payload_bytes).map_err(|_| SessionError::Invalid)?;
    let (user_id, exp) = payload.split_once('|').ok_or(SessionError::Invalid)?;
    let user_id = Uuid::parse_str(user_id).map_err(|_| SessionError::Invalid)?;
    let exp: i64 = exp.parse().map_err(|_| SessionError::Invalid)?;
    if Utc::now().timestamp() > exp {
        return Err(SessionError::Expired);
    }
    Ok(SessionClaims { user_id, exp })
}

/// Bearer header first, then the `session` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(bearer) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        return Some(bearer.trim().to_string());
    }
    headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .find_map(|pair| pair.trim().strip_prefix("session="))
                .map(str::to_string)
        })
}

pub fn session_cookie(token: &str, secure: bool) -> Result<HeaderValue, StatusCode> {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "session={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{secure_flag}",
        SESSION_TTL_HOURS * 3600
    )
    .parse()
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Authenticated user id. Rejects with 401 when the token is missing, invalid,
/// expired, or points at a deleted user.
pub struct UserSession(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for UserSession
where
    S: Send + Sync,
    crate::state::SharedState: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let shared_state = crate::state::SharedState::from_ref(state);

        let token = extract_token(&parts.headers).ok_or(StatusCode::UNAUTHORIZED)?;

        let claims = verify_session(&token, &shared_state.session_key).map_err(|e| {
            tracing::warn!("Session verification failed: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

        let user = db::find_user_by_id(&shared_state.pool, claims.user_id)
            .await
            .map_err(|e| {
                tracing::warn!("User lookup failed for session: {}", e);
                StatusCode::UNAUTHORIZED
            })?;

        if user.is_none() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(UserSession(claims.user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_sign_and_verify() {
        let user_id = Uuid::new_v4();
        let token = sign_session(user_id, KEY).unwrap();
        let claims = verify_session(&token, KEY).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_rejects_other_key_and_garbage() {
        let token = sign_session(Uuid::new_v4(), KEY).unwrap();
        assert_eq!(
            verify_session(&token, b"another-key-another-key-another!!"),
            Err(SessionError::Signature)
        );
        assert_eq!(verify_session("no-dot", KEY), Err(SessionError::Invalid));
        assert_eq!(verify_session("!!.??", KEY), Err(SessionError::Invalid));
    }

    #[test]
    fn test_rejects_expired() {
        let token =
            sign_session_until(Uuid::new_v4(), Utc::now() - Duration::minutes(1), KEY).unwrap();
        assert_eq!(verify_session(&token, KEY), Err(SessionError::Expired));
    }

    #[test]
    fn test_extract_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc.def"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer xyz.123"),
        );
        assert_eq!(extract_token(&headers).as_deref(), Some("xyz.123"));

        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("tok", true).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("session=tok; HttpOnly"));
        assert!(cookie.ends_with("; Secure"));
    }
}
