use super::AdminError;
use crate::AppState;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::COOKIE, request::Parts},
};
use base64::{Engine, engine::general_purpose};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "vitrine_session";

pub fn create_signed_cookie(secret: &str, value: &str) -> Result<String, String> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| "Invalid secret key")?;
    mac.update(value.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);
    Ok(format!("{}.{}", value, signature_b64))
}

/// Returns the signed value when the signature checks out.
pub fn verify_signed_cookie<'a>(secret: &str, signed_value: &'a str) -> Option<&'a str> {
    let (value, signature_b64) = signed_value.rsplit_once('.')?;
    let signature = general_purpose::URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(value.as_bytes());
    mac.verify_slice(&signature).ok().map(|_| value)
}

pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim().to_string())
        })
}

/// Session payload: base64url email, then the expiry as a unix timestamp.
pub fn issue_session(secret: &str, email: &str, lifetime_hours: u64) -> Result<String, String> {
    let expires = Utc::now().timestamp() + (lifetime_hours as i64) * 3600;
    let payload = format!(
        "{}.{}",
        general_purpose::URL_SAFE_NO_PAD.encode(email.as_bytes()),
        expires
    );
    create_signed_cookie(secret, &payload)
}

/// Email of a valid, unexpired session.
pub fn read_session(secret: &str, cookie: &str) -> Option<String> {
    let payload = verify_signed_cookie(secret, cookie)?;
    let (email_b64, expires) = payload.split_once('.')?;
    let expires: i64 = expires.parse().ok()?;
    if expires <= Utc::now().timestamp() {
        return None;
    }
    let email = general_purpose::URL_SAFE_NO_PAD.decode(email_b64).ok()?;
    String::from_utf8(email).ok()
}

pub fn session_cookie(value: &str, lifetime_hours: u64) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        value,
        lifetime_hours * 3600
    )
}

pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", SESSION_COOKIE)
}

/// Lowercase hex SHA-256 of a password, as stored in `[admin] password_sha256`.
pub fn hash_password(password: &str) -> String {
    Sha256::digest(password.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

pub fn password_matches(password: &str, expected_sha256: &str) -> bool {
    let expected = expected_sha256.trim().to_ascii_lowercase();
    !expected.is_empty() && hash_password(password) == expected
}

/// Signed-in operator. Handlers that take this extractor reject requests
/// without a valid session cookie.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub email: String,
}

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AdminError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        get_cookie_value(&parts.headers, SESSION_COOKIE)
            .and_then(|cookie| read_session(&state.config.app.session_secret, &cookie))
            .map(|email| AdminSession { email })
            .ok_or(AdminError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_signed_cookie_roundtrip_and_tamper() {
        let signed = create_signed_cookie("secret", "hello").unwrap();
        assert_eq!(verify_signed_cookie("secret", &signed), Some("hello"));
        assert_eq!(verify_signed_cookie("other", &signed), None);

        let tampered = signed.replacen("hello", "hellp", 1);
        assert_eq!(verify_signed_cookie("secret", &tampered), None);
        assert_eq!(verify_signed_cookie("secret", "no-signature"), None);
    }

    #[test]
    fn test_session_carries_email() {
        let cookie = issue_session("secret", "isa@example.com", 1).unwrap();
        assert_eq!(
            read_session("secret", &cookie).as_deref(),
            Some("isa@example.com")
        );
        assert_eq!(read_session("wrong", &cookie), None);
    }

    #[test]
    fn test_expired_session_is_rejected() {
        let cookie = issue_session("secret", "isa@example.com", 0).unwrap();
        assert_eq!(read_session("secret", &cookie), None);
    }

    #[test]
    fn test_get_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; vitrine_session=abc.def"),
        );
        assert_eq!(
            get_cookie_value(&headers, SESSION_COOKIE).as_deref(),
            Some("abc.def")
        );
        assert_eq!(get_cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_password_hash() {
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
        assert!(password_matches(
            "password",
            "5E884898DA28047151D0E56F8DC6292773603D0D6AABBDD62A11EF721D1542D8"
        ));
        assert!(!password_matches("password", ""));
        assert!(!password_matches("wrong", &hash_password("password")));
    }
}
