//! # Anti-Forgery Tokens
//!
//! Double-submit tokens for the photo form. A token is a random nonce plus an
//! HMAC-SHA256 signature of that nonce. The page sets it as the `csrf` cookie
//! and embeds the same value in a hidden form field; a submission is accepted
//! only when both are present, equal, and correctly signed.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::utils::constant::{CSRF_FIELD, CSRF_NONCE_LEN};

type HmacSha256 = Hmac<Sha256>;

/// Reasons a submission fails the anti-forgery check
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsrfError {
    #[error("CSRF key rejected")]
    InvalidKey,
    #[error("CSRF cookie missing")]
    MissingCookie,
    #[error("CSRF form token missing")]
    MissingFormToken,
    #[error("CSRF tokens do not match")]
    Mismatch,
    #[error("CSRF token signature invalid")]
    BadSignature,
}

/// Issues and validates double-submit anti-forgery tokens
#[derive(Clone)]
pub struct CsrfService {
    mac: HmacSha256,
}

impl CsrfService {
    /// Creates a service keyed with `secret`.
    pub fn new(secret: &[u8]) -> Result<Self, CsrfError> {
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| CsrfError::InvalidKey)?;
        Ok(Self { mac })
    }

    /// Generates a fresh signed token.
    pub fn issue(&self) -> String {
        let nonce: [u8; CSRF_NONCE_LEN] = rand::random();
        let nonce = URL_SAFE_NO_PAD.encode(nonce);

        let mut mac = self.mac.clone();
        mac.update(nonce.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        trace!("Issued CSRF token");
        format!("{nonce}.{signature}")
    }

    /// Checks that `token` carries a valid signature for its nonce.
    pub fn verify_signature(&self, token: &str) -> bool {
        let Some((nonce, signature)) = token.split_once('.') else {
            return false;
        };
        let Ok(signature) = URL_SAFE_NO_PAD.decode(signature) else {
            return false;
        };

        let mut mac = self.mac.clone();
        mac.update(nonce.as_bytes());
        mac.verify_slice(&signature).is_ok()
    }

    /// Validates the token submitted with a form against the request's cookie.
    #[instrument(skip_all)]
    pub fn validate(&self, jar: &CookieJar, form_token: Option<&str>) -> Result<(), CsrfError> {
        let cookie = jar.get(CSRF_FIELD).ok_or(CsrfError::MissingCookie)?;
        let form_token = form_token
            .filter(|token| !token.is_empty())
            .ok_or(CsrfError::MissingFormToken)?;

        if cookie.value() != form_token {
            debug!("Form token does not match cookie");
            return Err(CsrfError::Mismatch);
        }

        if !self.verify_signature(form_token) {
            debug!("Token signature invalid");
            return Err(CsrfError::BadSignature);
        }

        Ok(())
    }

    /// Cookie that stores `token` for later double-submit checks.
    pub fn cookie(token: String, secure: bool) -> Cookie<'static> {
        Cookie::build((CSRF_FIELD, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};

    use super::*;

    fn jar_with(token: &str) -> CookieJar {
        CookieJar::new()
            .add(Cookie::new("theme", "dark"))
            .add(Cookie::new(CSRF_FIELD, token.to_string()))
    }

    #[test]
    fn issued_token_validates_against_matching_cookie() {
        let csrf = CsrfService::new(b"secret").unwrap();
        let token = csrf.issue();

        assert_eq!(csrf.validate(&jar_with(&token), Some(&token)), Ok(()));
    }

    #[test]
    fn token_is_read_from_the_cookie_header() {
        let csrf = CsrfService::new(b"secret").unwrap();
        let token = csrf.issue();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; csrf={token}")).unwrap(),
        );

        let jar = CookieJar::from_headers(&headers);
        assert_eq!(csrf.validate(&jar, Some(&token)), Ok(()));
    }

    #[test]
    fn missing_pieces_are_rejected() {
        let csrf = CsrfService::new(b"secret").unwrap();
        let token = csrf.issue();

        assert_eq!(
            csrf.validate(&CookieJar::new(), Some(&token)),
            Err(CsrfError::MissingCookie)
        );
        let jar = jar_with(&token);
        assert_eq!(csrf.validate(&jar, None), Err(CsrfError::MissingFormToken));
        assert_eq!(csrf.validate(&jar, Some("")), Err(CsrfError::MissingFormToken));
    }

    #[test]
    fn mismatched_or_forged_tokens_are_rejected() {
        let csrf = CsrfService::new(b"secret").unwrap();
        let other = CsrfService::new(b"other-secret").unwrap();

        let token = csrf.issue();
        assert_eq!(
            csrf.validate(&jar_with(&token), Some(&csrf.issue())),
            Err(CsrfError::Mismatch)
        );

        let forged = other.issue();
        assert_eq!(
            csrf.validate(&jar_with(&forged), Some(&forged)),
            Err(CsrfError::BadSignature)
        );
        assert!(!csrf.verify_signature("no-dot-here"));
    }

    #[test]
    fn cookie_is_http_only_and_secure_only_when_asked() {
        let cookie = CsrfService::cookie("t".to_string(), false);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_ne!(cookie.secure(), Some(true));

        assert_eq!(CsrfService::cookie("t".to_string(), true).secure(), Some(true));
    }
}
