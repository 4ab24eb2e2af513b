//! Session and credential helpers
//!
//! Pure functions only; cookie handling and the middleware live in the API
//! crate. Two session kinds exist (federated single sign-on and local
//! username/password) but both are rows in the `sessions` table and expire
//! the same way: by comparing the stored last-signed-in timestamp against
//! the configured inactivity window on every authenticated request.

use rand::Rng;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Session kind stored in the `kind` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Federated single sign-on session
    Federada,
    /// Local username/password session
    Local,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Federada => "federada",
            SessionKind::Local => "local",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "federada" => Some(SessionKind::Federada),
            "local" => Some(SessionKind::Local),
            _ => None,
        }
    }
}

/// Current wall-clock time as Unix epoch milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Generate an opaque session token (64 hex chars)
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Generate a random salt for password hashing (32 hex chars)
pub fn generate_salt() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Salted SHA-256 password hash, 64 hex chars
///
/// # Examples
///
/// ```
/// use relevo_common::session::hash_password;
///
/// let hash = hash_password("s3creto", "ab12");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_password("s3creto", "ab12"));
/// assert_ne!(hash, hash_password("s3creto", "cd34"));
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Verify a password against a stored salted hash
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    hash_password(password, salt) == stored_hash
}

/// True when a session last refreshed at `last_signed_in_ms` has exceeded
/// the inactivity window
///
/// # Examples
///
/// ```
/// use relevo_common::session::{is_session_expired, now_ms};
///
/// let timeout_ms = 30 * 60 * 1000;
/// assert!(!is_session_expired(now_ms(), timeout_ms));
/// assert!(is_session_expired(now_ms() - timeout_ms - 1, timeout_ms));
/// ```
pub fn is_session_expired(last_signed_in_ms: i64, timeout_ms: i64) -> bool {
    now_ms() - last_signed_in_ms > timeout_ms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_unique_and_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_password_round_trip() {
        let salt = generate_salt();
        let hash = hash_password("entrada-segura", &salt);
        assert!(verify_password("entrada-segura", &salt, &hash));
        assert!(!verify_password("entrada-equivocada", &salt, &hash));
    }

    #[test]
    fn test_fresh_session_not_expired() {
        assert!(!is_session_expired(now_ms(), 60_000));
    }

    #[test]
    fn test_stale_session_expired() {
        let timeout_ms = 60_000;
        assert!(is_session_expired(now_ms() - timeout_ms - 1000, timeout_ms));
    }

    #[test]
    fn test_boundary_not_expired() {
        // Exactly at the window edge is still valid (strict > comparison)
        let timeout_ms = 60_000;
        assert!(!is_session_expired(now_ms() - timeout_ms, timeout_ms));
    }

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(SessionKind::parse("federada"), Some(SessionKind::Federada));
        assert_eq!(SessionKind::parse("local"), Some(SessionKind::Local));
        assert_eq!(SessionKind::parse("otro"), None);
        assert_eq!(SessionKind::Local.as_str(), "local");
    }
}
