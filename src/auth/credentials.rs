//! The single shared admin credential checked at login.

use sha2::{Digest, Sha256};

/// Username/password pair from configuration.
#[derive(Clone)]
pub struct AdminCredentials {
    username: Option<String>,
    password_hash: Option<String>,
}

impl AdminCredentials {
    /// Empty values count as not configured.
    pub fn new(username: Option<&str>, password: Option<&str>) -> Self {
        Self {
            username: username.filter(|u| !u.is_empty()).map(String::from),
            password_hash: password.filter(|p| !p.is_empty()).map(Self::hash),
        }
    }

    fn hash(value: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn is_configured(&self) -> bool {
        self.username.is_some() && self.password_hash.is_some()
    }

    /// Check a login attempt. Always false when nothing is configured.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let (Some(expected_user), Some(expected_hash)) = (&self.username, &self.password_hash)
        else {
            tracing::warn!("Admin username or password not configured");
            return false;
        };

        // Compare fixed-length digests rather than raw input
        let user_ok = Self::hash(username) == Self::hash(expected_user);
        let password_ok = Self::hash(password) == *expected_hash;
        user_ok && password_ok
    }
}
