//! Username/password lookup.

use std::collections::HashMap;

use super::AuthError;

/// Bcrypt hash of "places" for the built-in `admin` user
const BUILTIN_ADMIN_HASH: &str = "$2b$10$JXuz3VGzQ/c5SughpyBw2uV1rwmrME7VABIYk9J3tk0P6vlf7WKsy";

/// Source of password hashes by username
pub trait CredentialStore: Send + Sync {
    /// Bcrypt hash for `username`, if the user exists
    fn password_hash(&self, username: &str) -> Option<&str>;

    /// Check `password` against the stored hash. Unknown users never match.
    fn verify(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        match self.password_hash(username) {
            Some(hash) => Ok(bcrypt::verify(password, hash)?),
            None => Ok(false),
        }
    }
}

/// Fixed set of users held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new<I, U, H>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, H)>,
        U: Into<String>,
        H: Into<String>,
    {
        Self {
            users: users
                .into_iter()
                .map(|(user, hash)| (user.into(), hash.into()))
                .collect(),
        }
    }

    /// The single `admin` user shipped with the service
    pub fn builtin() -> Self {
        Self::new([("admin", BUILTIN_ADMIN_HASH)])
    }
}

impl CredentialStore for StaticCredentials {
    fn password_hash(&self, username: &str) -> Option<&str> {
        self.users.get(username).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_known_user() {
        let hash = bcrypt::hash("secret", 4).unwrap();
        let creds = StaticCredentials::new([("alice", hash)]);

        assert!(creds.verify("alice", "secret").unwrap());
        assert!(!creds.verify("alice", "wrong").unwrap());
    }

    #[test]
    fn test_unknown_user_never_matches() {
        let creds = StaticCredentials::builtin();
        assert!(!creds.verify("mallory", "places").unwrap());
    }

    #[test]
    fn test_builtin_admin() {
        let creds = StaticCredentials::builtin();
        assert!(creds.verify("admin", "places").unwrap());
        assert!(!creds.verify("admin", "wrong").unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let creds = StaticCredentials::new([("bob", "not-a-bcrypt-hash")]);
        assert!(creds.verify("bob", "anything").is_err());
    }
}
