use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::{debug, warn};

use crate::models::{NewUser, UserRow};
use crate::{Database, DbError, Result};

/// Prefix of every hash produced by [`hash_password`].
pub const HASH_PREFIX: &str = "$argon2id$";

/// Hash a plaintext password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::PasswordHash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Check a plaintext password against a stored hash. A stored value that is
/// not a valid PHC string never verifies.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password is not a valid hash: {}", e);
            return false;
        }
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

impl Database {
    /// Hash the password and insert a new user.
    ///
    /// An empty or absent password is rejected before the store is touched.
    /// A missing or duplicate username/email is left to the store and comes
    /// back as [`DbError::Integrity`].
    pub fn signup(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        password: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<UserRow> {
        let password = match password {
            Some(p) if !p.is_empty() => p,
            _ => return Err(DbError::MissingPassword),
        };

        let hashed = hash_password(password)?;

        let user = self.insert_user(&NewUser {
            username: username.map(str::to_string),
            email: email.map(str::to_string),
            password: hashed,
            image_url: image_url.map(str::to_string),
        })?;

        debug!("Signed up user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Look up `username` and verify `password`. Returns `None` for an unknown
    /// user or a wrong password; only storage failures are errors.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserRow>> {
        let Some(user) = self.get_user_by_username(username)? else {
            return Ok(None);
        };

        if verify_password(password, &user.password) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_prefixed() {
        let a = hash_password("testpass").unwrap();
        let b = hash_password("testpass").unwrap();

        assert_ne!(a, "testpass");
        assert!(a.starts_with(HASH_PREFIX));
        assert_ne!(a, b);
    }

    #[test]
    fn verify_accepts_only_the_right_password() {
        let hash = hash_password("testpass").unwrap();
        assert!(verify_password("testpass", &hash));
        assert!(!verify_password("badpassword", &hash));
    }

    #[test]
    fn verify_rejects_non_hash_values() {
        assert!(!verify_password("HASHED_PASSWORD", "HASHED_PASSWORD"));
        assert!(!verify_password("", ""));
    }
}
