use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, Version};
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::user::{Role, Session, User, UserRecord};
use crate::providers::traits::UserRepository;

/// Minimum accepted password length (characters).
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Argon2id cost parameters for password digests.
#[derive(Debug, Clone, Copy)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Number of iterations
    pub time_cost: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_cost: 19_456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

/// Login, registration and the current session.
///
/// Accounts live behind an injected [`UserRepository`]; the service holds
/// only the active session. This is a dashboard-side gate, not a security
/// boundary: the backend authorizes every API call on its own.
pub struct AuthService {
    repository: Arc<dyn UserRepository>,
    params: HashParams,
    session: RwLock<Option<Session>>,
}

impl AuthService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self::with_params(repository, HashParams::default())
    }

    pub fn with_params(repository: Arc<dyn UserRepository>, params: HashParams) -> Self {
        Self {
            repository,
            params,
            session: RwLock::new(None),
        }
    }

    /// Create an account. Does not log the new user in.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<User, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError("Name must not be empty".into()));
        }
        let email = normalize_email(email);
        validate_email(&email)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CoreError::ValidationError(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(CoreError::DuplicateEmail(email));
        }

        let mut salt = [0u8; 16];
        getrandom::getrandom(&mut salt)
            .map_err(|e| CoreError::Hashing(format!("Failed to generate salt: {e}")))?;
        let password_hash = self.hash_password(password, &salt)?;

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email,
            role,
            created_at: Utc::now(),
        };
        self.repository
            .insert(UserRecord {
                user: user.clone(),
                password_salt: salt,
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "Account registered");
        Ok(user)
    }

    /// Check credentials and start a session, replacing any previous one.
    ///
    /// Unknown email and wrong password both return
    /// `CoreError::InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, CoreError> {
        let email = normalize_email(email);
        let Some(record) = self.repository.find_by_email(&email).await? else {
            debug!("Login attempt for unknown email");
            return Err(CoreError::InvalidCredentials);
        };

        let candidate = self.hash_password(password, &record.password_salt)?;
        if !constant_time_eq(&candidate, &record.password_hash) {
            debug!(user_id = %record.user.id, "Login attempt with wrong password");
            return Err(CoreError::InvalidCredentials);
        }

        let session = Session {
            id: Uuid::new_v4(),
            user: record.user,
            started_at: Utc::now(),
        };
        *self.session.write() = Some(session.clone());
        info!(user_id = %session.user.id, "Logged in");
        Ok(session)
    }

    /// End the current session. Returns `false` if nobody was logged in.
    pub fn logout(&self) -> bool {
        let previous = self.session.write().take();
        if let Some(session) = &previous {
            info!(user_id = %session.user.id, "Logged out");
        }
        previous.is_some()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    /// The logged-in user, or `CoreError::NotAuthenticated`.
    pub fn current_user(&self) -> Result<User, CoreError> {
        self.session
            .read()
            .as_ref()
            .map(|s| s.user.clone())
            .ok_or(CoreError::NotAuthenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_some()
    }

    /// All accounts (admin panel). Requires an admin session.
    pub async fn list_users(&self) -> Result<Vec<User>, CoreError> {
        self.require_admin()?;
        Ok(self
            .repository
            .list()
            .await?
            .into_iter()
            .map(|r| r.user)
            .collect())
    }

    /// Look up one account by email (admin panel). Requires an admin session.
    pub async fn find_user(&self, email: &str) -> Result<User, CoreError> {
        self.require_admin()?;
        let email = normalize_email(email);
        self.repository
            .find_by_email(&email)
            .await?
            .map(|r| r.user)
            .ok_or(CoreError::UserNotFound(email))
    }

    fn require_admin(&self) -> Result<(), CoreError> {
        match self.session.read().as_ref() {
            None => Err(CoreError::NotAuthenticated),
            Some(s) if s.is_admin() => Ok(()),
            Some(_) => Err(CoreError::PermissionDenied(
                "admin role required".to_string(),
            )),
        }
    }

    fn hash_password(&self, password: &str, salt: &[u8; 16]) -> Result<[u8; 32], CoreError> {
        let params = Params::new(
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            Some(32),
        )
        .map_err(|e| CoreError::Hashing(format!("Invalid Argon2 params: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut hash = [0u8; 32];
        argon2.hash_password_into(password.as_bytes(), salt, &mut hash)?;
        Ok(hash)
    }
}

/// Trim and lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), CoreError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::ValidationError(format!(
            "Invalid email address '{email}'"
        )))
    }
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(validate_email("shop@momo.cm").is_ok());
        assert!(validate_email("shop.momo.cm").is_err());
        assert!(validate_email("@momo.cm").is_err());
        assert!(validate_email("shop@momo").is_err());
        assert!(validate_email("shop@@momo.cm").is_err());
        assert!(validate_email("shop@.cm").is_err());
    }

    #[test]
    fn constant_time_eq_detects_difference() {
        let a = [7u8; 32];
        let mut b = a;
        assert!(constant_time_eq(&a, &b));
        b[31] = 8;
        assert!(!constant_time_eq(&a, &b));
    }
}
