use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::info;

use friendbook_db::{Database, is_unique_violation};
use friendbook_types::Identity;

use crate::error::AppError;

/// Longest username the users table accepts.
pub const MAX_USERNAME_LEN: usize = 150;

/// Create an account and return its id.
pub fn register(db: &Database, username: &str, password: &str) -> Result<i64, AppError> {
    let username = username.trim();

    if username.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required.".into(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::Validation(format!(
            "Username must be at most {} characters.",
            MAX_USERNAME_LEN
        )));
    }

    if db.get_user_by_username(username)?.is_some() {
        return Err(AppError::DuplicateUsername);
    }

    let password_hash = hash_password(password)?;

    // A concurrent registration can still win the race to the UNIQUE index.
    match db.create_user(username, &password_hash) {
        Ok(user_id) => {
            info!(user_id, username, "User registered");
            Ok(user_id)
        }
        Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateUsername),
        Err(e) => Err(e.into()),
    }
}

/// Check credentials. Unknown user and wrong password are indistinguishable.
pub fn login(db: &Database, username: &str, password: &str) -> Result<Identity, AppError> {
    let user = db
        .get_user_by_username(username.trim())?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.password) {
        return Err(AppError::InvalidCredentials);
    }

    Ok(Identity {
        user_id: user.id,
        username: user.username,
    })
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
