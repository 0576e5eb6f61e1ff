//! Mock sign-in backed by the stored current-user record.

use crate::core::User;
use crate::marketplace::MarketplaceStorage;
use anyhow::Result;
use chrono::Utc;
use thiserror::Error;
use tracing::info;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
}

fn check_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

fn new_user_id() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Signs in with any email and a long enough password. The display name is
/// the local part of the email.
pub async fn login(storage: &MarketplaceStorage, email: &str, password: &str) -> Result<User> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields.into());
    }
    check_password(password)?;

    let name = email.split('@').next().unwrap_or(email).to_string();
    let user = User {
        id: new_user_id(),
        name,
        email: email.to_string(),
        avatar: None,
    };
    storage.save_user(&user).await?;
    info!(user = %user.name, "Logged in");
    Ok(user)
}

pub async fn signup(
    storage: &MarketplaceStorage,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User> {
    let (name, email) = (name.trim(), email.trim());
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields.into());
    }
    check_password(password)?;

    let user = User {
        id: new_user_id(),
        name: name.to_string(),
        email: email.to_string(),
        avatar: None,
    };
    storage.save_user(&user).await?;
    info!(user = %user.name, "Signed up");
    Ok(user)
}

pub async fn logout(storage: &MarketplaceStorage) -> Result<()> {
    storage.clear_user().await?;
    info!("Logged out");
    Ok(())
}
