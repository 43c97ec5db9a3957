use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use crate::errors::{AppError, AppResult, StoreError};
use crate::models::{require, Credentials, User};
use super::store::Store;

// Full cost in the binary; the minimum keeps the test-suite fast.
const HASH_COST: u32 = if cfg!(test) { 4 } else { DEFAULT_COST };
const RESET_TOKEN_LEN: usize = 32;

fn hash_password(password: &str) -> AppResult<String> {
    hash(password.as_bytes(), HASH_COST)
        .map_err(|e| AppError::store("Error saving credentials")(StoreError::Hash(e)))
}

fn new_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Creates the configured static account on first start. Returns whether
/// a new account was written.
pub async fn seed_account(store: &dyn Store, username: &str, password: &str) -> AppResult<bool> {
    let user = User::new(username.to_string(), hash_password(password)?);
    let created = store
        .create_user(&user)
        .await
        .map_err(AppError::store("Error seeding account"))?;

    if created {
        tracing::info!("Seeded account {}", username);
    } else {
        tracing::debug!("Account {} already present, not seeding", username);
    }
    Ok(created)
}

pub async fn signup(store: &dyn Store, credentials: Credentials) -> AppResult<User> {
    credentials.validate()?;

    let user = User::new(credentials.username, hash_password(&credentials.password)?);
    let created = store
        .create_user(&user)
        .await
        .map_err(AppError::store("Error signing up"))?;

    if !created {
        return Err(AppError::Conflict("Username already taken".into()));
    }
    tracing::info!("Registered user {}", user.username);
    Ok(user)
}

pub async fn verify_login(store: &dyn Store, credentials: &Credentials) -> AppResult<User> {
    let user = store
        .get_user(&credentials.username)
        .await
        .map_err(AppError::store("Error logging in"))?;

    // Same answer for unknown users and bad passwords
    let Some(user) = user else {
        tracing::info!("Login attempt for unknown user {}", credentials.username);
        return Err(AppError::Auth("Invalid username or password".into()));
    };

    let matches = verify(&credentials.password, &user.password_hash)
        .map_err(|e| AppError::store("Error logging in")(StoreError::Hash(e)))?;
    if !matches {
        tracing::info!("Invalid password for user {}", credentials.username);
        return Err(AppError::Auth("Invalid username or password".into()));
    }

    Ok(user)
}

/// Issues a reset token valid for `ttl`. There is no mail channel, so the
/// caller hands the token back to the client.
pub async fn issue_reset_token(
    store: &dyn Store,
    username: &str,
    ttl: Duration,
) -> AppResult<(String, DateTime<Utc>)> {
    let mut user = store
        .get_user(username)
        .await
        .map_err(AppError::store("Error processing forgot password"))?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let token = new_reset_token();
    let expiry = Utc::now() + ttl;
    user.reset_token = Some(token.clone());
    user.reset_token_expiry = Some(expiry);

    store
        .save_user(&user)
        .await
        .map_err(AppError::store("Error processing forgot password"))?;

    tracing::info!("Issued reset token for {} (expires {})", username, expiry);
    Ok((token, expiry))
}

pub async fn reset_password(store: &dyn Store, token: &str, new_password: &str) -> AppResult<()> {
    require("newPassword", new_password)?;

    let user = store
        .find_user_by_reset_token(token)
        .await
        .map_err(AppError::store("Error resetting password"))?;

    let mut user = match user {
        Some(user) if user.reset_token_valid(token, Utc::now()) => user,
        _ => return Err(AppError::Validation("Invalid or expired reset token".into())),
    };

    user.password_hash = hash_password(new_password)?;
    user.reset_token = None;
    user.reset_token_expiry = None;

    store
        .save_user(&user)
        .await
        .map_err(AppError::store("Error resetting password"))?;

    tracing::info!("Password reset for {}", user.username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = MemoryStore::new();
        assert!(seed_account(&store, "yugdeep", "989814yug").await.unwrap());
        assert!(!seed_account(&store, "yugdeep", "changed").await.unwrap());
        // The first password still works
        verify_login(&store, &creds("yugdeep", "989814yug")).await.unwrap();
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let store = MemoryStore::new();
        let user = signup(&store, creds("mayank", "s3cret")).await.unwrap();
        assert_ne!(user.password_hash, "s3cret");

        verify_login(&store, &creds("mayank", "s3cret")).await.unwrap();
        assert!(matches!(
            verify_login(&store, &creds("mayank", "wrong")).await,
            Err(AppError::Auth(_))
        ));
        assert!(matches!(
            verify_login(&store, &creds("nobody", "s3cret")).await,
            Err(AppError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_duplicate_and_blank() {
        let store = MemoryStore::new();
        signup(&store, creds("mayank", "a")).await.unwrap();
        assert!(matches!(signup(&store, creds("mayank", "b")).await, Err(AppError::Conflict(_))));
        assert!(matches!(signup(&store, creds("", "b")).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_reset_flow() {
        let store = MemoryStore::new();
        signup(&store, creds("mayank", "old")).await.unwrap();

        let (token, _) = issue_reset_token(&store, "mayank", Duration::minutes(10)).await.unwrap();
        assert_eq!(token.len(), RESET_TOKEN_LEN);

        reset_password(&store, &token, "new").await.unwrap();
        verify_login(&store, &creds("mayank", "new")).await.unwrap();
        assert!(verify_login(&store, &creds("mayank", "old")).await.is_err());

        // Tokens are single use
        assert!(matches!(
            reset_password(&store, &token, "again").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let store = MemoryStore::new();
        signup(&store, creds("mayank", "old")).await.unwrap();
        let (token, _) = issue_reset_token(&store, "mayank", Duration::seconds(-1)).await.unwrap();

        assert!(matches!(
            reset_password(&store, &token, "new").await,
            Err(AppError::Validation(_))
        ));
        verify_login(&store, &creds("mayank", "old")).await.unwrap();
    }

    #[tokio::test]
    async fn test_forgot_password_unknown_user() {
        let store = MemoryStore::new();
        assert!(matches!(
            issue_reset_token(&store, "ghost", Duration::minutes(10)).await,
            Err(AppError::NotFound(_))
        ));
    }
}
