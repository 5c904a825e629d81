//! bcrypt hashing, run off the async executor.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub async fn hash_password(plain: &str, cost: u32) -> Result<String, PasswordError> {
    let plain = plain.to_owned();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost)).await??;
    Ok(hashed)
}

pub async fn verify_password(plain: &str, hashed: &str) -> Result<bool, PasswordError> {
    let plain = plain.to_owned();
    let hashed = hashed.to_owned();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hashed)).await??;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hashed = hash_password("password1", 4).await.unwrap();
        assert_ne!(hashed, "password1");
        assert!(verify_password("password1", &hashed).await.unwrap());
        assert!(!verify_password("wrong", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(verify_password("password1", "not-a-hash").await.is_err());
    }
}
