use tokio::sync::OnceCell;

use crate::error::Result;

const DUMMY_PASSWORD: &str = "todo-worker-dummy-password";

/// bcrypt hashing. The work runs on tokio's blocking pool so a slow cost
/// factor never stalls the request executor.
#[derive(Debug)]
pub struct PasswordHasher {
    cost: u32,
    pub(super) dummy_hash: OnceCell<String>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy_hash: OnceCell::new(),
        }
    }

    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_owned();
        let cost = self.cost;

        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hash)
    }

    /// A stored hash that bcrypt cannot parse never matches.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        if hash.is_empty() {
            return Ok(false);
        }

        let password = password.to_owned();
        let hash = hash.to_owned();

        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
        match outcome {
            Ok(valid) => Ok(valid),
            Err(e) => {
                tracing::warn!("stored password hash could not be checked: {}", e);
                Ok(false)
            }
        }
    }

    /// Spends the same bcrypt work as `verify` against a fixed hash, so a
    /// missing account costs as much time as a wrong password.
    pub async fn verify_dummy(&self, password: &str) -> Result<()> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD))
            .await?;
        self.verify(password, hash).await?;
        Ok(())
    }
}
