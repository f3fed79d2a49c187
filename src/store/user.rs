use std::path::PathBuf;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use super::JsonFile;
use crate::{
    error::{AppError, Result},
    model::User,
};

/// Users keyed by unique username, persisted as `{"users": [...]}`.
pub struct UserStore {
    file: JsonFile<User>,
}

impl UserStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            file: JsonFile::open(path, "users").await?,
        })
    }

    /// Inserts a new user. The uniqueness check runs under the store lock and
    /// also covers records that are on disk but could not be decoded.
    pub async fn create(&self, username: &str, password_hash: String) -> Result<User> {
        self.file
            .update(|users, unreadable| {
                let taken = users.iter().any(|u| u.username == username)
                    || unreadable
                        .iter()
                        .any(|raw| raw.get("username").and_then(Value::as_str) == Some(username));
                if taken {
                    return Err(AppError::UsernameExists);
                }

                let user = User {
                    id: Uuid::new_v4(),
                    username: username.to_string(),
                    password_hash,
                    created_at: Utc::now(),
                };
                users.push(user.clone());
                Ok(user)
            })
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.file.read().await?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.file.read().await?;
        Ok(users.into_iter().find(|u| u.id == id))
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        Ok(self.find_by_username(username).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, UserStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = UserStore::open(dir.path().join("users.json")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn created_user_is_found_by_name_and_id() {
        let (_dir, store) = store().await;

        let user = store.create("alice", "hash".to_string()).await.unwrap();

        let by_name = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert!(store.username_exists("alice").await.unwrap());
        assert!(!store.username_exists("bob").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (_dir, store) = store().await;

        store.create("alice", "hash".to_string()).await.unwrap();
        let err = store.create("alice", "other".to_string()).await.unwrap_err();

        assert!(matches!(err, AppError::UsernameExists));
    }

    #[tokio::test]
    async fn users_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        let user = {
            let store = UserStore::open(&path).await.unwrap();
            store.create("alice", "hash".to_string()).await.unwrap()
        };

        let reopened = UserStore::open(&path).await.unwrap();
        let found = reopened.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.password_hash, "hash");
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let (_dir, store) = store().await;
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn loads_users_written_with_naive_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let bob_id = Uuid::new_v4();
        let legacy = serde_json::json!({
            "users": [{
                "id": bob_id.to_string(),
                "username": "bob",
                "password_hash": "hash",
                "created_at": "2024-05-01T12:00:00.123456"
            }]
        });
        std::fs::write(&path, legacy.to_string()).unwrap();

        let store = UserStore::open(&path).await.unwrap();

        let bob = store.find_by_username("bob").await.unwrap().unwrap();
        assert_eq!(bob.id, bob_id);
        assert_eq!(bob.created_at.to_rfc3339(), "2024-05-01T12:00:00.123456+00:00");
    }

    #[tokio::test]
    async fn registering_keeps_records_that_do_not_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let broken = serde_json::json!({
            "id": "not-a-uuid",
            "username": "bob",
            "password_hash": "hash",
            "created_at": "yesterday"
        });
        std::fs::write(&path, serde_json::json!({ "users": [broken] }).to_string()).unwrap();
        let store = UserStore::open(&path).await.unwrap();

        store.create("alice", "hash".to_string()).await.unwrap();

        let on_disk: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        let users = on_disk["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.contains(&broken));
        assert!(store.find_by_username("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unreadable_record_still_reserves_its_username() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"{"users": [{"username": "bob"}]}"#).unwrap();
        let store = UserStore::open(&path).await.unwrap();

        let err = store.create("bob", "hash".to_string()).await.unwrap_err();

        assert!(matches!(err, AppError::UsernameExists));
    }
}
