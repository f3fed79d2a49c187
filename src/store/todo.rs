use std::path::PathBuf;

use chrono::Utc;
use uuid::Uuid;

use super::JsonFile;
use crate::{error::Result, model::Todo};

/// Todo records persisted as `{"todos": [...]}`.
pub struct TodoStore {
    file: JsonFile<Todo>,
}

impl TodoStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            file: JsonFile::open(path, "todos").await?,
        })
    }

    pub async fn create(&self, owner_id: Uuid, content: String) -> Result<Todo> {
        self.file
            .update(|todos, _| {
                let todo = Todo {
                    id: Uuid::new_v4(),
                    content,
                    owner_id,
                    created_at: Utc::now(),
                };
                todos.push(todo.clone());
                Ok(todo)
            })
            .await
    }

    /// Todos owned by `owner_id`, newest first. Equal timestamps keep the
    /// later-inserted record first.
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Todo>> {
        let mut todos: Vec<Todo> = self
            .file
            .read()
            .await?
            .into_iter()
            .rev()
            .filter(|t| t.owner_id == owner_id)
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(todos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn lists_only_the_owners_todos_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = TodoStore::open(dir.path().join("todos.json")).await.unwrap();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let first = store.create(alice, "first".to_string()).await.unwrap();
        store.create(bob, "not yours".to_string()).await.unwrap();
        let second = store.create(alice, "second".to_string()).await.unwrap();

        let listed = store.list_by_owner(alice).await.unwrap();
        assert_eq!(listed, vec![second, first]);
        assert!(listed.iter().all(|t| t.owner_id == alice));
    }

    #[tokio::test]
    async fn sorts_by_timestamp_not_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        let owner = Uuid::new_v4();
        let now = Utc::now();

        let newer = Todo {
            id: Uuid::new_v4(),
            content: "newer".to_string(),
            owner_id: owner,
            created_at: now,
        };
        let older = Todo {
            id: Uuid::new_v4(),
            content: "older".to_string(),
            owner_id: owner,
            created_at: now - Duration::hours(1),
        };
        let doc = serde_json::json!({ "todos": [newer, older] });
        std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();

        let store = TodoStore::open(&path).await.unwrap();
        let contents: Vec<String> = store
            .list_by_owner(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.content)
            .collect();
        assert_eq!(contents, vec!["newer", "older"]);
    }

    #[tokio::test]
    async fn owner_is_stored_as_user_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        let store = TodoStore::open(&path).await.unwrap();
        let owner = Uuid::new_v4();

        store.create(owner, "buy milk".to_string()).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["todos"][0]["user_id"], owner.to_string());
        assert_eq!(raw["todos"][0]["content"], "buy milk");
    }

    #[tokio::test]
    async fn loads_todos_written_with_naive_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        let owner = Uuid::new_v4();
        let legacy = serde_json::json!({
            "todos": [
                {
                    "id": Uuid::new_v4().to_string(),
                    "content": "older",
                    "user_id": owner.to_string(),
                    "created_at": "2024-05-01T12:00:00"
                },
                {
                    "id": Uuid::new_v4().to_string(),
                    "content": "newer",
                    "user_id": owner.to_string(),
                    "created_at": "2024-05-01T12:00:00.500000"
                }
            ]
        });
        std::fs::write(&path, legacy.to_string()).unwrap();

        let store = TodoStore::open(&path).await.unwrap();
        store.create(owner, "newest".to_string()).await.unwrap();

        let contents: Vec<String> = store
            .list_by_owner(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.content)
            .collect();
        assert_eq!(contents, vec!["newest", "newer", "older"]);
    }
}
