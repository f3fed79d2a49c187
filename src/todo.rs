use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    model::Todo,
    store::TodoStore,
};

pub const MAX_CONTENT_CHARS: usize = 1000;

pub struct TodoService {
    store: TodoStore,
}

impl TodoService {
    pub fn new(store: TodoStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner_id: Uuid, content: &str) -> Result<Todo> {
        let content = validate_content(content)?;
        let todo = self.store.create(owner_id, content.to_string()).await?;

        tracing::debug!("created todo {} for {}", todo.id, owner_id);
        Ok(todo)
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Todo>> {
        self.store.list_by_owner(owner_id).await
    }
}

/// Trims `content` and checks it is non-empty and within the length limit.
pub fn validate_content(content: &str) -> Result<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::EmptyContent);
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::ContentTooLong);
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_limits() {
        assert!(matches!(validate_content(""), Err(AppError::EmptyContent)));
        assert!(matches!(validate_content(" \t\n"), Err(AppError::EmptyContent)));
        assert_eq!(validate_content("  buy milk ").unwrap(), "buy milk");

        let max = "x".repeat(MAX_CONTENT_CHARS);
        assert_eq!(validate_content(&max).unwrap().len(), MAX_CONTENT_CHARS);

        let over = "x".repeat(MAX_CONTENT_CHARS + 1);
        assert!(matches!(validate_content(&over), Err(AppError::ContentTooLong)));
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let accented = "é".repeat(MAX_CONTENT_CHARS);
        assert!(accented.len() > MAX_CONTENT_CHARS);
        assert!(validate_content(&accented).is_ok());
    }

    #[test]
    fn surrounding_whitespace_does_not_count() {
        let padded = format!("  {}  ", "x".repeat(MAX_CONTENT_CHARS));
        assert!(validate_content(&padded).is_ok());
    }

    #[tokio::test]
    async fn create_stores_trimmed_content_and_list_filters_by_owner() {
        let dir = tempfile::tempdir().unwrap();
        let store = TodoStore::open(dir.path().join("todos.json")).await.unwrap();
        let todos = TodoService::new(store);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let created = todos.create(alice, "  buy milk  ").await.unwrap();
        todos.create(bob, "bob's chore").await.unwrap();

        assert_eq!(created.content, "buy milk");
        assert_eq!(todos.list(alice).await.unwrap(), vec![created]);
        assert_eq!(todos.list(bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejected_content_is_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let store = TodoStore::open(dir.path().join("todos.json")).await.unwrap();
        let todos = TodoService::new(store);
        let owner = Uuid::new_v4();

        assert!(todos.create(owner, "   ").await.is_err());
        assert!(todos.list(owner).await.unwrap().is_empty());
    }
}
