//! Library repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::LibraryItem;
use crate::domain::aggregation::LibraryRowSet;
use crate::domain::DomainError;

/// DB adapter for a user's library
///
/// Every method is scoped to one user; rows for other users must never be
/// returned.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LibraryRepository: Send + Sync {
    /// List all items in the user's library
    async fn list(&self, user_id: &str) -> Result<Vec<LibraryItem>, DomainError>;

    /// Get a single item by game id
    async fn get(&self, user_id: &str, game_id: i64) -> Result<Option<LibraryItem>, DomainError>;

    /// Add a game to the library
    async fn create(&self, user_id: &str, item: LibraryItem) -> Result<LibraryItem, DomainError>;

    /// Replace an existing library item
    async fn update(&self, user_id: &str, item: LibraryItem) -> Result<LibraryItem, DomainError>;

    /// Remove a game from the library, returns true if it existed
    async fn delete(&self, user_id: &str, game_id: i64) -> Result<bool, DomainError>;

    /// Flat game × platform × location rows for the library view
    async fn library_rows(&self, user_id: &str) -> Result<LibraryRowSet, DomainError>;
}
