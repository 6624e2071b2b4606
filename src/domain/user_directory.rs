//! In-memory user directory with an email index.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{Role, User, UserId};
use crate::error::ServiceError;

#[derive(Debug, Default)]
struct Directory {
    by_id: HashMap<UserId, User>,
    by_email: HashMap<String, UserId>,
}

/// Server-side store of user accounts and their current roles.
///
/// Both indexes live behind one lock so an insert can never leave them
/// out of sync.
#[derive(Debug, Default)]
pub struct UserDirectory {
    inner: RwLock<Directory>,
}

impl UserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::EmailTaken`] if the email is already in use.
    pub async fn insert(&self, user: User) -> Result<UserId, ServiceError> {
        let mut dir = self.inner.write().await;
        if dir.by_email.contains_key(&user.email) {
            return Err(ServiceError::EmailTaken(user.email));
        }
        let id = user.id;
        dir.by_email.insert(user.email.clone(), id);
        dir.by_id.insert(id, user);
        Ok(id)
    }

    /// Returns a copy of the account.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UserNotFound`] if no such account exists.
    pub async fn get(&self, user_id: UserId) -> Result<User, ServiceError> {
        let dir = self.inner.read().await;
        dir.by_id
            .get(&user_id)
            .cloned()
            .ok_or(ServiceError::UserNotFound(*user_id.as_uuid()))
    }

    /// Looks an account up by (already normalised) email.
    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let dir = self.inner.read().await;
        dir.by_email
            .get(email)
            .and_then(|id| dir.by_id.get(id))
            .cloned()
    }

    /// Promotes a student to organizer. Returns `true` if the role changed;
    /// organizers and admins keep their role.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::UserNotFound`] if no such account exists.
    pub async fn promote_to_organizer(&self, user_id: UserId) -> Result<bool, ServiceError> {
        let mut dir = self.inner.write().await;
        let user = dir
            .by_id
            .get_mut(&user_id)
            .ok_or(ServiceError::UserNotFound(*user_id.as_uuid()))?;
        if user.role != Role::Student {
            return Ok(false);
        }
        user.role = Role::Organizer;
        Ok(true)
    }

    /// Returns the number of accounts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    /// Returns `true` if there are no accounts.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_id.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(email: &str, role: Role) -> User {
        User {
            id: UserId::new(),
            name: "Ada".to_string(),
            email: email.to_string(),
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_email() {
        let dir = UserDirectory::new();
        assert!(dir.insert(user("ada@uni.edu", Role::Student)).await.is_ok());
        assert!(matches!(
            dir.insert(user("ada@uni.edu", Role::Student)).await,
            Err(ServiceError::EmailTaken(_))
        ));
        assert_eq!(dir.len().await, 1);
    }

    #[tokio::test]
    async fn find_by_email_and_get_agree() {
        let dir = UserDirectory::new();
        let Ok(id) = dir.insert(user("grace@uni.edu", Role::Admin)).await else {
            panic!("insert failed");
        };
        let Some(found) = dir.find_by_email("grace@uni.edu").await else {
            panic!("not found by email");
        };
        assert_eq!(found.id, id);
        assert!(dir.get(UserId::new()).await.is_err());
    }

    #[tokio::test]
    async fn promotion_only_affects_students() {
        let dir = UserDirectory::new();
        let Ok(student) = dir.insert(user("s@uni.edu", Role::Student)).await else {
            panic!("insert failed");
        };
        let Ok(admin) = dir.insert(user("a@uni.edu", Role::Admin)).await else {
            panic!("insert failed");
        };

        assert!(matches!(dir.promote_to_organizer(student).await, Ok(true)));
        assert!(matches!(dir.promote_to_organizer(student).await, Ok(false)));
        assert!(matches!(dir.promote_to_organizer(admin).await, Ok(false)));

        let Ok(promoted) = dir.get(student).await else {
            panic!("user missing");
        };
        assert_eq!(promoted.role, Role::Organizer);
    }
}
