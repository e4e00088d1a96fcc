#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::AuthError;

use super::user::{AuthUser, UserRepository};

#[derive(Clone, Default)]
pub struct MockUserRepository {
    pub users: Arc<Mutex<Vec<AuthUser>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<AuthUser, AuthError> {
        let mut users = self.users.lock().unwrap();
        let next_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = AuthUser {
            id: next_id,
            email: email.to_owned(),
            hashed_password: hashed_password.to_owned(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        drop(users);

        Ok(user)
    }
}
