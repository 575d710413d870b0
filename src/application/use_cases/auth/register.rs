use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use password_hash::rand_core::OsRng;

use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    /// Returns `None` when the email is already registered.
    pub async fn execute(&self, req: &RegisterRequest) -> anyhow::Result<Option<UserRow>> {
        if self.repo.find_by_email(&req.email).await?.is_some() {
            return Ok(None);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();
        // the insert itself is conditional, so a concurrent signup still lands on None
        let user = self
            .repo
            .create_user(&req.email, req.name.as_deref(), &hash)
            .await?;
        Ok(user.map(|u| UserRow {
            password_hash: None,
            ..u
        }))
    }
}
