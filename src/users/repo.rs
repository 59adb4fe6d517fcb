use anyhow::Context;
use async_trait::async_trait;

use super::repo_types::{PasswordResetToken, User};
use crate::db::PgRepository;

const USER_COLUMNS: &str = "id, username, email, password_hash, profile, created_at, updated_at";

/// Store operations on users and their reset tokens.
///
/// Lookups return `None` for unknown rows and mutations return `false` when
/// nothing matched, so callers decide what "not found" means for them.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        profile: Option<serde_json::Value>,
    ) -> anyhow::Result<User>;
    async fn get_user(&self, id: i32) -> anyhow::Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// `profile: None` keeps the stored profile, `Some(None)` clears it.
    async fn update_user(
        &self,
        id: i32,
        username: &str,
        email: &str,
        profile: Option<Option<serde_json::Value>>,
    ) -> anyhow::Result<bool>;
    async fn delete_user(&self, id: i32) -> anyhow::Result<bool>;
    async fn update_password(&self, user_id: i32, password_hash: &str) -> anyhow::Result<bool>;

    async fn save_password_reset_token(&self, user_id: i32, token: &str) -> anyhow::Result<()>;
    /// Only tokens that were never redeemed are returned.
    async fn get_password_reset_token(&self, token: &str)
        -> anyhow::Result<Option<PasswordResetToken>>;
    /// Marks the token redeemed. Returns `false` if it was unknown or already used.
    async fn consume_password_reset_token(&self, token: &str) -> anyhow::Result<bool>;
}

#[async_trait]
impl UserRepo for PgRepository {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        profile: Option<serde_json::Value>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, profile)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(profile)
        .fetch_one(&self.pool)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn get_user(&self, id: i32) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("select user by id")?;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("select user by email")?;
        Ok(user)
    }

    async fn update_user(
        &self,
        id: i32,
        username: &str,
        email: &str,
        profile: Option<Option<serde_json::Value>>,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET username = $2,
                   email = $3,
                   profile = CASE WHEN $4 THEN $5 ELSE profile END,
                   updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(profile.is_some())
        .bind(profile.flatten())
        .execute(&self.pool)
        .await
        .context("update user")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_user(&self, id: i32) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }

    async fn update_password(&self, user_id: i32, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .context("update password")?;
        Ok(res.rows_affected() > 0)
    }

    async fn save_password_reset_token(&self, user_id: i32, token: &str) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO password_reset_tokens (token, user_id) VALUES ($1, $2)")
            .bind(token)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("insert password reset token")?;
        Ok(())
    }

    async fn get_password_reset_token(
        &self,
        token: &str,
    ) -> anyhow::Result<Option<PasswordResetToken>> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT user_id
              FROM password_reset_tokens
             WHERE token = $1 AND used_at IS NULL
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .context("select password reset token")?;
        Ok(row)
    }

    async fn consume_password_reset_token(&self, token: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE password_reset_tokens SET used_at = now() WHERE token = $1 AND used_at IS NULL",
        )
        .bind(token)
        .execute(&self.pool)
        .await
        .context("consume password reset token")?;
        Ok(res.rows_affected() > 0)
    }
}
