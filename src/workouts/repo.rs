use anyhow::Context;
use async_trait::async_trait;
use time::OffsetDateTime;

use super::repo_types::Workout;
use crate::db::PgRepository;

const WORKOUT_COLUMNS: &str = "id, user_id, name, description, date, created_at, updated_at";

/// Store operations on workouts. Everything but creation and listing is
/// scoped to an (id, user_id) pair.
#[async_trait]
pub trait WorkoutRepo: Send + Sync {
    async fn create_workout(
        &self,
        user_id: i32,
        name: &str,
        description: Option<&str>,
    ) -> anyhow::Result<Workout>;
    async fn get_workouts_by_user(&self, user_id: i32) -> anyhow::Result<Vec<Workout>>;
    async fn get_workout(&self, id: i32, user_id: i32) -> anyhow::Result<Option<Workout>>;
    /// `date: None` keeps the stored date.
    async fn update_workout(
        &self,
        id: i32,
        user_id: i32,
        name: &str,
        description: Option<&str>,
        date: Option<OffsetDateTime>,
    ) -> anyhow::Result<bool>;
    async fn delete_workout(&self, id: i32, user_id: i32) -> anyhow::Result<bool>;
}

#[async_trait]
impl WorkoutRepo for PgRepository {
    async fn create_workout(
        &self,
        user_id: i32,
        name: &str,
        description: Option<&str>,
    ) -> anyhow::Result<Workout> {
        let workout = sqlx::query_as::<_, Workout>(&format!(
            r#"
            INSERT INTO workouts (user_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING {WORKOUT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .context("insert workout")?;
        Ok(workout)
    }

    async fn get_workouts_by_user(&self, user_id: i32) -> anyhow::Result<Vec<Workout>> {
        let rows = sqlx::query_as::<_, Workout>(&format!(
            r#"
            SELECT {WORKOUT_COLUMNS}
              FROM workouts
             WHERE user_id = $1
             ORDER BY date DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("list workouts by user")?;
        Ok(rows)
    }

    async fn get_workout(&self, id: i32, user_id: i32) -> anyhow::Result<Option<Workout>> {
        let row = sqlx::query_as::<_, Workout>(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("select workout")?;
        Ok(row)
    }

    async fn update_workout(
        &self,
        id: i32,
        user_id: i32,
        name: &str,
        description: Option<&str>,
        date: Option<OffsetDateTime>,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE workouts
               SET name = $3,
                   description = $4,
                   date = COALESCE($5, date),
                   updated_at = now()
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(description)
        .bind(date)
        .execute(&self.pool)
        .await
        .context("update workout")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_workout(&self, id: i32, user_id: i32) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM workouts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("delete workout")?;
        Ok(res.rows_affected() > 0)
    }
}
