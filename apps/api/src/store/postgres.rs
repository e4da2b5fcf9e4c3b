use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::contact::Contact;
use crate::models::interaction::Interaction;
use crate::store::schema::SCHEMA;
use crate::store::{ContactTransition, GardenStore};

#[derive(Clone)]
pub struct PgGardenStore {
    pool: PgPool,
}

impl PgGardenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the idempotent schema. Runs as a simple query so the DDL
    /// batch goes through in one round trip.
    pub async fn migrate(&self) -> Result<()> {
        self.pool.execute(SCHEMA).await?;
        info!("Garden schema is up to date");
        Ok(())
    }
}

async fn insert_interaction(
    tx: &mut Transaction<'_, Postgres>,
    interaction: &Interaction,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO interactions
            (id, contact_id, user_id, interaction_type, source, notes,
             sentiment, happened_at, duration_minutes, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(interaction.id)
    .bind(interaction.contact_id)
    .bind(interaction.user_id)
    .bind(interaction.interaction_type)
    .bind(interaction.source)
    .bind(&interaction.notes)
    .bind(interaction.sentiment)
    .bind(interaction.happened_at)
    .bind(interaction.duration_minutes)
    .bind(&interaction.metadata)
    .bind(interaction.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl GardenStore for PgGardenStore {
    async fn insert_contact(&self, contact: &Contact) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO contacts
                (id, user_id, name, email, company, title, tier, growth_stage,
                 health_score, decay_rate, last_interaction_at, total_interactions,
                 is_favorite, is_archived, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(contact.id)
        .bind(contact.user_id)
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.company)
        .bind(&contact.title)
        .bind(contact.tier)
        .bind(contact.growth_stage)
        .bind(contact.health_score)
        .bind(contact.decay_rate)
        .bind(contact.last_interaction_at)
        .bind(contact.total_interactions)
        .bind(contact.is_favorite)
        .bind(contact.is_archived)
        .bind(&contact.tags)
        .bind(contact.created_at)
        .bind(contact.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>, AppError> {
        Ok(
            sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_contacts(&self, user_id: Uuid) -> Result<Vec<Contact>, AppError> {
        Ok(sqlx::query_as::<_, Contact>(
            "SELECT * FROM contacts WHERE user_id = $1 ORDER BY last_interaction_at ASC, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_archived(
        &self,
        id: Uuid,
        archived: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Contact>, AppError> {
        Ok(sqlx::query_as::<_, Contact>(
            "UPDATE contacts SET is_archived = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(archived)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_contact(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_interaction(&self, id: Uuid) -> Result<Option<Interaction>, AppError> {
        Ok(
            sqlx::query_as::<_, Interaction>("SELECT * FROM interactions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_interactions(
        &self,
        contact_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Interaction>, AppError> {
        Ok(sqlx::query_as::<_, Interaction>(
            r#"
            SELECT * FROM interactions
            WHERE contact_id = $1
            ORDER BY happened_at DESC, id
            LIMIT $2
            "#,
        )
        .bind(contact_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_interaction(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM interactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_interaction_raw(&self, interaction: &Interaction) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        insert_interaction(&mut tx, interaction).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn commit_interaction(
        &self,
        interaction: &Interaction,
        transition: ContactTransition<'_>,
    ) -> Result<Contact, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent waterings of the same contact only.
        let current = sqlx::query_as::<_, Contact>("SELECT * FROM contacts WHERE id = $1 FOR UPDATE")
            .bind(interaction.contact_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contact {} not found", interaction.contact_id)))?;

        // Dropping `tx` on any early return rolls everything back.
        let next = transition(&current)?;

        insert_interaction(&mut tx, interaction).await?;

        let updated = sqlx::query_as::<_, Contact>(
            r#"
            UPDATE contacts
            SET total_interactions = $2,
                growth_stage = $3,
                health_score = $4,
                last_interaction_at = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(current.id)
        .bind(next.total_interactions)
        .bind(next.growth_stage)
        .bind(next.health_score)
        .bind(next.last_interaction_at)
        .bind(next.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(
            "Committed interaction {} for contact {}",
            interaction.id, updated.id
        );
        Ok(updated)
    }
}
