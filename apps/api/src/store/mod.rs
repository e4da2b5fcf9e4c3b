//! Persistence seam. `AppState` carries an `Arc<dyn GardenStore>`; the
//! Postgres backend is the production path, the in-memory backend serves
//! local runs and tests.

pub mod memory;
pub mod postgres;
pub mod schema;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::contact::Contact;
use crate::models::interaction::Interaction;

pub use memory::MemoryGardenStore;
pub use postgres::PgGardenStore;

/// Computes a contact's next state from its locked current state. Runs
/// inside the store's transaction; an `Err` aborts it with nothing written.
pub type ContactTransition<'a> = &'a (dyn Fn(&Contact) -> Result<Contact, AppError> + Send + Sync);

#[async_trait]
pub trait GardenStore: Send + Sync {
    async fn insert_contact(&self, contact: &Contact) -> Result<(), AppError>;

    async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>, AppError>;

    /// All contacts for an owner, archived ones included.
    async fn list_contacts(&self, user_id: Uuid) -> Result<Vec<Contact>, AppError>;

    /// Flips the soft-delete flag. Returns `None` if the contact is gone.
    async fn set_archived(
        &self,
        id: Uuid,
        archived: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Contact>, AppError>;

    /// Hard delete; cascades to the contact's interactions.
    async fn delete_contact(&self, id: Uuid) -> Result<bool, AppError>;

    async fn get_interaction(&self, id: Uuid) -> Result<Option<Interaction>, AppError>;

    /// Newest `happened_at` first.
    async fn list_interactions(
        &self,
        contact_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Interaction>, AppError>;

    async fn delete_interaction(&self, id: Uuid) -> Result<bool, AppError>;

    /// Appends an interaction without touching the owning contact.
    async fn insert_interaction_raw(&self, interaction: &Interaction) -> Result<(), AppError>;

    /// One unit of work: lock the owning contact, apply `transition`, insert
    /// the interaction and write the new contact state. Both rows commit
    /// together or not at all; writes to different contacts never share a
    /// lock.
    async fn commit_interaction(
        &self,
        interaction: &Interaction,
        transition: ContactTransition<'_>,
    ) -> Result<Contact, AppError>;
}
