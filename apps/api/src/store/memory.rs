use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::contact::Contact;
use crate::models::interaction::Interaction;
use crate::store::{ContactTransition, GardenStore};

/// `None` once the contact has been hard-deleted, so a writer that was
/// already waiting on the slot sees the delete.
type ContactSlot = Arc<Mutex<Option<Contact>>>;

/// In-process store. Each contact has its own mutex; lock order is always
/// contact slot first, then the shared maps.
#[derive(Default)]
pub struct MemoryGardenStore {
    contacts: RwLock<HashMap<Uuid, ContactSlot>>,
    interactions: Mutex<HashMap<Uuid, Interaction>>,
}

fn poisoned() -> AppError {
    AppError::StorageUnavailable("in-memory store lock poisoned".to_string())
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, AppError> {
    mutex.lock().map_err(|_| poisoned())
}

impl MemoryGardenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: Uuid) -> Result<Option<ContactSlot>, AppError> {
        let contacts = self.contacts.read().map_err(|_| poisoned())?;
        Ok(contacts.get(&id).cloned())
    }

    fn all_slots(&self) -> Result<Vec<ContactSlot>, AppError> {
        let contacts = self.contacts.read().map_err(|_| poisoned())?;
        Ok(contacts.values().cloned().collect())
    }

    fn append(&self, interaction: &Interaction) -> Result<(), AppError> {
        let mut interactions = lock(&self.interactions)?;
        if interactions.contains_key(&interaction.id) {
            return Err(AppError::Validation(format!(
                "Interaction {} already exists",
                interaction.id
            )));
        }
        interactions.insert(interaction.id, interaction.clone());
        Ok(())
    }
}

#[async_trait]
impl GardenStore for MemoryGardenStore {
    async fn insert_contact(&self, contact: &Contact) -> Result<(), AppError> {
        let mut contacts = self.contacts.write().map_err(|_| poisoned())?;
        if contacts.contains_key(&contact.id) {
            return Err(AppError::Validation(format!(
                "Contact {} already exists",
                contact.id
            )));
        }
        contacts.insert(contact.id, Arc::new(Mutex::new(Some(contact.clone()))));
        Ok(())
    }

    async fn get_contact(&self, id: Uuid) -> Result<Option<Contact>, AppError> {
        match self.slot(id)? {
            Some(slot) => Ok(lock(&slot)?.clone()),
            None => Ok(None),
        }
    }

    async fn list_contacts(&self, user_id: Uuid) -> Result<Vec<Contact>, AppError> {
        let mut owned = Vec::new();
        for slot in self.all_slots()? {
            if let Some(contact) = lock(&slot)?.as_ref() {
                if contact.user_id == user_id {
                    owned.push(contact.clone());
                }
            }
        }
        owned.sort_by(|a, b| {
            a.last_interaction_at
                .cmp(&b.last_interaction_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(owned)
    }

    async fn set_archived(
        &self,
        id: Uuid,
        archived: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Contact>, AppError> {
        let Some(slot) = self.slot(id)? else {
            return Ok(None);
        };
        let mut guard = lock(&slot)?;
        Ok(guard.as_mut().map(|contact| {
            contact.is_archived = archived;
            contact.updated_at = updated_at;
            contact.clone()
        }))
    }

    async fn delete_contact(&self, id: Uuid) -> Result<bool, AppError> {
        let Some(slot) = self.slot(id)? else {
            return Ok(false);
        };
        let mut guard = lock(&slot)?;
        if guard.take().is_none() {
            return Ok(false);
        }
        self.contacts
            .write()
            .map_err(|_| poisoned())?
            .remove(&id);
        lock(&self.interactions)?.retain(|_, interaction| interaction.contact_id != id);
        Ok(true)
    }

    async fn get_interaction(&self, id: Uuid) -> Result<Option<Interaction>, AppError> {
        Ok(lock(&self.interactions)?.get(&id).cloned())
    }

    async fn list_interactions(
        &self,
        contact_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Interaction>, AppError> {
        let mut found: Vec<Interaction> = lock(&self.interactions)?
            .values()
            .filter(|interaction| interaction.contact_id == contact_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.happened_at
                .cmp(&a.happened_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        found.truncate(limit.max(0) as usize);
        Ok(found)
    }

    async fn delete_interaction(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(lock(&self.interactions)?.remove(&id).is_some())
    }

    async fn insert_interaction_raw(&self, interaction: &Interaction) -> Result<(), AppError> {
        let slot = self.slot(interaction.contact_id)?.ok_or_else(|| {
            AppError::NotFound(format!("Contact {} not found", interaction.contact_id))
        })?;
        let guard = lock(&slot)?;
        if guard.is_none() {
            return Err(AppError::NotFound(format!(
                "Contact {} not found",
                interaction.contact_id
            )));
        }
        self.append(interaction)
    }

    async fn commit_interaction(
        &self,
        interaction: &Interaction,
        transition: ContactTransition<'_>,
    ) -> Result<Contact, AppError> {
        let not_found = || AppError::NotFound(format!("Contact {} not found", interaction.contact_id));
        let slot = self.slot(interaction.contact_id)?.ok_or_else(not_found)?;

        // Held across read, transition and write: the lost-update guard.
        let mut guard = lock(&slot)?;
        let current = guard.as_ref().ok_or_else(not_found)?;
        let next = transition(current)?;
        self.append(interaction)?;
        *guard = Some(next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contact::{GrowthStage, Tier};
    use crate::models::interaction::{InteractionSource, InteractionType};
    use chrono::Duration;

    fn contact(user_id: Uuid, days_ago: i64) -> Contact {
        let now = Utc::now();
        Contact {
            id: Uuid::new_v4(),
            user_id,
            name: "Emily Wang".to_string(),
            email: None,
            company: None,
            title: None,
            tier: Tier::Fern,
            growth_stage: GrowthStage::Seed,
            health_score: 1.0,
            decay_rate: 0.0231,
            last_interaction_at: now - Duration::days(days_ago),
            total_interactions: 0,
            is_favorite: false,
            is_archived: false,
            tags: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn interaction(contact: &Contact, days_ago: i64) -> Interaction {
        let now = Utc::now();
        Interaction {
            id: Uuid::new_v4(),
            contact_id: contact.id,
            user_id: contact.user_id,
            interaction_type: InteractionType::Call,
            source: InteractionSource::Manual,
            notes: None,
            sentiment: None,
            happened_at: now - Duration::days(days_ago),
            duration_minutes: None,
            metadata: None,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_failed_transition_writes_nothing() {
        let store = MemoryGardenStore::new();
        let c = contact(Uuid::new_v4(), 3);
        store.insert_contact(&c).await.unwrap();

        let i = interaction(&c, 0);
        let result = store
            .commit_interaction(&i, &|_| Err(AppError::Forbidden))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
        assert!(store.get_interaction(i.id).await.unwrap().is_none());
        assert_eq!(store.get_contact(c.id).await.unwrap().unwrap(), c);
    }

    #[tokio::test]
    async fn test_commit_writes_both_rows() {
        let store = MemoryGardenStore::new();
        let c = contact(Uuid::new_v4(), 3);
        store.insert_contact(&c).await.unwrap();

        let i = interaction(&c, 0);
        let next = store
            .commit_interaction(&i, &|current| {
                let mut next = current.clone();
                next.total_interactions += 1;
                Ok(next)
            })
            .await
            .unwrap();

        assert_eq!(next.total_interactions, 1);
        assert_eq!(store.get_interaction(i.id).await.unwrap(), Some(i));
    }

    #[tokio::test]
    async fn test_delete_contact_cascades() {
        let store = MemoryGardenStore::new();
        let c = contact(Uuid::new_v4(), 3);
        store.insert_contact(&c).await.unwrap();
        let i = interaction(&c, 1);
        store.insert_interaction_raw(&i).await.unwrap();

        assert!(store.delete_contact(c.id).await.unwrap());
        assert!(store.get_contact(c.id).await.unwrap().is_none());
        assert!(store.get_interaction(i.id).await.unwrap().is_none());
        assert!(!store.delete_contact(c.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_raw_insert_requires_contact() {
        let store = MemoryGardenStore::new();
        let orphan = interaction(&contact(Uuid::new_v4(), 0), 0);
        let result = store.insert_interaction_raw(&orphan).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_interactions_newest_first_with_limit() {
        let store = MemoryGardenStore::new();
        let c = contact(Uuid::new_v4(), 30);
        store.insert_contact(&c).await.unwrap();
        for days_ago in [10, 2, 25, 7] {
            store
                .insert_interaction_raw(&interaction(&c, days_ago))
                .await
                .unwrap();
        }

        let listed = store.list_interactions(c.id, 3).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed[0].happened_at > listed[1].happened_at);
        assert!(listed[1].happened_at > listed[2].happened_at);
    }

    #[tokio::test]
    async fn test_list_contacts_scoped_to_owner() {
        let store = MemoryGardenStore::new();
        let owner = Uuid::new_v4();
        store.insert_contact(&contact(owner, 1)).await.unwrap();
        store.insert_contact(&contact(owner, 2)).await.unwrap();
        store.insert_contact(&contact(Uuid::new_v4(), 3)).await.unwrap();

        assert_eq!(store.list_contacts(owner).await.unwrap().len(), 2);
    }
}
