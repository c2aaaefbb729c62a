// In-memory repositories.
//
// The test double: collections held directly behind one async mutex per
// repository instance, which serializes every read-modify-write cycle.
// Behavior must be observably identical to the store-backed family for
// everything in the repository contract.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;

use rota_types::{
    generate_id, is_standard_role_id, standard_role, standard_roles, CheckList, CheckListFilter,
    Entity, Role, Shift, ShiftBatchEntry, ShiftCommand, ShiftFilter, User,
};

use crate::batch::apply_commands;
use crate::listener::{CollectionUpdates, EntityUpdates, ListenerHandle, ListenerRegistry};
use crate::merge::{decode, encode, merge_documents};
use crate::pagination::{paginate, ShiftCursor, ShiftPage};
use crate::query::{checklist_matches, shift_matches};
use crate::repository::{
    CheckListRepository, Repository, RoleRepository, ShiftRepository, UserRepository,
    WatchRepository, GET_ALL_LIMIT,
};
use crate::types::{StoreError, StoreResult};

/// Generic in-memory collection with listener fan-out. The entity-specific
/// repositories are this plus their extension-trait impls or a thin
/// wrapper where CRUD itself is special-cased.
pub struct MemoryRepository<E: Entity> {
    records: Mutex<HashMap<String, E>>,
    listeners: ListenerRegistry<E>,
    order_key: Option<fn(&E) -> DateTime<Utc>>,
}

impl<E: Entity> MemoryRepository<E> {
    pub fn new() -> Self {
        Self::with_order(None)
    }

    pub(crate) fn with_order(order_key: Option<fn(&E) -> DateTime<Utc>>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            listeners: ListenerRegistry::new(),
            order_key,
        }
    }

    /// Collection order: by the order key descending with id tie-break,
    /// or by id when the collection has no natural sort field. Matches
    /// the order the store-backed family asks of its backend.
    fn sorted(&self, mut items: Vec<E>) -> Vec<E> {
        match self.order_key {
            Some(key) => items.sort_by(|a, b| key(b).cmp(&key(a)).then_with(|| a.id().cmp(b.id()))),
            None => items.sort_by(|a, b| a.id().cmp(b.id())),
        }
        items
    }

    fn collection_view(&self, records: &HashMap<String, E>) -> Vec<E> {
        self.sorted(records.values().cloned().collect())
    }

    pub(crate) async fn snapshot_filtered(&self, keep: impl Fn(&E) -> bool) -> Vec<E> {
        let records = self.records.lock().await;
        self.sorted(records.values().filter(|e| keep(e)).cloned().collect())
    }

    /// Fan out a committed mutation. Called while the records lock is
    /// still held so listener payloads arrive in commit order.
    fn notify_mutation(&self, records: &HashMap<String, E>, id: &str, value: Option<E>) {
        self.listeners.notify_entity(id, Ok(value));
        if self.listeners.has_collection_listeners() {
            self.listeners
                .notify_collection(Ok(self.collection_view(records)));
        }
    }
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository<Shift> {
    pub fn shifts() -> Self {
        Self::with_order(Some(|shift: &Shift| shift.start_time))
    }
}

impl MemoryRepository<CheckList> {
    pub fn checklists() -> Self {
        Self::with_order(Some(|checklist: &CheckList| checklist.created_at))
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn get(&self, id: &str) -> StoreResult<E> {
        let records = self.records.lock().await;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{}/{id}", E::COLLECTION)))
    }

    async fn get_all(&self) -> StoreResult<Vec<E>> {
        let records = self.records.lock().await;
        let mut all = self.collection_view(&records);
        if all.len() > GET_ALL_LIMIT {
            tracing::debug!(
                collection = E::COLLECTION,
                total = all.len(),
                "get_all truncated to {GET_ALL_LIMIT} records"
            );
            all.truncate(GET_ALL_LIMIT);
        }
        Ok(all)
    }

    async fn create(&self, mut entity: E) -> StoreResult<E> {
        let mut records = self.records.lock().await;
        if entity.id().is_empty() {
            let mut id = generate_id();
            while records.contains_key(&id) {
                id = generate_id();
            }
            entity.set_id(id);
        } else if records.contains_key(entity.id()) {
            return Err(StoreError::AlreadyExists(format!(
                "{}/{}",
                E::COLLECTION,
                entity.id()
            )));
        }
        records.insert(entity.id().to_string(), entity.clone());
        self.notify_mutation(&records, entity.id(), Some(entity.clone()));
        Ok(entity)
    }

    async fn update(&self, entity: E) -> StoreResult<E> {
        if entity.id().is_empty() {
            return Err(StoreError::InvalidData(format!(
                "update on {} requires a non-empty id",
                E::COLLECTION
            )));
        }
        let mut records = self.records.lock().await;
        let stored = records
            .get(entity.id())
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", E::COLLECTION, entity.id())))?;
        let merged_doc = merge_documents(&encode(stored)?, &encode(&entity)?);
        let merged: E = decode(merged_doc)?;
        records.insert(merged.id().to_string(), merged.clone());
        self.notify_mutation(&records, merged.id(), Some(merged.clone()));
        Ok(merged)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut records = self.records.lock().await;
        if records.remove(id).is_none() {
            return Err(StoreError::NotFound(format!("{}/{id}", E::COLLECTION)));
        }
        self.notify_mutation(&records, id, None);
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> WatchRepository<E> for MemoryRepository<E> {
    async fn listen(&self, id: &str) -> (ListenerHandle, EntityUpdates<E>) {
        // Snapshot and register under the records lock so no mutation
        // can slip between the two.
        let records = self.records.lock().await;
        let snapshot = records.get(id).cloned();
        self.listeners.subscribe_entity(id, Ok(snapshot))
    }

    async fn listen_all(&self) -> (ListenerHandle, CollectionUpdates<E>) {
        let records = self.records.lock().await;
        let view = self.collection_view(&records);
        self.listeners.subscribe_collection(Ok(view))
    }

    async fn stop_listening(&self, handle: ListenerHandle) {
        self.listeners.unsubscribe(handle);
    }
}

#[async_trait]
impl ShiftRepository for MemoryRepository<Shift> {
    async fn query(&self, filter: &ShiftFilter) -> StoreResult<Vec<Shift>> {
        Ok(self.snapshot_filtered(|s| shift_matches(s, filter)).await)
    }

    async fn query_paginated(
        &self,
        filter: &ShiftFilter,
        page_size: usize,
        cursor: Option<ShiftCursor>,
    ) -> StoreResult<ShiftPage> {
        if page_size == 0 {
            return Err(StoreError::InvalidData(
                "page size must be positive".to_string(),
            ));
        }
        let matched = {
            let records = self.records.lock().await;
            records
                .values()
                .filter(|s| shift_matches(s, filter))
                .cloned()
                .collect()
        };
        Ok(paginate(matched, page_size, cursor.as_ref()))
    }

    async fn batch_update(
        &self,
        shift_id: &str,
        commands: Vec<ShiftCommand>,
    ) -> StoreResult<Shift> {
        let mut records = self.records.lock().await;
        let mut shift = records
            .get(shift_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("shifts/{shift_id}")))?;
        apply_commands(&mut shift, &commands, Utc::now())?;
        records.insert(shift.id.clone(), shift.clone());
        self.notify_mutation(&records, &shift.id, Some(shift.clone()));
        Ok(shift)
    }

    async fn batch_update_many(&self, entries: Vec<ShiftBatchEntry>) -> StoreResult<Vec<Shift>> {
        let mut records = self.records.lock().await;
        let now = Utc::now();

        // Compute every result before touching shared state; a failure
        // here leaves the store exactly as it was.
        let mut staged = Vec::with_capacity(entries.len());
        for entry in &entries {
            let mut shift = records
                .get(&entry.shift_id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("shifts/{}", entry.shift_id)))?;
            apply_commands(&mut shift, &entry.commands, now)?;
            staged.push(shift);
        }

        for shift in &staged {
            records.insert(shift.id.clone(), shift.clone());
        }
        for shift in &staged {
            self.listeners.notify_entity(&shift.id, Ok(Some(shift.clone())));
        }
        if self.listeners.has_collection_listeners() {
            self.listeners
                .notify_collection(Ok(self.collection_view(&records)));
        }
        Ok(staged)
    }
}

#[async_trait]
impl CheckListRepository for MemoryRepository<CheckList> {
    async fn query_on(
        &self,
        filter: &CheckListFilter,
        today: NaiveDate,
    ) -> StoreResult<Vec<CheckList>> {
        Ok(self
            .snapshot_filtered(|c| checklist_matches(c, filter, today))
            .await)
    }
}

/// Role repository with the standard catalog consulted before storage.
pub struct MemoryRoleRepository {
    inner: MemoryRepository<Role>,
}

impl MemoryRoleRepository {
    pub fn new() -> Self {
        Self {
            inner: MemoryRepository::new(),
        }
    }
}

impl Default for MemoryRoleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<Role> for MemoryRoleRepository {
    async fn get(&self, id: &str) -> StoreResult<Role> {
        if let Some(role) = standard_role(id) {
            return Ok(role);
        }
        self.inner.get(id).await
    }

    async fn get_all(&self) -> StoreResult<Vec<Role>> {
        self.inner.get_all().await
    }

    async fn create(&self, role: Role) -> StoreResult<Role> {
        if role.title.trim().is_empty() {
            return Err(StoreError::InvalidData(
                "role title must not be empty".to_string(),
            ));
        }
        if role.is_standard || is_standard_role_id(&role.id) {
            return Err(StoreError::OperationFailed(
                "standard roles are a fixed catalog and cannot be created".to_string(),
            ));
        }
        self.inner.create(role).await
    }

    async fn update(&self, role: Role) -> StoreResult<Role> {
        if is_standard_role_id(&role.id) {
            return Err(StoreError::OperationFailed(
                "standard roles cannot be edited".to_string(),
            ));
        }
        self.inner.update(role).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        if is_standard_role_id(id) {
            return Err(StoreError::OperationFailed(
                "standard roles cannot be deleted".to_string(),
            ));
        }
        self.inner.delete(id).await
    }
}

#[async_trait]
impl RoleRepository for MemoryRoleRepository {
    async fn roles_for_company(&self, company_id: &str) -> StoreResult<Vec<Role>> {
        let mut roles = standard_roles().to_vec();
        let mut persisted = self
            .inner
            .snapshot_filtered(|r| r.company_id == company_id)
            .await;
        roles.append(&mut persisted);
        Ok(roles)
    }
}

/// User repository; uids are issued by auth, never generated here.
pub struct MemoryUserRepository {
    inner: MemoryRepository<User>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self {
            inner: MemoryRepository::new(),
        }
    }
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<User> for MemoryUserRepository {
    async fn get(&self, id: &str) -> StoreResult<User> {
        self.inner.get(id).await
    }

    async fn get_all(&self) -> StoreResult<Vec<User>> {
        self.inner.get_all().await
    }

    async fn create(&self, user: User) -> StoreResult<User> {
        if user.uid.is_empty() {
            return Err(StoreError::InvalidData(
                "user uid must be issued by auth".to_string(),
            ));
        }
        self.inner.create(user).await
    }

    async fn update(&self, user: User) -> StoreResult<User> {
        self.inner.update(user).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.inner.delete(id).await
    }
}

impl UserRepository for MemoryUserRepository {}
