// Store-backed repositories.
//
// These hold no entity state of their own: every read and write goes
// through the document-store boundary. A per-instance write lock
// serializes read-modify-write cycles, and listeners are notified
// strictly after the backing write commits.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use rota_types::{
    generate_id, is_standard_role_id, standard_role, standard_roles, CheckList, CheckListFilter,
    Entity, Role, Shift, ShiftBatchEntry, ShiftCommand, ShiftFilter, User,
};

use crate::batch::apply_commands;
use crate::document::{DocumentStore, StoreQuery, WriteOp};
use crate::listener::{CollectionUpdates, EntityUpdates, ListenerHandle, ListenerRegistry};
use crate::merge::{decode, encode, merge_documents};
use crate::pagination::{ShiftCursor, ShiftPage};
use crate::query::{checklist_matches, checklist_store_query, shift_store_query};
use crate::repository::{
    CheckListRepository, Repository, RoleRepository, ShiftRepository, UserRepository,
    WatchRepository, GET_ALL_LIMIT,
};
use crate::types::{StoreError, StoreResult};

const SHIFT_ORDER_FIELD: &str = "startTime";
const CHECKLIST_ORDER_FIELD: &str = "createdAt";

pub struct RemoteRepository<E: Entity> {
    store: Arc<dyn DocumentStore>,
    listeners: ListenerRegistry<E>,
    write_lock: tokio::sync::Mutex<()>,
    order_field: Option<&'static str>,
}

impl<E: Entity> RemoteRepository<E> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_order(store, None)
    }

    pub(crate) fn with_order(
        store: Arc<dyn DocumentStore>,
        order_field: Option<&'static str>,
    ) -> Self {
        Self {
            store,
            listeners: ListenerRegistry::new(),
            write_lock: tokio::sync::Mutex::new(()),
            order_field,
        }
    }

    fn base_query(&self) -> StoreQuery {
        match self.order_field {
            Some(field) => StoreQuery::default().order_desc(field),
            None => StoreQuery::default(),
        }
    }

    async fn read(&self, id: &str) -> StoreResult<Option<E>> {
        match self.store.get(E::COLLECTION, id).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    async fn fetch(&self, query: StoreQuery) -> StoreResult<Vec<E>> {
        let docs = self.store.query(E::COLLECTION, query).await?;
        docs.into_iter().map(decode).collect()
    }

    /// Fan out a committed write. Collection watchers get a re-read of
    /// the full collection, failures included, through their channel.
    async fn notify_mutation(&self, id: &str, value: Option<E>) {
        self.listeners.notify_entity(id, Ok(value));
        if self.listeners.has_collection_listeners() {
            let view = self.fetch(self.base_query()).await;
            if view.is_err() {
                tracing::warn!(
                    collection = E::COLLECTION,
                    "collection re-read after write failed; delivering error to listeners"
                );
            }
            self.listeners.notify_collection(view);
        }
    }
}

impl RemoteRepository<Shift> {
    pub fn shifts(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_order(store, Some(SHIFT_ORDER_FIELD))
    }
}

impl RemoteRepository<CheckList> {
    pub fn checklists(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_order(store, Some(CHECKLIST_ORDER_FIELD))
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for RemoteRepository<E> {
    async fn get(&self, id: &str) -> StoreResult<E> {
        self.read(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{}/{id}", E::COLLECTION)))
    }

    async fn get_all(&self) -> StoreResult<Vec<E>> {
        self.fetch(self.base_query().limit(GET_ALL_LIMIT)).await
    }

    async fn create(&self, mut entity: E) -> StoreResult<E> {
        let _guard = self.write_lock.lock().await;
        if entity.id().is_empty() {
            let mut id = generate_id();
            while self.store.get(E::COLLECTION, &id).await?.is_some() {
                id = generate_id();
            }
            entity.set_id(id);
        } else if self.store.get(E::COLLECTION, entity.id()).await?.is_some() {
            return Err(StoreError::AlreadyExists(format!(
                "{}/{}",
                E::COLLECTION,
                entity.id()
            )));
        }
        self.store
            .set(E::COLLECTION, entity.id(), encode(&entity)?)
            .await?;
        self.notify_mutation(entity.id(), Some(entity.clone())).await;
        Ok(entity)
    }

    async fn update(&self, entity: E) -> StoreResult<E> {
        if entity.id().is_empty() {
            return Err(StoreError::InvalidData(format!(
                "update on {} requires a non-empty id",
                E::COLLECTION
            )));
        }
        let _guard = self.write_lock.lock().await;
        let stored = self
            .store
            .get(E::COLLECTION, entity.id())
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", E::COLLECTION, entity.id())))?;
        let merged_doc = merge_documents(&stored, &encode(&entity)?);
        let merged: E = decode(merged_doc.clone())?;
        self.store.set(E::COLLECTION, merged.id(), merged_doc).await?;
        self.notify_mutation(merged.id(), Some(merged.clone())).await;
        Ok(merged)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        if self.store.get(E::COLLECTION, id).await?.is_none() {
            return Err(StoreError::NotFound(format!("{}/{id}", E::COLLECTION)));
        }
        self.store.delete(E::COLLECTION, id).await?;
        self.notify_mutation(id, None).await;
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> WatchRepository<E> for RemoteRepository<E> {
    async fn listen(&self, id: &str) -> (ListenerHandle, EntityUpdates<E>) {
        // The write lock keeps mutations out between snapshot and
        // registration, so the subscriber cannot miss an update.
        let _guard = self.write_lock.lock().await;
        let snapshot = self.read(id).await;
        self.listeners.subscribe_entity(id, snapshot)
    }

    async fn listen_all(&self) -> (ListenerHandle, CollectionUpdates<E>) {
        let _guard = self.write_lock.lock().await;
        let view = self.fetch(self.base_query()).await;
        self.listeners.subscribe_collection(view)
    }

    async fn stop_listening(&self, handle: ListenerHandle) {
        self.listeners.unsubscribe(handle);
    }
}

#[async_trait]
impl ShiftRepository for RemoteRepository<Shift> {
    async fn query(&self, filter: &ShiftFilter) -> StoreResult<Vec<Shift>> {
        let query = shift_store_query(filter)?.order_desc(SHIFT_ORDER_FIELD);
        self.fetch(query).await
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
        let mut query = shift_store_query(filter)?
            .order_desc(SHIFT_ORDER_FIELD)
            .limit(page_size);
        if let Some(cursor) = &cursor {
            let sort_value = serde_json::to_value(cursor.start_time())
                .map_err(|err| StoreError::Encoding(err.to_string()))?;
            query = query.start_after(sort_value, cursor.id());
        }
        let items = self.fetch(query).await?;
        let next_cursor = if items.len() == page_size {
            items.last().map(ShiftCursor::after)
        } else {
            None
        };
        Ok(ShiftPage { items, next_cursor })
    }

    async fn batch_update(
        &self,
        shift_id: &str,
        commands: Vec<ShiftCommand>,
    ) -> StoreResult<Shift> {
        let _guard = self.write_lock.lock().await;
        let mut shift = self
            .read(shift_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("shifts/{shift_id}")))?;
        apply_commands(&mut shift, &commands, Utc::now())?;
        self.store
            .set(Shift::COLLECTION, &shift.id, encode(&shift)?)
            .await?;
        self.notify_mutation(&shift.id, Some(shift.clone())).await;
        Ok(shift)
    }

    async fn batch_update_many(&self, entries: Vec<ShiftBatchEntry>) -> StoreResult<Vec<Shift>> {
        let _guard = self.write_lock.lock().await;
        let now = Utc::now();

        // Load and compute everything before staging a single write; any
        // failure aborts with the store untouched.
        let mut staged = Vec::with_capacity(entries.len());
        for entry in &entries {
            let mut shift = self
                .read(&entry.shift_id)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("shifts/{}", entry.shift_id)))?;
            apply_commands(&mut shift, &entry.commands, now)?;
            staged.push(shift);
        }

        let mut ops = Vec::with_capacity(staged.len());
        for shift in &staged {
            ops.push(WriteOp::Set {
                collection: Shift::COLLECTION.to_string(),
                id: shift.id.clone(),
                document: encode(shift)?,
            });
        }
        self.store.commit(ops).await?;

        for shift in &staged {
            self.listeners.notify_entity(&shift.id, Ok(Some(shift.clone())));
        }
        if self.listeners.has_collection_listeners() {
            let view = self.fetch(self.base_query()).await;
            self.listeners.notify_collection(view);
        }
        Ok(staged)
    }
}

#[async_trait]
impl CheckListRepository for RemoteRepository<CheckList> {
    async fn query_on(
        &self,
        filter: &CheckListFilter,
        today: NaiveDate,
    ) -> StoreResult<Vec<CheckList>> {
        let query = checklist_store_query(filter)?.order_desc(CHECKLIST_ORDER_FIELD);
        let mut rows = self.fetch(query).await?;
        // The frequency rule has no store-side form; the shared predicate
        // finishes the job so both backends agree.
        rows.retain(|checklist| checklist_matches(checklist, filter, today));
        Ok(rows)
    }
}

/// Role repository with the standard catalog consulted before storage.
pub struct RemoteRoleRepository {
    inner: RemoteRepository<Role>,
}

impl RemoteRoleRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: RemoteRepository::new(store),
        }
    }
}

#[async_trait]
impl Repository<Role> for RemoteRoleRepository {
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
impl RoleRepository for RemoteRoleRepository {
    async fn roles_for_company(&self, company_id: &str) -> StoreResult<Vec<Role>> {
        let company_value = serde_json::to_value(company_id)
            .map_err(|err| StoreError::Encoding(err.to_string()))?;
        let mut roles = standard_roles().to_vec();
        let mut persisted = self
            .inner
            .fetch(StoreQuery::default().eq("companyId", company_value))
            .await?;
        roles.append(&mut persisted);
        Ok(roles)
    }
}

/// User repository; uids are issued by auth, never generated here.
pub struct RemoteUserRepository {
    inner: RemoteRepository<User>,
}

impl RemoteUserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: RemoteRepository::new(store),
        }
    }
}

#[async_trait]
impl Repository<User> for RemoteUserRepository {
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

impl UserRepository for RemoteUserRepository {}
