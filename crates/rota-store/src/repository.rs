// The repository contract.
//
// `Repository<E>` is the generic CRUD surface; per-entity extension
// traits add queries, pagination, subscriptions, and batch updates. Both
// backend families implement the same traits, and the contract tests run
// against both.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use rota_types::{
    CheckList, CheckListFilter, Entity, Role, Shift, ShiftBatchEntry, ShiftCommand, ShiftFilter,
    User,
};

use crate::listener::{CollectionUpdates, EntityUpdates, ListenerHandle};
use crate::pagination::{ShiftCursor, ShiftPage};
use crate::types::StoreResult;

/// Hard cap on `get_all`. Callers needing more must paginate; the
/// truncation is silent by contract.
pub const GET_ALL_LIMIT: usize = 100;

#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Fetch one record; `NotFound` when absent.
    async fn get(&self, id: &str) -> StoreResult<E>;

    /// Fetch up to [`GET_ALL_LIMIT`] records in the collection's order.
    async fn get_all(&self) -> StoreResult<Vec<E>>;

    /// Persist a new record. An empty id is replaced with a generated
    /// one; a colliding id is `AlreadyExists`. Returns the stored record.
    async fn create(&self, entity: E) -> StoreResult<E>;

    /// Merge-write an existing record: fields present on `entity`
    /// overwrite, absent optional fields keep their stored value. Empty
    /// id is `InvalidData`, unknown id is `NotFound`.
    async fn update(&self, entity: E) -> StoreResult<E>;

    /// Remove a record; `NotFound` when absent.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Live-update subscriptions over one collection.
#[async_trait]
pub trait WatchRepository<E: Entity>: Repository<E> {
    /// Watch one record. The current state (or the failure to read it)
    /// is queued before any subsequent update.
    async fn listen(&self, id: &str) -> (ListenerHandle, EntityUpdates<E>);

    /// Watch the whole collection; every committed mutation re-delivers
    /// the full refreshed view.
    async fn listen_all(&self) -> (ListenerHandle, CollectionUpdates<E>);

    /// Idempotent; after return no further payloads are queued for the
    /// handle (in-flight deliveries still drain).
    async fn stop_listening(&self, handle: ListenerHandle);
}

#[async_trait]
pub trait ShiftRepository: WatchRepository<Shift> {
    async fn query(&self, filter: &ShiftFilter) -> StoreResult<Vec<Shift>>;

    /// Cursor-paged query, newest first. Pass the previous page's cursor
    /// to resume; a `None` cursor in the result means no further pages.
    async fn query_paginated(
        &self,
        filter: &ShiftFilter,
        page_size: usize,
        cursor: Option<ShiftCursor>,
    ) -> StoreResult<ShiftPage>;

    /// Apply the commands in order to one shift and persist the result
    /// with a single write. Listeners are notified after the commit.
    async fn batch_update(
        &self,
        shift_id: &str,
        commands: Vec<ShiftCommand>,
    ) -> StoreResult<Shift>;

    /// Apply each entry's commands and commit every staged write
    /// atomically: if any shift fails to load or any command is
    /// malformed, nothing is written.
    async fn batch_update_many(&self, entries: Vec<ShiftBatchEntry>) -> StoreResult<Vec<Shift>>;
}

#[async_trait]
pub trait CheckListRepository: WatchRepository<CheckList> {
    /// Filtered query evaluated against today's date.
    async fn query(&self, filter: &CheckListFilter) -> StoreResult<Vec<CheckList>> {
        self.query_on(filter, Utc::now().date_naive()).await
    }

    /// Filtered query with the evaluation date pinned; `query` is this
    /// with today's date.
    async fn query_on(
        &self,
        filter: &CheckListFilter,
        today: NaiveDate,
    ) -> StoreResult<Vec<CheckList>>;
}

#[async_trait]
pub trait RoleRepository: Repository<Role> {
    /// The standard catalog followed by the company's persisted roles.
    async fn roles_for_company(&self, company_id: &str) -> StoreResult<Vec<Role>>;
}

pub trait UserRepository: Repository<User> {}
