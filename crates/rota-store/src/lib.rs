mod batch;
pub mod document;
pub mod listener;
mod merge;
pub mod memory;
pub mod pagination;
pub mod provider;
mod query;
pub mod remote;
pub mod repository;
pub mod types;

pub use document::{Condition, DocumentStore, MemoryDocumentStore, StoreQuery, WriteOp};
pub use listener::{CollectionUpdates, EntityUpdates, ListenerHandle};
pub use memory::{MemoryRepository, MemoryRoleRepository, MemoryUserRepository};
pub use pagination::{ShiftCursor, ShiftPage};
pub use provider::RepositoryProvider;
pub use remote::{RemoteRepository, RemoteRoleRepository, RemoteUserRepository};
pub use repository::{
    CheckListRepository, Repository, RoleRepository, ShiftRepository, UserRepository,
    WatchRepository, GET_ALL_LIMIT,
};
pub use types::{StoreError, StoreResult};
