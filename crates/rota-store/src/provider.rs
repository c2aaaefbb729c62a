// Repository wiring.

use std::sync::Arc;

use crate::document::DocumentStore;
use crate::memory::{MemoryRepository, MemoryRoleRepository, MemoryUserRepository};
use crate::remote::{RemoteRepository, RemoteRoleRepository, RemoteUserRepository};
use crate::repository::{CheckListRepository, RoleRepository, ShiftRepository, UserRepository};

#[derive(Clone)]
enum Backend {
    Memory,
    Document(Arc<dyn DocumentStore>),
}

/// Wires the in-memory family or the store-backed family behind the same
/// repository traits. The provider instance is the unit of process-wide
/// state; there are no hidden statics.
pub struct RepositoryProvider {
    backend: Backend,
    shifts: Arc<dyn ShiftRepository>,
    checklists: Arc<dyn CheckListRepository>,
    roles: Arc<dyn RoleRepository>,
    users: Arc<dyn UserRepository>,
}

impl RepositoryProvider {
    /// The in-memory test double family.
    pub fn in_memory() -> Self {
        Self::build(Backend::Memory)
    }

    /// The store-backed family over the given document store.
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self::build(Backend::Document(store))
    }

    fn build(backend: Backend) -> Self {
        let shifts: Arc<dyn ShiftRepository>;
        let checklists: Arc<dyn CheckListRepository>;
        let roles: Arc<dyn RoleRepository>;
        let users: Arc<dyn UserRepository>;
        match &backend {
            Backend::Memory => {
                shifts = Arc::new(MemoryRepository::shifts());
                checklists = Arc::new(MemoryRepository::checklists());
                roles = Arc::new(MemoryRoleRepository::new());
                users = Arc::new(MemoryUserRepository::new());
            }
            Backend::Document(store) => {
                shifts = Arc::new(RemoteRepository::shifts(Arc::clone(store)));
                checklists = Arc::new(RemoteRepository::checklists(Arc::clone(store)));
                roles = Arc::new(RemoteRoleRepository::new(Arc::clone(store)));
                users = Arc::new(RemoteUserRepository::new(Arc::clone(store)));
            }
        }
        Self {
            backend,
            shifts,
            checklists,
            roles,
            users,
        }
    }

    pub fn shifts(&self) -> Arc<dyn ShiftRepository> {
        Arc::clone(&self.shifts)
    }

    pub fn checklists(&self) -> Arc<dyn CheckListRepository> {
        Arc::clone(&self.checklists)
    }

    pub fn roles(&self) -> Arc<dyn RoleRepository> {
        Arc::clone(&self.roles)
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        Arc::clone(&self.users)
    }

    /// Reinstall fresh repositories for test isolation. In-memory data
    /// and every listener registration are dropped; an external document
    /// store keeps its contents (the caller owns that lifecycle).
    pub fn reset(&mut self) {
        *self = Self::build(self.backend.clone());
    }
}
