//! Entity use-case service.
//!
//! # Responsibility
//! - Provide create/save/get/list/remove entry points for core callers.
//! - Delegate persistence to any `Repository<T>` implementation.
//!
//! # Invariants
//! - Service APIs never bypass repository persistence contracts.
//! - `create` only accepts entities that were never persisted.

use crate::model::entity::{Entity, EntityId};
use crate::repo::generic_repo::{RepoError, RepoResult, Repository};
use rusqlite::types::ToSql;
use std::marker::PhantomData;

/// Use-case service wrapper for entity CRUD operations.
pub struct EntityService<T, R: Repository<T>> {
    repo: R,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, R: Repository<T>> EntityService<T, R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            _entity: PhantomData,
        }
    }

    /// Persists a new entity and returns it with its assigned id.
    ///
    /// # Errors
    /// - `IdAlreadyAssigned` when `entity` already carries an id.
    pub fn create(&self, entity: &T) -> RepoResult<T> {
        if let Some(id) = entity.id() {
            return Err(RepoError::IdAlreadyAssigned(id));
        }
        self.repo.save(entity)
    }

    /// Upsert-by-null-id passthrough.
    pub fn save(&self, entity: &T) -> RepoResult<T> {
        self.repo.save(entity)
    }

    pub fn get(&self, id: EntityId) -> RepoResult<Option<T>> {
        self.repo.find_by_id(id)
    }

    pub fn get_by(&self, column: &str, value: &dyn ToSql) -> RepoResult<Option<T>> {
        self.repo.find_by(column, value)
    }

    pub fn list(&self) -> RepoResult<Vec<T>> {
        self.repo.find_all()
    }

    /// Deletes by id and reports whether a row was removed.
    pub fn remove(&self, id: EntityId) -> RepoResult<bool> {
        Ok(self.repo.delete(id)? > 0)
    }

    /// Returns the wrapped repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }
}
