//! Entity mapping model.
//!
//! # Responsibility
//! - Define the explicit schema-mapping contract implemented by entities.
//! - Provide value conversions shared by entity mappers and repositories.
//!
//! # Invariants
//! - Every persisted entity is identified by an `EntityId` in column `id`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod entity;
pub mod value;
