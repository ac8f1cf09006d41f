//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the entity data access contract.
//! - Isolate SQL assembly from service/business orchestration.
//!
//! # Invariants
//! - Identifiers are assigned by the repository on first insert.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `IncorrectResultSize`) in addition to DB transport errors.

pub mod generic_repo;
