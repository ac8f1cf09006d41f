//! Entity schema mapping.
//!
//! # Responsibility
//! - Describe how an entity type maps onto table columns.
//! - Derive the attribute column list used by repository SQL assembly.
//!
//! # Invariants
//! - The identifier column is always `id` and never part of the attribute list.
//! - Attribute order follows declaration order in `Entity::fields()`.
//! - `created_at`/`updated_at` values are supplied by the repository, not by
//!   `Entity::values()`.

use crate::naming::to_snake_case;
use rusqlite::types::Value;
use uuid::Uuid;

/// Stable identifier assigned to every persisted entity.
pub type EntityId = Uuid;

/// Identifier column name shared by every mapped table.
pub const ID_COLUMN: &str = "id";
/// Managed creation timestamp column.
pub const CREATED_AT_COLUMN: &str = "created_at";
/// Managed modification timestamp column.
pub const UPDATED_AT_COLUMN: &str = "updated_at";

/// How a declared field is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Scalar value (integer, float, bool) stored in a same-named column.
    Primitive,
    /// Another entity of the same domain model, stored as `<field>_id`.
    Reference,
    /// Any other value (text, timestamps, enums) stored in a same-named column.
    Value,
}

/// Declared entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Declared name, in any case convention (`authorName`, `author_name`).
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn primitive(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Primitive,
        }
    }

    pub const fn reference(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Reference,
        }
    }

    pub const fn value(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Value,
        }
    }

    /// Returns the column this field is stored in, or `None` for the id field.
    pub fn column_name(&self) -> Option<String> {
        let snake = to_snake_case(self.name);
        if snake == ID_COLUMN {
            return None;
        }

        match self.kind {
            FieldKind::Reference => Some(format!("{snake}_id")),
            FieldKind::Primitive | FieldKind::Value => Some(snake),
        }
    }
}

/// Explicit schema mapping for a persisted record.
///
/// Implementors declare their fields once; repositories derive column lists
/// from that declaration.
pub trait Entity {
    /// Returns the identifier, or `None` when the entity was never persisted.
    fn id(&self) -> Option<EntityId>;

    /// Declared fields in column order. May include the `id` field.
    fn fields() -> &'static [FieldDef];

    /// Bind values for every attribute column except managed timestamps,
    /// in attribute order.
    fn values(&self) -> Vec<Value>;
}

/// Derives the attribute column list for `T`, excluding `id`.
pub fn table_attributes<T: Entity>() -> Vec<String> {
    T::fields()
        .iter()
        .filter_map(FieldDef::column_name)
        .collect()
}

/// Returns whether `attributes` contains `column`.
pub fn has_attribute(attributes: &[String], column: &str) -> bool {
    attributes.iter().any(|attribute| attribute == column)
}

/// Returns whether `column` is filled in by the repository.
pub fn is_managed_timestamp(column: &str) -> bool {
    column == CREATED_AT_COLUMN || column == UPDATED_AT_COLUMN
}
