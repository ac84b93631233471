//! Table names and layouts.

use convert_case::{Case, Casing};

use crate::storage::{ColumnDef, ColumnKind, TableSchema};

/// Shared object table used in single-table mode.
pub const OBJECTS: &str = "objects";

/// Shared association (edge) table.
pub const ASSOCIATIONS: &str = "associations";

/// `index__{snake_case(type)}__{field}`
pub fn index_table(type_name: &str, field: &str) -> String {
    format!("index__{}__{}", type_name.to_case(Case::Snake), field)
}

/// Relationship tag stored in `associations.assoc_type_name`.
pub fn edge_tag(type_name: &str, edge: &str) -> String {
    format!("{}__{}", type_name.to_case(Case::Snake), edge)
}

pub fn object_table_schema(name: &str) -> TableSchema {
    TableSchema::new(name)
        .column(ColumnDef::new("id", ColumnKind::String).primary_key())
        .column(ColumnDef::new("type_name", ColumnKind::String))
        .column(ColumnDef::new("visibility", ColumnKind::Integer))
        .column(ColumnDef::new("creator_id", ColumnKind::String))
        .column(ColumnDef::new("data", ColumnKind::Text))
        .column(ColumnDef::new("created_at", ColumnKind::Timestamp))
        .column(ColumnDef::new("updated_at", ColumnKind::Timestamp))
}

pub fn associations_schema() -> TableSchema {
    TableSchema::new(ASSOCIATIONS)
        .column(ColumnDef::new("id1", ColumnKind::String).indexed())
        .column(ColumnDef::new("id2", ColumnKind::String).indexed())
        .column(ColumnDef::new("assoc_type_name", ColumnKind::String))
        .column(ColumnDef::new("id2_type", ColumnKind::String))
        .column(ColumnDef::new("creator_id", ColumnKind::String))
        .column(ColumnDef::new("created_at", ColumnKind::Timestamp))
        .column(ColumnDef::new("updated_at", ColumnKind::Timestamp))
}

pub fn index_table_schema(name: &str) -> TableSchema {
    TableSchema::new(name)
        .column(ColumnDef::new("key", ColumnKind::Text).indexed())
        .column(ColumnDef::new("id", ColumnKind::String))
}
