//! Declarative attribute schemas and the per-operation data view.

mod data;
mod field;
mod id;
mod output;
mod value;

pub use data::ResourceData;
pub use field::{Elem, FieldSchema, FieldType, Schema, Validation};
pub use id::{ID_SEPARATOR, build_composite_id, data_resource_id_hash, split_composite_id};
pub use output::write_result_output;
pub use value::{AttrMap, AttrValue, block_string, first_block};
