//! SeaORM entity definitions for the pitchside document store.

pub mod collection;
pub mod document;
pub mod document_index;
pub mod prelude;
