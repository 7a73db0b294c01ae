//! Common re-exports for convenient entity usage.

pub use super::collection::Collection;
pub use super::document::{
    ActiveModel as DocumentActiveModel, Column as DocumentColumn, Entity as Document,
    Model as DocumentModel,
};
pub use super::document_index::{
    ActiveModel as DocumentIndexActiveModel, Column as DocumentIndexColumn,
    Entity as DocumentIndex, IndexField, Model as DocumentIndexModel,
};
