//! Create, load and edit Power BI projects stored in the PBIR format, a
//! directory of JSON documents describing a report and its data model.

pub mod error;
pub mod handler;
pub mod metadata;
pub mod schema;
pub mod store;

pub use error::PbirError;
pub use handler::MetadataHandler;
pub use metadata::{Metadata, MetadataInfo};
pub use schema::{Column, Relationship, Table};
pub use store::StoreLayout;
