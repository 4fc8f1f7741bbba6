pub mod catalog;
pub mod writer;

pub use catalog::{load_catalog, WasteCatalog};
pub use writer::append_entry;
