pub mod memory;
pub mod traits;

pub use memory::MemoryCatalog;
pub use traits::{
    CatalogError, CatalogResult, CatalogStore, OrderHint, ScanFilter, ScanPage, ScanRequest,
};
