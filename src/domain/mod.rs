pub mod export;
pub mod fallback;
pub mod models;
pub mod summary;
pub mod trends;
