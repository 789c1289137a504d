pub mod layout;
pub mod file_lock;
pub mod document_store;
pub mod log_store;
pub mod segment;
pub mod checkpoint;
