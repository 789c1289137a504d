pub mod field;
pub mod decoder;
pub mod collection;
pub mod stream;
