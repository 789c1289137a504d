pub mod field;
pub mod results;
