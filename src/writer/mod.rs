pub mod batch;
pub mod importer;
