pub mod embedding_store;
pub mod matcher;
pub mod study_catalog;
pub mod study_manager;
