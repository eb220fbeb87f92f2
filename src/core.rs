pub mod cleanup;
pub mod deployment;
pub mod engine;
pub mod ingest;
pub mod mod_manager;
pub mod package;
pub mod resolver;
pub mod store;
