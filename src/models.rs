pub mod activation;
pub mod catalog;
pub mod error;
pub mod game;
pub mod mod_backup;
pub mod mod_dto;
pub mod paths;
