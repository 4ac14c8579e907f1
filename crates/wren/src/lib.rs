pub mod agent;
pub mod chat;
pub mod errors;
pub mod models;
pub mod options;
pub mod providers;
pub mod tools;
pub mod transcript;
