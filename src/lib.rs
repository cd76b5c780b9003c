pub mod config;
pub mod flashcards;
pub mod logging;
pub mod server;
