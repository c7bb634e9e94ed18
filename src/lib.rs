// Public API for integration tests and potential library usage

pub mod api;
pub mod broadcast;
pub mod config;
pub mod deck;
pub mod dictionary;
pub mod error;
pub mod kana;
pub mod protocol;
pub mod registry;
pub mod room;
pub mod session;
pub mod state;
pub mod types;
pub mod ws;
