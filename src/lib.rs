// Codekt - Knowledge-Transfer Dashboard API
// Library exports

// Core modules
pub mod chat;
pub mod config;
pub mod openai;
pub mod schema;
pub mod server;
pub mod store;
