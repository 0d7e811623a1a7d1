//! SQLite key-value store. One worker thread owns the connection and serves
//! typed get/set/remove requests.

mod connection;
mod kv_store;
mod schema;

pub use connection::Database;
