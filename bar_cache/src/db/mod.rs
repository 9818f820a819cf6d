//! SQLite plumbing: connections and migrations.

pub mod connection;
pub mod migrate;
