// ABOUTME: PostgreSQL client tool plumbing
// ABOUTME: Exports readiness probing and connection flag helpers

pub mod connection;
pub mod readiness;

pub use connection::client_command;
pub use readiness::{check_ready, wait_for_ready, wait_until, Readiness};
