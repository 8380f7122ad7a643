// ABOUTME: Export and import steps of a transfer
// ABOUTME: Wraps pg_dump and psql around a single transfer file

pub mod dump;
pub mod restore;

pub use dump::dump_database;
pub use restore::restore_database;
