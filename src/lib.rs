// ABOUTME: Library module for postgres-etl-transfer
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod config;
pub mod error;
pub mod migration;
pub mod postgres;
pub mod utils;

#[cfg(all(test, unix))]
pub(crate) mod test_support;
