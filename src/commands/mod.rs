// ABOUTME: Command implementations for the CLI
// ABOUTME: Exports the full transfer and the readiness-only wait command

pub mod transfer;
pub mod wait;

pub use transfer::{transfer, Stage};
pub use wait::wait;
