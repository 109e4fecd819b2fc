//! The `utils` module holds the pieces every other module leans on: the
//! `HubError` taxonomy and the `tracing` subscriber setup.

pub mod error;
pub mod logging;

pub use error::{HubError, Result};

#[cfg(test)]
mod tests;
