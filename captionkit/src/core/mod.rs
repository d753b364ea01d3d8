//! Captionkit Core Engine
//!
//! Caption timing, compilation and settings.

pub mod captions;
pub mod settings;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;

#[cfg(test)]
mod tests_destructive;
