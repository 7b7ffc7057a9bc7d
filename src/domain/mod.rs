//! Core domain types
//!
//! Pure types with no I/O dependencies: the settings record, the serial
//! line parameters it is made of, and the key-value codec used to persist it.

pub mod error;
pub mod settings;
pub mod types;

pub use error::*;
pub use settings::*;
pub use types::*;
