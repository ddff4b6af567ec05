//! Device configuration
//!
//! Factory settings live in the `Default` impls. With the `config` feature
//! they can be overridden from TOML text; keys that are left out keep their
//! factory value.

#[cfg(feature = "config")]
pub mod parse;
pub mod types;

#[cfg(feature = "config")]
pub use parse::parse_config;
pub use types::*;
