//! Common test utilities and helpers
//!
//! - **`assertions`** - assertion macros
//! - **`fixtures`** - configuration, state, tokens and a live server

pub mod assertions;
pub mod fixtures;

pub use fixtures::*;
