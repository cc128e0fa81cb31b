//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, one use
//! case per file.

pub mod billing;
pub mod invitation;
pub mod project;
pub mod wallet;
