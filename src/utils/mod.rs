//! Small helper functions for working with A2A protocol types — content
//! extraction from [`crate::types::Part`]/[`crate::types::Artifact`], not
//! a second API surface. Task construction lives on the task store (C6),
//! not here, since the store alone owns task identity.

pub mod artifact;
pub mod constants;
pub mod message;
pub mod parts;

pub use artifact::*;
pub use constants::*;
pub use message::*;
pub use parts::*;
