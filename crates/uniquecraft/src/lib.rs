//! # UniqueCraft
//!
//! Operator surface for the craft-once registry in [`uniquecraft_core`]:
//! the in-game `/uniquecraft` command handler and the offline
//! `uniquecraft_admin` tool.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod admin;
pub mod cli;

pub use admin::{AdminCommand, AdminCommands, AdminError};
pub use uniquecraft_core;
