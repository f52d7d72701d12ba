//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - The `rigger` command line
//! - [`outbound`] - Control API client and manifest repositories

pub mod inbound;
pub mod outbound;
