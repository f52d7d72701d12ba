//! Platform control API integration.

pub mod client;
pub mod dto;

pub use client::PlatformClient;
