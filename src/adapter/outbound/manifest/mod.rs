//! Manifest repositories.

pub mod directory;
pub mod http;

pub use directory::DirectoryManifestRepository;
pub use http::HttpManifestRepository;
