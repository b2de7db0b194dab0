//! # External Integrations
//!
//! Boundary clients for optional third-party services. Both are
//! disabled unless configured; their internal logic is out of scope
//! here, only the configuration seam is kept.

pub mod notebook;
pub mod privacy;

pub use notebook::NotebookClient;
pub use privacy::PrivacyVault;
