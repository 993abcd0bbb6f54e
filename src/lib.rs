// Platform table: key -> download URL + archive type
pub mod platform;
// Resource directory layout
pub mod paths;
// HTTP download with redirect following
pub mod downloads;
// Provisioning pipeline + extractors
pub mod setup;
mod error;

pub use error::{Result, SetupError};
pub use setup::{provision, SetupConfig, SetupOutcome};
