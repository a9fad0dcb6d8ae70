pub mod config;
pub mod error;
pub mod modules;
pub mod services;

pub use config::settings::{SeedConfig, SeedMode};
pub use error::{FailureKind, SeedError};
pub use services::seeder::{SeedReport, SeedStage, SeedStep, Seeder};
