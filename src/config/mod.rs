#[cfg(feature = "cli")]
pub mod cli;
pub mod endpoints;
pub mod settings;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use endpoints::Endpoints;
pub use settings::{HttpSettings, Settings};
