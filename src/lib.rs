pub mod config;
pub mod core;
pub mod domain;
pub mod testing;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{Endpoints, Settings};

pub use crate::core::{
    actions::{modify, modify_batch},
    client::PocketClient,
    transport::HttpTransport,
};
pub use domain::ports::{PocketApi, Transport};
pub use utils::error::{ErrorKind, PocketError, Result};
