pub mod config;
pub mod editorial;
pub mod error;
pub mod markup;
pub mod open_data;
pub mod pipeline;
pub mod render;
pub mod table;
pub mod tariff;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// Logs go to stderr so stdout only carries the command's own output.
/// Note: This function can only be called once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
