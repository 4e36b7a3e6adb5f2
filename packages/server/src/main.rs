#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone server binary.
//!
//! Settings come from the environment, optionally layered over the TOML
//! file named by `ER_CONFIG`.

use std::path::PathBuf;

use er_congestion_source::settings::SourceSettings;

/// Environment variable naming an optional TOML settings file.
const ENV_CONFIG: &str = "ER_CONFIG";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    er_congestion_server::init_logger();

    let config_path = std::env::var(ENV_CONFIG).ok().map(PathBuf::from);
    let settings = SourceSettings::load(config_path.as_deref()).map_err(|e| {
        log::error!("Invalid configuration: {e}");
        std::io::Error::other(e)
    })?;

    er_congestion_server::run_server(&settings).await
}
