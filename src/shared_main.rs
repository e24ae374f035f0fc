use std::env;

use log::LevelFilter;

/// Info for everything, debug for this crate and `bin_module` with `RUST_LOG=debug`.
pub fn logger_init(bin_module: &str) {
    let level = if env::var(pretty_env_logger::env_logger::DEFAULT_FILTER_ENV).unwrap_or_default() == "debug" {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    pretty_env_logger::formatted_timed_builder()
        .filter_level(LevelFilter::Info)
        .filter_module("mealrate_rs", level)
        .filter_module(bin_module, level)
        .init();

    if !log::log_enabled!(log::Level::Debug) {
        log::info!("Set env variable 'RUST_LOG=debug' or pass -v for timings");
    }
}
