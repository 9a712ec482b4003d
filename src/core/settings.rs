// SPDX-License-Identifier: GPL-3.0-only

use cosmic::{
    app::Settings,
    iced::{Limits, Size},
};

pub fn init() -> Settings {
    init_logging();
    get_app_settings()
}

pub fn get_app_settings() -> Settings {
    Settings::default()
        .size_limits(Limits::NONE.min_width(800.0).min_height(300.0))
        .size(Size::new(1200.0, 800.0))
}

/// Logs to stderr, `RUST_LOG` overrides the default `info` level
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
