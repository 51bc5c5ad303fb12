//! Zoom-then-reveal price chart engine.
//!
//! Canonicalizes loosely shaped OHLCV records, fills in moving averages, maps the
//! `before` and `after` segments of a round onto pixel scales and animates the reveal
//! of `after`. Drawing is left to a [`application::RenderAdapter`].

use wasm_bindgen::prelude::*;

use crate::domain::logging::{LogComponent, get_logger};

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::{EngineConfig, RenderAdapter, RenderFrame, RenderOutput, RevealChartEngine};

/// Install panic hook, console logger and browser clock
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let console_logger = Box::new(if cfg!(debug_assertions) {
        infrastructure::ConsoleLogger::new_development()
    } else {
        infrastructure::ConsoleLogger::new_production()
    });
    domain::logging::init_logger(console_logger);

    let browser_time_provider = Box::new(infrastructure::BrowserTimeProvider::new());
    domain::logging::init_time_provider(browser_time_provider);

    get_logger().info(LogComponent::Presentation("Initialize"), "chart engine ready");
}
