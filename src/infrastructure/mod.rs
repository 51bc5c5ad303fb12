pub mod clock;
pub mod rendering;
pub mod services;

pub use clock::BrowserFrameScheduler;
pub use services::{BrowserTimeProvider, ConsoleLogger};
