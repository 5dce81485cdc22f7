pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::webdriver::{WebDriverLauncher, WebDriverSession};
pub use config::{BrowserEngine, RunRequest};
pub use core::engine::EnrollmentEngine;
pub use domain::events::{self, EventLevel, EventSender, RunEvent};
pub use utils::error::{EnrollError, Result};
