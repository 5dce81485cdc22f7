pub mod auth;
pub mod engine;
pub mod navigator;
pub mod outcome;
pub mod prefs;
pub mod selector;
pub mod table;

pub use crate::domain::model::{
    Availability, ClassPreference, EnrollmentTarget, PickResult, SlotRow, SlotType,
};
pub use crate::domain::ports::{BrowserDriver, DriverLauncher, ElementHandle};
pub use crate::utils::error::Result;
