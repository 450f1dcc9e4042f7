//! Settings catalog for the game tweaks
//!
//! - **value**: typed setting values (whitelisted strings, optional integers)
//! - **registry**: the fixed catalog plus JSON load/save

pub mod error;
pub mod id;
pub mod registry;
pub mod value;

pub use error::SettingsError;
pub use id::SettingId;
pub use registry::{SettingsRegistry, UnknownKeyPolicy};
pub use value::{Setting, SettingValue};
