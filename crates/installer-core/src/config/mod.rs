//! Project configuration
//!
//! The installer reads a flat `.env` file once at startup. The resulting
//! [`Configuration`] is passed explicitly to every later stage; nothing reads
//! the process environment for project settings.

pub mod keys;
pub mod loader;

pub use keys::SettingKey;
pub use loader::{load, ConfigError, Configuration};
