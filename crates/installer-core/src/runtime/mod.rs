//! Runtime manager provisioning and invocation
//!
//! This module provides:
//! - Detection and installation of the runtime manager (`uv`)
//! - The runtime manager command surface used by the dependency installer
//! - Streamed execution of external commands

pub mod manager;
pub mod process;
pub mod tool;

pub use manager::{RuntimeManager, UvManager};
pub use process::CommandError;
pub use tool::{
    CurlInstaller, HostChecks, ProvisionError, Provisioned, RuntimeProvisioner, ScriptInstaller,
    SystemHost, ToolConfig,
};
