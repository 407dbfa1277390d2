//! lifctl - manage ONTAP network IP interfaces through the cluster REST API
//!
//! The library holds the REST plumbing ([`ontap`]), the resource adapters
//! ([`interfaces`]), error reporting ([`error`]) and persistent settings
//! ([`config`]). The `lifctl` binary is a thin command-line caller on top.

pub mod config;
pub mod error;
pub mod interfaces;
pub mod ontap;

/// Version injected at compile time via LIFCTL_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("LIFCTL_VERSION") {
    Some(v) => v,
    None => "dev",
};
