// VPN module

pub mod controller;
pub mod runner;

pub use controller::{ConnectionController, VpnError};
pub use runner::{CommandRunner, SystemRunner};

/// The external VPN client this front-end drives.
pub const CLIENT_BIN: &str = "tailscale";
