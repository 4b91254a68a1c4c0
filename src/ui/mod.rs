// UI module

pub mod components;

// Re-export
pub use components::*;
