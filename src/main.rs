// Main entry point for the Headscale VPN client GUI

use iced::window;
use iced::Size;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod config;
mod models;
mod ui;
mod vpn;

use app::HeadscaleGui;

pub fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    iced::application("Headscale VPN", HeadscaleGui::update, HeadscaleGui::view)
        .window(window::Settings {
            size: Size::new(500.0, 600.0),
            resizable: false,
            ..Default::default()
        })
        .run_with(HeadscaleGui::new)
}
