// UI Components and View Logic

use iced::widget::{button, checkbox, column, container, row, scrollable, text, text_input, Space};
use iced::{Alignment, Color, Element, Length, Theme};

use crate::app::HeadscaleGui;
use crate::models::{ConnectionState, Message};

const GREEN: Color = Color::from_rgb(0.063, 0.725, 0.506); // #10b981
const RED: Color = Color::from_rgb(0.937, 0.267, 0.267); // #ef4444
const AMBER: Color = Color::from_rgb(0.961, 0.620, 0.043); // #f59e0b
const GRAY: Color = Color::from_rgb(0.392, 0.455, 0.545); // #64748b
const BLUE: Color = Color::from_rgb(0.145, 0.388, 0.922); // #2563eb

/// Main view function
pub fn view_main(app: &HeadscaleGui) -> Element<'_, Message> {
    let main_view = container(build_main_content(app)).padding(20);

    if app.confirm_disconnect {
        iced::widget::stack![main_view, build_confirm_modal()].into()
    } else if app.client_missing {
        iced::widget::stack![main_view, build_client_missing_modal()].into()
    } else {
        main_view.into()
    }
}

/// Build the main application content
fn build_main_content(app: &HeadscaleGui) -> Element<'_, Message> {
    column![
        build_title(),
        Space::with_height(15),
        build_form(app),
        Space::with_height(15),
        build_controls(app),
        Space::with_height(10),
        build_status_label(app),
        Space::with_height(10),
        build_logs_view(app),
    ]
    .into()
}

/// Title and subtitle header
fn build_title() -> Element<'static, Message> {
    column![
        text("Headscale VPN").size(26).color(BLUE),
        text("Self-hosted mesh VPN client").size(12).color(GRAY),
    ]
    .spacing(2)
    .align_x(Alignment::Center)
    .width(Length::Fill)
    .into()
}

/// Server, port and auth key inputs with their checkboxes
fn build_form(app: &HeadscaleGui) -> Element<'_, Message> {
    let editable = app.controller.state().editable();

    let mut server_input = text_input("e.g. 203.0.113.10", &app.server_ip);
    let mut port_input = text_input("8080", &app.port);
    let mut key_input = text_input("Authentication key", &app.auth_key).secure(!app.show_key);
    if editable {
        server_input = server_input.on_input(Message::ServerIpChanged);
        port_input = port_input.on_input(Message::PortChanged);
        key_input = key_input.on_input(Message::AuthKeyChanged);
    }

    column![
        text("Headscale Server IP:").size(13),
        server_input.padding(8),
        Space::with_height(8),
        text("Port (default: 8080):").size(13),
        port_input.padding(8),
        Space::with_height(8),
        text("Authentication Key:").size(13),
        key_input.padding(8),
        Space::with_height(5),
        checkbox("Show authentication key", app.show_key).on_toggle(Message::ToggleShowKey),
        checkbox("Accept routes from other nodes", app.accept_routes)
            .on_toggle(Message::ToggleAcceptRoutes),
    ]
    .spacing(4)
    .into()
}

/// Connect/Disconnect buttons, enabled according to connection state
fn build_controls(app: &HeadscaleGui) -> Element<'_, Message> {
    let state = app.controller.state();
    let can_connect = state.editable();
    let can_disconnect = state == ConnectionState::Connected;

    row![
        Space::with_width(Length::Fill),
        button(text("Connect").size(15))
            .style(|theme: &Theme, status| button::Style {
                background: Some(iced::Background::Color(GREEN)),
                text_color: Color::WHITE,
                ..button::primary(theme, status)
            })
            .padding(12)
            .on_press_maybe(can_connect.then_some(Message::ConnectPressed)),
        button(text("Disconnect").size(15))
            .style(|theme: &Theme, status| button::Style {
                background: Some(iced::Background::Color(RED)),
                text_color: Color::WHITE,
                ..button::primary(theme, status)
            })
            .padding(12)
            .on_press_maybe(can_disconnect.then_some(Message::DisconnectPressed)),
        Space::with_width(Length::Fill),
    ]
    .spacing(10)
    .into()
}

/// Colored status label, a pure function of the controller state
fn build_status_label(app: &HeadscaleGui) -> Element<'_, Message> {
    let (label, color) = match app.controller.state() {
        ConnectionState::Connected => ("Status: Connected", GREEN),
        ConnectionState::Connecting => ("Status: Connecting...", AMBER),
        ConnectionState::Disconnecting => ("Status: Disconnecting...", AMBER),
        ConnectionState::Failed => ("Status: Connection Failed", RED),
        ConnectionState::Disconnected => ("Status: Disconnected", GRAY),
    };

    let mut status = column![text(label).size(14).color(color)]
        .spacing(3)
        .align_x(Alignment::Center)
        .width(Length::Fill);

    if let Some(detail) = &app.last_error {
        status = status.push(text(detail.clone()).size(12).color(RED));
    }

    status.into()
}

/// Scrolling log pane
fn build_logs_view(app: &HeadscaleGui) -> Element<'_, Message> {
    container(
        scrollable(
            text(app.logs.join("\n"))
                .size(11)
                .font(iced::Font::MONOSPACE),
        )
        .height(Length::Fixed(140.0))
        .width(Length::Fill),
    )
    .style(|_theme: &Theme| container::Style {
        background: Some(iced::Background::Color(Color::from_rgb8(245, 245, 245))),
        border: iced::Border {
            color: Color::from_rgb8(200, 200, 200),
            width: 1.0,
            radius: 4.0.into(),
        },
        ..Default::default()
    })
    .padding(8)
    .width(Length::Fill)
    .into()
}

/// Disconnect confirmation dialog
fn build_confirm_modal() -> Element<'static, Message> {
    let content = column![
        text("Confirm Disconnect").size(18),
        Space::with_height(10),
        text("Are you sure you want to disconnect from the VPN?").size(13),
        Space::with_height(15),
        row![
            button("Yes, disconnect")
                .style(|theme: &Theme, status| button::Style {
                    background: Some(iced::Background::Color(RED)),
                    text_color: Color::WHITE,
                    ..button::primary(theme, status)
                })
                .on_press(Message::ConfirmDisconnect),
            button("Cancel").on_press(Message::CancelDisconnect),
        ]
        .spacing(10),
    ]
    .align_x(Alignment::Center)
    .padding(25);

    modal_container(content.into())
}

/// Shown when the tailscale binary cannot be found on the PATH
fn build_client_missing_modal() -> Element<'static, Message> {
    let content = column![
        text("Tailscale Not Found").size(18).color(RED),
        Space::with_height(10),
        text("Tailscale is not installed or not in PATH.").size(13),
        text("Please install Tailscale first:").size(13),
        Space::with_height(5),
        text("Windows: https://tailscale.com/download/windows").size(12),
        text("Linux: https://tailscale.com/download/linux").size(12),
        Space::with_height(15),
        button("Close").on_press(Message::DismissClientMissing),
    ]
    .align_x(Alignment::Center)
    .padding(25);

    modal_container(content.into())
}

/// Centered overlay box used by both modals
fn modal_container(content: Element<'static, Message>) -> Element<'static, Message> {
    container(
        container(content).style(|_theme: &Theme| container::Style {
            background: Some(iced::Background::Color(Color::WHITE)),
            border: iced::Border {
                color: Color::from_rgb8(160, 160, 160),
                width: 2.0,
                radius: 8.0.into(),
            },
            ..Default::default()
        }),
    )
    .center_x(Length::Fill)
    .center_y(Length::Fill)
    .into()
}
