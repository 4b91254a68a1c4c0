// Application state and business logic

use iced::Task;
use notify_rust::Notification;

use crate::config::ConfigStore;
use crate::models::{ConnectionAttempt, ConnectionState, Message};
use crate::ui::view_main;
use crate::vpn::{ConnectionController, SystemRunner, VpnError};

/// What to execute in the second dispatch phase, after the status label
/// from the first phase has been painted.
enum PendingAction {
    Connect(ConnectionAttempt),
    Disconnect,
}

/// The main application state
pub struct HeadscaleGui {
    pub controller: ConnectionController<SystemRunner>,

    // Form fields
    pub server_ip: String,
    pub port: String,
    pub auth_key: String,
    pub show_key: bool,
    pub accept_routes: bool,

    // Presentation
    pub last_error: Option<String>,
    pub logs: Vec<String>,
    pub confirm_disconnect: bool,
    pub client_missing: bool,

    pending: Option<PendingAction>,
}

impl HeadscaleGui {
    pub fn new() -> (Self, Task<Message>) {
        let store = ConfigStore::new();
        let saved = store.load();

        let mut app = Self {
            controller: ConnectionController::new(SystemRunner::new(), store),
            server_ip: saved.server_ip,
            port: saved.port,
            auth_key: String::new(),
            show_key: false,
            accept_routes: true,
            last_error: None,
            logs: vec!["Application started.".to_string()],
            confirm_disconnect: false,
            client_missing: false,
            pending: None,
        };

        // Seed the initial state from one status probe.
        match app.controller.probe() {
            Ok(ConnectionState::Connected) => app.log("Already connected.".to_string()),
            Ok(_) => app.log("Not connected.".to_string()),
            Err(VpnError::ClientNotInstalled) => {
                app.client_missing = true;
                app.log("Tailscale is not installed or not in PATH.".to_string());
            }
            Err(err) => app.log(format!("Status check failed: {err}")),
        }

        (app, Task::none())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ServerIpChanged(value) => {
                self.server_ip = value;
                Task::none()
            }
            Message::PortChanged(value) => {
                self.port = value;
                Task::none()
            }
            Message::AuthKeyChanged(value) => {
                self.auth_key = value;
                Task::none()
            }
            Message::ToggleShowKey(value) => {
                self.show_key = value;
                Task::none()
            }
            Message::ToggleAcceptRoutes(value) => {
                self.accept_routes = value;
                Task::none()
            }
            Message::ConnectPressed => self.handle_connect_pressed(),
            Message::DisconnectPressed => {
                self.confirm_disconnect = true;
                Task::none()
            }
            Message::ConfirmDisconnect => self.handle_confirm_disconnect(),
            Message::CancelDisconnect => {
                self.confirm_disconnect = false;
                Task::none()
            }
            Message::RunPending => self.handle_run_pending(),
            Message::DismissClientMissing => {
                self.client_missing = false;
                Task::none()
            }
        }
    }

    pub fn view(&self) -> iced::Element<'_, Message> {
        view_main(self)
    }

    pub fn log(&mut self, msg: String) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        self.logs.push(format!("[{}] {}", timestamp, msg));
        // Keep logs manageable
        if self.logs.len() > 1000 {
            self.logs.remove(0);
        }
    }
}

// --- Message Handlers ---

impl HeadscaleGui {
    /// Phase one of connect: validate and flip to Connecting so the label
    /// repaints, then queue the blocking phase.
    fn handle_connect_pressed(&mut self) -> Task<Message> {
        let attempt = ConnectionAttempt::new(
            &self.server_ip,
            &self.port,
            &self.auth_key,
            self.accept_routes,
        );

        if let Err(err) = self.controller.begin_connect(&attempt) {
            self.last_error = Some(err.to_string());
            self.log(format!("Cannot connect: {err}"));
            return Task::none();
        }

        self.last_error = None;
        self.log(format!("Connecting to {}...", attempt.login_server()));
        self.pending = Some(PendingAction::Connect(attempt));
        Task::done(Message::RunPending)
    }

    fn handle_confirm_disconnect(&mut self) -> Task<Message> {
        self.confirm_disconnect = false;
        self.controller.begin_disconnect();
        self.log("Disconnecting...".to_string());
        self.pending = Some(PendingAction::Disconnect);
        Task::done(Message::RunPending)
    }

    /// Phase two: the blocking subprocess call. The whole flow is
    /// synchronous, so no second attempt can start while this runs.
    fn handle_run_pending(&mut self) -> Task<Message> {
        match self.pending.take() {
            Some(PendingAction::Connect(attempt)) => {
                match self.controller.connect(&attempt) {
                    Ok(()) => {
                        self.last_error = None;
                        self.log("Connected to Headscale server.".to_string());
                        notify("Connected to Headscale server.");
                    }
                    Err(err) => self.report_failure("Connection failed", err),
                }
            }
            Some(PendingAction::Disconnect) => match self.controller.disconnect(true) {
                Ok(()) => {
                    self.last_error = None;
                    self.log("Disconnected from VPN.".to_string());
                    notify("Disconnected from VPN.");
                }
                Err(err) => self.report_failure("Disconnect failed", err),
            },
            None => {}
        }
        Task::none()
    }

    fn report_failure(&mut self, action: &str, err: VpnError) {
        if err == VpnError::ClientNotInstalled {
            self.client_missing = true;
        }
        self.last_error = Some(err.to_string());
        self.log(format!("{action}: {err}"));
    }
}

fn notify(body: &str) {
    let _ = Notification::new()
        .summary("Headscale VPN")
        .body(body)
        .show();
}
