// Models and Message types

use crate::vpn::VpnError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
    Failed,
}

impl ConnectionState {
    /// Whether the connect form should accept input.
    pub fn editable(self) -> bool {
        matches!(self, ConnectionState::Disconnected | ConnectionState::Failed)
    }
}

/// One connection attempt, built from the form at connect time.
/// Consumed to build a single `tailscale up` invocation and then discarded;
/// the auth key is never persisted anywhere.
#[derive(Debug, Clone)]
pub struct ConnectionAttempt {
    pub server_ip: String,
    pub port: String,
    pub auth_key: String,
    pub accept_routes: bool,
}

impl ConnectionAttempt {
    pub fn new(server_ip: &str, port: &str, auth_key: &str, accept_routes: bool) -> Self {
        Self {
            server_ip: server_ip.trim().to_string(),
            port: port.trim().to_string(),
            auth_key: auth_key.trim().to_string(),
            accept_routes,
        }
    }

    /// All three string fields are required before any subprocess runs.
    pub fn validate(&self) -> Result<(), VpnError> {
        if self.server_ip.is_empty() {
            return Err(VpnError::Validation("server IP address"));
        }
        if self.port.is_empty() {
            return Err(VpnError::Validation("port number"));
        }
        if self.auth_key.is_empty() {
            return Err(VpnError::Validation("authentication key"));
        }
        Ok(())
    }

    /// Login-server URL presented to the coordination server.
    pub fn login_server(&self) -> String {
        format!("http://{}:{}", self.server_ip, self.port)
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    // Form input
    ServerIpChanged(String),
    PortChanged(String),
    AuthKeyChanged(String),
    ToggleShowKey(bool),
    ToggleAcceptRoutes(bool),

    // Connection lifecycle
    ConnectPressed,
    DisconnectPressed,
    ConfirmDisconnect,
    CancelDisconnect,
    // Second phase of connect/disconnect: runs after the status label has
    // been repainted, then blocks on the subprocess.
    RunPending,

    // Install prompt
    DismissClientMissing,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vpn::VpnError;

    #[test]
    fn attempt_trims_fields() {
        let attempt = ConnectionAttempt::new(" 10.0.0.5 ", " 8080 ", " key123 ", true);
        assert_eq!(attempt.server_ip, "10.0.0.5");
        assert_eq!(attempt.port, "8080");
        assert_eq!(attempt.auth_key, "key123");
    }

    #[test]
    fn validate_names_the_missing_field() {
        let attempt = ConnectionAttempt::new("", "8080", "key", false);
        assert_eq!(
            attempt.validate(),
            Err(VpnError::Validation("server IP address"))
        );

        let attempt = ConnectionAttempt::new("10.0.0.5", "  ", "key", false);
        assert_eq!(attempt.validate(), Err(VpnError::Validation("port number")));

        let attempt = ConnectionAttempt::new("10.0.0.5", "8080", "", false);
        assert_eq!(
            attempt.validate(),
            Err(VpnError::Validation("authentication key"))
        );
    }

    #[test]
    fn login_server_url() {
        let attempt = ConnectionAttempt::new("10.0.0.5", "8080", "key", false);
        assert_eq!(attempt.login_server(), "http://10.0.0.5:8080");
    }
}
