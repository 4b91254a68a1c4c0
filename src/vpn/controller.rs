// Connection lifecycle orchestration

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigStore, ConnectionConfig};
use crate::models::{ConnectionAttempt, ConnectionState};
use crate::vpn::runner::{CommandRunner, RunError};
use crate::vpn::CLIENT_BIN;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VpnError {
    #[error("please enter the {0}")]
    Validation(&'static str),
    #[error("tailscale is not installed or not in PATH")]
    ClientNotInstalled,
    #[error("{0}")]
    CommandFailed(String),
}

/// Owns the connection state and drives the up/down lifecycle. All state
/// transitions happen here; the UI renders from [`state`](Self::state).
pub struct ConnectionController<R> {
    runner: R,
    store: ConfigStore,
    state: ConnectionState,
}

impl<R: CommandRunner> ConnectionController<R> {
    pub fn new(runner: R, store: ConfigStore) -> Self {
        Self {
            runner,
            store,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Runs `tailscale status` (unelevated) and classifies the result:
    /// exit 0 with non-empty output means an active session. A missing
    /// binary is a distinct condition, never conflated with Disconnected.
    pub fn probe(&mut self) -> Result<ConnectionState, VpnError> {
        let argv = vec![CLIENT_BIN.to_string(), "status".to_string()];
        match self.runner.run(&argv, false) {
            Ok(out) => {
                self.state = if out.success() && !out.stdout.trim().is_empty() {
                    ConnectionState::Connected
                } else {
                    ConnectionState::Disconnected
                };
                Ok(self.state)
            }
            Err(RunError::NotFound(_)) => Err(VpnError::ClientNotInstalled),
            Err(err) => Err(VpnError::CommandFailed(err.to_string())),
        }
    }

    /// Validates the attempt and enters Connecting without running anything.
    /// Lets the UI repaint the "Connecting…" label before [`connect`]
    /// blocks on the subprocess.
    pub fn begin_connect(&mut self, attempt: &ConnectionAttempt) -> Result<(), VpnError> {
        attempt.validate()?;
        self.state = ConnectionState::Connecting;
        Ok(())
    }

    pub fn connect(&mut self, attempt: &ConnectionAttempt) -> Result<(), VpnError> {
        attempt.validate()?;

        let mut argv = vec![
            CLIENT_BIN.to_string(),
            "up".to_string(),
            format!("--login-server={}", attempt.login_server()),
            format!("--authkey={}", attempt.auth_key),
        ];
        if attempt.accept_routes {
            argv.push("--accept-routes".to_string());
        }

        self.state = ConnectionState::Connecting;
        match self.runner.run(&argv, true) {
            Ok(out) if out.success() => {
                self.state = ConnectionState::Connected;
                info!("connected to {}", attempt.login_server());
                // Persist server and port only; the auth key is discarded.
                // A save failure must never mask the successful connection.
                let config = ConnectionConfig {
                    server_ip: attempt.server_ip.clone(),
                    port: attempt.port.clone(),
                };
                if let Err(err) = self.store.save(&config) {
                    warn!("failed to save config: {err}");
                }
                Ok(())
            }
            Ok(out) => {
                self.state = ConnectionState::Failed;
                Err(VpnError::CommandFailed(out.error_detail()))
            }
            Err(RunError::NotFound(_)) => {
                self.state = ConnectionState::Failed;
                Err(VpnError::ClientNotInstalled)
            }
            Err(err) => {
                self.state = ConnectionState::Failed;
                Err(VpnError::CommandFailed(err.to_string()))
            }
        }
    }

    /// Enters Disconnecting; see [`begin_connect`] for why this is split out.
    pub fn begin_disconnect(&mut self) {
        self.state = ConnectionState::Disconnecting;
    }

    /// Brings the connection down. Without explicit confirmation this is a
    /// no-op: no subprocess runs and the state is untouched. On failure the
    /// prior state is restored.
    pub fn disconnect(&mut self, confirmed: bool) -> Result<(), VpnError> {
        if !confirmed {
            return Ok(());
        }

        let prior = if self.state == ConnectionState::Disconnecting {
            ConnectionState::Connected
        } else {
            self.state
        };
        self.state = ConnectionState::Disconnecting;

        let argv = vec![CLIENT_BIN.to_string(), "down".to_string()];
        match self.runner.run(&argv, true) {
            Ok(out) if out.success() => {
                self.state = ConnectionState::Disconnected;
                info!("disconnected");
                Ok(())
            }
            Ok(out) => {
                self.state = prior;
                Err(VpnError::CommandFailed(out.error_detail()))
            }
            Err(RunError::NotFound(_)) => {
                self.state = prior;
                Err(VpnError::ClientNotInstalled)
            }
            Err(err) => {
                self.state = prior;
                Err(VpnError::CommandFailed(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vpn::runner::CommandOutput;
    use std::cell::RefCell;

    /// Scripted runner that records every invocation.
    struct FakeRunner {
        calls: RefCell<Vec<(Vec<String>, bool)>>,
        results: RefCell<Vec<Result<CommandOutput, RunError>>>,
    }

    impl FakeRunner {
        fn new(results: Vec<Result<CommandOutput, RunError>>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                results: RefCell::new(results),
            }
        }

        fn exits(exit_code: i32, stdout: &str, stderr: &str) -> Result<CommandOutput, RunError> {
            Ok(CommandOutput {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            })
        }
    }

    impl CommandRunner for &FakeRunner {
        fn run(&self, argv: &[String], elevate: bool) -> Result<CommandOutput, RunError> {
            self.calls.borrow_mut().push((argv.to_vec(), elevate));
            self.results.borrow_mut().remove(0)
        }
    }

    fn temp_store(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::with_path(dir.path().join("config.json"))
    }

    #[test]
    fn connect_with_missing_field_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(vec![]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));

        for attempt in [
            ConnectionAttempt::new("", "8080", "key", true),
            ConnectionAttempt::new("10.0.0.5", "", "key", true),
            ConnectionAttempt::new("10.0.0.5", "8080", "", true),
        ] {
            let err = controller.connect(&attempt).unwrap_err();
            assert!(matches!(err, VpnError::Validation(_)));
        }
        assert!(runner.calls.borrow().is_empty());
        assert_eq!(controller.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn successful_connect_builds_argv_and_persists_config() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(vec![FakeRunner::exits(0, "", "")]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));

        let attempt = ConnectionAttempt::new("10.0.0.5", "8080", "key123", true);
        controller.connect(&attempt).unwrap();
        assert_eq!(controller.state(), ConnectionState::Connected);

        let calls = runner.calls.borrow();
        let (argv, elevate) = &calls[0];
        assert_eq!(
            argv,
            &vec![
                "tailscale".to_string(),
                "up".to_string(),
                "--login-server=http://10.0.0.5:8080".to_string(),
                "--authkey=key123".to_string(),
                "--accept-routes".to_string(),
            ]
        );
        assert!(*elevate);

        let raw = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        assert!(raw.contains("10.0.0.5"));
        assert!(raw.contains("8080"));
        assert!(!raw.contains("key123"));
    }

    #[test]
    fn accept_routes_flag_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(vec![FakeRunner::exits(0, "", "")]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));

        let attempt = ConnectionAttempt::new("10.0.0.5", "8080", "key123", false);
        controller.connect(&attempt).unwrap();
        let calls = runner.calls.borrow();
        assert!(!calls[0].0.contains(&"--accept-routes".to_string()));
    }

    #[test]
    fn failed_connect_reports_stderr_detail() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(vec![FakeRunner::exits(1, "", "bad key")]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));

        let attempt = ConnectionAttempt::new("10.0.0.5", "8080", "key123", true);
        let err = controller.connect(&attempt).unwrap_err();
        assert_eq!(err, VpnError::CommandFailed("bad key".to_string()));
        assert_eq!(controller.state(), ConnectionState::Failed);
        assert!(!dir.path().join("config.json").exists());
    }

    #[test]
    fn failed_connect_falls_back_to_stdout_detail() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(vec![FakeRunner::exits(1, "backend stopped", "")]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));

        let attempt = ConnectionAttempt::new("10.0.0.5", "8080", "key123", true);
        let err = controller.connect(&attempt).unwrap_err();
        assert_eq!(err, VpnError::CommandFailed("backend stopped".to_string()));
    }

    #[test]
    fn connect_with_missing_binary_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(vec![Err(RunError::NotFound("tailscale".to_string()))]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));

        let attempt = ConnectionAttempt::new("10.0.0.5", "8080", "key123", true);
        let err = controller.connect(&attempt).unwrap_err();
        assert_eq!(err, VpnError::ClientNotInstalled);
        assert_eq!(controller.state(), ConnectionState::Failed);
    }

    #[test]
    fn unconfirmed_disconnect_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(vec![FakeRunner::exits(0, "connected", "")]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));
        controller.probe().unwrap();
        assert_eq!(controller.state(), ConnectionState::Connected);

        controller.disconnect(false).unwrap();
        assert_eq!(controller.state(), ConnectionState::Connected);
        assert_eq!(runner.calls.borrow().len(), 1); // only the probe ran
    }

    #[test]
    fn confirmed_disconnect_runs_down() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(vec![
            FakeRunner::exits(0, "connected", ""),
            FakeRunner::exits(0, "", ""),
        ]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));
        controller.probe().unwrap();

        controller.disconnect(true).unwrap();
        assert_eq!(controller.state(), ConnectionState::Disconnected);

        let calls = runner.calls.borrow();
        let (argv, elevate) = &calls[1];
        assert_eq!(argv, &vec!["tailscale".to_string(), "down".to_string()]);
        assert!(*elevate);
    }

    #[test]
    fn failed_disconnect_keeps_prior_state() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(vec![
            FakeRunner::exits(0, "connected", ""),
            FakeRunner::exits(1, "", "still busy"),
        ]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));
        controller.probe().unwrap();

        let err = controller.disconnect(true).unwrap_err();
        assert_eq!(err, VpnError::CommandFailed("still busy".to_string()));
        assert_eq!(controller.state(), ConnectionState::Connected);
    }

    #[test]
    fn probe_classifies_status_output() {
        let dir = tempfile::tempdir().unwrap();

        let runner = FakeRunner::new(vec![FakeRunner::exits(0, "100.64.0.1 node\n", "")]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));
        assert_eq!(controller.probe().unwrap(), ConnectionState::Connected);
        // The status probe never elevates.
        assert!(!runner.calls.borrow()[0].1);

        let runner = FakeRunner::new(vec![FakeRunner::exits(0, "  \n", "")]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));
        assert_eq!(controller.probe().unwrap(), ConnectionState::Disconnected);

        let runner = FakeRunner::new(vec![FakeRunner::exits(1, "", "not running")]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));
        assert_eq!(controller.probe().unwrap(), ConnectionState::Disconnected);
    }

    #[test]
    fn probe_with_missing_binary_is_not_disconnected() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new(vec![Err(RunError::NotFound("tailscale".to_string()))]);
        let mut controller = ConnectionController::new(&runner, temp_store(&dir));
        assert_eq!(controller.probe().unwrap_err(), VpnError::ClientNotInstalled);
    }
}
