// Privilege-elevated subprocess runner

use std::process::Command;

use thiserror::Error;
use tracing::debug;

/// Captured result of a finished subprocess. A non-zero exit code is a
/// normal, reportable outcome, not an error.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Human-readable failure detail: stderr, falling back to stdout.
    pub fn error_detail(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    /// The program is not on the execution path. Kept distinct from a failed
    /// run so callers can prompt for installation.
    #[error("{0} is not installed or not in PATH")]
    NotFound(String),
    #[error("failed to launch {0}: {1}")]
    Launch(String, #[source] std::io::Error),
}

/// Seam between the connection controller and the operating system. Tests
/// substitute a fake; the real implementation is [`SystemRunner`].
pub trait CommandRunner {
    /// Runs `argv` to completion and captures its output. When `elevate` is
    /// set, the platform's elevation strategy is applied first.
    fn run(&self, argv: &[String], elevate: bool) -> Result<CommandOutput, RunError>;
}

/// How a command gains elevated privileges on this platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// Already privileged, or the platform handles elevation itself.
    None,
    /// Prefix with `sudo`, or with a GUI helper when one is available.
    Sudo,
}

/// Per-platform process policy, resolved once per call.
#[derive(Debug, Clone, Copy)]
pub struct PlatformPolicy {
    pub suppress_console_window: bool,
    pub elevation: Elevation,
}

impl PlatformPolicy {
    #[cfg(windows)]
    pub fn current() -> Self {
        Self {
            suppress_console_window: true,
            elevation: Elevation::None,
        }
    }

    #[cfg(unix)]
    pub fn current() -> Self {
        let is_root = unsafe { libc::geteuid() } == 0;
        Self {
            suppress_console_window: false,
            elevation: if is_root { Elevation::None } else { Elevation::Sudo },
        }
    }
}

/// Prepends the elevation prefix dictated by `policy`. `helper_available`
/// is the result of the per-call `which pkexec` probe.
fn apply_elevation(policy: PlatformPolicy, helper_available: bool, argv: &[String]) -> Vec<String> {
    match policy.elevation {
        Elevation::None => argv.to_vec(),
        Elevation::Sudo => {
            let prefix = if helper_available { "pkexec" } else { "sudo" };
            let mut elevated = Vec::with_capacity(argv.len() + 1);
            elevated.push(prefix.to_string());
            elevated.extend_from_slice(argv);
            elevated
        }
    }
}

/// Helper availability can change between calls (package installs, PATH
/// edits), so this is probed fresh every time rather than cached.
fn pkexec_available() -> bool {
    Command::new("which")
        .arg("pkexec")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Runs commands through `std::process::Command`, blocking until they exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String], elevate: bool) -> Result<CommandOutput, RunError> {
        let policy = PlatformPolicy::current();
        let argv = if elevate && policy.elevation != Elevation::None {
            apply_elevation(policy, pkexec_available(), argv)
        } else {
            argv.to_vec()
        };
        debug!("running {:?}", argv);

        let Some((program, args)) = argv.split_first() else {
            return Err(RunError::Launch(
                String::new(),
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"),
            ));
        };
        let mut cmd = Command::new(program);
        cmd.args(args);

        #[cfg(windows)]
        if policy.suppress_console_window {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        match cmd.output() {
            Ok(out) => Ok(CommandOutput {
                exit_code: out.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&out.stdout).to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(RunError::NotFound(program.clone()))
            }
            Err(err) => Err(RunError::Launch(program.clone(), err)),
        }
    }
}
