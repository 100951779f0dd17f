//! Terminal implementations of the cue backends.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Mutex, MutexGuard, PoisonError};

use boxbreath_types::PhaseKind;

use crate::cues::{CueError, CueSettings, Cues, HapticOutput, ToneOutput, WakeLock};

const BELL: &[u8] = b"\x07";

/// Rings the terminal bell. Terminals cannot reproduce pitch, so the
/// requested frequency is only logged.
pub struct TerminalBell<W: Write + Send> {
    out: W,
}

impl TerminalBell<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write + Send> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> ToneOutput for TerminalBell<W> {
    fn play(&mut self, phase: PhaseKind, frequency_hz: u32) -> Result<(), CueError> {
        tracing::trace!(%phase, frequency_hz, "tone");
        self.out
            .write_all(BELL)
            .and_then(|()| self.out.flush())
            .map_err(|source| CueError::Io {
                action: "ringing the terminal bell",
                source,
            })
    }
}

/// Terminals have no vibration motor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl HapticOutput for NoHaptics {
    fn vibrate(&mut self, _pattern: &[u32]) -> Result<(), CueError> {
        Err(CueError::Unsupported("vibration"))
    }
}

/// A platform sleep inhibitor found on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inhibitor {
    pub binary: PathBuf,
    pub args: Vec<String>,
}

impl Inhibitor {
    /// `systemd-inhibit` on Linux, `caffeinate` on macOS, `None` elsewhere or
    /// when the tool is not installed.
    #[must_use]
    pub fn detect() -> Option<Self> {
        if cfg!(target_os = "macos") {
            return which::which("caffeinate").ok().map(|binary| Self {
                binary,
                args: vec!["-d".to_string()],
            });
        }
        if cfg!(target_os = "linux") {
            return which::which("systemd-inhibit").ok().map(|binary| Self {
                binary,
                args: [
                    "--what=idle:sleep",
                    "--who=boxbreath",
                    "--why=Breathing session in progress",
                    "--mode=block",
                    "sleep",
                    "infinity",
                ]
                .map(String::from)
                .to_vec(),
            });
        }
        None
    }
}

/// Holds the screen awake by keeping an inhibitor child process alive.
///
/// The child can exit on its own (for example when the inhibitor is denied
/// by policy), so every check reaps it first. An exited child is not held.
#[derive(Debug)]
pub struct InhibitorWakeLock {
    inhibitor: Option<Inhibitor>,
    child: Mutex<Option<Child>>,
}

impl InhibitorWakeLock {
    #[must_use]
    pub fn new(inhibitor: Option<Inhibitor>) -> Self {
        Self {
            inhibitor,
            child: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn detect() -> Self {
        Self::new(Inhibitor::detect())
    }

    fn slot(&self) -> MutexGuard<'_, Option<Child>> {
        self.child.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clear `slot` when its child has exited, returning the exit status.
fn reap(slot: &mut Option<Child>) -> Option<ExitStatus> {
    let child = slot.as_mut()?;
    match child.try_wait() {
        Ok(Some(status)) => {
            *slot = None;
            Some(status)
        }
        Ok(None) => None,
        Err(err) => {
            tracing::debug!("Could not poll the sleep inhibitor: {err}");
            None
        }
    }
}

impl WakeLock for InhibitorWakeLock {
    fn acquire(&mut self) -> Result<(), CueError> {
        let Some(inhibitor) = &self.inhibitor else {
            return Err(CueError::Unsupported("wake lock"));
        };
        let slot = self.child.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(status) = reap(slot) {
            tracing::warn!(%status, "sleep inhibitor exited; restarting it");
        }
        if slot.is_some() {
            return Ok(());
        }

        let child = Command::new(&inhibitor.binary)
            .args(&inhibitor.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CueError::Io {
                action: "starting the sleep inhibitor",
                source,
            })?;
        let pid = child.id();
        *slot = Some(child);
        if let Some(status) = reap(slot) {
            return Err(CueError::Io {
                action: "starting the sleep inhibitor",
                source: io::Error::other(format!("inhibitor exited immediately ({status})")),
            });
        }
        tracing::debug!(pid, binary = %inhibitor.binary.display(), "inhibitor started");
        Ok(())
    }

    fn release(&mut self) -> Result<(), CueError> {
        let slot = self.child.get_mut().unwrap_or_else(PoisonError::into_inner);
        let Some(mut child) = slot.take() else {
            return Ok(());
        };
        // An inhibitor that already exited is fine; reap it either way.
        let killed = match child.kill() {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::InvalidInput => Ok(()),
            Err(source) => Err(CueError::Io {
                action: "stopping the sleep inhibitor",
                source,
            }),
        };
        let _ = child.wait();
        killed
    }

    fn is_held(&self) -> bool {
        let mut slot = self.slot();
        if let Some(status) = reap(&mut slot) {
            tracing::warn!(%status, "sleep inhibitor exited; wake lock lost");
        }
        slot.is_some()
    }
}

impl Drop for InhibitorWakeLock {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// Cue backends for an interactive terminal.
#[must_use]
pub fn terminal_cues(settings: CueSettings) -> Cues {
    Cues::new(
        Box::new(TerminalBell::stdout()),
        Box::new(NoHaptics),
        Box::new(InhibitorWakeLock::detect()),
        settings,
    )
}
