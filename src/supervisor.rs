//! Backend process supervision.
//!
//! The backend runs as a child process with inherited stdio and environment.
//! A watcher task owns the [`Child`], relays signals to it and publishes its
//! exit through a `watch` channel so any handle can wait for it.

use crate::config::BackendConfig;
use crate::shutdown::ShutdownSignal;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// How the backend process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendExit {
    /// Exit code, `None` when terminated by a signal.
    pub code: Option<i32>,
    /// Signal that terminated the process, if any.
    pub signal: Option<i32>,
    /// Whether the exit followed a shutdown request.
    pub expected: bool,
}

#[derive(Debug)]
enum Control {
    Signal(ShutdownSignal),
    Kill,
}

/// Handle to the supervised backend process.
#[derive(Debug, Clone)]
pub struct BackendSupervisor {
    pid: Option<u32>,
    control: mpsc::UnboundedSender<Control>,
    exit: watch::Receiver<Option<BackendExit>>,
    stopping: Arc<AtomicBool>,
}

impl BackendSupervisor {
    /// Launches the backend and starts watching it.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns error if the process cannot be started.
    pub fn spawn(config: &BackendConfig) -> std::io::Result<Self> {
        info!("Starting backend: {} {:?}", config.command, config.args);

        let mut command = Command::new(&config.command);
        command
            .args(&config.args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        // An ignored disposition survives exec and would swallow forwarded signals
        #[cfg(unix)]
        // SAFETY: only async-signal-safe calls run between fork and exec.
        unsafe {
            command.pre_exec(|| {
                libc::signal(libc::SIGINT, libc::SIG_DFL);
                libc::signal(libc::SIGTERM, libc::SIG_DFL);
                Ok(())
            });
        }

        let child = command
            .spawn()
            .inspect_err(|e| error!("Failed to start backend: {}", e))?;

        let pid = child.id();
        info!("Backend started (PID: {:?})", pid);

        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let (exit_tx, exit_rx) = watch::channel(None);
        let stopping = Arc::new(AtomicBool::new(false));

        tokio::spawn(watch_child(child, control_rx, exit_tx, Arc::clone(&stopping)));

        Ok(Self {
            pid,
            control: control_tx,
            exit: exit_rx,
            stopping,
        })
    }

    /// Exit information once the backend has terminated.
    #[must_use]
    pub fn exit_status(&self) -> Option<BackendExit> {
        *self.exit.borrow()
    }

    /// Returns true while the backend process is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.exit.borrow().is_none()
    }

    /// Sends `signal` to the backend and marks the exit as expected.
    pub fn forward(&self, signal: ShutdownSignal) {
        self.stopping.store(true, Ordering::SeqCst);
        if !self.is_running() {
            debug!("Backend already exited, not forwarding {}", signal);
            return;
        }
        info!("Forwarding {} to backend (PID: {:?})", signal, self.pid);
        let _ = self.control.send(Control::Signal(signal));
    }

    /// Waits for the backend to exit, killing it when `grace` elapses first.
    pub async fn wait_for_exit(&self, grace: Duration) -> Option<BackendExit> {
        let mut rx = self.exit.clone();
        let waited = tokio::time::timeout(grace, rx.wait_for(Option::is_some))
            .await
            .map(|result| result.map(|exit| *exit));

        match waited {
            Ok(Ok(exit)) => exit,
            Ok(Err(_)) => self.exit_status(),
            Err(_) => {
                warn!(
                    "Backend did not exit within {:?}, killing it (PID: {:?})",
                    grace, self.pid
                );
                let _ = self.control.send(Control::Kill);
                rx.wait_for(Option::is_some)
                    .await
                    .map(|exit| *exit)
                    .unwrap_or_else(|_| self.exit_status())
            }
        }
    }

    /// Forwards `signal`, then waits up to `grace` for the backend to exit.
    pub async fn shutdown(&self, signal: ShutdownSignal, grace: Duration) -> Option<BackendExit> {
        self.forward(signal);
        self.wait_for_exit(grace).await
    }
}

async fn watch_child(
    mut child: Child,
    mut control: mpsc::UnboundedReceiver<Control>,
    exit_tx: watch::Sender<Option<BackendExit>>,
    stopping: Arc<AtomicBool>,
) {
    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            Some(request) = control.recv() => match request {
                Control::Signal(signal) => deliver(&mut child, signal),
                Control::Kill => {
                    if let Err(e) = child.start_kill() {
                        warn!("Failed to kill backend: {}", e);
                    }
                }
            },
        }
    };

    let expected = stopping.load(Ordering::SeqCst);
    let (code, signal) = match status {
        Ok(status) => (status.code(), terminating_signal(&status)),
        Err(e) => {
            error!("Failed to wait for backend: {}", e);
            (None, None)
        }
    };

    if expected {
        info!("Backend exited with code {:?} (signal {:?})", code, signal);
    } else {
        error!(
            "Backend exited unexpectedly with code {:?} (signal {:?})",
            code, signal
        );
    }

    exit_tx.send_replace(Some(BackendExit {
        code,
        signal,
        expected,
    }));
}

#[cfg(unix)]
fn terminating_signal(status: &std::process::ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn terminating_signal(_status: &std::process::ExitStatus) -> Option<i32> {
    None
}

#[cfg(unix)]
fn deliver(child: &mut Child, signal: ShutdownSignal) {
    let Some(pid) = child.id() else {
        return;
    };
    // SAFETY: `pid` belongs to a child that has not been reaped yet.
    let rc = unsafe { libc::kill(pid as libc::pid_t, signal.as_raw()) };
    if rc != 0 {
        warn!(
            "Failed to send {} to backend: {}",
            signal,
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn deliver(child: &mut Child, signal: ShutdownSignal) {
    debug!("{} has no equivalent here, terminating backend", signal);
    if let Err(e) = child.start_kill() {
        warn!("Failed to stop backend: {}", e);
    }
}
