//! Idle monitor driven by an input surface and a tokio timer.
//!
//! Each monitor runs one task that handles input events and its debounce
//! timer in sequence, so an event and a timer expiry never overlap.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::trace;

use crate::activity::ActivityState;
use crate::config::ConfigError;
use crate::domain::Activity;
use crate::domain::EventKinds;
use crate::surface::InputEvent;
use crate::surface::InputSurface;
use crate::surface::ListenerId;

/// Receives activity transitions.
///
/// Called on every state change and never for same-state repeats.
pub trait ActivityObserver: Send {
    fn on_change(&mut self, activity: Activity);
}

impl<F> ActivityObserver for F
where
    F: FnMut(Activity) + Send,
{
    fn on_change(&mut self, activity: Activity) {
        self(activity);
    }
}

impl ActivityObserver for Vec<Box<dyn ActivityObserver>> {
    fn on_change(&mut self, activity: Activity) {
        for observer in self.iter_mut() {
            observer.on_change(activity);
        }
    }
}

/// Validated monitor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    timeout: Duration,
    targets: EventKinds,
}

impl MonitorConfig {
    /// Build settings from a timeout in milliseconds and the kinds to listen for.
    pub fn new(timeout_ms: u64, targets: EventKinds) -> Result<Self, ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::NonPositiveTimeout);
        }
        if targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        Ok(Self {
            timeout: Duration::from_millis(timeout_ms),
            targets,
        })
    }

    /// Settings listening for every qualifying event kind.
    pub fn qualifying(timeout_ms: u64) -> Result<Self, ConfigError> {
        Self::new(timeout_ms, EventKinds::QUALIFYING)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn targets(&self) -> EventKinds {
        self.targets
    }
}

/// A running idle monitor.
///
/// Dropping the monitor stops it.
pub struct IdleMonitor {
    config: MonitorConfig,
    surface: Arc<dyn InputSurface>,

    /// Listener registration, `None` once stopped.
    listener: Option<ListenerId>,

    /// State mirrored out of the task.
    is_active: Arc<AtomicBool>,

    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl IdleMonitor {
    /// Register on `surface` and start tracking activity.
    ///
    /// The monitor starts active with no timer armed. Must be called from
    /// within a tokio runtime.
    pub fn start<O>(config: MonitorConfig, surface: Arc<dyn InputSurface>, observer: O) -> Self
    where
        O: ActivityObserver + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = surface.add_listener(config.targets, tx);

        let is_active = Arc::new(AtomicBool::new(true));
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run(
            config,
            rx,
            Box::new(observer),
            Arc::clone(&is_active),
            cancel.clone(),
        ));

        info!(
            "Idle monitor started, timeout {:?}, listening for {}",
            config.timeout, config.targets
        );

        Self {
            config,
            surface,
            listener: Some(listener),
            is_active,
            cancel,
            task: Some(task),
        }
    }

    /// Whether a qualifying event happened within the timeout window.
    ///
    /// Reflects an event once the monitor task has handled it.
    pub fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Acquire)
    }

    pub fn activity(&self) -> Activity {
        Activity::from_active(self.is_active())
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    pub fn targets(&self) -> EventKinds {
        self.config.targets
    }

    pub fn is_running(&self) -> bool {
        self.listener.is_some()
    }

    /// Deregister listeners and cancel any pending timer.
    ///
    /// Calling it again has no effect.
    pub fn stop(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };

        self.cancel.cancel();
        self.surface.remove_listener(listener);
        if let Some(task) = self.task.take() {
            task.abort();
        }

        info!("Idle monitor stopped");
    }
}

impl Drop for IdleMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wait until `deadline`, or forever when no timer is armed.
async fn timer(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn run(
    config: MonitorConfig,
    mut events: UnboundedReceiver<InputEvent>,
    mut observer: Box<dyn ActivityObserver>,
    is_active: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    let mut state = ActivityState::new();

    loop {
        let deadline = state.deadline();

        let change = tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            event = events.recv() => {
                let Some(event) = event else {
                    debug!("Input surface closed, monitor task exiting");
                    break;
                };
                trace!("Input {} at {:?}, timer reset", event.kind, event.at);
                state.record_input(event.at, config.timeout)
            }

            () = timer(deadline) => {
                trace!("Idle timer expired");
                state.expire()
            }
        };

        let Some(activity) = change else {
            continue;
        };

        // stop() may have raced the event we just handled
        if cancel.is_cancelled() {
            break;
        }

        is_active.store(activity.is_active(), Ordering::Release);
        debug!("Activity changed: {}", activity);
        observer.on_change(activity);
    }

    state.cancel();
}
