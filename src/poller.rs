use anyhow::Result;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time;

use crate::runtime::TrackingRuntime;
use crate::session::{SessionState, TrackingSession};
use crate::wire::DevicePose;

/// What the polling thread last observed.
#[derive(Debug, Clone)]
pub struct PollSnapshot {
    pub state: SessionState,
    pub status: String,
    pub devices: Vec<DevicePose>,
    /// Cycles completed since the poller started, failed ones included.
    pub cycles: u64,
}

/// Drives a [`TrackingSession`] at a fixed cadence on its own thread.
///
/// Consumers read [`latest`] whenever they like; dropping the poller stops
/// the loop and joins the thread.
///
/// [`latest`]: Poller::latest
pub struct Poller {
    snapshot: Arc<Mutex<PollSnapshot>>,
    running: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Moves `session` onto a background thread and cycles it every
    /// `interval`; `interval` must be non-zero.
    ///
    /// The first cycle on a fresh session connects it, and connecting
    /// resets calibration to identity. To poll with a calibration, connect
    /// the session and set the calibration before handing it over.
    pub fn start<R>(session: TrackingSession<R>, interval: Duration) -> Poller
    where
        R: TrackingRuntime + Send + 'static,
    {
        let snapshot = Arc::new(Mutex::new(PollSnapshot {
            state: session.state(),
            status: session.status().to_owned(),
            devices: Vec::new(),
            cycles: 0,
        }));
        let running = Arc::new(AtomicBool::new(true));

        let thread_snapshot = Arc::clone(&snapshot);
        let thread_running = Arc::clone(&running);
        let join_handle = thread::spawn(move || {
            if let Err(error) = run_poll_loop(session, interval, thread_snapshot, thread_running) {
                warn!("poll loop stopped: {}", error);
            }
        });

        Poller {
            snapshot,
            running,
            join_handle: Some(join_handle),
        }
    }

    /// Clone of the most recent snapshot.
    pub fn latest(&self) -> PollSnapshot {
        self.snapshot.lock().unwrap().clone()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(join_handle) = self.join_handle.take() {
            if join_handle.join().is_err() {
                warn!("poll thread panicked");
            }
        }
    }
}

fn run_poll_loop<R: TrackingRuntime>(
    mut session: TrackingSession<R>,
    interval: Duration,
    snapshot: Arc<Mutex<PollSnapshot>>,
    running: Arc<AtomicBool>,
) -> Result<()> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut ticker = time::interval(interval);
        let mut cycles: u64 = 0;
        while running.load(Ordering::SeqCst) {
            ticker.tick().await;
            if let Err(error) = session.cycle() {
                // the snapshot below carries the failure in its status
                debug!("poll cycle failed: {}", error);
            }
            cycles += 1;
            let mut latest = snapshot.lock().unwrap();
            latest.state = session.state();
            latest.status = session.status().to_owned();
            latest.devices = session.snapshot();
            latest.cycles = cycles;
        }
    });
    Ok(())
}
