use log::{info, warn};
use nalgebra as na;

use crate::registry::DeviceRegistry;
use crate::runtime::{Result, TrackingError, TrackingRuntime, MAX_TRACKED_DEVICES};
use crate::wire::DevicePose;

/// Connection lifecycle of a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Refreshing,
}

/// Owns the runtime handle and device registry for one tracking session,
/// along with the session-scoped calibration.
///
/// The session never schedules itself; a caller (or a [`Poller`]) drives it
/// by calling [`cycle`] at whatever cadence it wants.
///
/// [`Poller`]: crate::poller::Poller
/// [`cycle`]: TrackingSession::cycle
pub struct TrackingSession<R: TrackingRuntime> {
    runtime: R,
    registry: DeviceRegistry,
    state: SessionState,
    status: String,
    calibration: na::Isometry3<f32>,
}

impl<R: TrackingRuntime> TrackingSession<R> {
    pub fn new(runtime: R) -> TrackingSession<R> {
        TrackingSession {
            runtime,
            registry: DeviceRegistry::new(),
            state: SessionState::Disconnected,
            status: String::from("not connected"),
            calibration: na::Isometry3::identity(),
        }
    }

    /// Probes the runtime and enumerates the connected devices.
    ///
    /// Connecting wipes session state: the calibration resets to identity on
    /// success and failure alike, and a failed connect empties the registry too.
    pub fn connect(&mut self) -> Result<()> {
        self.state = SessionState::Connecting;
        if !self.runtime.is_installed() {
            return Err(self.disconnect(TrackingError::RuntimeNotInstalled));
        }
        if !self.runtime.is_available() {
            return Err(self.disconnect(TrackingError::RuntimeNotRunning));
        }
        self.registry.enumerate(&self.runtime, MAX_TRACKED_DEVICES);
        self.calibration = na::Isometry3::identity();
        self.state = SessionState::Connected;
        self.status = self.registry.summary();
        info!("tracking connected: {}", self.status);
        Ok(())
    }

    /// One poll cycle: connect if needed, then refresh every pose.
    ///
    /// Losing the runtime tears the whole session down and surfaces in the
    /// status line; a single device failing to track does not.
    pub fn cycle(&mut self) -> Result<()> {
        if self.state == SessionState::Disconnected {
            self.connect()?;
        }
        if !self.runtime.is_available() {
            return Err(self.disconnect(TrackingError::RuntimeNotRunning));
        }
        self.state = SessionState::Refreshing;
        self.registry.refresh_poses(&self.runtime);
        self.state = SessionState::Connected;
        self.status = self.registry.summary();
        Ok(())
    }

    /// Re-enumerates the device set without restarting the session, for
    /// devices turned on or off since [`connect`].
    ///
    /// [`connect`]: TrackingSession::connect
    pub fn refresh_topology(&mut self) -> Result<()> {
        if self.state == SessionState::Disconnected {
            return self.connect();
        }
        self.registry.enumerate(&self.runtime, MAX_TRACKED_DEVICES);
        self.status = self.registry.summary();
        Ok(())
    }

    fn disconnect(&mut self, error: TrackingError) -> TrackingError {
        warn!("tracking session lost: {}", error);
        self.registry.clear();
        self.calibration = na::Isometry3::identity();
        self.state = SessionState::Disconnected;
        self.status = error.to_string();
        error
    }

    /// Calibration applied on top of every raw pose in [`snapshot`]. Any
    /// connect resets it to identity, so set it on a session that is already
    /// connected.
    ///
    /// [`snapshot`]: TrackingSession::snapshot
    pub fn set_calibration(&mut self, calibration: na::Isometry3<f32>) {
        self.calibration = calibration;
    }

    pub fn calibration(&self) -> &na::Isometry3<f32> {
        &self.calibration
    }

    /// Wire records for the current device set, calibration applied.
    pub fn snapshot(&self) -> Vec<DevicePose> {
        self.registry
            .devices()
            .iter()
            .map(|device| {
                let world = self.calibration * device.pose().to_isometry();
                DevicePose::from_device(device.index() as i32, device.class().to_string(), &world)
            })
            .collect()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Human-readable line describing the session, readable in any state:
    /// the device summary while connected, the failure otherwise.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockRuntime;
    use crate::pose::PoseMatrix;
    use crate::registry::{ClassCounters, DeviceClass};
    use crate::runtime::raw_class;

    fn translated(x: f32, y: f32, z: f32) -> PoseMatrix {
        PoseMatrix([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
        ])
    }

    #[test]
    fn connect_requires_installed_runtime() {
        let runtime = MockRuntime::new();
        runtime.set_installed(false);
        let mut session = TrackingSession::new(runtime);
        let error = session.cycle().unwrap_err();
        assert!(matches!(error, TrackingError::RuntimeNotInstalled));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.registry().is_empty());
        assert_eq!(session.status(), "tracking runtime is not installed on this machine");
    }

    #[test]
    fn connect_requires_running_runtime() {
        let runtime = MockRuntime::new();
        runtime.set_available(false);
        let mut session = TrackingSession::new(runtime);
        let error = session.cycle().unwrap_err();
        assert!(matches!(error, TrackingError::RuntimeNotRunning));
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn cycle_connects_and_refreshes() {
        let runtime = MockRuntime::new();
        runtime.add_device(0, raw_class::HMD);
        runtime.add_device(1, raw_class::CONTROLLER);
        let moved = translated(0.5, 1.0, -0.25);
        runtime.set_pose(1, moved);

        let mut session = TrackingSession::new(runtime);
        session.cycle().unwrap();
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(session.status(), "1 HMD, 1 Controller, 0 Trackers, 0 Lighthouses");
        assert_eq!(session.registry().devices()[1].pose(), &moved);

        let hmd = session.registry().device_by_class(DeviceClass::Hmd).unwrap();
        assert!(hmd.description(session.runtime()).starts_with("Name: HMD,Model: "));
    }

    #[test]
    fn runtime_loss_clears_session() {
        let runtime = MockRuntime::new();
        runtime.add_device(0, raw_class::HMD);
        let mut session = TrackingSession::new(runtime.clone());
        session.cycle().unwrap();
        session.set_calibration(na::Isometry3::translation(0.0, 1.7, 0.0));
        assert!(!session.registry().is_empty());

        runtime.set_available(false);
        let error = session.cycle().unwrap_err();
        assert!(matches!(error, TrackingError::RuntimeNotRunning));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.registry().is_empty());
        assert_eq!(session.registry().counters(), &ClassCounters::default());
        assert_eq!(session.calibration(), &na::Isometry3::identity());

        // the next cycle reconnects from scratch
        runtime.set_available(true);
        session.cycle().unwrap();
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(session.registry().len(), 1);
    }

    #[test]
    fn snapshot_applies_calibration() {
        let runtime = MockRuntime::new();
        runtime.add_device(2, raw_class::GENERIC_TRACKER);
        runtime.set_pose(2, translated(1.0, 0.0, 0.0));

        let mut session = TrackingSession::new(runtime);
        session.cycle().unwrap();
        session.set_calibration(na::Isometry3::translation(0.0, 2.0, 0.0));

        let records = session.snapshot();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].device_index, 2);
        assert_eq!(records[0].device_class, "Tracker");
        assert!((records[0].position.x - 1.0).abs() < 1e-6);
        assert!((records[0].position.y - 2.0).abs() < 1e-6);
        assert!(records[0].rotation.is_identity);
    }

    #[test]
    fn connect_resets_calibration_set_beforehand() {
        let runtime = MockRuntime::new();
        runtime.add_device(0, raw_class::HMD);
        runtime.set_pose(0, translated(1.0, 0.0, 0.0));

        let mut session = TrackingSession::new(runtime);
        session.set_calibration(na::Isometry3::translation(0.0, 2.0, 0.0));
        // the first cycle connects, which starts the calibration over
        session.cycle().unwrap();

        assert_eq!(session.calibration(), &na::Isometry3::identity());
        let records = session.snapshot();
        assert!((records[0].position.x - 1.0).abs() < 1e-6);
        assert!(records[0].position.y.abs() < 1e-6);
    }

    #[test]
    fn refresh_topology_picks_up_new_devices() {
        let runtime = MockRuntime::new();
        runtime.add_device(0, raw_class::HMD);
        let mut session = TrackingSession::new(runtime.clone());
        session.cycle().unwrap();
        assert_eq!(session.registry().len(), 1);

        runtime.add_device(1, raw_class::GENERIC_TRACKER);
        // a plain cycle refreshes poses but keeps the topology
        session.cycle().unwrap();
        assert_eq!(session.registry().len(), 1);

        session.refresh_topology().unwrap();
        assert_eq!(session.registry().len(), 2);
        assert_eq!(session.registry().counters().generic_trackers, 1);
        assert_eq!(session.status(), "1 HMD, 0 Controllers, 1 Tracker, 0 Lighthouses");
    }
}
