//! Bridges OpenVR-style room tracking into plain Rust. A session enumerates
//! the tracked devices a runtime reports and polls their 3x4 poses on a
//! fixed cadence; the pose codec turns each pose into a translation, Euler
//! angles, a unit quaternion or a JSON record for downstream consumers.

pub mod mock;
pub mod poller;
pub mod pose;
pub mod registry;
pub mod runtime;
pub mod session;
pub mod wire;

#[cfg(feature = "openvr")]
pub mod openvr_adaptor;

pub use crate::poller::{PollSnapshot, Poller};
pub use crate::pose::PoseMatrix;
pub use crate::registry::{ClassCounters, DeviceClass, DeviceRegistry, TrackedDevice};
pub use crate::runtime::{
    DeviceProperty, TrackingError, TrackingRuntime, MAX_TRACKED_DEVICES,
};
pub use crate::session::{SessionState, TrackingSession};
pub use crate::wire::DevicePose;
