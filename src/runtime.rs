use thiserror::Error;

use crate::pose::PoseMatrix;

/// Device slots a runtime reports; indices are `0..MAX_TRACKED_DEVICES`.
pub const MAX_TRACKED_DEVICES: u32 = 16;

/// Raw device class codes on the wire. Codes outside this set classify as
/// unknown rather than failing.
pub mod raw_class {
    pub const INVALID: u32 = 0;
    pub const HMD: u32 = 1;
    pub const CONTROLLER: u32 = 2;
    pub const GENERIC_TRACKER: u32 = 3;
    pub const TRACKING_REFERENCE: u32 = 4;
}

/// String properties fetched on demand rather than cached at enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceProperty {
    ModelNumber,
    SerialNumber,
    BatteryPercentage,
}

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("tracking runtime is not installed on this machine")]
    RuntimeNotInstalled,
    #[error("tracking runtime is not running, start SteamVR first")]
    RuntimeNotRunning,
    #[error("device index {0} is no longer valid")]
    DeviceIndexInvalid(u32),
    #[error("property unavailable: {0}")]
    PropertyUnavailable(String),
}

pub type Result<T> = std::result::Result<T, TrackingError>;

/// What the bookkeeping needs from a live tracking runtime. One session owns
/// one handle; implementations only need `&self` to be queried.
pub trait TrackingRuntime {
    /// Runtime software present on the machine at all.
    fn is_installed(&self) -> bool;

    /// Runtime server currently reachable.
    fn is_available(&self) -> bool;

    /// Raw class code for a slot, `raw_class::INVALID` when empty.
    fn device_class(&self, index: u32) -> u32;

    /// Whether the slot holds a connected device right now.
    fn is_device_connected(&self, index: u32) -> bool;

    /// Latest pose for a slot; fails with `DeviceIndexInvalid` when the slot
    /// no longer tracks.
    fn device_pose(&self, index: u32) -> Result<PoseMatrix>;

    /// On-demand string property for a slot.
    fn string_property(&self, index: u32, property: DeviceProperty) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_failure() {
        assert!(TrackingError::RuntimeNotRunning.to_string().contains("SteamVR"));
        assert_eq!(
            TrackingError::DeviceIndexInvalid(7).to_string(),
            "device index 7 is no longer valid"
        );
        assert!(TrackingError::PropertyUnavailable("no battery".to_owned())
            .to_string()
            .contains("no battery"));
    }
}
