use anyhow::Result;

use crate::pose::PoseMatrix;
use crate::runtime;
use crate::runtime::{raw_class, DeviceProperty, TrackingError, TrackingRuntime};

/// Tracking runtime backed by a live OpenVR installation.
pub struct OpenVrRuntime {
    /// Context needs to be kept around for interop reasons
    /// Otherwise you get a segfault
    #[allow(dead_code)]
    context: openvr::Context,
    system: openvr::System,
}

impl OpenVrRuntime {
    /// Initialises OpenVR as a background application, no rendering surface.
    /// Fails with the SDK's own message when the runtime is missing or not
    /// running.
    pub fn new() -> Result<OpenVrRuntime> {
        let context = unsafe { openvr::init(openvr::ApplicationType::Other) }?;
        let system = context.system()?;
        Ok(OpenVrRuntime { context, system })
    }
}

impl TrackingRuntime for OpenVrRuntime {
    // construction already proved both probes; the SDK offers no safe way to
    // re-ask once a context exists, devices go stale instead
    fn is_installed(&self) -> bool {
        true
    }

    fn is_available(&self) -> bool {
        true
    }

    fn device_class(&self, index: u32) -> u32 {
        match self.system.tracked_device_class(index) {
            openvr::TrackedDeviceClass::HMD => raw_class::HMD,
            openvr::TrackedDeviceClass::Controller => raw_class::CONTROLLER,
            openvr::TrackedDeviceClass::GenericTracker => raw_class::GENERIC_TRACKER,
            openvr::TrackedDeviceClass::TrackingReference => raw_class::TRACKING_REFERENCE,
            _ => raw_class::INVALID,
        }
    }

    fn is_device_connected(&self, index: u32) -> bool {
        self.system.is_tracked_device_connected(index)
    }

    fn device_pose(&self, index: u32) -> runtime::Result<PoseMatrix> {
        let poses = self
            .system
            .device_to_absolute_tracking_pose(openvr::TrackingUniverseOrigin::Standing, 0.0);
        let pose = poses
            .get(index as usize)
            .filter(|pose| pose.pose_is_valid())
            .ok_or(TrackingError::DeviceIndexInvalid(index))?;
        Ok(PoseMatrix(*pose.device_to_absolute_tracking()))
    }

    fn string_property(&self, index: u32, property: DeviceProperty) -> runtime::Result<String> {
        match property {
            DeviceProperty::ModelNumber => Ok(self
                .system
                .string_tracked_device_property(index, openvr::property::ModelNumber_String)
                .map_err(|error| TrackingError::PropertyUnavailable(error.to_string()))?
                .to_string_lossy()
                .into_owned()),
            DeviceProperty::SerialNumber => Ok(self
                .system
                .string_tracked_device_property(index, openvr::property::SerialNumber_String)
                .map_err(|error| TrackingError::PropertyUnavailable(error.to_string()))?
                .to_string_lossy()
                .into_owned()),
            DeviceProperty::BatteryPercentage => {
                let level = self
                    .system
                    .float_tracked_device_property(
                        index,
                        openvr::property::DeviceBatteryPercentage_Float,
                    )
                    .map_err(|error| TrackingError::PropertyUnavailable(error.to_string()))?;
                Ok(format!("{:.0} %", level * 100.0))
            }
        }
    }
}
