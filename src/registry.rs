use log::trace;
use std::fmt;

use crate::pose::PoseMatrix;
use crate::runtime::{raw_class, DeviceProperty, TrackingRuntime};

/// Stand-in for device properties the runtime cannot provide.
pub const UNKNOWN_PROPERTY: &str = "<unknown>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Hmd,
    Controller,
    GenericTracker,
    TrackingReference,
    Unknown,
}

impl DeviceClass {
    pub fn from_raw(raw: u32) -> DeviceClass {
        match raw {
            raw_class::HMD => DeviceClass::Hmd,
            raw_class::CONTROLLER => DeviceClass::Controller,
            raw_class::GENERIC_TRACKER => DeviceClass::GenericTracker,
            raw_class::TRACKING_REFERENCE => DeviceClass::TrackingReference,
            _ => DeviceClass::Unknown,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceClass::Hmd => "HMD",
            DeviceClass::Controller => "Controller",
            DeviceClass::GenericTracker => "Tracker",
            DeviceClass::TrackingReference => "Lighthouse",
            DeviceClass::Unknown => "unknown",
        })
    }
}

/// Per-class device counts for one enumeration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounters {
    pub hmds: u32,
    pub controllers: u32,
    pub generic_trackers: u32,
    pub tracking_references: u32,
}

impl ClassCounters {
    /// Classifies a raw class code and counts the device in the same step,
    /// so the counters can never drift from the device set they describe.
    pub fn classify(&mut self, raw: u32) -> DeviceClass {
        let class = DeviceClass::from_raw(raw);
        match class {
            DeviceClass::Hmd => self.hmds += 1,
            DeviceClass::Controller => self.controllers += 1,
            DeviceClass::GenericTracker => self.generic_trackers += 1,
            DeviceClass::TrackingReference => self.tracking_references += 1,
            DeviceClass::Unknown => {}
        }
        class
    }
}

/// One tracked device the runtime reported at enumeration time.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedDevice {
    index: u32,
    class: DeviceClass,
    pose: PoseMatrix,
}

impl TrackedDevice {
    fn new(index: u32, class: DeviceClass) -> TrackedDevice {
        TrackedDevice {
            index,
            class,
            pose: PoseMatrix::IDENTITY,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn class(&self) -> DeviceClass {
        self.class
    }

    /// Last pose the registry fetched for this device, identity until the
    /// first refresh.
    pub fn pose(&self) -> &PoseMatrix {
        &self.pose
    }

    pub fn model_number<R: TrackingRuntime>(&self, runtime: &R) -> String {
        self.string_property(runtime, DeviceProperty::ModelNumber)
    }

    pub fn serial_number<R: TrackingRuntime>(&self, runtime: &R) -> String {
        self.string_property(runtime, DeviceProperty::SerialNumber)
    }

    pub fn battery<R: TrackingRuntime>(&self, runtime: &R) -> String {
        self.string_property(runtime, DeviceProperty::BatteryPercentage)
    }

    // properties degrade to a placeholder, a device with no battery must not
    // fail a status line
    fn string_property<R: TrackingRuntime>(&self, runtime: &R, property: DeviceProperty) -> String {
        runtime
            .string_property(self.index, property)
            .unwrap_or_else(|error| {
                trace!("device {}: {}", self.index, error);
                UNKNOWN_PROPERTY.to_owned()
            })
    }

    /// One-line description with on-demand properties.
    pub fn description<R: TrackingRuntime>(&self, runtime: &R) -> String {
        format!(
            "Name: {},Model: {},Serial: {},Battery: {}",
            self.class,
            self.model_number(runtime),
            self.serial_number(runtime),
            self.battery(runtime)
        )
    }
}

/// Tracked-device set and per-class counts for one session.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<TrackedDevice>,
    counters: ClassCounters,
}

impl DeviceRegistry {
    pub fn new() -> DeviceRegistry {
        DeviceRegistry::default()
    }

    /// Rebuilds the device set from the slots `runtime` reports connected,
    /// in slot order.
    ///
    /// The new set and its counters are built aside and swapped in together,
    /// so a reader never observes a half-finished enumeration.
    pub fn enumerate<R: TrackingRuntime>(&mut self, runtime: &R, max_slots: u32) {
        let mut devices = Vec::new();
        let mut counters = ClassCounters::default();
        for index in 0..max_slots {
            if !runtime.is_device_connected(index) {
                continue;
            }
            let class = counters.classify(runtime.device_class(index));
            devices.push(TrackedDevice::new(index, class));
        }
        self.devices = devices;
        self.counters = counters;
    }

    /// Refreshes every device pose in place. A device whose index went stale
    /// keeps its last-known pose; the rest still refresh.
    pub fn refresh_poses<R: TrackingRuntime>(&mut self, runtime: &R) {
        for device in &mut self.devices {
            match runtime.device_pose(device.index) {
                Ok(pose) => {
                    device.pose = pose;
                    trace!("device {} pose {}", device.index, pose);
                }
                Err(error) => trace!("device {} pose kept: {}", device.index, error),
            }
        }
    }

    /// One-line per-class count, e.g.
    /// `1 HMD, 2 Controllers, 0 Trackers, 1 Lighthouse`.
    pub fn summary(&self) -> String {
        let c = &self.counters;
        format!(
            "{}, {}, {}, {}",
            plural(c.hmds, "HMD"),
            plural(c.controllers, "Controller"),
            plural(c.generic_trackers, "Tracker"),
            plural(c.tracking_references, "Lighthouse"),
        )
    }

    pub fn devices(&self) -> &[TrackedDevice] {
        &self.devices
    }

    pub fn counters(&self) -> &ClassCounters {
        &self.counters
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// First device of a class, in slot order.
    pub fn device_by_class(&self, class: DeviceClass) -> Option<&TrackedDevice> {
        self.devices.iter().find(|device| device.class == class)
    }

    /// Drops every device and zeroes the counters.
    pub fn clear(&mut self) {
        self.devices.clear();
        self.counters = ClassCounters::default();
    }
}

fn plural(count: u32, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
