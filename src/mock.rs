use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::pose::PoseMatrix;
use crate::runtime::{raw_class, DeviceProperty, Result, TrackingError, TrackingRuntime};

/// Scripted in-memory runtime for tests and offline development.
///
/// Clones share one underlying state, so a caller can keep a handle and
/// change slots or availability while a session polls another clone.
#[derive(Debug, Clone)]
pub struct MockRuntime {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug)]
struct MockState {
    installed: bool,
    available: bool,
    slots: HashMap<u32, MockSlot>,
}

#[derive(Debug, Clone)]
struct MockSlot {
    class: u32,
    // None makes pose fetches fail while the device stays enumerated
    pose: Option<PoseMatrix>,
    model: String,
    serial: String,
    battery: Option<String>,
}

impl MockRuntime {
    pub fn new() -> MockRuntime {
        MockRuntime {
            inner: Arc::new(Mutex::new(MockState {
                installed: true,
                available: true,
                slots: HashMap::new(),
            })),
        }
    }

    pub fn set_installed(&self, installed: bool) {
        self.inner.lock().unwrap().installed = installed;
    }

    pub fn set_available(&self, available: bool) {
        self.inner.lock().unwrap().available = available;
    }

    /// Occupies a slot with a device of the given raw class, posed at the
    /// identity with placeholder properties.
    pub fn add_device(&self, index: u32, class: u32) {
        self.inner.lock().unwrap().slots.insert(
            index,
            MockSlot {
                class,
                pose: Some(PoseMatrix::IDENTITY),
                model: format!("Mock Model {}", index),
                serial: format!("MOCK-{:04}", index),
                battery: Some(String::from("100 %")),
            },
        );
    }

    pub fn remove_device(&self, index: u32) {
        self.inner.lock().unwrap().slots.remove(&index);
    }

    pub fn set_pose(&self, index: u32, pose: PoseMatrix) {
        if let Some(slot) = self.inner.lock().unwrap().slots.get_mut(&index) {
            slot.pose = Some(pose);
        }
    }

    /// Makes pose fetches for the slot fail until `set_pose` is called
    /// again, the way a runtime reports a device that stopped tracking.
    pub fn invalidate_pose(&self, index: u32) {
        if let Some(slot) = self.inner.lock().unwrap().slots.get_mut(&index) {
            slot.pose = None;
        }
    }

    /// Makes the battery property fail for the slot.
    pub fn drop_battery(&self, index: u32) {
        if let Some(slot) = self.inner.lock().unwrap().slots.get_mut(&index) {
            slot.battery = None;
        }
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        MockRuntime::new()
    }
}

impl TrackingRuntime for MockRuntime {
    fn is_installed(&self) -> bool {
        self.inner.lock().unwrap().installed
    }

    fn is_available(&self) -> bool {
        self.inner.lock().unwrap().available
    }

    fn device_class(&self, index: u32) -> u32 {
        self.inner
            .lock()
            .unwrap()
            .slots
            .get(&index)
            .map(|slot| slot.class)
            .unwrap_or(raw_class::INVALID)
    }

    fn is_device_connected(&self, index: u32) -> bool {
        self.inner.lock().unwrap().slots.contains_key(&index)
    }

    fn device_pose(&self, index: u32) -> Result<PoseMatrix> {
        self.inner
            .lock()
            .unwrap()
            .slots
            .get(&index)
            .and_then(|slot| slot.pose)
            .ok_or(TrackingError::DeviceIndexInvalid(index))
    }

    fn string_property(&self, index: u32, property: DeviceProperty) -> Result<String> {
        let state = self.inner.lock().unwrap();
        let slot = state
            .slots
            .get(&index)
            .ok_or(TrackingError::DeviceIndexInvalid(index))?;
        match property {
            DeviceProperty::ModelNumber => Ok(slot.model.clone()),
            DeviceProperty::SerialNumber => Ok(slot.serial.clone()),
            DeviceProperty::BatteryPercentage => slot.battery.clone().ok_or_else(|| {
                TrackingError::PropertyUnavailable(String::from("battery not reported"))
            }),
        }
    }
}
