use nalgebra as na;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// `is_identity` marks an exactly-identity orientation so consumers can skip
/// rotating altogether.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
    pub is_identity: bool,
}

/// One tracked device pose as downstream consumers see it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DevicePose {
    pub device_index: i32,
    pub device_class: String,
    pub position: Vector,
    pub rotation: Quaternion,
}

impl DevicePose {
    pub fn from_device(
        device_index: i32,
        device_class: String,
        pose: &na::Isometry3<f32>,
    ) -> DevicePose {
        let translation = &pose.translation.vector;
        let quat = pose.rotation.into_inner().coords;
        DevicePose {
            device_index,
            device_class,
            position: Vector {
                x: translation.x,
                y: translation.y,
                z: translation.z,
            },
            rotation: Quaternion {
                x: quat.x,
                y: quat.y,
                z: quat.z,
                w: quat.w,
                is_identity: pose.rotation == na::UnitQuaternion::identity(),
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(data: &[u8]) -> serde_json::Result<DevicePose> {
        serde_json::from_slice(data)
    }
}
