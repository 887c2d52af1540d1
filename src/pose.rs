use nalgebra as na;
use std::fmt;

/// Below this margin of |sin(pitch)| from 1 the yaw and roll axes have
/// collapsed onto each other and the regular extraction would divide by
/// cos(pitch) ~ 0.
const GIMBAL_LOCK_EPS: f32 = 1e-6;

/// Rigid device pose as the tracking runtime reports it: a 3x4 row-major
/// matrix whose first three columns are the rotation and whose last column
/// is the translation in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseMatrix(pub [[f32; 4]; 3]);

impl PoseMatrix {
    pub const IDENTITY: PoseMatrix = PoseMatrix([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
    ]);

    /// Translation component (the fourth column).
    pub fn to_position(&self) -> na::Point3<f32> {
        let m = &self.0;
        na::Point3::new(m[0][3], m[1][3], m[2][3])
    }

    /// Rotation component as a unit quaternion.
    ///
    /// Uses the largest-branch extraction from
    /// [euclideanspace.com](http://www.euclideanspace.com/maths/geometry/rotations/conversions/matrixToQuaternion/index.htm):
    /// picking the largest of the trace and the three diagonal entries keeps
    /// the divisor away from zero for every rotation, including half turns
    /// where the off-diagonal sign sources vanish.
    #[allow(clippy::many_single_char_names)]
    pub fn to_rotation(&self) -> na::UnitQuaternion<f32> {
        let m = &self.0;
        let trace = m[0][0] + m[1][1] + m[2][2];
        let (w, i, j, k);
        if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            w = 0.25 * s;
            i = (m[2][1] - m[1][2]) / s;
            j = (m[0][2] - m[2][0]) / s;
            k = (m[1][0] - m[0][1]) / s;
        } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
            let s = (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
            w = (m[2][1] - m[1][2]) / s;
            i = 0.25 * s;
            j = (m[0][1] + m[1][0]) / s;
            k = (m[0][2] + m[2][0]) / s;
        } else if m[1][1] > m[2][2] {
            let s = (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
            w = (m[0][2] - m[2][0]) / s;
            i = (m[0][1] + m[1][0]) / s;
            j = 0.25 * s;
            k = (m[1][2] + m[2][1]) / s;
        } else {
            let s = (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
            w = (m[1][0] - m[0][1]) / s;
            i = (m[0][2] + m[2][0]) / s;
            j = (m[1][2] + m[2][1]) / s;
            k = 0.25 * s;
        }
        na::UnitQuaternion::from_quaternion(na::Quaternion::new(w, i, j, k))
    }

    /// Euler angles `(roll, pitch, yaw)` in radians for the intrinsic Z-Y-X
    /// composition `R = Rz(yaw) * Ry(pitch) * Rx(roll)`, the same convention
    /// as nalgebra's `from_euler_angles`.
    ///
    /// At pitch = ±90° the yaw and roll axes coincide; yaw is pinned to zero
    /// and roll absorbs the remaining rotation, so the returned triple still
    /// rebuilds the matrix.
    pub fn to_euler(&self) -> (f32, f32, f32) {
        let m = &self.0;
        if m[2][0].abs() < 1.0 - GIMBAL_LOCK_EPS {
            let roll = m[2][1].atan2(m[2][2]);
            let pitch = (-m[2][0]).asin();
            let yaw = m[1][0].atan2(m[0][0]);
            (roll, pitch, yaw)
        } else if m[2][0] < 0.0 {
            // pitch = +90°, only roll - yaw is determined
            (m[0][1].atan2(m[0][2]), std::f32::consts::FRAC_PI_2, 0.0)
        } else {
            // pitch = -90°, only roll + yaw is determined
            ((-m[0][1]).atan2(-m[0][2]), -std::f32::consts::FRAC_PI_2, 0.0)
        }
    }

    pub fn to_isometry(&self) -> na::Isometry3<f32> {
        na::Isometry3::from_parts(self.to_position().coords.into(), self.to_rotation())
    }

    pub fn from_isometry(isometry: &na::Isometry3<f32>) -> PoseMatrix {
        let rotation = isometry.rotation.to_rotation_matrix();
        let r = rotation.matrix();
        let t = &isometry.translation.vector;
        PoseMatrix([
            [r[(0, 0)], r[(0, 1)], r[(0, 2)], t.x],
            [r[(1, 0)], r[(1, 1)], r[(1, 2)], t.y],
            [r[(2, 0)], r[(2, 1)], r[(2, 2)], t.z],
        ])
    }
}

impl Default for PoseMatrix {
    fn default() -> Self {
        PoseMatrix::IDENTITY
    }
}

/// Canonical text form: the twelve entries comma separated in row-major
/// order, identity printing as `1,0,0,0,0,1,0,0,0,0,1,0`.
impl fmt::Display for PoseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.0;
        write!(
            f,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            m[0][0], m[0][1], m[0][2], m[0][3],
            m[1][0], m[1][1], m[1][2], m[1][3],
            m[2][0], m[2][1], m[2][2], m[2][3],
        )
    }
}
