use nalgebra::{Matrix3, Rotation3, Translation3, Vector3};

use crate::geometry::{JointAngles, LinkGeometry, Position};

/// Rotation about the Y axis as used by the pitch joints.
///
/// Positive angles tip the Z axis toward negative X.
fn rotation_pitch(theta: f64) -> Rotation3<f64> {
    let (sin, cos) = theta.sin_cos();

    Rotation3::from_matrix_unchecked(Matrix3::new(
        cos, 0.0, -sin, //
        0.0, 1.0, 0.0, //
        sin, 0.0, cos,
    ))
}

/// Rotation about the Z axis.
fn rotation_yaw(theta: f64) -> Rotation3<f64> {
    let (sin, cos) = theta.sin_cos();

    Rotation3::from_matrix_unchecked(Matrix3::new(
        cos, -sin, 0.0, //
        sin, cos, 0.0, //
        0.0, 0.0, 1.0,
    ))
}

#[derive(Clone, Copy, Debug)]
pub struct ForwardKinematics {
    geometry: LinkGeometry,
}

impl ForwardKinematics {
    pub fn new(geometry: LinkGeometry) -> Self {
        Self { geometry }
    }

    #[inline]
    pub fn geometry(&self) -> &LinkGeometry {
        &self.geometry
    }

    /// Compute the end-effector position in the base frame.
    ///
    /// The chain is walked from the effector back to the base: the lower
    /// link is rotated by the knee, offset by the upper link, rotated by the
    /// hip pitch, offset by the hip and finally rotated by the hip yaw.
    pub fn solve(&self, angles: &JointAngles) -> Position {
        let effector = Position::new(0.0, 0.0, self.geometry.l2);

        let knee = Translation3::new(0.0, 0.0, self.geometry.l1) * rotation_pitch(angles[2]);
        let hip_pitch =
            Translation3::new(0.0, -self.geometry.hip_offset, 0.0) * rotation_pitch(angles[1]);
        let hip_yaw = rotation_yaw(-angles[0]);

        hip_yaw * (hip_pitch * (knee * effector))
    }

    /// Vector from the desired position to the reached position.
    pub fn residual(&self, desired: &Position, angles: &JointAngles) -> Vector3<f64> {
        self.solve(angles) - desired
    }

    /// Euclidean distance between the reached and the desired position.
    pub fn position_error(&self, desired: &Position, angles: &JointAngles) -> f64 {
        self.residual(desired, angles).norm()
    }
}
