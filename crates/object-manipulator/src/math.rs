use enumset::{EnumSet, EnumSetType};

pub use glam::{BVec3, DQuat, DVec3, EulerRot};

/// Squared lengths below this are treated as zero.
pub(crate) const EPSILON_SQUARED: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Transform {
    pub scale: mint::Vector3<f64>,
    pub rotation: mint::Quaternion<f64>,
    pub translation: mint::Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: DVec3::ONE.into(),
            rotation: DQuat::IDENTITY.into(),
            translation: DVec3::ZERO.into(),
        }
    }
}

impl Transform {
    pub fn from_scale_rotation_translation(
        scale: impl Into<mint::Vector3<f64>>,
        rotation: impl Into<mint::Quaternion<f64>>,
        translation: impl Into<mint::Vector3<f64>>,
    ) -> Self {
        Self {
            scale: scale.into(),
            rotation: rotation.into(),
            translation: translation.into(),
        }
    }

    pub fn from_translation(translation: impl Into<mint::Vector3<f64>>) -> Self {
        Self {
            translation: translation.into(),
            ..Default::default()
        }
    }
}

/// Position and orientation of a tracked joint or pointer in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: DVec3,
    pub rotation: DQuat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: DVec3, rotation: DQuat) -> Self {
        Self { position, rotation }
    }
}

/// A world space axis.
#[derive(Debug, EnumSetType, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Unit vector pointing along this axis.
    pub fn unit(self) -> DVec3 {
        match self {
            Self::X => DVec3::X,
            Self::Y => DVec3::Y,
            Self::Z => DVec3::Z,
        }
    }
}

/// Interpolation factor for frame-rate independent exponential smoothing.
///
/// A `smoothing` of zero snaps to the target immediately. Values approaching
/// one damp the movement more and more.
pub fn lerp_factor(smoothing: f64, delta_time: f64) -> f64 {
    if smoothing <= 0.0 {
        return 1.0;
    }

    (1.0 - smoothing.powf(delta_time.max(0.0))).clamp(0.0, 1.0)
}

/// Projects `vector` onto the plane with the given unit `normal`.
pub(crate) fn project_on_plane(vector: DVec3, normal: DVec3) -> DVec3 {
    vector - normal * vector.dot(normal)
}

/// Twist part of the swing-twist decomposition of `rotation` around the unit `axis`.
///
/// Returns identity when the twist is undefined, i.e. when `rotation` is a half turn
/// around an axis perpendicular to `axis`.
pub(crate) fn twist(rotation: DQuat, axis: DVec3) -> DQuat {
    let projected = axis * rotation.xyz().dot(axis);
    let twist = DQuat::from_xyzw(projected.x, projected.y, projected.z, rotation.w);

    if twist.length_squared() < EPSILON_SQUARED {
        DQuat::IDENTITY
    } else {
        twist.normalize()
    }
}

/// Limits the change from `start` to `target` to a rotation around the given world axis.
pub(crate) fn constrain_rotation(start: DQuat, target: DQuat, axis: Option<Axis>) -> DQuat {
    let Some(axis) = axis else {
        return target;
    };

    (twist(target * start.inverse(), axis.unit()) * start).normalize()
}

/// Keeps the components of `target` on axes missing from `axes` at their `start` values.
pub(crate) fn constrain_translation(start: DVec3, target: DVec3, axes: EnumSet<Axis>) -> DVec3 {
    let mask = BVec3::new(
        axes.contains(Axis::X),
        axes.contains(Axis::Y),
        axes.contains(Axis::Z),
    );

    DVec3::select(mask, target, start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn zero_smoothing_snaps_for_any_delta_time() {
        for dt in [0.0, 0.001, 1.0 / 60.0, 0.5, 10.0] {
            assert_eq!(lerp_factor(0.0, dt), 1.0);
        }
    }

    #[test]
    fn lerp_factor_decreases_as_smoothing_approaches_one() {
        let dt = 1.0 / 90.0;
        let mut previous = lerp_factor(0.0, dt);
        for smoothing in [0.001, 0.1, 0.5, 0.9, 0.99, 0.999_999] {
            let factor = lerp_factor(smoothing, dt);
            assert!(factor < previous, "{smoothing}: {factor} >= {previous}");
            previous = factor;
        }
        assert!(previous < 1e-6);
    }

    #[test]
    fn lerp_factor_is_frame_rate_independent() {
        let smoothing = 0.01;
        let one_step = lerp_factor(smoothing, 0.02);
        let half_step = lerp_factor(smoothing, 0.01);
        // Two half steps cover the same fraction as one full step.
        let two_half_steps = 1.0 - (1.0 - half_step) * (1.0 - half_step);
        assert_relative_eq!(one_step, two_half_steps, epsilon = 1e-12);
    }

    #[test]
    fn twist_extracts_rotation_around_axis() {
        let yaw = DQuat::from_rotation_y(0.7);
        let pitch = DQuat::from_rotation_x(0.3);
        let rotation = yaw * pitch;

        let extracted = twist(rotation, DVec3::Y);
        let (y, x, z) = extracted.to_euler(EulerRot::YXZ);
        assert_relative_eq!(x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(z, 0.0, epsilon = 1e-9);
        assert!(y > 0.0);
    }

    #[test]
    fn twist_of_perpendicular_half_turn_is_identity() {
        let rotation = DQuat::from_rotation_x(std::f64::consts::PI);
        assert_eq!(twist(rotation, DVec3::Y), DQuat::IDENTITY);
    }

    #[test]
    fn constrained_rotation_only_changes_constrained_axis() {
        let start = DQuat::from_euler(EulerRot::YXZ, 0.2, 0.4, -0.1);
        let target = DQuat::from_rotation_z(FRAC_PI_2) * start;

        let constrained = constrain_rotation(start, target, Some(Axis::Y));
        let (_, sx, sz) = start.to_euler(EulerRot::YXZ);
        let (_, cx, cz) = constrained.to_euler(EulerRot::YXZ);
        assert_relative_eq!(sx, cx, epsilon = 1e-9);
        assert_relative_eq!(sz, cz, epsilon = 1e-9);

        assert_eq!(constrain_rotation(start, target, None), target);
    }

    #[test]
    fn translation_keeps_disallowed_components() {
        let start = DVec3::new(1.0, 2.0, 3.0);
        let target = DVec3::new(4.0, 5.0, 6.0);

        assert_eq!(
            constrain_translation(start, target, Axis::X | Axis::Z),
            DVec3::new(4.0, 2.0, 6.0)
        );
        assert_eq!(constrain_translation(start, target, EnumSet::all()), target);
        assert_eq!(constrain_translation(start, target, EnumSet::empty()), start);
    }

    #[test]
    fn plane_projection_removes_normal_component() {
        let projected = project_on_plane(DVec3::new(1.0, 2.0, 3.0), DVec3::Y);
        assert_eq!(projected, DVec3::new(1.0, 0.0, 3.0));
    }
}
