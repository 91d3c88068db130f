//! Vector helpers and bone-frame math.
//!
//! Bones are stored as a head point, a tail point and a roll angle. The bone's
//! local frame is derived from those: Y runs from head to tail, and X/Z are the
//! world axes carried onto Y by the shortest-arc rotation, then spun by `roll`.

use nalgebra::{UnitQuaternion, Vector3};

/// 3D vector type used for bone heads, tails and axes.
pub type Vec3 = Vector3<f64>;

/// Tolerance for degenerate vectors and coincident points.
pub const EPSILON: f64 = 1e-9;

/// Orthonormal local axes of a bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneAxes {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

/// Returns the rotation that carries the rest Y axis onto `dir`, then rolls it
/// by `roll` radians around that axis.
pub fn bone_rotation(dir: &Vec3, roll: f64) -> UnitQuaternion<f64> {
    let align = match dir.try_normalize(EPSILON) {
        Some(nor) => UnitQuaternion::rotation_between(&Vec3::y(), &nor).unwrap_or_else(|| {
            // Anti-parallel to +Y: half turn around Z keeps X/Z well defined.
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::PI)
        }),
        None => UnitQuaternion::identity(),
    };
    align * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), roll)
}

/// Computes the local axes of a bone from its head, tail and roll.
pub fn bone_axes(head: &Vec3, tail: &Vec3, roll: f64) -> BoneAxes {
    let rot = bone_rotation(&(tail - head), roll);
    BoneAxes {
        x: rot * Vec3::x(),
        y: rot * Vec3::y(),
        z: rot * Vec3::z(),
    }
}

/// Returns the roll that makes the bone's Z axis point along the component of
/// `target` perpendicular to the bone.
///
/// Returns `None` when `target` is parallel to the bone or degenerate.
pub fn roll_for_z_axis(head: &Vec3, tail: &Vec3, target: &Vec3) -> Option<f64> {
    let dir = (tail - head).try_normalize(EPSILON)?;
    let projected = (target - dir * dir.dot(target)).try_normalize(EPSILON)?;
    let rest = bone_axes(head, tail, 0.0);
    let angle = rest.z.dot(&projected).clamp(-1.0, 1.0).acos();
    let sign = if rest.z.cross(&projected).dot(&dir) < 0.0 {
        -1.0
    } else {
        1.0
    };
    Some(sign * angle)
}

/// Returns the roll that makes the bone's X axis point along the component of
/// `target` perpendicular to the bone.
pub fn roll_for_x_axis(head: &Vec3, tail: &Vec3, target: &Vec3) -> Option<f64> {
    let dir = (tail - head).try_normalize(EPSILON)?;
    // X = Y x Z, so aligning X with `target` is aligning Z with `target x Y`.
    let z_target = target.cross(&dir);
    roll_for_z_axis(head, tail, &z_target)
}

/// Midpoint of two points.
pub fn midpoint(a: &Vec3, b: &Vec3) -> Vec3 {
    (a + b) / 2.0
}

/// Converts an array triple into a vector.
pub fn vec3(v: [f64; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).norm() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_axes_of_bone_along_y() {
        let axes = bone_axes(&Vec3::zeros(), &Vec3::new(0.0, 2.0, 0.0), 0.0);
        assert_vec_eq(axes.x, Vec3::x());
        assert_vec_eq(axes.y, Vec3::y());
        assert_vec_eq(axes.z, Vec3::z());
    }

    #[test]
    fn test_axes_of_bone_along_negative_y() {
        let axes = bone_axes(&Vec3::zeros(), &Vec3::new(0.0, -1.0, 0.0), 0.0);
        assert_vec_eq(axes.y, -Vec3::y());
        assert_vec_eq(axes.x, -Vec3::x());
        assert_vec_eq(axes.z, Vec3::z());
    }

    #[test]
    fn test_axes_of_bone_pointing_down() {
        let axes = bone_axes(&Vec3::zeros(), &Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert_vec_eq(axes.y, -Vec3::z());
        assert_vec_eq(axes.x, Vec3::x());
        assert_vec_eq(axes.z, Vec3::y());
    }

    #[test]
    fn test_roll_rotates_x_around_y() {
        let axes = bone_axes(
            &Vec3::zeros(),
            &Vec3::new(0.0, 1.0, 0.0),
            std::f64::consts::FRAC_PI_2,
        );
        assert_vec_eq(axes.y, Vec3::y());
        assert!((axes.x.dot(&Vec3::x())).abs() < 1e-9);
    }

    #[test]
    fn test_roll_for_z_axis_round_trips() {
        let head = Vec3::new(0.1, 0.2, 0.3);
        let tail = Vec3::new(0.4, -0.5, 1.0);
        let target = Vec3::new(1.0, 1.0, 0.0);
        let roll = roll_for_z_axis(&head, &tail, &target).unwrap();
        let axes = bone_axes(&head, &tail, roll);
        let dir = (tail - head).normalize();
        let expected = (target - dir * dir.dot(&target)).normalize();
        assert_vec_eq(axes.z, expected);
    }

    #[test]
    fn test_roll_for_x_axis_round_trips() {
        let head = Vec3::zeros();
        let tail = Vec3::new(0.0, 0.0, 1.0);
        let roll = roll_for_x_axis(&head, &tail, &Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let axes = bone_axes(&head, &tail, roll);
        assert_vec_eq(axes.x, Vec3::y());
    }

    #[test]
    fn test_roll_for_parallel_target_is_none() {
        let head = Vec3::zeros();
        let tail = Vec3::new(0.0, 0.0, 1.0);
        assert!(roll_for_z_axis(&head, &tail, &Vec3::new(0.0, 0.0, 3.0)).is_none());
    }
}
