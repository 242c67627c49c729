//! Per-part evaluated state at a single time.

use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::channel::ChannelSet;
use crate::data::PartDef;

/// Discrete facing of an actor body part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    North,
    East,
    South,
    West,
}

impl Facing {
    /// Decode from a sampled curve value (truncated, wrapped modulo 4).
    #[inline]
    pub fn from_index(value: i64) -> Self {
        match value.rem_euclid(4) {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            _ => Self::West,
        }
    }

    /// Facing after applying instance mirroring: horizontal mirroring swaps
    /// east/west, vertical mirroring swaps north/south.
    pub fn mirrored(self, mirror_x: bool, mirror_y: bool) -> Self {
        match self {
            Self::North if mirror_y => Self::South,
            Self::South if mirror_y => Self::North,
            Self::East if mirror_x => Self::West,
            Self::West if mirror_x => Self::East,
            other => other,
        }
    }
}

/// The fully evaluated state of one part at one instant.
///
/// Local fields come straight from curve sampling; the matrices are filled in
/// by the world pass once every parent in the same pass has been evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSnapshot {
    /// False only for the dummy snapshot handed out on invalid lookups.
    pub valid: bool,
    pub time: f32,

    pub local_position: Vector3<f32>,
    /// Euler angles in degrees, applied yaw-pitch-roll (y, then x, then z).
    pub local_rotation: Vector3<f32>,
    pub local_scale: Vector3<f32>,
    pub data_a: f32,
    pub data_b: f32,
    pub data_c: f32,
    /// RGBA tint.
    pub color: [f32; 4],
    pub flip_x: bool,
    pub flip_y: bool,
    pub active: bool,
    pub direction: Facing,

    pub local_matrix: Matrix4<f32>,
    /// Product of ancestor local matrices down to and including this part.
    pub chain_matrix: Matrix4<f32>,
    pub world_matrix: Matrix4<f32>,
    /// World matrix without the per-instance override adjustment.
    pub world_matrix_no_override: Matrix4<f32>,
}

impl Default for PartSnapshot {
    fn default() -> Self {
        Self {
            valid: false,
            time: 0.0,
            local_position: Vector3::zeros(),
            local_rotation: Vector3::zeros(),
            local_scale: Vector3::new(1.0, 1.0, 1.0),
            data_a: 0.0,
            data_b: 0.0,
            data_c: 0.0,
            color: [1.0, 1.0, 1.0, 1.0],
            flip_x: false,
            flip_y: false,
            active: false,
            direction: Facing::North,
            local_matrix: Matrix4::identity(),
            chain_matrix: Matrix4::identity(),
            world_matrix: Matrix4::identity(),
            world_matrix_no_override: Matrix4::identity(),
        }
    }
}

impl PartSnapshot {
    /// Sample every channel of `part` at `time`.
    ///
    /// Pure with respect to its inputs: same part and time always produce the
    /// same snapshot, so parts can be sampled in parallel.
    pub fn sample(part: &PartDef, time: f32) -> Self {
        let ch: &ChannelSet = &part.channels;

        let local_position = Vector3::new(
            ch.pos_x.evaluate(time),
            ch.pos_y.evaluate(time),
            ch.pos_z.evaluate(time),
        );
        let local_rotation = Vector3::new(
            ch.rot_x.evaluate(time),
            ch.rot_y.evaluate(time),
            ch.rot_z.evaluate(time),
        );
        let local_scale = Vector3::new(
            ch.scl_x.evaluate(time),
            ch.scl_y.evaluate(time),
            ch.scl_z.evaluate(time),
        );

        let mut snapshot = Self {
            valid: true,
            time,
            local_position,
            local_rotation,
            local_scale,
            data_a: ch.data_a.evaluate(time),
            data_b: ch.data_b.evaluate(time),
            data_c: ch.data_c.evaluate(time),
            color: [
                ch.col_r.evaluate(time),
                ch.col_g.evaluate(time),
                ch.col_b.evaluate(time),
                ch.col_a.evaluate(time),
            ],
            flip_x: ch.flip_x.evaluate(time) >= 0.5,
            flip_y: ch.flip_y.evaluate(time) >= 0.5,
            active: ch.active.evaluate(time) >= 0.5,
            direction: Facing::from_index(ch.direction.evaluate(time) as i64),
            ..Self::default()
        };
        snapshot.rebuild_local_matrix();
        snapshot
    }

    /// Recompute `local_matrix` from the local TRS components.
    pub fn rebuild_local_matrix(&mut self) {
        self.local_matrix = trs(self.local_position, self.local_rotation, self.local_scale);
    }

    /// Cross-fade blend between two snapshots.
    ///
    /// Every continuous field lerps; booleans and the discrete direction snap
    /// at the halfway point.
    pub fn lerp(from: &PartSnapshot, to: &PartSnapshot, t: f32) -> PartSnapshot {
        let t = t.clamp(0.0, 1.0);
        let snap_to = t >= 0.5;
        let mut out = PartSnapshot {
            valid: to.valid,
            time: to.time,
            local_position: from.local_position.lerp(&to.local_position, t),
            local_rotation: from.local_rotation.lerp(&to.local_rotation, t),
            local_scale: from.local_scale.lerp(&to.local_scale, t),
            data_a: lerp(from.data_a, to.data_a, t),
            data_b: lerp(from.data_b, to.data_b, t),
            data_c: lerp(from.data_c, to.data_c, t),
            color: [
                lerp(from.color[0], to.color[0], t),
                lerp(from.color[1], to.color[1], t),
                lerp(from.color[2], to.color[2], t),
                lerp(from.color[3], to.color[3], t),
            ],
            flip_x: if snap_to { to.flip_x } else { from.flip_x },
            flip_y: if snap_to { to.flip_y } else { from.flip_y },
            active: if snap_to { to.active } else { from.active },
            direction: if snap_to { to.direction } else { from.direction },
            ..PartSnapshot::default()
        };
        out.rebuild_local_matrix();
        out
    }

    /// World-space position of a local point under an instance root
    /// transform.
    pub fn world_position(&self, root: &Matrix4<f32>) -> Vector3<f32> {
        let m = root * self.world_matrix;
        m.transform_point(&nalgebra::Point3::origin()).coords
    }

    /// Yaw of the world matrix in degrees, for renderers that orient flat
    /// sprites.
    pub fn world_yaw_degrees(&self, root: &Matrix4<f32>) -> f32 {
        let m = root * self.world_matrix;
        let x_axis = m.transform_vector(&Vector3::x());
        x_axis.z.atan2(x_axis.x).to_degrees()
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// TRS matrix with Euler degrees applied yaw (y), then pitch (x), then
/// roll (z) — the composition the authoring tool bakes against.
pub fn trs(position: Vector3<f32>, euler_deg: Vector3<f32>, scale: Vector3<f32>) -> Matrix4<f32> {
    let rotation = euler_rotation(euler_deg);
    Matrix4::new_translation(&position)
        * rotation.to_homogeneous()
        * Matrix4::new_nonuniform_scaling(&scale)
}

/// Euler composition in authoring-tool order: `Ry * Rx * Rz`, degrees in.
pub fn euler_rotation(euler_deg: Vector3<f32>) -> UnitQuaternion<f32> {
    let rx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), euler_deg.x.to_radians());
    let ry = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), euler_deg.y.to_radians());
    let rz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), euler_deg.z.to_radians());
    ry * rx * rz
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelSet;
    use crate::curve::{Curve, Keyframe, WrapMode};
    use approx::assert_relative_eq;

    fn rotating_part() -> PartDef {
        let mut channels = ChannelSet::default();
        let mut k0 = Keyframe::flat(0.0, 0.0);
        let mut k1 = Keyframe::flat(1.0, 90.0);
        k0.out_tangent = 90.0;
        k1.in_tangent = 90.0;
        channels.rot_y = Curve::new(WrapMode::ClampForever, WrapMode::ClampForever, vec![k0, k1]);
        PartDef {
            path: "Arm".into(),
            custom_name: None,
            texture_path: None,
            parent: None,
            transparent_by_default: false,
            channels,
        }
    }

    #[test]
    fn sampling_is_deterministic() {
        let part = rotating_part();
        let a = PartSnapshot::sample(&part, 0.37);
        let b = PartSnapshot::sample(&part, 0.37);
        assert_eq!(a, b);
    }

    #[test]
    fn linear_rotation_curve_hits_midpoint() {
        let part = rotating_part();
        let snap = PartSnapshot::sample(&part, 0.5);
        assert_relative_eq!(snap.local_rotation.y, 45.0, epsilon = 1e-3);
    }

    #[test]
    fn booleans_decode_from_threshold() {
        let mut part = rotating_part();
        part.channels.flip_x = Curve::constant(0.49);
        part.channels.active = Curve::constant(0.5);
        let snap = PartSnapshot::sample(&part, 0.0);
        assert!(!snap.flip_x);
        assert!(snap.active);
    }

    #[test]
    fn lerp_snaps_discrete_fields_at_midpoint() {
        let part = rotating_part();
        let mut from = PartSnapshot::sample(&part, 0.0);
        from.flip_x = false;
        from.direction = Facing::East;
        let mut to = PartSnapshot::sample(&part, 1.0);
        to.flip_x = true;
        to.direction = Facing::West;

        let early = PartSnapshot::lerp(&from, &to, 0.25);
        assert!(!early.flip_x);
        assert_eq!(early.direction, Facing::East);
        assert_relative_eq!(early.local_rotation.y, 22.5, epsilon = 1e-3);

        let late = PartSnapshot::lerp(&from, &to, 0.75);
        assert!(late.flip_x);
        assert_eq!(late.direction, Facing::West);
    }

    #[test]
    fn facing_mirrors_per_axis() {
        assert_eq!(Facing::East.mirrored(true, false), Facing::West);
        assert_eq!(Facing::East.mirrored(false, true), Facing::East);
        assert_eq!(Facing::North.mirrored(false, true), Facing::South);
        assert_eq!(Facing::North.mirrored(true, false), Facing::North);
    }
}
