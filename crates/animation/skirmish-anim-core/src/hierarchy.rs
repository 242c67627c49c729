//! World-matrix resolution across the part hierarchy, with mirroring and
//! per-instance override adjustments.

use nalgebra::{Matrix4, Vector3};
use serde::{Deserialize, Serialize};

use crate::data::AnimationAsset;
use crate::snapshot::{trs, PartSnapshot};

/// Per-instance, per-part adjustments layered on top of the baked curves.
///
/// This is how a playing instance skins concrete weapons and hands onto
/// generic parts: offset/rotation/scale correct for sprite differences, the
/// flips and tint come from the equipped item, `hidden` suppresses drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartOverride {
    /// Extra local offset on the animation plane (x, z).
    pub local_offset: (f32, f32),
    /// Extra local yaw in degrees.
    pub local_rotation: f32,
    /// Extra local scale factor on the animation plane (x, z).
    pub local_scale: (f32, f32),
    /// Invert the part's baked flip state.
    pub flip_x: bool,
    pub flip_y: bool,
    /// Multiplied into the sampled color.
    pub color_tint: [f32; 4],
    /// Replaces the sampled color entirely when set.
    pub color_override: Option<[f32; 4]>,
    /// Suppress rendering of this part.
    pub hidden: bool,
    /// Replacement texture path for the host renderer.
    pub texture_path: Option<String>,
}

impl Default for PartOverride {
    fn default() -> Self {
        Self {
            local_offset: (0.0, 0.0),
            local_rotation: 0.0,
            local_scale: (1.0, 1.0),
            flip_x: false,
            flip_y: false,
            color_tint: [1.0, 1.0, 1.0, 1.0],
            color_override: None,
            hidden: false,
            texture_path: None,
        }
    }
}

impl PartOverride {
    /// The color the renderer should use for a snapshot under this override.
    pub fn final_color(&self, sampled: [f32; 4]) -> [f32; 4] {
        if let Some(color) = self.color_override {
            return color;
        }
        [
            sampled[0] * self.color_tint[0],
            sampled[1] * self.color_tint[1],
            sampled[2] * self.color_tint[2],
            sampled[3] * self.color_tint[3],
        ]
    }
}

/// Resolve world matrices and hierarchical visibility for a full snapshot
/// array.
///
/// Must run after every part has been sampled for the same time. Parts are
/// visited in the asset's parent-before-child order, so each part's chain
/// matrix is computed exactly once per pass.
pub fn resolve_world(
    asset: &AnimationAsset,
    snapshots: &mut [PartSnapshot],
    overrides: &[PartOverride],
    mirror_x: bool,
    mirror_y: bool,
) {
    let mirror = mirror_matrix(mirror_x, mirror_y);

    for &index in asset.resolve_order() {
        let (parent_chain, parent_active) = match asset.parts[index].parent {
            Some(p) => {
                let parent = &snapshots[p];
                (parent.chain_matrix, parent.active)
            }
            None => (Matrix4::identity(), true),
        };

        let snapshot = &mut snapshots[index];
        snapshot.chain_matrix = parent_chain * snapshot.local_matrix;
        // Visibility inherits down the tree: a part is only effectively
        // active when every ancestor is.
        snapshot.active = snapshot.active && parent_active;

        let adjust = override_adjust(snapshot, overrides.get(index));
        snapshot.world_matrix = mirror * snapshot.chain_matrix * adjust * mirror;
        snapshot.world_matrix_no_override = mirror * snapshot.chain_matrix * mirror;
    }
}

/// The local adjustment matrix contributed by a part's override.
///
/// Offsets flip sign per mirrored axis, and the extra rotation flips sign
/// when exactly one axis is flipped, so authored corrections stay visually
/// attached to the sprite under every flip combination.
fn override_adjust(snapshot: &PartSnapshot, ov: Option<&PartOverride>) -> Matrix4<f32> {
    let Some(ov) = ov else {
        return Matrix4::identity();
    };

    let fx = snapshot.flip_x ^ ov.flip_x;
    let fy = snapshot.flip_y ^ ov.flip_y;

    let off_x = if fx { -ov.local_offset.0 } else { ov.local_offset.0 };
    let off_z = if fy { -ov.local_offset.1 } else { ov.local_offset.1 };
    let rot = if fx ^ fy {
        -ov.local_rotation
    } else {
        ov.local_rotation
    };

    trs(
        Vector3::new(off_x, 0.0, off_z),
        Vector3::new(0.0, rot, 0.0),
        Vector3::new(ov.local_scale.0, 1.0, ov.local_scale.1),
    )
}

/// Mirroring as a scale: x negated for horizontal, z for vertical.
#[inline]
pub fn mirror_matrix(mirror_x: bool, mirror_y: bool) -> Matrix4<f32> {
    Matrix4::new_nonuniform_scaling(&Vector3::new(
        if mirror_x { -1.0 } else { 1.0 },
        1.0,
        if mirror_y { -1.0 } else { 1.0 },
    ))
}
