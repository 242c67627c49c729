//! End-to-end playback over decoded assets: hierarchy composition, event
//! traversal, mirroring and cross-fade.

use std::sync::Arc;

use approx::assert_relative_eq;
use skirmish_anim_core::{decode, PlaybackInstance, PlaybackPhase, SeekTarget};
use skirmish_test_fixtures::three_part_rig;

fn rig_instance() -> PlaybackInstance {
    let asset = Arc::new(decode(&three_part_rig()).unwrap());
    PlaybackInstance::new(asset)
}

fn seek(instance: &mut PlaybackInstance, time: f32) -> Vec<f32> {
    let mut events = Vec::new();
    instance.seek(SeekTarget::Absolute(time), &mut events);
    events.iter().map(|e| e.time).collect()
}

#[test]
fn hand_world_position_composes_through_root_and_arm() {
    let mut instance = rig_instance();
    seek(&mut instance, 0.5);

    let arm = instance.snapshot_by_name("Arm");
    assert_relative_eq!(arm.local_rotation.y, 45.0, epsilon = 1e-3);

    // Hand sits at local (1, 0, 0) under an arm rotated 45 degrees about y:
    // the world position swings through the composed matrices.
    let hand = instance.snapshot_by_name("Hand");
    let origin = hand
        .world_matrix
        .transform_point(&nalgebra::Point3::origin());
    let expected = 45.0f32.to_radians();
    assert_relative_eq!(origin.x, expected.cos(), epsilon = 1e-4);
    assert_relative_eq!(origin.z, -expected.sin(), epsilon = 1e-4);
}

#[test]
fn hierarchy_invariant_holds_for_every_mirror_combination() {
    for (mx, my) in [(false, false), (true, false), (false, true), (true, true)] {
        let mut instance = rig_instance();
        instance.mirror_x = mx;
        instance.mirror_y = my;
        seek(&mut instance, 0.5);

        let asset = Arc::clone(instance.asset());
        for (i, part) in asset.parts.iter().enumerate() {
            let Some(parent) = part.parent else { continue };
            let child = instance.snapshot(i);
            let parent = instance.snapshot(parent);
            // chain(child) == chain(parent) * local(child), under every
            // mirror combination (mirroring wraps the chain afterwards).
            let expected = parent.chain_matrix * child.local_matrix;
            assert_relative_eq!(child.chain_matrix, expected, epsilon = 1e-4);
        }
    }
}

#[test]
fn mirroring_flips_world_x() {
    let mut plain = rig_instance();
    seek(&mut plain, 0.5);
    let mut mirrored = rig_instance();
    mirrored.mirror_x = true;
    seek(&mut mirrored, 0.5);

    let a = plain
        .snapshot_by_name("Hand")
        .world_matrix
        .transform_point(&nalgebra::Point3::origin());
    let b = mirrored
        .snapshot_by_name("Hand")
        .world_matrix
        .transform_point(&nalgebra::Point3::origin());
    assert_relative_eq!(a.x, -b.x, epsilon = 1e-4);
    assert_relative_eq!(a.z, b.z, epsilon = 1e-4);
}

#[test]
fn forward_seek_collects_events_in_traversed_interval() {
    let mut instance = rig_instance();
    assert_eq!(seek(&mut instance, 0.0), Vec::<f32>::new());
    assert_eq!(seek(&mut instance, 0.4), Vec::<f32>::new());
    // The rig's event sits at 0.5; [0.4, 0.6) crosses it.
    assert_eq!(seek(&mut instance, 0.6), vec![0.5]);
    // Already consumed; a further forward seek does not repeat it.
    assert_eq!(seek(&mut instance, 0.9), Vec::<f32>::new());
}

#[test]
fn scrubbing_back_and_forth_emits_once_per_traversal() {
    let mut instance = rig_instance();
    seek(&mut instance, 0.0);
    assert_eq!(seek(&mut instance, 0.7), vec![0.5]);
    assert_eq!(seek(&mut instance, 0.3), vec![0.5]);
    assert_eq!(seek(&mut instance, 0.7), vec![0.5]);
    // No duplicates within any single traversal.
}

#[test]
fn invalid_part_lookup_degrades_to_dummy() {
    let mut instance = rig_instance();
    seek(&mut instance, 0.5);
    let dummy = instance.snapshot(99);
    assert!(!dummy.valid);
    let dummy = instance.snapshot_by_name("NoSuchPart");
    assert!(!dummy.valid);
}

#[test]
fn completion_after_duration_is_natural() {
    let mut instance = rig_instance();
    seek(&mut instance, 0.0);
    seek(&mut instance, 2.0);
    assert_eq!(instance.phase(), PlaybackPhase::Completed);
    assert!(!instance.was_interrupted());
}

#[test]
fn cross_fade_pulls_pose_toward_previous_instance() {
    let mut previous = rig_instance();
    seek(&mut previous, 1.0);
    let prev_arm_rot = previous.snapshot_by_name("Arm").local_rotation.y;
    assert_relative_eq!(prev_arm_rot, 90.0, epsilon = 1e-3);

    let mut next = rig_instance();
    next.cross_fade_from(&previous, 0.5);
    seek(&mut next, 0.25);

    // Halfway through the fade: blend of the old pose (90 degrees) and the
    // new clip's pose at 0.25 (22.5 degrees).
    let blended = next.snapshot_by_name("Arm").local_rotation.y;
    assert_relative_eq!(blended, 0.5 * 90.0 + 0.5 * 22.5, epsilon = 1e-2);
}

#[test]
fn trails_are_bound_to_sweep_parts() {
    let asset = Arc::new(decode(&skirmish_test_fixtures::sweep_rig(8)).unwrap());
    let mut instance = PlaybackInstance::new(asset);
    assert_eq!(instance.trails_mut().len(), 1);

    let trail = &mut instance.trails_mut()[0];
    let crossed: Vec<_> = trail.cursor.advance_to(0.5).collect();
    assert_eq!(crossed.len(), 4);
    let again: Vec<_> = trail.cursor.advance_to(0.5).collect();
    assert!(again.is_empty());
}
