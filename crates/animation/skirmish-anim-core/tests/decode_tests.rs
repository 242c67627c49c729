//! Decoder behaviour against independently encoded binary assets.

use skirmish_anim_core::{decode, ChannelId, DecodeError, WeightedMode, WrapMode};
use skirmish_test_fixtures::{
    three_part_rig, AssetWriter, CurveData, KeyData, PartData, SweepPointData,
};

#[test]
fn decodes_the_three_part_rig() {
    let asset = decode(&three_part_rig()).unwrap();

    assert_eq!(asset.name, "three_part_rig");
    assert_eq!(asset.duration, 1.0);
    assert_eq!(asset.parts.len(), 3);

    assert_eq!(asset.parts[0].path, "Root");
    assert_eq!(asset.parts[0].parent, None);
    assert_eq!(asset.parts[1].parent, Some(0));
    assert_eq!(asset.parts[2].parent, Some(1));

    // The arm rotation curve samples linearly.
    let arm = &asset.parts[1];
    assert!((arm.channels.rot_y.evaluate(0.5) - 45.0).abs() < 1e-3);

    // The hand's x position was baked as a default constant.
    let hand = &asset.parts[2];
    assert_eq!(hand.channels.pos_x.evaluate(0.7), 1.0);

    // Untouched channels hold their neutral values.
    assert_eq!(hand.channels.scl_x.evaluate(0.3), 1.0);
    assert_eq!(hand.channels.col_a.evaluate(0.3), 1.0);
    assert_eq!(hand.channels.active.evaluate(0.3), 1.0);

    assert_eq!(asset.events.len(), 1);
    assert_eq!(asset.events[0].time, 0.5);
    assert_eq!(asset.events[0].handler_name(), Some("MeleeHit"));
}

#[test]
fn truncation_fails_at_every_prefix() {
    let bytes = three_part_rig();
    // Any strict prefix must fail loudly, never produce a partial asset.
    for cut in [0, 1, 3, 7, 15, bytes.len() / 2, bytes.len() - 1] {
        let err = decode(&bytes[..cut]).unwrap_err();
        assert!(
            matches!(err, DecodeError::Truncated { .. } | DecodeError::BadVersion { .. }),
            "cut at {cut} gave {err:?}"
        );
    }
}

#[test]
fn keyframes_round_trip_bit_for_bit() {
    let keys = vec![
        KeyData {
            time: 0.0,
            value: 1.25,
            in_tangent: 0.5,
            out_tangent: -2.75,
            in_weight: 0.1,
            out_weight: 0.9,
            weighted_mode: 3,
        },
        KeyData {
            time: 0.625,
            value: -7.5,
            in_tangent: f32::INFINITY,
            out_tangent: 0.0,
            in_weight: 1.0 / 3.0,
            out_weight: 1.0 / 3.0,
            weighted_mode: 1,
        },
        KeyData::flat(1.0, 42.0),
    ];
    let mut writer = AssetWriter::new("rt", 1.0);
    let part = writer.part(PartData::new("Root", -1));
    writer.curve(
        part,
        1,
        4,
        CurveData {
            pre_wrap: 2,
            post_wrap: 4,
            keys: keys.clone(),
        },
    );
    let asset = decode(&writer.finish()).unwrap();

    let curve = asset.parts[0].channels.get(ChannelId::RotX);
    assert_eq!(curve.pre_wrap, WrapMode::Loop);
    assert_eq!(curve.post_wrap, WrapMode::PingPong);
    assert_eq!(curve.keys.len(), keys.len());
    for (decoded, original) in curve.keys.iter().zip(&keys) {
        assert_eq!(decoded.time.to_bits(), original.time.to_bits());
        assert_eq!(decoded.value.to_bits(), original.value.to_bits());
        assert_eq!(decoded.in_tangent.to_bits(), original.in_tangent.to_bits());
        assert_eq!(
            decoded.out_tangent.to_bits(),
            original.out_tangent.to_bits()
        );
        assert_eq!(decoded.in_weight.to_bits(), original.in_weight.to_bits());
        assert_eq!(decoded.out_weight.to_bits(), original.out_weight.to_bits());
        assert_eq!(
            decoded.weighted_mode,
            WeightedMode::from_byte(original.weighted_mode)
        );
    }
}

#[test]
fn unknown_channel_is_rejected() {
    let mut writer = AssetWriter::new("bad", 1.0);
    let part = writer.part(PartData::new("Root", -1));
    writer.curve(part, 9, 9, CurveData::clamped(vec![KeyData::flat(0.0, 0.0)]));
    assert!(matches!(
        decode(&writer.finish()),
        Err(DecodeError::UnknownChannel { kind: 9, field: 9 })
    ));
}

#[test]
fn curve_part_index_out_of_range_is_rejected() {
    let mut writer = AssetWriter::new("bad", 1.0);
    writer.part(PartData::new("Root", -1));
    writer.curve(5, 1, 1, CurveData::clamped(vec![KeyData::flat(0.0, 0.0)]));
    assert!(matches!(
        decode(&writer.finish()),
        Err(DecodeError::PartIndexOutOfRange { index: 5, count: 1 })
    ));
}

#[test]
fn unsorted_keyframes_are_rejected() {
    let mut writer = AssetWriter::new("bad", 1.0);
    let part = writer.part(PartData::new("Root", -1));
    writer.curve(
        part,
        1,
        1,
        CurveData::clamped(vec![KeyData::flat(0.8, 0.0), KeyData::flat(0.2, 1.0)]),
    );
    assert!(matches!(
        decode(&writer.finish()),
        Err(DecodeError::UnsortedKeyframes { .. })
    ));
}

#[test]
fn parent_cycles_are_rejected_at_decode_time() {
    let mut writer = AssetWriter::new("bad", 1.0);
    writer.part(PartData::new("a", 1));
    writer.part(PartData::new("b", 0));
    assert!(matches!(
        decode(&writer.finish()),
        Err(DecodeError::InvalidHierarchy { .. })
    ));
}

#[test]
fn sweep_blocks_decode_with_their_part() {
    let mut writer = AssetWriter::new("sweepy", 2.0);
    let item = writer.part(PartData::new("ItemA", -1));
    writer.sweep(
        item as i32,
        vec![
            SweepPointData {
                time: 0.0,
                x: 0.0,
                z: 0.0,
                dx: 0.0,
                dz: 1.0,
                disabled: false,
            },
            SweepPointData {
                time: 1.0,
                x: 1.0,
                z: 0.5,
                dx: 0.0,
                dz: 1.0,
                disabled: true,
            },
        ],
    );
    let asset = decode(&writer.finish()).unwrap();
    let paths = asset.sweep_paths(item as usize);
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].len(), 2);
    assert!(paths[0].points()[1].disabled);
}

#[test]
fn sweep_part_index_out_of_range_is_rejected() {
    let mut writer = AssetWriter::new("bad", 1.0);
    writer.part(PartData::new("Root", -1));
    writer.sweep(3, vec![]);
    assert!(matches!(
        decode(&writer.finish()),
        Err(DecodeError::PartIndexOutOfRange { index: 3, count: 1 })
    ));
}

#[test]
fn invalid_duration_is_rejected() {
    let writer = AssetWriter::new("bad", 0.0);
    assert!(matches!(
        decode(&writer.finish()),
        Err(DecodeError::InvalidDuration { .. })
    ));
}
