//! Test-only encoder for the binary animation-asset format, plus canned
//! assets shared across integration tests.
//!
//! Deliberately independent of the runtime crates: the writer speaks raw
//! bytes (little-endian, ULEB128-length-prefixed strings) so round-trip
//! tests exercise the real decoder against an independently produced
//! stream rather than a shared implementation.

/// A keyframe as the wire format stores it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyData {
    pub time: f32,
    pub value: f32,
    pub in_tangent: f32,
    pub out_tangent: f32,
    pub in_weight: f32,
    pub out_weight: f32,
    pub weighted_mode: u8,
}

impl KeyData {
    /// A key with flat tangents and default weights.
    pub fn flat(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
            in_weight: 1.0 / 3.0,
            out_weight: 1.0 / 3.0,
            weighted_mode: 0,
        }
    }

    /// A key whose tangents make the surrounding segments linear with the
    /// given slopes.
    pub fn sloped(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            in_tangent,
            out_tangent,
            ..Self::flat(time, value)
        }
    }
}

/// A keyed curve as the wire format stores it.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveData {
    pub pre_wrap: u8,
    pub post_wrap: u8,
    pub keys: Vec<KeyData>,
}

impl CurveData {
    /// ClampForever on both ends.
    pub fn clamped(keys: Vec<KeyData>) -> Self {
        Self {
            pre_wrap: 8,
            post_wrap: 8,
            keys,
        }
    }

    /// Two keys with matched slopes: a linear ramp.
    pub fn linear(t0: f32, v0: f32, t1: f32, v1: f32) -> Self {
        let slope = (v1 - v0) / (t1 - t0);
        Self::clamped(vec![
            KeyData::sloped(t0, v0, 0.0, slope),
            KeyData::sloped(t1, v1, slope, 0.0),
        ])
    }
}

/// Part header fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PartData {
    pub path: String,
    pub parent_index: i16,
    pub custom_name: Option<String>,
    pub texture_path: Option<String>,
    pub transparent: bool,
}

impl PartData {
    pub fn new(path: &str, parent_index: i16) -> Self {
        Self {
            path: path.to_string(),
            parent_index,
            custom_name: None,
            texture_path: None,
            transparent: false,
        }
    }
}

/// One sweep path sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPointData {
    pub time: f32,
    pub x: f32,
    pub z: f32,
    pub dx: f32,
    pub dz: f32,
    pub disabled: bool,
}

/// Builder producing a complete binary asset blob.
///
/// Field order mirrors the decoder's contract exactly; every `finish()`
/// output is a decodable asset as long as the indices handed in are valid.
pub struct AssetWriter {
    name: String,
    duration: f32,
    parts: Vec<PartData>,
    events: Vec<(String, f32)>,
    /// `(kind, field, part_index, curve)`
    curves: Vec<(u8, u8, u8, CurveData)>,
    /// `defaults[part] = [(kind, field, value)]`
    defaults: Vec<Vec<(u8, u8, f32)>>,
    sweeps: Vec<(i32, Vec<SweepPointData>)>,
}

impl AssetWriter {
    pub fn new(name: &str, duration: f32) -> Self {
        Self {
            name: name.to_string(),
            duration,
            parts: Vec::new(),
            events: Vec::new(),
            curves: Vec::new(),
            defaults: Vec::new(),
            sweeps: Vec::new(),
        }
    }

    /// Add a part, returning its index.
    pub fn part(&mut self, part: PartData) -> u8 {
        self.parts.push(part);
        self.defaults.push(Vec::new());
        (self.parts.len() - 1) as u8
    }

    pub fn event(&mut self, time: f32, payload: &str) -> &mut Self {
        self.events.push((payload.to_string(), time));
        self
    }

    pub fn curve(&mut self, part: u8, kind: u8, field: u8, curve: CurveData) -> &mut Self {
        self.curves.push((kind, field, part, curve));
        self
    }

    pub fn default_value(&mut self, part: u8, kind: u8, field: u8, value: f32) -> &mut Self {
        self.defaults[part as usize].push((kind, field, value));
        self
    }

    pub fn sweep(&mut self, part: i32, points: Vec<SweepPointData>) -> &mut Self {
        self.sweeps.push((part, points));
        self
    }

    /// Serialize the full blob.
    pub fn finish(&self) -> Vec<u8> {
        let mut w = Writer::default();
        w.i32(1); // format version
        w.string(&self.name);
        w.f32(self.duration);
        w.i32(self.parts.len() as i32);

        w.i32(self.events.len() as i32);
        for (payload, time) in &self.events {
            w.string(payload);
            w.f32(*time);
        }

        for part in &self.parts {
            w.string(&part.path);
            w.i16(part.parent_index);
            w.bool(part.custom_name.is_some());
            if let Some(name) = &part.custom_name {
                w.string(name);
            }
            w.bool(part.texture_path.is_some());
            if let Some(path) = &part.texture_path {
                w.string(path);
            }
            w.bool(part.transparent);
        }

        w.i32(self.curves.len() as i32);
        for (kind, field, part, curve) in &self.curves {
            w.u8(*kind);
            w.u8(*field);
            w.u8(*part);
            w.u8(curve.pre_wrap);
            w.u8(curve.post_wrap);
            w.i32(curve.keys.len() as i32);
            for key in &curve.keys {
                w.f32(key.time);
                w.f32(key.value);
                w.f32(key.in_tangent);
                w.f32(key.out_tangent);
                w.f32(key.in_weight);
                w.f32(key.out_weight);
                w.u8(key.weighted_mode);
            }
        }

        for defaults in &self.defaults {
            w.u8(defaults.len() as u8);
            for (kind, field, value) in defaults {
                w.u8(*kind);
                w.u8(*field);
                w.f32(*value);
            }
        }

        w.i32(self.sweeps.len() as i32);
        for (part, points) in &self.sweeps {
            w.i32(*part);
            w.i32(points.len() as i32);
            for p in points {
                w.f32(p.time);
                w.f32(p.x);
                w.f32(p.z);
                w.f32(p.dx);
                w.f32(p.dz);
                w.bool(p.disabled);
            }
        }

        w.bytes
    }
}

#[derive(Default)]
struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    fn bool(&mut self, v: bool) {
        self.bytes.push(v as u8);
    }

    fn i16(&mut self, v: i16) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    fn i32(&mut self, v: i32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    fn f32(&mut self, v: f32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    fn string(&mut self, s: &str) {
        let mut len = s.len();
        loop {
            let mut byte = (len & 0x7f) as u8;
            len >>= 7;
            if len != 0 {
                byte |= 0x80;
            }
            self.bytes.push(byte);
            if len == 0 {
                break;
            }
        }
        self.bytes.extend_from_slice(s.as_bytes());
    }
}

/// The canonical three-part test rig: `Root` → `Arm` → `Hand`, with the
/// arm swinging 0° → 90° over one second and a hit event at 0.5s.
pub fn three_part_rig() -> Vec<u8> {
    let mut writer = AssetWriter::new("three_part_rig", 1.0);
    let root = writer.part(PartData::new("Root", -1));
    let arm = writer.part(PartData::new("Arm", root as i16));
    let hand = writer.part(PartData::new("Hand", arm as i16));

    // Arm.rotation.y ramps linearly to 90 degrees (kind 1 / field 5).
    writer.curve(arm, 1, 5, CurveData::linear(0.0, 0.0, 1.0, 90.0));
    // Hand sits one unit out along x (kind 1 / field 1).
    writer.default_value(hand, 1, 1, 1.0);
    writer.event(0.5, "MeleeHit;1");
    writer.finish()
}

/// A one-part clip carrying a sweep path with `count` evenly spaced points.
pub fn sweep_rig(count: usize) -> Vec<u8> {
    let mut writer = AssetWriter::new("sweep_rig", 1.0);
    let item = writer.part(PartData::new("ItemA", -1));
    let points = (0..count)
        .map(|i| {
            let t = i as f32 / count.max(1) as f32;
            SweepPointData {
                time: t,
                x: t * 2.0,
                z: 0.0,
                dx: 0.0,
                dz: 1.0,
                disabled: false,
            }
        })
        .collect();
    writer.sweep(item as i32, points);
    writer.finish()
}
