//! Binary asset decoder.
//!
//! The layout is contractual — field order and widths must keep decoding the
//! existing baked assets. Everything is little-endian; strings are
//! ULEB128-length-prefixed UTF-8; bools are one byte. Decoding is atomic:
//! the asset is assembled locally and returned whole, or an error is
//! returned and nothing is observable.

use hashbrown::HashMap;

use crate::channel::{ChannelId, ChannelSet};
use crate::curve::{Curve, Keyframe, WeightedMode, WrapMode};
use crate::data::{AnimEvent, AnimationAsset, PartDef};
use crate::error::DecodeError;
use crate::sweep::{SweepPoint, SweepPointCollection};

/// The only format version this build reads.
pub const FORMAT_VERSION: i32 = 1;

/// Decode a complete animation asset from bytes.
pub fn decode(bytes: &[u8]) -> Result<AnimationAsset, DecodeError> {
    let mut r = Reader::new(bytes);

    let version = r.i32("version")?;
    if version != FORMAT_VERSION {
        return Err(DecodeError::BadVersion {
            found: version,
            supported: FORMAT_VERSION,
        });
    }

    let name = r.string("name")?;
    let duration = r.f32("duration")?;

    let part_count = r.len("part count")?;

    let event_count = r.len("event count")?;
    let mut events = Vec::with_capacity(event_count);
    for _ in 0..event_count {
        let payload = r.string("event payload")?;
        let time = r.f32("event time")?;
        events.push(AnimEvent::new(time, payload));
    }

    let mut parts = Vec::with_capacity(part_count);
    for _ in 0..part_count {
        let path = r.string("part path")?;
        let parent_index = r.i16("parent index")?;
        let custom_name = if r.bool("has custom name")? {
            Some(r.string("custom name")?)
        } else {
            None
        };
        let texture_path = if r.bool("has texture")? {
            Some(r.string("texture path")?)
        } else {
            None
        };
        let transparent_by_default = r.bool("transparent flag")?;

        parts.push(PartDef {
            path,
            custom_name,
            texture_path,
            parent: if parent_index < 0 {
                None
            } else {
                Some(parent_index as usize)
            },
            transparent_by_default,
            channels: ChannelSet::default(),
        });
    }

    // Keyed curves. Channels not covered here are filled by the default
    // block below; anything still untouched keeps its neutral constant.
    let curve_count = r.len("curve count")?;
    for _ in 0..curve_count {
        let kind = r.u8("channel kind")?;
        let field = r.u8("channel field")?;
        let part_index = r.u8("curve part index")? as usize;
        let channel = ChannelId::from_bytes(kind, field)
            .ok_or(DecodeError::UnknownChannel { kind, field })?;
        let curve = read_curve(&mut r, part_index)?;
        let part = parts
            .get_mut(part_index)
            .ok_or(DecodeError::PartIndexOutOfRange {
                index: part_index,
                count: part_count,
            })?;
        part.channels.set(channel, curve);
    }

    // Baked defaults for channels without keyed curves.
    for part in parts.iter_mut() {
        let default_count = r.u8("default count")?;
        for _ in 0..default_count {
            let kind = r.u8("default kind")?;
            let field = r.u8("default field")?;
            let value = r.f32("default value")?;
            let channel = ChannelId::from_bytes(kind, field)
                .ok_or(DecodeError::UnknownChannel { kind, field })?;
            part.channels.set(channel, Curve::constant(value));
        }
    }

    let sweep_count = r.len("sweep count")?;
    let mut sweeps: HashMap<usize, Vec<SweepPointCollection>> = HashMap::new();
    for _ in 0..sweep_count {
        let part_index = r.len("sweep part index")?;
        if part_index >= part_count {
            return Err(DecodeError::PartIndexOutOfRange {
                index: part_index,
                count: part_count,
            });
        }
        let point_count = r.len("sweep point count")?;
        let mut points = Vec::with_capacity(point_count);
        for _ in 0..point_count {
            points.push(SweepPoint {
                time: r.f32("sweep time")?,
                x: r.f32("sweep x")?,
                z: r.f32("sweep z")?,
                dx: r.f32("sweep dx")?,
                dz: r.f32("sweep dz")?,
                disabled: r.bool("sweep disabled")?,
                velocity_top: 0.0,
                velocity_bottom: 0.0,
            });
        }
        sweeps
            .entry(part_index)
            .or_default()
            .push(SweepPointCollection::new(points));
    }

    AnimationAsset::new(name, duration, parts, events, sweeps)
}

fn read_curve(r: &mut Reader<'_>, part_index: usize) -> Result<Curve, DecodeError> {
    let pre_wrap = WrapMode::from_byte(r.u8("pre wrap")?);
    let post_wrap = WrapMode::from_byte(r.u8("post wrap")?);
    let key_count = r.len("key count")?;

    let mut keys = Vec::with_capacity(key_count);
    let mut last_time = f32::NEG_INFINITY;
    for _ in 0..key_count {
        let key = Keyframe {
            time: r.f32("key time")?,
            value: r.f32("key value")?,
            in_tangent: r.f32("key in tangent")?,
            out_tangent: r.f32("key out tangent")?,
            in_weight: r.f32("key in weight")?,
            out_weight: r.f32("key out weight")?,
            weighted_mode: WeightedMode::from_byte(r.u8("key weighted mode")?),
        };
        if key.time < last_time {
            return Err(DecodeError::UnsortedKeyframes { part: part_index });
        }
        last_time = key.time;
        keys.push(key);
    }

    Ok(Curve::new(pre_wrap, post_wrap, keys))
}

/// Little-endian pull parser with offset-tagged errors.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], DecodeError> {
        let end = self.offset.checked_add(n).filter(|&e| e <= self.bytes.len());
        match end {
            Some(end) => {
                let slice = &self.bytes[self.offset..end];
                self.offset = end;
                Ok(slice)
            }
            None => Err(DecodeError::Truncated {
                offset: self.offset,
                what,
            }),
        }
    }

    fn u8(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        Ok(self.take(1, what)?[0])
    }

    fn bool(&mut self, what: &'static str) -> Result<bool, DecodeError> {
        Ok(self.u8(what)? != 0)
    }

    fn i16(&mut self, what: &'static str) -> Result<i16, DecodeError> {
        let b = self.take(2, what)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    fn i32(&mut self, what: &'static str) -> Result<i32, DecodeError> {
        let b = self.take(4, what)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f32(&mut self, what: &'static str) -> Result<f32, DecodeError> {
        let b = self.take(4, what)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// An `i32` count that must be non-negative.
    fn len(&mut self, what: &'static str) -> Result<usize, DecodeError> {
        let v = self.i32(what)?;
        usize::try_from(v).map_err(|_| DecodeError::Truncated {
            offset: self.offset,
            what,
        })
    }

    /// ULEB128-length-prefixed UTF-8 string.
    fn string(&mut self, what: &'static str) -> Result<String, DecodeError> {
        let start = self.offset;
        let mut len: usize = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.u8(what)?;
            len |= ((byte & 0x7f) as usize) << shift;
            if byte & 0x80 == 0 {
                break;
            }
            shift += 7;
            if shift > 28 {
                return Err(DecodeError::BadString { offset: start });
            }
        }
        let raw = self.take(len, what)?;
        String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::BadString { offset: start })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_truncated() {
        assert!(matches!(
            decode(&[]),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let bytes = 99i32.to_le_bytes();
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::BadVersion { found: 99, .. })
        ));
    }
}
