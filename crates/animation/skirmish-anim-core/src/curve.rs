//! Keyframed float curves with Hermite tangents, weighted-tangent segments
//! and configurable pre/post extrapolation.
//!
//! The model mirrors the authoring tool's curve serialization so decoded
//! assets evaluate identically to the baked originals: per-key in/out
//! tangents, optional in/out weights, and byte-coded wrap modes.

use serde::{Deserialize, Serialize};

/// Extrapolation behaviour outside the keyed time range.
///
/// Byte values match the source serialization; unknown bytes fall back to
/// `Default` (clamp) so a newer exporter does not hard-fail older players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapMode {
    Default,
    Once,
    Loop,
    PingPong,
    ClampForever,
}

impl WrapMode {
    /// Decode from the serialized byte value.
    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => Self::Default,
            1 => Self::Once,
            2 => Self::Loop,
            4 => Self::PingPong,
            8 => Self::ClampForever,
            other => {
                log::warn!("unknown curve wrap mode byte {other}, treating as clamp");
                Self::Default
            }
        }
    }

    /// Byte value used by the wire format.
    #[inline]
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Default => 0,
            Self::Once => 1,
            Self::Loop => 2,
            Self::PingPong => 4,
            Self::ClampForever => 8,
        }
    }
}

/// Which ends of a keyframe use weighted (Bezier) tangents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightedMode {
    None,
    In,
    Out,
    Both,
}

impl WeightedMode {
    /// Decode from the serialized byte value (unknown bytes mean unweighted).
    #[inline]
    pub fn from_byte(b: u8) -> Self {
        match b {
            1 => Self::In,
            2 => Self::Out,
            3 => Self::Both,
            _ => Self::None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        match self {
            Self::None => 0,
            Self::In => 1,
            Self::Out => 2,
            Self::Both => 3,
        }
    }

    #[inline]
    pub fn weights_in(self) -> bool {
        matches!(self, Self::In | Self::Both)
    }

    #[inline]
    pub fn weights_out(self) -> bool {
        matches!(self, Self::Out | Self::Both)
    }
}

/// A single keyframe: value plus Hermite tangents and optional weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    pub in_tangent: f32,
    pub out_tangent: f32,
    pub in_weight: f32,
    pub out_weight: f32,
    pub weighted_mode: WeightedMode,
}

impl Keyframe {
    /// A keyframe with flat tangents and no weighting.
    #[inline]
    pub fn flat(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
            in_weight: DEFAULT_WEIGHT,
            out_weight: DEFAULT_WEIGHT,
            weighted_mode: WeightedMode::None,
        }
    }
}

/// The unweighted tangent weight; makes the Bezier form collapse to Hermite.
pub const DEFAULT_WEIGHT: f32 = 1.0 / 3.0;

/// An evaluable float channel: ordered keyframes plus wrap modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub pre_wrap: WrapMode,
    pub post_wrap: WrapMode,
    pub keys: Vec<Keyframe>,
}

impl Curve {
    /// Build from ordered keyframes with explicit wrap modes.
    pub fn new(pre_wrap: WrapMode, post_wrap: WrapMode, keys: Vec<Keyframe>) -> Self {
        Self {
            pre_wrap,
            post_wrap,
            keys,
        }
    }

    /// A constant curve holding `value` at every time.
    ///
    /// Used for channels whose value was baked as a default rather than a
    /// keyed curve.
    pub fn constant(value: f32) -> Self {
        Self {
            pre_wrap: WrapMode::ClampForever,
            post_wrap: WrapMode::ClampForever,
            keys: vec![Keyframe::flat(0.0, value)],
        }
    }

    /// First keyed time, or 0 for an empty curve.
    #[inline]
    pub fn start_time(&self) -> f32 {
        self.keys.first().map(|k| k.time).unwrap_or(0.0)
    }

    /// Last keyed time, or 0 for an empty curve.
    #[inline]
    pub fn end_time(&self) -> f32 {
        self.keys.last().map(|k| k.time).unwrap_or(0.0)
    }

    /// Evaluate the curve at `time`, applying pre/post wrap outside the
    /// keyed range.
    pub fn evaluate(&self, time: f32) -> f32 {
        let n = self.keys.len();
        match n {
            0 => 0.0,
            1 => self.keys[0].value,
            _ => {
                let t0 = self.keys[0].time;
                let t1 = self.keys[n - 1].time;
                let t = if time < t0 {
                    match wrap_time(time, t0, t1, self.pre_wrap) {
                        Some(wrapped) => wrapped,
                        None => return self.keys[0].value,
                    }
                } else if time > t1 {
                    match wrap_time(time, t0, t1, self.post_wrap) {
                        Some(wrapped) => wrapped,
                        None => return self.keys[n - 1].value,
                    }
                } else {
                    time
                };
                self.evaluate_in_range(t)
            }
        }
    }

    /// Evaluate with `t` already inside `[start_time, end_time]`.
    fn evaluate_in_range(&self, t: f32) -> f32 {
        let last = self.keys.len() - 1;
        if t >= self.keys[last].time {
            return self.keys[last].value;
        }
        // Find the segment containing t. Curves are short (a handful of
        // keys per channel), a linear scan beats a binary search here.
        let mut i = 0;
        while i + 2 < self.keys.len() && self.keys[i + 1].time <= t {
            i += 1;
        }
        let left = &self.keys[i];
        let right = &self.keys[i + 1];
        evaluate_segment(left, right, t)
    }
}

/// Remap an out-of-range time into the keyed span, or `None` to clamp.
fn wrap_time(time: f32, start: f32, end: f32, mode: WrapMode) -> Option<f32> {
    let span = end - start;
    if span <= 0.0 {
        return None;
    }
    match mode {
        WrapMode::Loop => {
            let m = (time - start).rem_euclid(span);
            Some(start + m)
        }
        WrapMode::PingPong => {
            let period = 2.0 * span;
            let m = (time - start).rem_euclid(period);
            Some(start + if m <= span { m } else { period - m })
        }
        WrapMode::Default | WrapMode::Once | WrapMode::ClampForever => None,
    }
}

/// Evaluate one segment at absolute time `t` (left.time <= t <= right.time).
fn evaluate_segment(left: &Keyframe, right: &Keyframe, t: f32) -> f32 {
    let dt = right.time - left.time;
    if dt <= f32::EPSILON {
        return left.value;
    }

    // Infinite tangents encode stepped segments: hold the left value.
    if !left.out_tangent.is_finite() || !right.in_tangent.is_finite() {
        return left.value;
    }

    let u = ((t - left.time) / dt).clamp(0.0, 1.0);
    let m0 = left.out_tangent * dt;
    let m1 = right.in_tangent * dt;

    let weighted = left.weighted_mode.weights_out() || right.weighted_mode.weights_in();
    if !weighted {
        return hermite(left.value, m0, right.value, m1, u);
    }

    // Weighted segment: equivalent 2D cubic Bezier in normalized time.
    // An unweighted end keeps the default weight so it matches the Hermite
    // form on that side.
    let w0 = if left.weighted_mode.weights_out() {
        left.out_weight
    } else {
        DEFAULT_WEIGHT
    };
    let w1 = if right.weighted_mode.weights_in() {
        right.in_weight
    } else {
        DEFAULT_WEIGHT
    };

    let y0 = left.value;
    let y3 = right.value;
    let y1 = y0 + m0 * w0;
    let y2 = y3 - m1 * w1;
    let x1 = w0;
    let x2 = 1.0 - w1;

    let s = solve_bezier_x(u, x1, x2);
    cubic_bezier(y0, y1, y2, y3, s)
}

/// Cubic Hermite basis over normalized `u`.
#[inline]
fn hermite(v0: f32, m0: f32, v1: f32, m1: f32, u: f32) -> f32 {
    let u2 = u * u;
    let u3 = u2 * u;
    (2.0 * u3 - 3.0 * u2 + 1.0) * v0
        + (u3 - 2.0 * u2 + u) * m0
        + (-2.0 * u3 + 3.0 * u2) * v1
        + (u3 - u2) * m1
}

/// Cubic Bezier basis function.
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, s: f32) -> f32 {
    let r = 1.0 - s;
    r * r * r * p0 + 3.0 * r * r * s * p1 + 3.0 * r * s * s * p2 + s * s * s * p3
}

/// Invert the x Bezier (x0=0, x3=1) by bisection: find s with x(s) == u.
#[inline]
fn solve_bezier_x(u: f32, x1: f32, x2: f32) -> f32 {
    let u = u.clamp(0.0, 1.0);
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = u;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - u).abs() < 1e-6 {
            break;
        }
        if x < u {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    mid
}
