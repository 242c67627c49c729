//! Weapon-sweep trail sampling: time-ordered path points and the monotonic
//! cursor that feeds trail geometry one new point at a time.

use serde::{Deserialize, Serialize};

/// One baked sample of a weapon's trailing edge.
///
/// `(x, z)` is the blade anchor on the animation plane, `(dx, dz)` the blade
/// direction; the renderer extrudes the trail edge between
/// `anchor + dir * down_dst` and `anchor + dir * up_dst`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SweepPoint {
    pub time: f32,
    pub x: f32,
    pub z: f32,
    pub dx: f32,
    pub dz: f32,
    /// Trail segments between disabled points are not drawn.
    pub disabled: bool,
    /// Edge speeds filled in by [`SweepPointCollection::clone_with_velocities`].
    pub velocity_top: f32,
    pub velocity_bottom: f32,
}

impl SweepPoint {
    /// Blend two points; the `disabled` flag snaps at the midpoint.
    pub fn lerp(a: &SweepPoint, b: &SweepPoint, t: f32) -> SweepPoint {
        let l = |x: f32, y: f32| x + (y - x) * t;
        SweepPoint {
            time: l(a.time, b.time),
            x: l(a.x, b.x),
            z: l(a.z, b.z),
            dx: l(a.dx, b.dx),
            dz: l(a.dz, b.dz),
            disabled: if t >= 0.5 { b.disabled } else { a.disabled },
            velocity_top: l(a.velocity_top, b.velocity_top),
            velocity_bottom: l(a.velocity_bottom, b.velocity_bottom),
        }
    }

    /// The two trail-edge endpoints for the given blade distances.
    #[inline]
    pub fn end_points(&self, down_dst: f32, up_dst: f32) -> ((f32, f32), (f32, f32)) {
        let down = (self.x + self.dx * down_dst, self.z + self.dz * down_dst);
        let up = (self.x + self.dx * up_dst, self.z + self.dz * up_dst);
        (down, up)
    }
}

/// An ordered-by-time run of sweep points for one part.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SweepPointCollection {
    points: Vec<SweepPoint>,
}

impl SweepPointCollection {
    /// Wrap points, sorting by time so cursor assumptions always hold.
    pub fn new(mut points: Vec<SweepPoint>) -> Self {
        points.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { points }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    /// Clone the points with per-edge velocities computed from consecutive
    /// samples, for trail shading keyed on blade speed.
    pub fn clone_with_velocities(&self, down_dst: f32, up_dst: f32) -> Vec<SweepPoint> {
        let mut out = self.points.clone();
        let mut prev_down = (0.0f32, 0.0f32);
        let mut prev_up = (0.0f32, 0.0f32);
        let mut prev_time = 0.0f32;

        for (i, point) in out.iter_mut().enumerate() {
            let (down, up) = point.end_points(down_dst, up_dst);
            if i != 0 {
                let dt = point.time - prev_time;
                if dt > 0.0 {
                    point.velocity_bottom = dist(prev_down, down) / dt;
                    point.velocity_top = dist(prev_up, up) / dt;
                }
            }
            prev_down = down;
            prev_up = up;
            prev_time = point.time;
        }
        out
    }
}

#[inline]
fn dist(a: (f32, f32), b: (f32, f32)) -> f32 {
    let dx = b.0 - a.0;
    let dz = b.1 - a.1;
    (dx * dx + dz * dz).sqrt()
}

/// Monotonic forward consumer of a sweep path.
///
/// Each point is yielded exactly once as time passes it; rewinding resets the
/// cursor without re-yielding history. Single-pass: one cursor per consumer.
#[derive(Debug, Clone)]
pub struct SweepCursor {
    points: Vec<SweepPoint>,
    index: usize,
    time: f32,
}

impl SweepCursor {
    /// Cursor over a collection, with trail velocities baked in.
    pub fn new(collection: &SweepPointCollection, down_dst: f32, up_dst: f32) -> Self {
        Self {
            points: collection.clone_with_velocities(down_dst, up_dst),
            index: 0,
            time: -1.0,
        }
    }

    /// Time of the previous seek.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Move to `new_time`, yielding every point crossed since the last call.
    ///
    /// Seeking backward resets the cursor to the first point past `new_time`
    /// and yields nothing; seeking to the current time yields nothing.
    pub fn advance_to(&mut self, new_time: f32) -> SweepDrain<'_> {
        if new_time < self.time {
            self.index = self.points.partition_point(|p| p.time <= new_time);
        }
        self.time = new_time;
        SweepDrain {
            cursor: self,
            until: new_time,
        }
    }

    /// A synthetic point lerped between the last crossed point and its
    /// successor, extending the trail smoothly to the current time.
    pub fn interpolated_at(&self, time: f32) -> Option<SweepPoint> {
        if self.index == 0 || self.index >= self.points.len() {
            return None;
        }
        let last = &self.points[self.index - 1];
        let next = &self.points[self.index];
        if (last.time - time).abs() < 1e-3 {
            return None;
        }
        let span = next.time - last.time;
        if span <= 0.0 {
            return None;
        }
        let t = ((time - last.time) / span).clamp(0.0, 1.0);
        Some(SweepPoint::lerp(last, next, t))
    }
}

/// Iterator over the points crossed by one [`SweepCursor::advance_to`] call.
pub struct SweepDrain<'a> {
    cursor: &'a mut SweepCursor,
    until: f32,
}

impl Iterator for SweepDrain<'_> {
    type Item = SweepPoint;

    fn next(&mut self) -> Option<SweepPoint> {
        let point = self.cursor.points.get(self.cursor.index)?;
        if point.time < self.until {
            self.cursor.index += 1;
            Some(*point)
        } else {
            None
        }
    }
}
