//! The immutable animation asset: part hierarchy, events and sweep paths.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::channel::ChannelSet;
use crate::error::DecodeError;
use crate::sweep::SweepPointCollection;

/// One independently transformable element of the animation hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDef {
    /// Hierarchy path, unique within the asset.
    pub path: String,
    /// Optional friendly name; takes precedence over the path for lookup.
    pub custom_name: Option<String>,
    /// Optional texture path resolved by the host renderer.
    pub texture_path: Option<String>,
    /// Parent part index; `None` for roots.
    pub parent: Option<usize>,
    /// Whether the part renders with the transparent material by default.
    pub transparent_by_default: bool,
    /// Every animatable channel, always fully populated.
    pub channels: ChannelSet,
}

impl PartDef {
    /// The display/lookup name: custom name if present, else the path.
    #[inline]
    pub fn name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or(&self.path)
    }
}

/// A timestamped opaque event payload.
///
/// The payload format belongs to the event dispatcher; this type only offers
/// tokenization of the `;`-delimited convention without interpreting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimEvent {
    pub time: f32,
    pub payload: String,
}

impl AnimEvent {
    pub fn new(time: f32, payload: impl Into<String>) -> Self {
        Self {
            time,
            payload: payload.into(),
        }
    }

    /// First token of the payload, conventionally the handler name.
    pub fn handler_name(&self) -> Option<&str> {
        self.payload.split(';').next().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The n-th argument token after the handler name.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.payload.split(';').nth(index + 1).map(str::trim)
    }
}

/// An immutable, shareable animation clip.
///
/// Built once by the decoder and then only read; players share it by `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationAsset {
    pub name: String,
    /// Clip length in seconds, always positive and finite.
    pub duration: f32,
    pub parts: Vec<PartDef>,
    /// Events sorted by time.
    pub events: Vec<AnimEvent>,
    /// Weapon-trail sample paths, keyed by part index.
    pub sweeps: HashMap<usize, Vec<SweepPointCollection>>,
    /// Parent-before-child traversal order over `parts`.
    resolve_order: Vec<usize>,
}

impl AnimationAsset {
    /// Assemble an asset, validating the hierarchy and ordering events.
    ///
    /// Fails if any parent index is out of range or the parent links contain
    /// a cycle; playback assumes the hierarchy is a forest and never checks
    /// again.
    pub fn new(
        name: String,
        duration: f32,
        parts: Vec<PartDef>,
        mut events: Vec<AnimEvent>,
        sweeps: HashMap<usize, Vec<SweepPointCollection>>,
    ) -> Result<Self, DecodeError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DecodeError::InvalidDuration { duration });
        }

        let resolve_order = topological_order(&parts)?;
        events.sort_by(|a, b| a.time.total_cmp(&b.time));

        Ok(Self {
            name,
            duration,
            parts,
            events,
            sweeps,
            resolve_order,
        })
    }

    /// Parent-before-child order for world-matrix resolution.
    #[inline]
    pub fn resolve_order(&self) -> &[usize] {
        &self.resolve_order
    }

    /// Find a part by name (custom name or path).
    pub fn part_index(&self, name: &str) -> Option<usize> {
        self.parts.iter().position(|p| p.name() == name)
    }

    /// Events with `time` in the half-open interval `[start, end)`.
    pub fn events_in(&self, start: f32, end: f32) -> impl Iterator<Item = &AnimEvent> {
        self.events
            .iter()
            .filter(move |e| e.time >= start && e.time < end)
    }

    /// Sweep paths registered for a part, empty if none.
    pub fn sweep_paths(&self, part_index: usize) -> &[SweepPointCollection] {
        self.sweeps
            .get(&part_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Part indices that carry sweep paths.
    pub fn parts_with_sweeps(&self) -> impl Iterator<Item = usize> + '_ {
        self.sweeps.keys().copied()
    }
}

/// Compute a parent-before-child order, rejecting cycles and bad links.
fn topological_order(parts: &[PartDef]) -> Result<Vec<usize>, DecodeError> {
    let n = parts.len();
    for (i, part) in parts.iter().enumerate() {
        if let Some(p) = part.parent {
            if p >= n {
                return Err(DecodeError::InvalidHierarchy {
                    reason: format!("part {i} has parent index {p} but there are {n} parts"),
                });
            }
            if p == i {
                return Err(DecodeError::InvalidHierarchy {
                    reason: format!("part {i} is its own parent"),
                });
            }
        }
    }

    // Kahn's algorithm over the parent links.
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut order = Vec::with_capacity(n);
    let mut queue: Vec<usize> = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        match part.parent {
            Some(p) => children[p].push(i),
            None => queue.push(i),
        }
    }
    while let Some(i) = queue.pop() {
        order.push(i);
        queue.extend(children[i].iter().copied());
    }

    if order.len() != n {
        return Err(DecodeError::InvalidHierarchy {
            reason: "parent links contain a cycle".into(),
        });
    }
    Ok(order)
}
