//! A running animation instance: time seeking, cross-fade blending, event
//! collection and the end-of-life state machine.

use std::sync::Arc;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::data::{AnimEvent, AnimationAsset};
use crate::hierarchy::{resolve_world, PartOverride};
use crate::snapshot::PartSnapshot;
use crate::sweep::SweepCursor;

/// Lifecycle of a playback instance.
///
/// `Completed` and `Interrupted` are absorbing; callers distinguish them to
/// decide whether natural-end logic (actor relocation, outcome application)
/// should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// Constructed, not yet seeked.
    Created,
    /// Actively seekable.
    Running,
    /// Reached the natural end of the clip.
    Completed,
    /// Cancelled from outside before the natural end.
    Interrupted,
}

impl PlaybackPhase {
    /// True once the instance can no longer advance.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Interrupted)
    }
}

/// How the instance ended; reported exactly once via
/// [`PlaybackInstance::poll_end`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndKind {
    Completed,
    Interrupted,
}

/// A seek request: jump to an absolute clip time, or advance by a host
/// delta (scaled by the instance's `time_scale`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    Absolute(f32),
    Delta(f32),
}

/// Cross-fade source captured from a prior instance.
struct CrossFade {
    /// Snapshot per local part index; invalid entries have no counterpart.
    source: Vec<PartSnapshot>,
    duration: f32,
}

/// A sweep cursor bound to the part whose path it follows.
pub struct SweepTrail {
    pub part_index: usize,
    pub cursor: SweepCursor,
}

/// One playing animation.
///
/// Owns its snapshot and override arrays exclusively; the asset is shared
/// read-only. Not intended for concurrent use by multiple writers.
pub struct PlaybackInstance {
    asset: Arc<AnimationAsset>,
    snapshots: Vec<PartSnapshot>,
    overrides: Vec<PartOverride>,
    trails: Vec<SweepTrail>,

    time: f32,
    /// Per-instance speed multiplier applied to delta seeks.
    pub time_scale: f32,
    pub mirror_x: bool,
    pub mirror_y: bool,
    /// Restart from zero instead of completing at the clip end.
    pub looping: bool,
    /// Hold the terminal transition until [`finalize`](Self::finalize), so a
    /// render frame in flight can finish with valid snapshots.
    pub defer_termination: bool,

    phase: PlaybackPhase,
    termination_pending: bool,
    end_reported: bool,
    last_mirror: (bool, bool),
    fade: Option<CrossFade>,
}

fn dummy_snapshot() -> &'static PartSnapshot {
    static DUMMY: OnceLock<PartSnapshot> = OnceLock::new();
    DUMMY.get_or_init(PartSnapshot::default)
}

impl PlaybackInstance {
    /// Create an instance over a shared asset, at time zero, not yet seeked.
    pub fn new(asset: Arc<AnimationAsset>) -> Self {
        let part_count = asset.parts.len();
        let trails = asset
            .parts_with_sweeps()
            .flat_map(|part_index| {
                asset.sweep_paths(part_index).iter().map(move |collection| {
                    (part_index, collection.clone())
                })
            })
            .map(|(part_index, collection)| SweepTrail {
                part_index,
                cursor: SweepCursor::new(&collection, 0.0, 1.0),
            })
            .collect();

        Self {
            snapshots: vec![PartSnapshot::default(); part_count],
            overrides: vec![PartOverride::default(); part_count],
            trails,
            asset,
            time: -1.0,
            time_scale: 1.0,
            mirror_x: false,
            mirror_y: false,
            looping: false,
            defer_termination: false,
            phase: PlaybackPhase::Created,
            termination_pending: false,
            end_reported: false,
            last_mirror: (false, false),
            fade: None,
        }
    }

    #[inline]
    pub fn asset(&self) -> &Arc<AnimationAsset> {
        &self.asset
    }

    #[inline]
    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Current clip time; negative before the first seek.
    #[inline]
    pub fn current_time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.asset.duration
    }

    /// True only after an interrupted (non-natural) end.
    #[inline]
    pub fn was_interrupted(&self) -> bool {
        self.phase == PlaybackPhase::Interrupted
    }

    /// Snapshot of a part; a harmless dummy for out-of-range indices.
    ///
    /// A stale part index (e.g. after a live asset edit) must not take down
    /// the frame loop, so lookups degrade instead of panicking.
    pub fn snapshot(&self, index: usize) -> &PartSnapshot {
        match self.snapshots.get(index) {
            Some(s) => s,
            None => {
                log::debug!("snapshot lookup for invalid part index {index}");
                dummy_snapshot()
            }
        }
    }

    /// Snapshot of a part looked up by name, dummy when absent.
    pub fn snapshot_by_name(&self, name: &str) -> &PartSnapshot {
        match self.asset.part_index(name) {
            Some(index) => self.snapshot(index),
            None => dummy_snapshot(),
        }
    }

    #[inline]
    pub fn snapshots(&self) -> &[PartSnapshot] {
        &self.snapshots
    }

    /// Mutable override for a part; `None` for out-of-range indices.
    pub fn override_mut(&mut self, index: usize) -> Option<&mut PartOverride> {
        self.overrides.get_mut(index)
    }

    #[inline]
    pub fn overrides(&self) -> &[PartOverride] {
        &self.overrides
    }

    /// The weapon trails owned by this instance.
    #[inline]
    pub fn trails_mut(&mut self) -> &mut [SweepTrail] {
        &mut self.trails
    }

    /// Set the blade span used for a part's trail geometry.
    pub fn set_blade_span(&mut self, part_index: usize, down_dst: f32, up_dst: f32) {
        let asset = Arc::clone(&self.asset);
        for trail in &mut self.trails {
            if trail.part_index == part_index {
                // Rebind with fresh velocity data for the new span.
                if let Some(collection) = asset.sweep_paths(part_index).first() {
                    trail.cursor = SweepCursor::new(collection, down_dst, up_dst);
                }
            }
        }
    }

    /// Capture a cross-fade source from another (usually ending) instance.
    ///
    /// Parts are matched by path; parts with no counterpart simply play
    /// without blending. The blend weight is `time / blend_duration`.
    pub fn cross_fade_from(&mut self, previous: &PlaybackInstance, blend_duration: f32) {
        if blend_duration <= 0.0 {
            self.fade = None;
            return;
        }
        let mut source = vec![PartSnapshot::default(); self.asset.parts.len()];
        for (i, part) in self.asset.parts.iter().enumerate() {
            if let Some(other) = previous
                .asset
                .parts
                .iter()
                .position(|p| p.path == part.path)
            {
                source[i] = previous.snapshot(other).clone();
            }
        }
        self.fade = Some(CrossFade {
            source,
            duration: blend_duration,
        });
    }

    /// Advance or jump the clock, re-evaluating every part and collecting
    /// the events whose times were traversed.
    ///
    /// Events with `time` in `[min(old, new), max(old, new))` are appended to
    /// `events`, which makes forward playback and backward scrubbing
    /// deterministic and free of duplicate emission.
    pub fn seek(&mut self, target: SeekTarget, events: &mut Vec<AnimEvent>) {
        if self.phase.is_terminal() || self.termination_pending {
            return;
        }

        let raw = match target {
            SeekTarget::Absolute(t) => t,
            SeekTarget::Delta(dt) => self.time.max(0.0) + dt * self.time_scale,
        };
        let new_time = raw.clamp(0.0, self.asset.duration);

        let mirrors_unchanged = self.last_mirror == (self.mirror_x, self.mirror_y);
        if (self.time - new_time).abs() < 1e-4 && mirrors_unchanged {
            return;
        }
        self.last_mirror = (self.mirror_x, self.mirror_y);
        self.phase = PlaybackPhase::Running;

        // Pass 1: sample every channel of every part, blending with the
        // cross-fade source while it is still in effect.
        let fade_t = match &self.fade {
            Some(fade) if fade.duration > 0.0 => Some((new_time / fade.duration).min(1.0)),
            _ => None,
        };
        for (i, part) in self.asset.parts.iter().enumerate() {
            let mut snapshot = PartSnapshot::sample(part, new_time);
            if let (Some(t), Some(fade)) = (fade_t, &self.fade) {
                let source = &fade.source[i];
                if source.valid {
                    snapshot = PartSnapshot::lerp(source, &snapshot, t);
                }
            }
            self.snapshots[i] = snapshot;
        }
        if fade_t.is_some_and(|t| t >= 1.0) {
            self.fade = None;
        }

        // Pass 2: world matrices, parent-before-child.
        resolve_world(
            &self.asset,
            &mut self.snapshots,
            &self.overrides,
            self.mirror_x,
            self.mirror_y,
        );

        let old_time = self.time.max(0.0);
        let (start, end) = if old_time <= new_time {
            (old_time, new_time)
        } else {
            (new_time, old_time)
        };
        events.extend(self.asset.events_in(start, end).cloned());
        self.time = new_time;

        // End of clip: loop, or move toward a terminal state.
        if raw >= self.asset.duration {
            if self.looping {
                self.time = 0.0;
            } else if self.defer_termination {
                self.termination_pending = true;
            } else {
                self.phase = PlaybackPhase::Completed;
            }
        }
    }

    /// Apply a deferred termination requested during `seek`.
    pub fn finalize(&mut self) {
        if self.termination_pending && !self.phase.is_terminal() {
            self.termination_pending = false;
            self.phase = PlaybackPhase::Completed;
        }
    }

    /// Cancel the instance. Idempotent; a completed instance stays
    /// completed.
    pub fn interrupt(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = PlaybackPhase::Interrupted;
        }
    }

    /// One-shot end notification.
    ///
    /// Returns `Some` exactly once after the instance reaches a terminal
    /// state, no matter how many times the instance was interrupted or
    /// polled; the caller runs its on-end logic (or skips it for
    /// interruptions) on that single report.
    pub fn poll_end(&mut self) -> Option<EndKind> {
        if self.end_reported || !self.phase.is_terminal() {
            return None;
        }
        self.end_reported = true;
        Some(match self.phase {
            PlaybackPhase::Completed => EndKind::Completed,
            _ => EndKind::Interrupted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelSet;
    use crate::data::PartDef;
    use hashbrown::HashMap;

    fn simple_asset(duration: f32, events: Vec<AnimEvent>) -> Arc<AnimationAsset> {
        let part = PartDef {
            path: "root".into(),
            custom_name: None,
            texture_path: None,
            parent: None,
            transparent_by_default: false,
            channels: ChannelSet::default(),
        };
        Arc::new(
            AnimationAsset::new("clip".into(), duration, vec![part], events, HashMap::new())
                .unwrap(),
        )
    }

    fn drain(instance: &mut PlaybackInstance, target: SeekTarget) -> Vec<f32> {
        let mut events = Vec::new();
        instance.seek(target, &mut events);
        events.iter().map(|e| e.time).collect()
    }

    #[test]
    fn natural_end_completes_once() {
        let mut inst = PlaybackInstance::new(simple_asset(1.0, vec![]));
        let mut events = Vec::new();
        inst.seek(SeekTarget::Absolute(0.0), &mut events);
        inst.seek(SeekTarget::Absolute(1.5), &mut events);
        assert_eq!(inst.phase(), PlaybackPhase::Completed);
        assert!(!inst.was_interrupted());
        assert_eq!(inst.poll_end(), Some(EndKind::Completed));
        assert_eq!(inst.poll_end(), None);
    }

    #[test]
    fn interrupt_is_idempotent_and_sticky() {
        let mut inst = PlaybackInstance::new(simple_asset(1.0, vec![]));
        inst.interrupt();
        inst.interrupt();
        assert_eq!(inst.phase(), PlaybackPhase::Interrupted);
        assert_eq!(inst.poll_end(), Some(EndKind::Interrupted));
        assert_eq!(inst.poll_end(), None);

        // A terminal instance ignores further seeks.
        let mut events = Vec::new();
        inst.seek(SeekTarget::Absolute(0.5), &mut events);
        assert_eq!(inst.current_time(), -1.0);
    }

    #[test]
    fn completed_wins_over_late_interrupt() {
        let mut inst = PlaybackInstance::new(simple_asset(1.0, vec![]));
        let mut events = Vec::new();
        inst.seek(SeekTarget::Absolute(2.0), &mut events);
        assert_eq!(inst.phase(), PlaybackPhase::Completed);
        inst.interrupt();
        assert_eq!(inst.phase(), PlaybackPhase::Completed);
        assert_eq!(inst.poll_end(), Some(EndKind::Completed));
    }

    #[test]
    fn looping_resets_instead_of_completing() {
        let mut inst = PlaybackInstance::new(simple_asset(1.0, vec![]));
        inst.looping = true;
        let mut events = Vec::new();
        inst.seek(SeekTarget::Absolute(1.2), &mut events);
        assert_eq!(inst.phase(), PlaybackPhase::Running);
        assert_eq!(inst.current_time(), 0.0);
    }

    #[test]
    fn deferred_termination_waits_for_finalize() {
        let mut inst = PlaybackInstance::new(simple_asset(1.0, vec![]));
        inst.defer_termination = true;
        let mut events = Vec::new();
        inst.seek(SeekTarget::Absolute(1.5), &mut events);
        assert_eq!(inst.phase(), PlaybackPhase::Running);
        assert_eq!(inst.poll_end(), None);
        inst.finalize();
        assert_eq!(inst.phase(), PlaybackPhase::Completed);
        assert_eq!(inst.poll_end(), Some(EndKind::Completed));
    }

    #[test]
    fn event_window_is_half_open() {
        let events = vec![
            AnimEvent::new(0.0, "zero"),
            AnimEvent::new(0.5, "mid"),
            AnimEvent::new(0.9, "late"),
        ];
        let mut inst = PlaybackInstance::new(simple_asset(1.0, events));
        // First seek to 0 emits nothing; the zero event belongs to the
        // first forward traversal.
        assert_eq!(drain(&mut inst, SeekTarget::Absolute(0.0)), Vec::<f32>::new());
        assert_eq!(drain(&mut inst, SeekTarget::Absolute(0.5)), vec![0.0]);
        assert_eq!(drain(&mut inst, SeekTarget::Absolute(0.95)), vec![0.5, 0.9]);
    }

    #[test]
    fn backward_scrub_does_not_duplicate_events() {
        let events = vec![AnimEvent::new(0.5, "mid")];
        let mut inst = PlaybackInstance::new(simple_asset(1.0, events));
        let mut all = Vec::new();
        inst.seek(SeekTarget::Absolute(0.8), &mut all);
        inst.seek(SeekTarget::Absolute(0.2), &mut all);
        inst.seek(SeekTarget::Absolute(0.8), &mut all);
        // Forward, backward, forward: the event fires on each traversal of
        // its timestamp, exactly once per traversal.
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|e| e.time == 0.5));
    }

    #[test]
    fn delta_seeks_scale_with_time_scale() {
        let mut inst = PlaybackInstance::new(simple_asset(1.0, vec![]));
        inst.time_scale = 0.5;
        let mut events = Vec::new();
        inst.seek(SeekTarget::Absolute(0.0), &mut events);
        inst.seek(SeekTarget::Delta(0.4), &mut events);
        assert!((inst.current_time() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn cross_fade_blends_from_source_snapshots() {
        let asset = simple_asset(1.0, vec![]);
        let mut old = PlaybackInstance::new(Arc::clone(&asset));
        let mut events = Vec::new();
        old.seek(SeekTarget::Absolute(0.5), &mut events);

        let mut new = PlaybackInstance::new(asset);
        new.cross_fade_from(&old, 0.5);
        new.seek(SeekTarget::Absolute(0.25), &mut events);
        // Halfway through the blend window the source still contributes.
        assert_eq!(new.phase(), PlaybackPhase::Running);
        new.seek(SeekTarget::Absolute(0.75), &mut events);
        // Past the window the fade is dropped.
        assert!(new.fade.is_none());
    }
}
