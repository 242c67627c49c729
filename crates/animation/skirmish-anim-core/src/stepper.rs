//! Per-frame advancement of every live instance, with an optional
//! data-parallel fan-out of the sample/resolve phase.
//!
//! Event handlers mutate shared game state, so however the seeking ran,
//! dispatch happens strictly on the calling thread after every instance has
//! finished its seek.

use rayon::prelude::*;

use crate::config::AnimConfig;
use crate::data::AnimEvent;
use crate::playback::{PlaybackInstance, SeekTarget};

/// Receiver for events collected during a step.
///
/// Called single-threaded, in instance order, after all seeking completes.
pub trait EventSink {
    fn handle(&mut self, instance_index: usize, event: &AnimEvent);
}

impl<F: FnMut(usize, &AnimEvent)> EventSink for F {
    fn handle(&mut self, instance_index: usize, event: &AnimEvent) {
        self(instance_index, event)
    }
}

/// Drives a set of instances one host frame at a time.
pub struct Stepper {
    config: AnimConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Stepper {
    /// Build a stepper; a dedicated thread pool is only created when the
    /// config caps workers below the global default.
    pub fn new(config: AnimConfig) -> Self {
        let pool = match config.max_workers {
            0 | 1 => None,
            n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("failed to build seek thread pool ({e}), using global pool");
                    None
                }
            },
        };
        Self { config, pool }
    }

    #[inline]
    pub fn config(&self) -> &AnimConfig {
        &self.config
    }

    /// Advance every instance by `dt` seconds and dispatch traversed events.
    ///
    /// Terminal instances are skipped by their own seek logic; interrupts
    /// requested mid-frame are observed at the start of the next step.
    pub fn step(&self, instances: &mut [PlaybackInstance], dt: f32, sink: &mut dyn EventSink) {
        let dt = dt * self.config.global_speed;
        let parallel =
            self.config.max_workers != 1 && instances.len() >= self.config.parallel_min_instances;

        let mut batches: Vec<(usize, Vec<AnimEvent>)> = if parallel {
            let mut seek_all = || {
                instances
                    .par_iter_mut()
                    .enumerate()
                    .map(|(i, instance)| {
                        let mut events = Vec::new();
                        instance.seek(SeekTarget::Delta(dt), &mut events);
                        (i, events)
                    })
                    .collect()
            };
            match &self.pool {
                Some(pool) => pool.install(seek_all),
                None => seek_all(),
            }
        } else {
            instances
                .iter_mut()
                .enumerate()
                .map(|(i, instance)| {
                    let mut events = Vec::new();
                    instance.seek(SeekTarget::Delta(dt), &mut events);
                    (i, events)
                })
                .collect()
        };

        // Single-threaded dispatch, in instance order.
        let mut dispatched = 0usize;
        for (index, events) in batches.iter_mut() {
            for event in events.iter() {
                if dispatched >= self.config.max_events_per_step {
                    log::warn!(
                        "event budget of {} exceeded this step, dropping the rest",
                        self.config.max_events_per_step
                    );
                    return;
                }
                sink.handle(*index, event);
                dispatched += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelSet;
    use crate::data::{AnimationAsset, PartDef};
    use hashbrown::HashMap;
    use std::sync::Arc;

    fn asset_with_event(at: f32) -> Arc<AnimationAsset> {
        let part = PartDef {
            path: "root".into(),
            custom_name: None,
            texture_path: None,
            parent: None,
            transparent_by_default: false,
            channels: ChannelSet::default(),
        };
        Arc::new(
            AnimationAsset::new(
                "clip".into(),
                1.0,
                vec![part],
                vec![AnimEvent::new(at, "hit")],
                HashMap::new(),
            )
            .unwrap(),
        )
    }

    fn prime(instance: &mut PlaybackInstance) {
        let mut sink = Vec::new();
        instance.seek(SeekTarget::Absolute(0.0), &mut sink);
    }

    #[test]
    fn events_arrive_in_instance_order() {
        let asset = asset_with_event(0.1);
        let mut instances: Vec<_> = (0..3)
            .map(|_| {
                let mut inst = PlaybackInstance::new(Arc::clone(&asset));
                prime(&mut inst);
                inst
            })
            .collect();

        let stepper = Stepper::new(AnimConfig::default());
        let mut seen = Vec::new();
        stepper.step(&mut instances, 0.2, &mut |i: usize, _e: &AnimEvent| {
            seen.push(i)
        });
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let asset = asset_with_event(0.1);
        let make = || {
            let mut v: Vec<_> = (0..16)
                .map(|_| {
                    let mut inst = PlaybackInstance::new(Arc::clone(&asset));
                    prime(&mut inst);
                    inst
                })
                .collect::<Vec<_>>();
            v.shrink_to_fit();
            v
        };

        let sequential = Stepper::new(AnimConfig {
            max_workers: 1,
            ..AnimConfig::default()
        });
        let parallel = Stepper::new(AnimConfig {
            parallel_min_instances: 2,
            ..AnimConfig::default()
        });

        let mut a = make();
        let mut seen_a = Vec::new();
        sequential.step(&mut a, 0.2, &mut |i: usize, _e: &AnimEvent| seen_a.push(i));

        let mut b = make();
        let mut seen_b = Vec::new();
        parallel.step(&mut b, 0.2, &mut |i: usize, _e: &AnimEvent| seen_b.push(i));

        assert_eq!(seen_a, seen_b);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.current_time(), y.current_time());
        }
    }

    #[test]
    fn event_budget_caps_dispatch() {
        let asset = asset_with_event(0.1);
        let mut instances: Vec<_> = (0..4)
            .map(|_| {
                let mut inst = PlaybackInstance::new(Arc::clone(&asset));
                prime(&mut inst);
                inst
            })
            .collect();

        let stepper = Stepper::new(AnimConfig {
            max_events_per_step: 2,
            ..AnimConfig::default()
        });
        let mut count = 0usize;
        stepper.step(&mut instances, 0.2, &mut |_i: usize, _e: &AnimEvent| {
            count += 1
        });
        assert_eq!(count, 2);
    }
}
