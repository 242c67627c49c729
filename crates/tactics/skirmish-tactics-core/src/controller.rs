//! The action controller: deterministic legality decision trees for
//! grapples and executions.
//!
//! Check order is part of the contract. Cheap and certain disqualifiers run
//! first, pathfinding runs last, and the first sufficient strategy
//! short-circuits the rest — both for performance and so the failure
//! category a user sees is stable.

use crate::catalog::{ActionAnimDef, ActionCatalog};
use crate::occupancy::{Cell, SmallMask};
use crate::report::{
    ExecutionOutcome, ExecutionReport, FailReason, GrappleReport, PossibleExecution, ReportPool,
};
use crate::request::{ExecutionRequest, GrappleRequest, SpotBehaviour};
use crate::world::{ActorFacts, ActorId, TacticalWorld, TacticsConfig};

/// One adjacency-feasible animation start, precomputed per request.
struct AnimStart<'a> {
    def: &'a ActionAnimDef,
    mirror_x: bool,
}

/// Plans grapples and executions against a world and a catalog.
pub struct ActionController<'a> {
    world: &'a dyn TacticalWorld,
    catalog: &'a ActionCatalog,
    config: TacticsConfig,
    pool: ReportPool,
}

impl<'a> ActionController<'a> {
    pub fn new(world: &'a dyn TacticalWorld, catalog: &'a ActionCatalog) -> Self {
        Self::with_config(world, catalog, TacticsConfig::default())
    }

    pub fn with_config(
        world: &'a dyn TacticalWorld,
        catalog: &'a ActionCatalog,
        config: TacticsConfig,
    ) -> Self {
        Self {
            world,
            catalog,
            config,
            pool: ReportPool::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &TacticsConfig {
        &self.config
    }

    /// Return a consumed execution report's payload to the internal pool.
    pub fn recycle(&mut self, report: ExecutionReport) {
        report.recycle(&mut self.pool);
    }

    /// Full grapple legality check.
    ///
    /// Disqualifiers are evaluated in a fixed priority order; the first hit
    /// becomes the report's category.
    pub fn grapple_report(&self, req: &GrappleRequest) -> GrappleReport {
        let fail = |reason| GrappleReport::Fail { reason };

        let Some(grappler) = self.world.actor_facts(req.grappler) else {
            return fail(FailReason::Internal);
        };
        if !grappler.spawned {
            return fail(FailReason::NotSpawned);
        }
        let target = match req.target {
            Some(id) => match self.world.actor_facts(id) {
                Some(facts) => Some((id, facts)),
                None => return fail(FailReason::Internal),
            },
            None => None,
        };
        if let Some((_, t)) = &target {
            if !t.spawned {
                return fail(FailReason::NotSpawned);
            }
        }

        if grappler.dead {
            return fail(FailReason::Dead);
        }
        if target.as_ref().is_some_and(|(_, t)| t.dead) {
            return fail(FailReason::DeadTarget);
        }
        if grappler.downed {
            return fail(FailReason::Downed);
        }
        if grappler.in_animation {
            return fail(FailReason::SelfInAnimation);
        }

        if !req.skip_cooldown_check && grappler.on_cooldown {
            return fail(FailReason::Cooldown);
        }
        if !req.skip_lasso_check && !grappler.has_lasso {
            return fail(FailReason::MissingLasso);
        }
        if !req.trust_lasso_usability {
            if self.config.min_skill_for_lasso > 0
                && grappler.melee_skill < self.config.min_skill_for_lasso
            {
                return fail(FailReason::SkillTooLow);
            }
            if self.config.min_manipulation_for_lasso > 0.0
                && grappler.manipulation < self.config.min_manipulation_for_lasso
            {
                return fail(FailReason::Manipulation);
            }
        }

        // No specific target: only answer whether any free spot exists.
        let Some((target_id, target)) = target else {
            let (cells, count) = self.free_spots(req, &grappler, None);
            return if count == 0 {
                fail(FailReason::NoDestination)
            } else {
                GrappleReport::Ok {
                    destination: cells[0],
                }
            };
        };

        if target_id == req.grappler {
            return fail(FailReason::Internal);
        }
        if !self.world.same_map(req.grappler, target_id) {
            return fail(FailReason::Internal);
        }
        if req
            .destination
            .is_some_and(|dest| target.position == dest)
        {
            return fail(FailReason::AlreadyAtDestination);
        }
        if target.targeted_for_grapple {
            return fail(FailReason::AlreadyTargeted);
        }
        if target.in_animation {
            return fail(FailReason::InAnimation);
        }

        let range = req.lasso_range.unwrap_or(self.config.lasso_range);
        let dist_sq = grappler.position.distance_squared(target.position) as f32;
        if dist_sq > range * range {
            return fail(FailReason::TooFar);
        }

        if self.config.max_lasso_mass > 0.0 && target.mass > self.config.max_lasso_mass {
            return fail(FailReason::Mass);
        }
        if self.config.max_lasso_body_size > 0.0
            && target.body_size > self.config.max_lasso_body_size
        {
            return fail(FailReason::Size);
        }

        // A caller-fixed destination skips the spot search entirely.
        if let Some(dest) = req.destination {
            if !self.world.is_cell_standable(dest) {
                return fail(FailReason::Internal);
            }
            if !self.world.line_of_sight(dest, target.position) {
                return fail(FailReason::MissingLineOfSight);
            }
            return GrappleReport::Ok { destination: dest };
        }

        let (cells, count) = self.free_spots(req, &grappler, Some(target.position));
        if count == 0 {
            return fail(FailReason::NoDestination);
        }
        for &cell in &cells[..count] {
            if self.world.line_of_sight(cell, target.position) {
                return GrappleReport::Ok { destination: cell };
            }
        }
        fail(FailReason::MissingLineOfSight)
    }

    /// Free cells around the grappler, ranked for target travel distance.
    ///
    /// West/east neighbours are seeded first; under `PreferAdjacent` the
    /// grappler's own row gets a heavy distance discount so adjacent spots
    /// win ties, and under `OnlyAdjacent` the other six cells are not even
    /// considered.
    fn free_spots(
        &self,
        req: &GrappleRequest,
        grappler: &ActorFacts,
        target: Option<Cell>,
    ) -> ([Cell; 8], usize) {
        let center = grappler.position;
        let mut cells = [Cell::default(); 8];
        let mut count = 0usize;

        let mut add = |dx: i32, dz: i32, cells: &mut [Cell; 8], count: &mut usize| {
            let clear = match req.occupied_mask {
                Some(mask) => !mask.get(dx, dz),
                None => self.world.is_cell_standable(center.offset(dx, dz)),
            };
            if clear {
                cells[*count] = center.offset(dx, dz);
                *count += 1;
            }
        };

        add(-1, 0, &mut cells, &mut count);
        add(1, 0, &mut cells, &mut count);
        if req.spot_behaviour != SpotBehaviour::OnlyAdjacent {
            add(0, -1, &mut cells, &mut count);
            add(0, 1, &mut cells, &mut count);
            add(-1, 1, &mut cells, &mut count);
            add(-1, -1, &mut cells, &mut count);
            add(1, 1, &mut cells, &mut count);
            add(1, -1, &mut cells, &mut count);
        }

        if let Some(target) = target {
            let prefer_adjacent = req.spot_behaviour != SpotBehaviour::Closest;
            cells[..count].sort_by(|a, b| {
                let rank = |c: &Cell| {
                    let mut d = (c.distance_squared(target) as f32).sqrt();
                    if prefer_adjacent && c.z == center.z {
                        d *= 0.01;
                    }
                    d
                };
                rank(a).total_cmp(&rank(b))
            });
        }

        (cells, count)
    }

    /// Execution legality for every requested target.
    ///
    /// Pre-target disqualifiers (weapon, spawn state, cooldown, empty
    /// animation set) end the whole request with a single report. Per
    /// target, the adjacent fast path wins outright, then the
    /// lasso-assisted path, then the walk fallback.
    pub fn execution_reports(&mut self, req: &ExecutionRequest) -> Vec<ExecutionReport> {
        if req.targets.is_empty() {
            return Vec::new();
        }

        let Some(executioner) = self.world.actor_facts(req.executioner) else {
            return vec![ExecutionReport::fail(None, FailReason::Internal)];
        };
        let Some(weapon_class) = executioner.weapon_class.clone() else {
            return vec![ExecutionReport::fail(None, FailReason::NoWeapon)];
        };
        if !executioner.spawned {
            return vec![ExecutionReport::fail(None, FailReason::NotSpawned)];
        }
        if executioner.downed {
            return vec![ExecutionReport::fail(None, FailReason::Downed)];
        }
        if executioner.in_animation {
            return vec![ExecutionReport::fail(None, FailReason::SelfInAnimation)];
        }
        if !req.skip_cooldown_check && executioner.on_cooldown {
            return vec![ExecutionReport::fail(None, FailReason::Cooldown)];
        }

        // Candidate animation set for this weapon and skill; empty is a
        // terminal failure, there is no point checking targets.
        let catalog = self.catalog;
        let anims: Vec<&ActionAnimDef> = match &req.only_these_animations {
            Some(names) => names
                .iter()
                .filter_map(|name| catalog.get(name))
                .collect(),
            None => catalog
                .executions_for(&weapon_class, executioner.melee_skill)
                .collect(),
        };
        if anims.is_empty() {
            return vec![ExecutionReport::fail(
                None,
                FailReason::NoAnimationsAvailable,
            )];
        }

        let adjacent_starts = self.adjacent_starts(req, &anims);

        // One generic probe decides whether the lasso is worth attempting
        // per target at all.
        let can_use_lasso = req.can_use_lasso
            && self
                .grapple_report(&GrappleRequest {
                    grappler: req.executioner,
                    occupied_mask: Some(req.small_occupied_mask),
                    trust_lasso_usability: req.trust_lasso_usability,
                    lasso_range: req.lasso_range,
                    quiet: true,
                    ..GrappleRequest::default()
                })
                .can_grapple();

        req.targets
            .iter()
            .map(|&target| {
                self.process_execution_target(req, &executioner, target, &adjacent_starts, can_use_lasso)
            })
            .collect()
    }

    /// Animations that fit the live occupancy when started in place, per
    /// orientation.
    fn adjacent_starts<'c>(
        &self,
        req: &ExecutionRequest,
        anims: &[&'c ActionAnimDef],
    ) -> Vec<AnimStart<'c>> {
        let mut starts = Vec::new();
        if !req.west_cell && !req.east_cell {
            return starts;
        }
        for def in anims {
            if req.west_cell && def.mask(true).allows(req.occupied_mask) {
                starts.push(AnimStart {
                    def,
                    mirror_x: true,
                });
            }
            if req.east_cell && def.mask(false).allows(req.occupied_mask) {
                starts.push(AnimStart {
                    def,
                    mirror_x: false,
                });
            }
        }
        starts
    }

    fn process_execution_target(
        &mut self,
        req: &ExecutionRequest,
        executioner: &ActorFacts,
        target_id: ActorId,
        adjacent_starts: &[AnimStart<'_>],
        can_use_lasso: bool,
    ) -> ExecutionReport {
        let fail = |reason| ExecutionReport::fail(Some(target_id), reason);

        let Some(target) = self.world.actor_facts(target_id) else {
            return fail(FailReason::Internal);
        };
        if target.dead {
            return fail(FailReason::DeadTarget);
        }
        if target.downed {
            return fail(FailReason::DownedTarget);
        }
        // The UI filters animals before asking; hitting this is a caller
        // bug, not a user-facing state.
        if target.is_animal && !self.config.animals_can_be_executed {
            return fail(FailReason::Internal);
        }
        if target.in_animation {
            return fail(FailReason::InAnimation);
        }

        let ep = executioner.position;
        let tp = target.position;

        // Fast path: the target is already standing in a start cell and an
        // animation mask fits. Success here short-circuits the lasso and
        // walk strategies.
        if !adjacent_starts.is_empty() && tp.z == ep.z {
            let east = tp.x == ep.x + 1;
            let west = tp.x == ep.x - 1;
            if east || west {
                let mut possibilities = self.pool.borrow_list();
                possibilities.extend(
                    adjacent_starts
                        .iter()
                        .filter(|s| s.mirror_x == west)
                        .map(|s| PossibleExecution {
                            anim: s.def.name.clone(),
                            mirror_x: s.mirror_x,
                            lasso_to: None,
                        }),
                );
                if possibilities.is_empty() {
                    // Adjacent but nothing fits: the only explanation left
                    // is missing space around the pair.
                    self.pool.recycle_list(possibilities);
                    return fail(FailReason::NoSpace);
                }
                return ExecutionReport {
                    target: Some(target_id),
                    outcome: ExecutionOutcome::Possible { possibilities },
                };
            }
        }

        // Lasso-assisted path: pull the target into an adjacent cell, then
        // start the animation oriented toward that side.
        if can_use_lasso {
            let lasso = self.grapple_report(&GrappleRequest {
                grappler: req.executioner,
                target: Some(target_id),
                spot_behaviour: SpotBehaviour::OnlyAdjacent,
                occupied_mask: Some(req.small_occupied_mask),
                skip_cooldown_check: true,
                skip_lasso_check: true,
                trust_lasso_usability: req.trust_lasso_usability,
                lasso_range: req.lasso_range,
                quiet: true,
                ..GrappleRequest::default()
            });
            if let Some(dest) = lasso.destination() {
                let mirror_x = dest.x < ep.x;
                let mut possibilities = self.pool.borrow_list();
                possibilities.extend(
                    adjacent_starts
                        .iter()
                        .filter(|s| s.mirror_x == mirror_x)
                        .map(|s| PossibleExecution {
                            anim: s.def.name.clone(),
                            mirror_x,
                            lasso_to: Some(dest),
                        }),
                );
                if !possibilities.is_empty() {
                    return ExecutionReport {
                        target: Some(target_id),
                        outcome: ExecutionOutcome::Possible { possibilities },
                    };
                }
                self.pool.recycle_list(possibilities);
            }
        }

        // Walk fallback, the only strategy that needs pathfinding.
        if !req.can_walk {
            return fail(FailReason::WalkingDisallowed);
        }
        if !self.world.can_reach(req.executioner, target_id) {
            return fail(FailReason::NoPath);
        }
        ExecutionReport {
            target: Some(target_id),
            outcome: ExecutionOutcome::MustWalk,
        }
    }
}
