//! The world boundary: everything the planner is allowed to ask the host.

use serde::{Deserialize, Serialize};

use crate::occupancy::Cell;

/// Opaque actor handle; the planner only ever compares these for identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// A point-in-time summary of one actor, supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorFacts {
    pub spawned: bool,
    pub dead: bool,
    pub downed: bool,
    /// Currently captured by a playing animation.
    pub in_animation: bool,
    /// The relevant action cooldown (execution or lasso) is still running.
    pub on_cooldown: bool,
    pub has_lasso: bool,
    pub melee_skill: u32,
    /// Manipulation capacity in `[0, 1]`-ish host units.
    pub manipulation: f32,
    pub body_size: f32,
    pub mass: f32,
    pub position: Cell,
    /// Class tag of the equipped melee weapon, if any.
    pub weapon_class: Option<String>,
    /// Another actor already claimed this one as a grapple target.
    pub targeted_for_grapple: bool,
    pub is_animal: bool,
}

impl Default for ActorFacts {
    fn default() -> Self {
        Self {
            spawned: true,
            dead: false,
            downed: false,
            in_animation: false,
            on_cooldown: false,
            has_lasso: true,
            melee_skill: 0,
            manipulation: 1.0,
            body_size: 1.0,
            mass: 60.0,
            position: Cell::new(0, 0),
            weapon_class: None,
            targeted_for_grapple: false,
            is_animal: false,
        }
    }
}

/// Queries the planner may make against the live game world.
///
/// Implemented by the host; all calls are synchronous and cheap relative to
/// pathfinding, which is only reached at the very end of a decision tree.
pub trait TacticalWorld {
    /// Facts about an actor, or `None` if the handle is stale.
    fn actor_facts(&self, actor: ActorId) -> Option<ActorFacts>;

    /// Are both actors on the same map?
    fn same_map(&self, a: ActorId, b: ActorId) -> bool;

    /// Can an actor stand on the cell right now?
    fn is_cell_standable(&self, cell: Cell) -> bool;

    /// Unobstructed line between two cells, by the host's LOS rules.
    fn line_of_sight(&self, from: Cell, to: Cell) -> bool;

    /// Can `actor` path to melee range of `target`? The expensive check.
    fn can_reach(&self, actor: ActorId, target: ActorId) -> bool;
}

/// Planner-wide gates mirrored from host settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticsConfig {
    /// Minimum melee skill to use a lasso; zero disables the gate.
    pub min_skill_for_lasso: u32,
    /// Minimum manipulation to use a lasso; zero disables the gate.
    pub min_manipulation_for_lasso: f32,
    /// Heaviest target a lasso can move; zero disables the gate.
    pub max_lasso_mass: f32,
    /// Largest body size a lasso can move; zero disables the gate.
    pub max_lasso_body_size: f32,
    /// Default lasso range when a request does not override it.
    pub lasso_range: f32,
    pub animals_can_be_executed: bool,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            min_skill_for_lasso: 0,
            min_manipulation_for_lasso: 0.5,
            max_lasso_mass: 0.0,
            max_lasso_body_size: 0.0,
            lasso_range: 10.0,
            animals_can_be_executed: false,
        }
    }
}
