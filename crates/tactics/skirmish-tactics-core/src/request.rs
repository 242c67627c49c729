//! Plain-value request structs for the two planning pipelines.

use serde::{Deserialize, Serialize};

use crate::occupancy::{Cell, LargeMask, SmallMask};
use crate::world::ActorId;

/// Destination-cell selection behaviour for grapples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpotBehaviour {
    /// The first cell minimizing target travel distance wins.
    #[default]
    Closest,
    /// Directly adjacent west/east cells are preferred, then closest.
    PreferAdjacent,
    /// Only the directly adjacent west/east cells are considered.
    OnlyAdjacent,
}

/// Inputs for one grapple legality query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GrappleRequest {
    pub grappler: ActorId,
    /// The actor to pull; `None` asks only "is there any free spot".
    pub target: Option<ActorId>,
    /// A fixed destination; when set, the spot search is skipped.
    pub destination: Option<Cell>,
    pub spot_behaviour: SpotBehaviour,
    /// Pre-encoded live occupancy around the grappler; saves world queries
    /// in hot loops when the caller already has it.
    pub occupied_mask: Option<SmallMask>,
    /// Skip the cooldown check (used by the execution pipeline's probes).
    pub skip_cooldown_check: bool,
    /// Skip the lasso-in-inventory check.
    pub skip_lasso_check: bool,
    /// Skip skill/manipulation gating; the caller has already vetted them.
    pub trust_lasso_usability: bool,
    /// Range override; `None` uses the configured default.
    pub lasso_range: Option<f32>,
    /// Suppress failure-message generation for speculative queries.
    pub quiet: bool,
}

/// Inputs for one execution legality query over one or more targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub executioner: ActorId,
    /// Targets evaluated in order; one report per target.
    pub targets: Vec<ActorId>,
    /// Live 7×7 occupancy around the executioner, for animation masks.
    pub occupied_mask: LargeMask,
    /// Live 3×3 occupancy around the executioner, for lasso spot picking.
    pub small_occupied_mask: SmallMask,
    /// Consider starting with the victim on the west side.
    pub west_cell: bool,
    /// Consider starting with the victim on the east side.
    pub east_cell: bool,
    pub can_use_lasso: bool,
    pub can_walk: bool,
    pub trust_lasso_usability: bool,
    pub lasso_range: Option<f32>,
    pub skip_cooldown_check: bool,
    pub quiet: bool,
    /// Restrict the candidate set to these definitions when present.
    pub only_these_animations: Option<Vec<String>>,
}

impl ExecutionRequest {
    /// A request with every optional behaviour enabled, matching the
    /// interactive "try everything" path.
    pub fn new(executioner: ActorId, targets: Vec<ActorId>) -> Self {
        Self {
            executioner,
            targets,
            occupied_mask: LargeMask::default(),
            small_occupied_mask: SmallMask::default(),
            west_cell: true,
            east_cell: true,
            can_use_lasso: true,
            can_walk: true,
            trust_lasso_usability: false,
            lasso_range: None,
            skip_cooldown_check: false,
            quiet: false,
            only_these_animations: None,
        }
    }
}
