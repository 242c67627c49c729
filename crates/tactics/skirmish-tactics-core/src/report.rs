//! Report types: categorized outcomes of legality queries.
//!
//! Failures are first-class values, not errors — callers branch on the
//! category and surface the templated messages, never string content.

use serde::{Deserialize, Serialize};

use crate::occupancy::Cell;
use crate::world::ActorId;

/// Why an action cannot happen. Closed set; message templates hang off the
/// category so UI text stays stable and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FailReason {
    /// A precondition the UI should have filtered; carries no user message.
    Internal,
    NotSpawned,
    Dead,
    DeadTarget,
    Downed,
    DownedTarget,
    /// The target is captured by a playing animation.
    InAnimation,
    /// The acting pawn is captured by a playing animation.
    SelfInAnimation,
    Cooldown,
    MissingLasso,
    NoWeapon,
    SkillTooLow,
    Manipulation,
    NoDestination,
    AlreadyAtDestination,
    AlreadyTargeted,
    TooFar,
    Mass,
    Size,
    MissingLineOfSight,
    NoAnimationsAvailable,
    NoSpace,
    WalkingDisallowed,
    NoPath,
}

impl FailReason {
    /// Short label for list UI.
    pub fn short_message(self) -> &'static str {
        match self {
            Self::Internal => "Internal error",
            Self::NotSpawned => "Not present",
            Self::Dead => "Dead",
            Self::DeadTarget => "Target is dead",
            Self::Downed => "Downed",
            Self::DownedTarget => "Target is downed",
            Self::InAnimation => "Target is busy",
            Self::SelfInAnimation => "Already in an animation",
            Self::Cooldown => "On cooldown",
            Self::MissingLasso => "No lasso",
            Self::NoWeapon => "No melee weapon",
            Self::SkillTooLow => "Melee skill too low",
            Self::Manipulation => "Insufficient manipulation",
            Self::NoDestination => "No free spot",
            Self::AlreadyAtDestination => "Already there",
            Self::AlreadyTargeted => "Already targeted",
            Self::TooFar => "Out of range",
            Self::Mass => "Too heavy",
            Self::Size => "Too large",
            Self::MissingLineOfSight => "No line of sight",
            Self::NoAnimationsAvailable => "No usable animations",
            Self::NoSpace => "Not enough space",
            Self::WalkingDisallowed => "Cannot move there",
            Self::NoPath => "No path",
        }
    }

    /// Longer sentence for tooltips.
    pub fn long_message(self) -> &'static str {
        match self {
            Self::Internal => "Something went wrong while checking this action.",
            Self::NotSpawned => "The pawn is not present on the map.",
            Self::Dead => "The pawn is dead.",
            Self::DeadTarget => "The target is already dead.",
            Self::Downed => "The pawn is downed and cannot act.",
            Self::DownedTarget => "The target is downed.",
            Self::InAnimation => "The target is part of a playing animation.",
            Self::SelfInAnimation => "The pawn is part of a playing animation.",
            Self::Cooldown => "This action is still on cooldown.",
            Self::MissingLasso => "A lasso must be equipped to grapple.",
            Self::NoWeapon => "A melee weapon is required.",
            Self::SkillTooLow => "The pawn's melee skill is below the required level.",
            Self::Manipulation => "The pawn's manipulation is too impaired.",
            Self::NoDestination => "There is no free cell to pull the target to.",
            Self::AlreadyAtDestination => "The target is already at the destination.",
            Self::AlreadyTargeted => "Another pawn is already grappling this target.",
            Self::TooFar => "The target is beyond lasso range.",
            Self::Mass => "The target is too heavy to pull.",
            Self::Size => "The target is too large to pull.",
            Self::MissingLineOfSight => "There is no clear line to the target.",
            Self::NoAnimationsAvailable => {
                "No execution animation works with the equipped weapon."
            }
            Self::NoSpace => "There is not enough clear space around for any animation.",
            Self::WalkingDisallowed => "Walking to the target is not allowed here.",
            Self::NoPath => "No walkable path reaches the target.",
        }
    }
}

/// Outcome of a grapple legality query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GrappleReport {
    /// The grapple is legal; pull the target to `destination`.
    Ok { destination: Cell },
    Fail { reason: FailReason },
}

impl GrappleReport {
    #[inline]
    pub fn can_grapple(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    #[inline]
    pub fn destination(&self) -> Option<Cell> {
        match self {
            Self::Ok { destination } => Some(*destination),
            Self::Fail { .. } => None,
        }
    }

    #[inline]
    pub fn reason(&self) -> Option<FailReason> {
        match self {
            Self::Ok { .. } => None,
            Self::Fail { reason } => Some(*reason),
        }
    }
}

/// One feasible way to start an execution on a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossibleExecution {
    /// Catalog name of the animation to play.
    pub anim: String,
    /// Play mirrored (victim approaches from the west).
    pub mirror_x: bool,
    /// Pull the target here first when the plan goes through the lasso.
    pub lasso_to: Option<Cell>,
}

/// Recycled backing lists for execution reports.
///
/// Execution queries run per hover/tick over many targets; the candidate
/// lists are borrowed here and must be returned with
/// [`ExecutionReport::recycle`] once the caller is done reading them.
#[derive(Debug, Default)]
pub struct ReportPool {
    free: Vec<Vec<PossibleExecution>>,
}

impl ReportPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow an empty list; ownership transfers to the report until
    /// recycled.
    pub fn borrow_list(&mut self) -> Vec<PossibleExecution> {
        self.free.pop().unwrap_or_default()
    }

    /// Return a list to the pool.
    pub fn recycle_list(&mut self, mut list: Vec<PossibleExecution>) {
        list.clear();
        self.free.push(list);
    }

    #[cfg(test)]
    pub(crate) fn pooled(&self) -> usize {
        self.free.len()
    }
}

/// Outcome of an execution legality query for one target.
#[derive(Debug, PartialEq)]
pub struct ExecutionReport {
    /// The target this report is about; `None` for pre-target failures
    /// (no weapon, cooldown, no animations) that end the whole request.
    pub target: Option<ActorId>,
    pub outcome: ExecutionOutcome,
}

/// The payload half of an [`ExecutionReport`].
#[derive(Debug, PartialEq)]
pub enum ExecutionOutcome {
    /// Executable now: at least one animation fits, possibly via a lasso
    /// pull first.
    Possible {
        possibilities: Vec<PossibleExecution>,
    },
    /// Reachable by walking; re-request on arrival.
    MustWalk,
    Fail { reason: FailReason },
}

impl ExecutionReport {
    pub fn fail(target: Option<ActorId>, reason: FailReason) -> Self {
        Self {
            target,
            outcome: ExecutionOutcome::Fail { reason },
        }
    }

    #[inline]
    pub fn can_execute(&self) -> bool {
        matches!(
            self.outcome,
            ExecutionOutcome::Possible { .. } | ExecutionOutcome::MustWalk
        )
    }

    #[inline]
    pub fn reason(&self) -> Option<FailReason> {
        match &self.outcome {
            ExecutionOutcome::Fail { reason } => Some(*reason),
            _ => None,
        }
    }

    /// Return any pooled payload to `pool`. Call once per report after
    /// consuming it; dropping a report without recycling only costs the
    /// allocation.
    pub fn recycle(self, pool: &mut ReportPool) {
        if let ExecutionOutcome::Possible { possibilities } = self.outcome {
            pool.recycle_list(possibilities);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_exist_for_every_reason() {
        let reasons = [
            FailReason::Internal,
            FailReason::NotSpawned,
            FailReason::Dead,
            FailReason::DeadTarget,
            FailReason::Downed,
            FailReason::DownedTarget,
            FailReason::InAnimation,
            FailReason::SelfInAnimation,
            FailReason::Cooldown,
            FailReason::MissingLasso,
            FailReason::NoWeapon,
            FailReason::SkillTooLow,
            FailReason::Manipulation,
            FailReason::NoDestination,
            FailReason::AlreadyAtDestination,
            FailReason::AlreadyTargeted,
            FailReason::TooFar,
            FailReason::Mass,
            FailReason::Size,
            FailReason::MissingLineOfSight,
            FailReason::NoAnimationsAvailable,
            FailReason::NoSpace,
            FailReason::WalkingDisallowed,
            FailReason::NoPath,
        ];
        for reason in reasons {
            assert!(!reason.short_message().is_empty());
            assert!(!reason.long_message().is_empty());
        }
    }

    #[test]
    fn recycling_returns_lists_to_the_pool() {
        let mut pool = ReportPool::new();
        let mut list = pool.borrow_list();
        list.push(PossibleExecution {
            anim: "slash".into(),
            mirror_x: false,
            lasso_to: None,
        });
        let report = ExecutionReport {
            target: Some(ActorId(1)),
            outcome: ExecutionOutcome::Possible {
                possibilities: list,
            },
        };
        assert_eq!(pool.pooled(), 0);
        report.recycle(&mut pool);
        assert_eq!(pool.pooled(), 1);

        // The recycled list comes back empty.
        let reused = pool.borrow_list();
        assert!(reused.is_empty());
    }
}
