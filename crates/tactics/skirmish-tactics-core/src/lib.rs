//! Skirmish tactics core.
//!
//! The planning layer on top of the animation engine: fixed-width occupancy
//! bitmasks for O(1) space-legality checks, a per-animation catalog with
//! baked clearance masks, and the request/report action controller that
//! decides whether and where grapples and executions can legally happen.

pub mod catalog;
pub mod controller;
pub mod occupancy;
pub mod report;
pub mod request;
pub mod world;

pub use catalog::{ActionAnimDef, ActionCatalog, ActionKind, CatalogError, CellData, CellRole};
pub use controller::ActionController;
pub use occupancy::{Cell, CellOffset, LargeMask, SmallMask};
pub use report::{
    ExecutionOutcome, ExecutionReport, FailReason, GrappleReport, PossibleExecution, ReportPool,
};
pub use request::{ExecutionRequest, GrappleRequest, SpotBehaviour};
pub use world::{ActorFacts, ActorId, TacticalWorld, TacticsConfig};
