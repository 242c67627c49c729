//! The planning-side animation catalog: per-animation space requirements,
//! weapon filters and skill gates, with legality masks baked at load time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use skirmish_anim_core::{AnimationAsset, AssetError, AssetRegistry, AssetSource};

use crate::occupancy::{CellOffset, LargeMask};

/// What an animation definition is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Execution,
    Duel,
}

/// Role of a block of cells in a definition's `cell_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellRole {
    /// The cells must be standable for the animation to start.
    MustBeClear,
    /// Where the actor with `actor_index` stands when the animation starts.
    ActorStart,
    /// Where the actor with `actor_index` is placed at the natural end.
    ActorEnd,
}

/// A group of relative cells with one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    pub role: CellRole,
    #[serde(default)]
    pub actor_index: Option<u8>,
    pub cells: Vec<CellOffset>,
}

/// One animation as the planner sees it.
///
/// The visual asset is referenced by path and only touched by the animation
/// crate; everything the planner needs (masks, gates, filters) lives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionAnimDef {
    pub name: String,
    pub kind: ActionKind,
    /// Path of the binary animation asset for the playback side.
    pub asset_path: String,
    /// Opaque weapon-class tags the primary actor's weapon must match.
    pub weapon_classes: Vec<String>,
    /// Optional second filter; when present, duels match one weapon against
    /// `weapon_classes` and the other against this list.
    #[serde(default)]
    pub weapon_classes_second: Option<Vec<String>>,
    #[serde(default)]
    pub min_melee_skill: Option<u32>,
    /// Weighting hook for host-side selection policies; zero disables the
    /// definition.
    #[serde(default = "default_probability")]
    pub relative_probability: f32,
    pub cell_data: Vec<CellData>,
    #[serde(default)]
    pub actor_count: u8,

    /// Baked: bit set for every cell that must be clear, unmirrored.
    #[serde(skip)]
    pub clear_mask: LargeMask,
    /// Baked: the same requirement mirrored on x.
    #[serde(skip)]
    pub flip_clear_mask: LargeMask,
}

fn default_probability() -> f32 {
    1.0
}

impl ActionAnimDef {
    /// Bake the static legality masks from `cell_data`.
    pub fn bake_masks(&mut self) {
        let cells = self.must_be_clear_cells(false, false).collect::<Vec<_>>();
        self.clear_mask = LargeMask::encode_static(cells.iter().copied());
        self.flip_clear_mask = self.clear_mask.mirrored(true, false);
    }

    /// The static mask for an orientation.
    #[inline]
    pub fn mask(&self, mirror_x: bool) -> LargeMask {
        if mirror_x {
            self.flip_clear_mask
        } else {
            self.clear_mask
        }
    }

    /// Every cell that must be clear, under the given mirroring.
    pub fn must_be_clear_cells(
        &self,
        mirror_x: bool,
        mirror_y: bool,
    ) -> impl Iterator<Item = CellOffset> + '_ {
        self.cell_data
            .iter()
            .filter(|d| d.role == CellRole::MustBeClear)
            .flat_map(move |d| {
                d.cells
                    .iter()
                    .map(move |c| c.mirrored(mirror_x, mirror_y))
            })
    }

    /// Start cell of an actor, under the given mirroring.
    pub fn actor_start(&self, actor_index: u8, mirror_x: bool, mirror_y: bool) -> Option<CellOffset> {
        self.actor_cell(CellRole::ActorStart, actor_index, mirror_x, mirror_y)
    }

    /// End cell of an actor, falling back to the start cell when no end was
    /// authored.
    pub fn actor_end(&self, actor_index: u8, mirror_x: bool, mirror_y: bool) -> Option<CellOffset> {
        self.actor_cell(CellRole::ActorEnd, actor_index, mirror_x, mirror_y)
            .or_else(|| self.actor_start(actor_index, mirror_x, mirror_y))
    }

    fn actor_cell(
        &self,
        role: CellRole,
        actor_index: u8,
        mirror_x: bool,
        mirror_y: bool,
    ) -> Option<CellOffset> {
        self.cell_data
            .iter()
            .find(|d| d.role == role && d.actor_index == Some(actor_index))
            .and_then(|d| d.cells.first())
            .map(|c| c.mirrored(mirror_x, mirror_y))
    }

    /// Load the playback asset behind this definition through a session
    /// registry. Decode failures propagate; the planner keeps working off
    /// the baked masks either way.
    pub fn resolve_asset<S: AssetSource>(
        &self,
        registry: &mut AssetRegistry<S>,
    ) -> Result<Arc<AnimationAsset>, AssetError> {
        registry.load(&self.asset_path)
    }

    /// Does this definition accept a weapon of the given class as the
    /// primary weapon?
    #[inline]
    pub fn allows_weapon(&self, weapon_class: &str) -> bool {
        self.weapon_classes.iter().any(|c| c == weapon_class)
    }

    fn allows_second_weapon(&self, weapon_class: &str) -> bool {
        match &self.weapon_classes_second {
            Some(second) => second.iter().any(|c| c == weapon_class),
            None => self.allows_weapon(weapon_class),
        }
    }
}

/// Errors raised while assembling a catalog.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to parse catalog json")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate animation definition '{name}'")]
    DuplicateName { name: String },

    #[error("definition '{name}' is invalid: {reason}")]
    InvalidDef { name: String, reason: String },
}

/// All planning definitions known to a session, indexed by kind.
#[derive(Debug, Default)]
pub struct ActionCatalog {
    defs: Vec<ActionAnimDef>,
}

impl ActionCatalog {
    /// Build a catalog, baking masks and validating every definition.
    pub fn new(mut defs: Vec<ActionAnimDef>) -> Result<Self, CatalogError> {
        let mut seen = hashbrown::HashSet::new();
        for def in defs.iter_mut() {
            if !seen.insert(def.name.clone()) {
                return Err(CatalogError::DuplicateName {
                    name: def.name.clone(),
                });
            }
            def.bake_masks();
            def.validate()?;
        }
        Ok(Self { defs })
    }

    /// Parse a JSON array of definitions.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let defs: Vec<ActionAnimDef> = serde_json::from_str(json)?;
        Self::new(defs)
    }

    #[inline]
    pub fn defs(&self) -> &[ActionAnimDef] {
        &self.defs
    }

    pub fn get(&self, name: &str) -> Option<&ActionAnimDef> {
        self.defs.iter().find(|d| d.name == name)
    }

    /// Execution animations usable with a weapon class at a melee skill
    /// level. Zero-probability definitions are filtered out here so every
    /// caller sees the same candidate set.
    pub fn executions_for<'a>(
        &'a self,
        weapon_class: &'a str,
        melee_skill: u32,
    ) -> impl Iterator<Item = &'a ActionAnimDef> {
        self.defs.iter().filter(move |d| {
            d.kind == ActionKind::Execution
                && d.allows_weapon(weapon_class)
                && d.min_melee_skill.unwrap_or(0) <= melee_skill
                && d.relative_probability > 0.0
        })
    }

    /// Find a duel animation for a weapon pairing.
    ///
    /// Returns the definition and which side must take the primary role:
    /// `None` when the pairing works either way around, `Some(true)` when
    /// the first weapon must be primary, `Some(false)` for the second.
    pub fn duel_anim_for(
        &self,
        weapon_a: &str,
        weapon_b: &str,
    ) -> Option<(&ActionAnimDef, Option<bool>)> {
        for def in self.defs.iter().filter(|d| d.kind == ActionKind::Duel) {
            if def.weapon_classes_second.is_none() {
                // One filter covers both weapons.
                if def.allows_weapon(weapon_a) && def.allows_weapon(weapon_b) {
                    return Some((def, None));
                }
                continue;
            }

            let forward = def.allows_weapon(weapon_a) && def.allows_second_weapon(weapon_b);
            let reverse = def.allows_weapon(weapon_b) && def.allows_second_weapon(weapon_a);
            match (forward, reverse) {
                (true, true) => return Some((def, None)),
                (true, false) => return Some((def, Some(true))),
                (false, true) => return Some((def, Some(false))),
                (false, false) => {}
            }
        }
        None
    }
}

impl ActionAnimDef {
    fn validate(&self) -> Result<(), CatalogError> {
        let fail = |reason: String| {
            Err(CatalogError::InvalidDef {
                name: self.name.clone(),
                reason,
            })
        };

        if self.kind == ActionKind::Execution {
            if self.actor_count < 2 {
                return fail(format!(
                    "execution animations involve at least 2 actors, got {}",
                    self.actor_count
                ));
            }
            // Execution choreography assumes the victim starts directly
            // east of the executioner; the planner's adjacency fast path
            // relies on it.
            match self.actor_start(1, false, false) {
                Some(CellOffset { x: 1, z: 0 }) => {}
                other => {
                    return fail(format!(
                        "actor 1 must start at offset (1, 0), got {other:?}"
                    ))
                }
            }
        }
        if self.weapon_classes.is_empty() {
            return fail("no weapon classes listed".into());
        }
        Ok(())
    }
}
