//! The board: unit placement, spatial queries, pathfinding and the event bus.
//!
//! The board owns every unit in an arena keyed by [`UnitId`]. Units refer
//! to each other only by id, so a unit that has left the board is simply
//! a failed lookup.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::CombatConfig;
use crate::error::{BoardError, Result};
use crate::events::GameEvent;
use crate::feedback::{CombatLog, Rgb, TextFloater, VisualEffect, VisualEffectKind};
use crate::math::{chebyshev, fixed_serde, Fixed};
use crate::projectile::Projectile;
use crate::rng::CombatRng;
use crate::unit::{Team, Unit, UnitId, UnitKind};

/// Neighbour offsets, in the order searches visit them.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// What remains on a cell after a unit dies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Corpse {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Archetype of the dead unit.
    pub kind: UnitKind,
    /// Team of the dead unit.
    pub team: Team,
    /// Max hit points of the dead unit.
    #[serde(with = "fixed_serde")]
    pub max_hp: Fixed,
    /// Name of the dead unit.
    pub name: String,
}

impl Corpse {
    /// Snapshot a unit where it stands.
    #[must_use]
    pub fn of(unit: &Unit) -> Self {
        let (x, y) = unit.position();
        Self {
            x,
            y,
            kind: unit.kind,
            team: unit.team(),
            max_hp: unit.max_hp(),
            name: unit.name.clone(),
        }
    }
}

/// Grid battlefield.
#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) config: CombatConfig,
    pub(crate) units: BTreeMap<UnitId, Unit>,
    cells: HashMap<(i32, i32), UnitId>,
    player_units: Vec<UnitId>,
    enemy_units: Vec<UnitId>,
    pub(crate) projectiles: Vec<Projectile>,
    visual_effects: Vec<VisualEffect>,
    floaters: Vec<TextFloater>,
    corpses: Vec<Corpse>,
    pub(crate) log: CombatLog,
    pub(crate) rng: CombatRng,
    next_id: u64,
    events: Vec<GameEvent>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl Board {
    /// Empty board sized by the config.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        let log = CombatLog::new(config.combat_log_capacity);
        let rng = CombatRng::new(config.seed);
        Self {
            config,
            units: BTreeMap::new(),
            cells: HashMap::new(),
            player_units: Vec::new(),
            enemy_units: Vec::new(),
            projectiles: Vec::new(),
            visual_effects: Vec::new(),
            floaters: Vec::new(),
            corpses: Vec::new(),
            log,
            rng,
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Settings the board was built with.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Columns.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.config.width
    }

    /// Rows.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.config.height
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Whether the cell lies on the board.
    #[must_use]
    pub fn is_valid_position(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.config.width && y < self.config.height
    }

    /// Whether the cell lies on the board and nobody stands on it.
    #[must_use]
    pub fn is_free(&self, x: i32, y: i32) -> bool {
        self.is_valid_position(x, y) && !self.cells.contains_key(&(x, y))
    }

    fn check_cell(&self, x: i32, y: i32) -> Result<()> {
        if !self.is_valid_position(x, y) {
            return Err(BoardError::OutOfBounds {
                x,
                y,
                width: self.config.width,
                height: self.config.height,
            });
        }
        if let Some(&occupant) = self.cells.get(&(x, y)) {
            return Err(BoardError::Occupied { x, y, occupant });
        }
        Ok(())
    }

    /// Place a unit on a team. Its home becomes this cell.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] or [`BoardError::Occupied`]; the unit
    /// is dropped in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use abler_core::prelude::*;
    ///
    /// let mut board = Board::default();
    /// let unit = Unit::new("Squire", UnitKind::Paladin, Stats::default());
    /// let id = board.add(unit.clone(), 2, 3, Team::Player).unwrap();
    /// assert_eq!(board.unit(id).map(Unit::position), Some((2, 3)));
    /// assert!(board.add(unit, 2, 3, Team::Enemy).is_err());
    /// ```
    pub fn add(&mut self, mut unit: Unit, x: i32, y: i32, team: Team) -> Result<UnitId> {
        self.check_cell(x, y)?;

        let id = UnitId(self.next_id);
        self.next_id += 1;
        unit.bind(id);
        unit.team = team;
        unit.x = x;
        unit.y = y;
        unit.home = (x, y);

        debug!(unit = %id, name = %unit.name, team = team.label(), x, y, "unit added");
        self.cells.insert((x, y), id);
        match team {
            Team::Player => self.player_units.push(id),
            Team::Enemy => self.enemy_units.push(id),
        }
        self.units.insert(id, unit);
        self.raise_event(GameEvent::UnitAdded { unit: id });
        Ok(id)
    }

    /// Take a unit off the board and hand it back.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        if self.cells.get(&(unit.x, unit.y)) == Some(&id) {
            self.cells.remove(&(unit.x, unit.y));
        }
        self.player_units.retain(|&other| other != id);
        self.enemy_units.retain(|&other| other != id);
        debug!(unit = %id, name = %unit.name, "unit removed");
        self.raise_event(GameEvent::UnitRemoved { unit: id });
        Some(unit)
    }

    /// Move a unit to another cell.
    ///
    /// # Errors
    ///
    /// [`BoardError::UnknownUnit`], [`BoardError::OutOfBounds`] or
    /// [`BoardError::Occupied`]; nothing changes in that case.
    pub fn move_unit(&mut self, id: UnitId, x: i32, y: i32) -> Result<()> {
        let from = self
            .units
            .get(&id)
            .map(Unit::position)
            .ok_or(BoardError::UnknownUnit(id))?;
        self.check_cell(x, y)?;

        self.cells.remove(&from);
        self.cells.insert((x, y), id);
        if let Some(unit) = self.units.get_mut(&id) {
            unit.x = x;
            unit.y = y;
        }
        Ok(())
    }

    /// Empty the board for the next round.
    ///
    /// Id assignment keeps counting so ids stay unique for the whole match.
    pub fn clear(&mut self) {
        self.units.clear();
        self.cells.clear();
        self.player_units.clear();
        self.enemy_units.clear();
        self.projectiles.clear();
        self.visual_effects.clear();
        self.floaters.clear();
        self.corpses.clear();
        self.events.clear();
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Mutable unit by id, for loadout changes between actions.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Unit standing on a cell, alive or dying.
    #[must_use]
    pub fn unit_at(&self, x: i32, y: i32) -> Option<&Unit> {
        self.cells.get(&(x, y)).and_then(|id| self.units.get(id))
    }

    /// Whether the unit is on the board with hit points left.
    #[must_use]
    pub fn is_alive(&self, id: UnitId) -> bool {
        self.units.get(&id).is_some_and(Unit::is_alive)
    }

    /// Player roster in placement order.
    #[must_use]
    pub fn players(&self) -> &[UnitId] {
        &self.player_units
    }

    /// Enemy roster in placement order.
    #[must_use]
    pub fn enemies(&self) -> &[UnitId] {
        &self.enemy_units
    }

    /// Roster of one team.
    #[must_use]
    pub fn roster(&self, team: Team) -> &[UnitId] {
        match team {
            Team::Player => &self.player_units,
            Team::Enemy => &self.enemy_units,
        }
    }

    /// Snapshot of every id, players first.
    #[must_use]
    pub fn all_units(&self) -> Vec<UnitId> {
        self.player_units.iter().chain(&self.enemy_units).copied().collect()
    }

    /// Every unit, players first.
    pub fn iter_units(&self) -> impl Iterator<Item = &Unit> {
        self.player_units
            .iter()
            .chain(&self.enemy_units)
            .filter_map(|id| self.units.get(id))
    }

    /// Number of units on the board, dead or alive.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Whether any unit of the team is alive.
    #[must_use]
    pub fn has_living(&self, team: Team) -> bool {
        self.roster(team).iter().any(|&id| self.is_alive(id))
    }

    // ------------------------------------------------------------------
    // Spatial queries
    // ------------------------------------------------------------------

    /// Chebyshev distance between two units on the board.
    #[must_use]
    pub fn distance(&self, a: UnitId, b: UnitId) -> Option<i32> {
        Some(chebyshev(self.unit(a)?.position(), self.unit(b)?.position()))
    }

    /// Closest living enemy. Ties go to the earlier roster entry.
    #[must_use]
    pub fn nearest_enemy(&self, id: UnitId) -> Option<UnitId> {
        let unit = self.unit(id)?;
        self.nearest_enemy_of(unit.team(), unit.position())
    }

    /// Closest living unit opposing `team`, measured from `from`.
    #[must_use]
    pub fn nearest_enemy_of(&self, team: Team, from: (i32, i32)) -> Option<UnitId> {
        let mut best: Option<(i32, UnitId)> = None;
        for &other in self.roster(team.opponent()) {
            let Some(unit) = self.unit(other).filter(|u| u.is_alive()) else {
                continue;
            };
            let distance = chebyshev(from, unit.position());
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, other));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Living units within Chebyshev `radius` of a cell, optionally on one team.
    #[must_use]
    pub fn units_in_range(&self, x: i32, y: i32, radius: i32, team: Option<Team>) -> Vec<UnitId> {
        self.iter_units()
            .filter(|u| u.is_alive())
            .filter(|u| team.map_or(true, |t| u.team() == t))
            .filter(|u| chebyshev((x, y), u.position()) <= radius)
            .map(Unit::id)
            .collect()
    }

    /// Shortest 8-connected path from start to end inclusive, avoiding
    /// occupied cells. The end cell may be occupied (it is usually the
    /// target). Empty when unreachable.
    ///
    /// # Example
    ///
    /// ```
    /// use abler_core::board::Board;
    ///
    /// let board = Board::default();
    /// let path = board.find_path((0, 0), (9, 9));
    /// assert_eq!(path.len(), 10);
    /// ```
    #[must_use]
    pub fn find_path(&self, start: (i32, i32), end: (i32, i32)) -> Vec<(i32, i32)> {
        if !self.is_valid_position(start.0, start.1) || !self.is_valid_position(end.0, end.1) {
            return Vec::new();
        }
        if start == end {
            return vec![start];
        }

        let mut came_from: HashMap<(i32, i32), (i32, i32)> = HashMap::new();
        let mut visited: HashSet<(i32, i32)> = HashSet::from([start]);
        let mut frontier = VecDeque::from([start]);

        while let Some(current) = frontier.pop_front() {
            for &(dx, dy) in &DIRECTIONS {
                let next = (current.0 + dx, current.1 + dy);
                if !self.is_valid_position(next.0, next.1) || visited.contains(&next) {
                    continue;
                }
                if next == end {
                    let mut path = vec![end, current];
                    let mut cursor = current;
                    while let Some(&previous) = came_from.get(&cursor) {
                        path.push(previous);
                        cursor = previous;
                    }
                    path.reverse();
                    return path;
                }
                if self.cells.contains_key(&next) {
                    continue;
                }
                visited.insert(next);
                came_from.insert(next, current);
                frontier.push_back(next);
            }
        }

        Vec::new()
    }

    // ------------------------------------------------------------------
    // Event bus
    // ------------------------------------------------------------------

    /// Record an event and offer it to every living unit's reactions.
    ///
    /// Delivery follows roster order (players, then enemies); within a
    /// unit, spell then passives then items then status effects.
    pub fn raise_event(&mut self, event: GameEvent) {
        trace!(event = event.name(), "event raised");
        self.events.push(event.clone());

        for owner in self.all_units() {
            let listeners = match self.units.get(&owner) {
                Some(unit) if unit.is_alive() => unit.listeners(),
                _ => continue,
            };
            for listener in listeners {
                let reaction = self
                    .units
                    .get(&owner)
                    .filter(|unit| unit.is_alive())
                    .and_then(|unit| unit.reaction(listener))
                    .filter(|reaction| reaction.listens_to(&event))
                    .cloned();
                if let Some(reaction) = reaction {
                    self.react(owner, &reaction, &event);
                }
            }
        }
    }

    /// Events raised since the last drain.
    #[must_use]
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Drain events raised outside [`Board::advance`].
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Corpses and presentation records
    // ------------------------------------------------------------------

    /// Record a corpse.
    pub fn add_corpse(&mut self, corpse: Corpse) {
        self.corpses.push(corpse);
    }

    /// Remove one matching corpse. Returns whether one was found.
    pub fn remove_corpse(&mut self, corpse: &Corpse) -> bool {
        match self.corpses.iter().position(|c| c == corpse) {
            Some(index) => {
                self.corpses.remove(index);
                true
            }
            None => false,
        }
    }

    /// Corpses within Chebyshev `radius` of a cell.
    #[must_use]
    pub fn corpses_in_area(&self, x: i32, y: i32, radius: i32) -> Vec<&Corpse> {
        self.corpses
            .iter()
            .filter(|c| chebyshev((x, y), (c.x, c.y)) <= radius)
            .collect()
    }

    /// Every corpse, oldest first.
    #[must_use]
    pub fn corpses(&self) -> &[Corpse] {
        &self.corpses
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Drop a fading marker on a cell.
    pub fn add_visual_effect(&mut self, kind: VisualEffectKind, x: i32, y: i32) {
        self.visual_effects
            .push(VisualEffect::new(kind, x, y, self.config.visual_effect_decay));
    }

    /// Live markers.
    #[must_use]
    pub fn visual_effects(&self) -> &[VisualEffect] {
        &self.visual_effects
    }

    /// Float a label above a cell.
    pub fn add_floater(&mut self, x: i32, y: i32, text: impl Into<String>, color: Rgb) {
        self.floaters
            .push(TextFloater::new(x, y, text, color, self.config.floater_lifetime));
    }

    /// Live floating labels.
    #[must_use]
    pub fn floaters(&self) -> &[TextFloater] {
        &self.floaters
    }

    /// Combat narration.
    #[must_use]
    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Advance everything by `dt` seconds and return the events raised
    /// since the previous call.
    ///
    /// Projectiles move first, then presentation records age, then each
    /// unit in a roster snapshot runs its state machine.
    pub fn advance(&mut self, dt: Fixed) -> Vec<GameEvent> {
        self.advance_projectiles(dt);
        self.visual_effects.retain_mut(|effect| effect.advance(dt));
        self.floaters.retain_mut(|floater| floater.advance(dt));

        for id in self.all_units() {
            self.advance_unit(id, dt);
        }

        std::mem::take(&mut self.events)
    }

    /// Deterministic digest of the simulation state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.units.len().hash(&mut hasher);
        for (id, unit) in &self.units {
            id.hash(&mut hasher);
            unit.team().hash(&mut hasher);
            unit.position().hash(&mut hasher);
            unit.hp().to_bits().hash(&mut hasher);
            unit.stats.hash(&mut hasher);
            unit.state().hash(&mut hasher);
            unit.target().hash(&mut hasher);
            unit.attack_timer().to_bits().hash(&mut hasher);
            unit.move_timer().to_bits().hash(&mut hasher);
            unit.cast_timer().to_bits().hash(&mut hasher);
            unit.death_timer().to_bits().hash(&mut hasher);
            unit.spell().map(|s| s.current_mana().to_bits()).hash(&mut hasher);
            unit.status_effects().len().hash(&mut hasher);
            for effect in unit.status_effects() {
                effect.name.hash(&mut hasher);
                effect.remaining().to_bits().hash(&mut hasher);
            }
        }

        self.player_units.hash(&mut hasher);
        self.enemy_units.hash(&mut hasher);

        self.projectiles.len().hash(&mut hasher);
        for projectile in &self.projectiles {
            projectile.source.hash(&mut hasher);
            projectile.position.hash(&mut hasher);
            projectile.damage.to_bits().hash(&mut hasher);
        }

        self.corpses.hash(&mut hasher);
        self.rng.state().hash(&mut hasher);

        hasher.finish()
    }

    /// Whether every occupied cell maps to a unit standing on that cell
    /// and every unit is indexed by its cell.
    #[must_use]
    pub fn occupancy_is_consistent(&self) -> bool {
        let cells_match = self
            .cells
            .iter()
            .all(|(&cell, id)| self.units.get(id).is_some_and(|u| u.position() == cell));
        let units_indexed = self
            .units
            .iter()
            .all(|(id, u)| self.cells.get(&u.position()) == Some(id));
        cells_match && units_indexed && self.cells.len() == self.units.len()
    }
}
