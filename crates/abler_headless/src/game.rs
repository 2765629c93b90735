//! Round orchestration.
//!
//! A [`Match`] owns one board for its whole life. Each round it takes the
//! player's units back off the board, clears it, resets them onto their
//! home cells, fields a seeded enemy team and lets [`CombatDriver`] run
//! the fight to an outcome.

use abler_content::prelude::create_unit;
use abler_core::prelude::{
    Board, CombatConfig, CombatDriver, CombatOutcome, CombatReport, Team, Unit, UnitId, UnitKind,
};
use abler_core::rng::CombatRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, RunnerError};
use crate::setup::MatchSetup;

/// Lives at the start of a match.
pub const STARTING_LIVES: u32 = 5;

/// Wins that end a match.
pub const WINS_TO_FINISH: u32 = 20;

/// Largest enemy team.
pub const MAX_ENEMIES: usize = 6;

/// Salt separating the match RNG stream from the board's.
const MATCH_RNG_SALT: u64 = 0xA5A5_5A5A_0F0F_F0F0;

/// What the match is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Between rounds. The army can change.
    Shopping,
    /// Units are on the board and the next call runs the fight.
    Combat,
}

/// Result of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    /// Round number, starting at 1.
    pub round: u32,
    /// Enemy archetypes fielded.
    pub enemies: Vec<UnitKind>,
    /// The fight itself.
    pub combat: CombatReport,
    /// Lives left after the round.
    pub lives: u32,
    /// Wins after the round.
    pub wins: u32,
    /// Board hash when combat stopped.
    pub state_hash: u64,
    /// Whether this round ended the match.
    pub game_over: bool,
}

#[derive(Debug, Clone)]
struct OwnedUnit {
    /// The unit as it last left the board.
    unit: Unit,
    home: (i32, i32),
    /// Board id during the current round.
    placed: Option<UnitId>,
}

/// A run of rounds against generated enemy teams.
#[derive(Debug, Clone)]
pub struct Match {
    board: Board,
    owned: Vec<OwnedUnit>,
    round: u32,
    lives: u32,
    wins: u32,
    phase: Phase,
    rng: CombatRng,
}

impl Match {
    /// An empty match seeded from the config.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        let rng = CombatRng::new(config.seed ^ MATCH_RNG_SALT);
        Self {
            board: Board::new(config),
            owned: Vec::new(),
            round: 1,
            lives: STARTING_LIVES,
            wins: 0,
            phase: Phase::Shopping,
            rng,
        }
    }

    /// A match with the setup's army recruited, seeded with `seed`.
    pub fn from_setup(setup: &MatchSetup, seed: u64) -> Result<Self> {
        let mut game = Self::new(setup.config.clone().with_seed(seed));
        for recruit in &setup.army {
            game.recruit(recruit.build()?, recruit.x, recruit.y)?;
        }
        Ok(game)
    }

    /// Add a unit to the player's army with a home cell.
    ///
    /// # Errors
    ///
    /// Fails outside the shopping phase, when the cell is off the board or
    /// when another owned unit already lives there.
    pub fn recruit(&mut self, unit: Unit, x: i32, y: i32) -> Result<()> {
        self.expect_phase(Phase::Shopping)?;
        if !self.board.is_valid_position(x, y) {
            return Err(abler_core::error::BoardError::OutOfBounds {
                x,
                y,
                width: self.board.width(),
                height: self.board.height(),
            }
            .into());
        }
        if self.owned.iter().any(|owned| owned.home == (x, y)) {
            return Err(RunnerError::HomeTaken { x, y });
        }
        debug!(unit = %unit.name, x, y, "recruited");
        self.owned.push(OwnedUnit {
            unit,
            home: (x, y),
            placed: None,
        });
        Ok(())
    }

    /// Put the army back on the board and field this round's enemies.
    pub fn start_round(&mut self) -> Result<()> {
        if self.is_game_over() {
            return Err(RunnerError::GameOver);
        }
        self.expect_phase(Phase::Shopping)?;

        // Units still on the board carry their round into the reset; the
        // ones already removed after dying come back from their last copy.
        for owned in &mut self.owned {
            if let Some(unit) = owned.placed.take().and_then(|id| self.board.remove(id)) {
                owned.unit = unit;
            }
        }
        self.board.clear();
        for owned in &mut self.owned {
            owned.unit.reset();
            let (x, y) = owned.home;
            owned.placed = Some(self.board.add(owned.unit.clone(), x, y, Team::Player)?);
        }
        self.generate_enemies()?;
        self.phase = Phase::Combat;
        debug!(round = self.round, enemies = self.board.enemies().len(), "round started");
        Ok(())
    }

    /// Fight the round that [`start_round`](Self::start_round) set up.
    pub fn run_combat(&mut self) -> Result<RoundSummary> {
        self.expect_phase(Phase::Combat)?;

        let enemies = self
            .board
            .enemies()
            .iter()
            .filter_map(|&id| self.board.unit(id).map(|u| u.kind))
            .collect();
        let combat = CombatDriver::new(&self.board).run(&mut self.board);

        match combat.outcome {
            CombatOutcome::Victory => self.wins += 1,
            CombatOutcome::Defeat => self.lives = self.lives.saturating_sub(1),
        }
        let summary = RoundSummary {
            round: self.round,
            enemies,
            state_hash: self.board.state_hash(),
            lives: self.lives,
            wins: self.wins,
            game_over: self.is_game_over(),
            combat,
        };
        info!(
            round = summary.round,
            outcome = ?summary.combat.outcome,
            lives = summary.lives,
            wins = summary.wins,
            "round finished"
        );

        self.round += 1;
        self.phase = Phase::Shopping;
        Ok(summary)
    }

    /// Start and fight one round.
    pub fn play_round(&mut self) -> Result<RoundSummary> {
        self.start_round()?;
        self.run_combat()
    }

    /// Out of lives or enough wins.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.lives == 0 || self.wins >= WINS_TO_FINISH
    }

    /// The board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Next round to play, or the one being fought.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Lives left.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Rounds won.
    #[must_use]
    pub fn wins(&self) -> u32 {
        self.wins
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Home cells of the army, in recruit order.
    #[must_use]
    pub fn homes(&self) -> Vec<(i32, i32)> {
        self.owned.iter().map(|owned| owned.home).collect()
    }

    /// Size of this round's enemy team.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        (self.round as usize / 3 + 2).min(MAX_ENEMIES)
    }

    fn generate_enemies(&mut self) -> Result<()> {
        let width = self.board.width();
        let height = self.board.height();
        for i in 0..self.enemy_count() {
            let kind = UnitKind::PLAYABLE[self.rng.next_below(UnitKind::PLAYABLE.len())];
            let x = (8 + (i % 2) as i32).clamp(0, width - 1);
            let y = (3 + (i / 2) as i32 * 2).clamp(0, height - 1);
            if let Err(err) = self.board.add(create_unit(kind)?, x, y, Team::Enemy) {
                warn!(%err, ?kind, "enemy not placed");
            }
        }
        Ok(())
    }

    fn expect_phase(&self, expected: Phase) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(RunnerError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }
}
