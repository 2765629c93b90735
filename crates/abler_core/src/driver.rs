//! Fixed-step combat driver.
//!
//! The board has no notion of an encounter ending. [`CombatDriver`] steps
//! it at a fixed `dt`, tracks simulated time and decides when the fight
//! is over and who won.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::Board;
use crate::events::GameEvent;
use crate::math::{Fixed, FRAME_TIME};
use crate::unit::Team;

/// How an encounter ended, from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatOutcome {
    /// The player has a living unit and the enemy does not.
    Victory,
    /// Anything else, including mutual wipe and timeout.
    Defeat,
}

/// Why the driver stopped stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// At least one side has no living units.
    Elimination,
    /// Simulated time reached the configured limit.
    Timeout,
}

/// Summary of a finished encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    /// Winner from the player's side.
    pub outcome: CombatOutcome,
    /// Why combat stopped.
    pub reason: EndReason,
    /// Steps taken.
    pub ticks: u64,
    /// Simulated seconds.
    #[serde(with = "crate::math::fixed_decimal")]
    pub elapsed: Fixed,
    /// Living player units at the end.
    pub player_survivors: usize,
    /// Living enemy units at the end.
    pub enemy_survivors: usize,
    /// Deaths observed while stepping.
    pub deaths: usize,
}

/// Steps a [`Board`] until one side is eliminated or time runs out.
#[derive(Debug, Clone)]
pub struct CombatDriver {
    dt: Fixed,
    max_time: Fixed,
    elapsed: Fixed,
    ticks: u64,
    deaths: usize,
}

impl CombatDriver {
    /// A driver stepping at [`FRAME_TIME`] with the board's time limit.
    #[must_use]
    pub fn new(board: &Board) -> Self {
        Self::with_step(FRAME_TIME, board.config().max_combat_time)
    }

    /// A driver with an explicit step and time limit.
    #[must_use]
    pub fn with_step(dt: Fixed, max_time: Fixed) -> Self {
        Self {
            dt,
            max_time,
            elapsed: Fixed::ZERO,
            ticks: 0,
            deaths: 0,
        }
    }

    /// Seconds simulated so far.
    #[must_use]
    pub const fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// Steps taken so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Step length.
    #[must_use]
    pub const fn dt(&self) -> Fixed {
        self.dt
    }

    /// The time limit.
    #[must_use]
    pub const fn max_time(&self) -> Fixed {
        self.max_time
    }

    /// Advance the board by one step and return the events it raised.
    pub fn step(&mut self, board: &mut Board) -> Vec<GameEvent> {
        let events = board.advance(self.dt);
        self.elapsed += self.dt;
        self.ticks += 1;
        self.deaths += events
            .iter()
            .filter(|e| matches!(e, GameEvent::UnitDeath { .. }))
            .count();
        events
    }

    /// Whether either side is fully eliminated.
    #[must_use]
    pub fn is_combat_over(board: &Board) -> bool {
        !board.has_living(Team::Player) || !board.has_living(Team::Enemy)
    }

    /// Whether the time limit has been reached.
    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.elapsed >= self.max_time
    }

    /// The result if combat is over now, `None` while it continues.
    #[must_use]
    pub fn outcome(&self, board: &Board) -> Option<CombatOutcome> {
        if Self::is_combat_over(board) || self.timed_out() {
            Some(Self::judge(board))
        } else {
            None
        }
    }

    /// Victory only when the player stands and the enemy does not.
    #[must_use]
    pub fn judge(board: &Board) -> CombatOutcome {
        if board.has_living(Team::Player) && !board.has_living(Team::Enemy) {
            CombatOutcome::Victory
        } else {
            CombatOutcome::Defeat
        }
    }

    /// Step until combat ends and report the result.
    pub fn run(&mut self, board: &mut Board) -> CombatReport {
        let reason = loop {
            if Self::is_combat_over(board) {
                break EndReason::Elimination;
            }
            if self.timed_out() {
                break EndReason::Timeout;
            }
            self.step(board);
        };

        let report = CombatReport {
            outcome: Self::judge(board),
            reason,
            ticks: self.ticks,
            elapsed: self.elapsed,
            player_survivors: living(board, Team::Player),
            enemy_survivors: living(board, Team::Enemy),
            deaths: self.deaths,
        };
        match reason {
            EndReason::Elimination => debug!(outcome = ?report.outcome, ticks = report.ticks, "combat finished"),
            EndReason::Timeout => info!(ticks = report.ticks, "combat timed out"),
        }
        report
    }
}

fn living(board: &Board, team: Team) -> usize {
    board
        .roster(team)
        .iter()
        .filter(|&&id| board.is_alive(id))
        .count()
}
