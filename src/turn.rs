//! Turn state machine for one match.
//!
//! The coordinator is pure bookkeeping: it never sleeps or spawns. The
//! session feeds it timer ticks and resolved shots and acts on what it
//! returns.

use core::fmt;

/// Where the match currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Ships are being positioned. Initial state.
    Placing,
    /// Our fleet is down, waiting for the ready barrier.
    WaitingForOpponentReady,
    LocalTurn,
    RemoteTurn,
    /// Terminal until the restart handshake resets the match.
    GameOver,
}

/// Who fired the shot being reported to [`TurnCoordinator::shot_resolved`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shooter {
    Local,
    Remote,
}

/// Result of one turn countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnTick {
    Remaining(u32),
    /// Countdown hit zero: the local side forfeits this turn.
    Expired,
}

/// Result of one pre-battle narration tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreBattleTick {
    Counting(u32),
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// Operation needs `expected` but the match is in `found`.
    WrongState { expected: TurnState, found: TurnState },
    /// Local input while it is not our turn, or during the pre-battle count.
    NotYourTurn,
    /// The view can only be swapped once the battle has begun.
    NoActiveMatch,
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnError::WrongState { expected, found } => {
                write!(f, "Expected state {:?} but match is in {:?}", expected, found)
            }
            TurnError::NotYourTurn => write!(f, "It is not your turn"),
            TurnError::NoActiveMatch => write!(f, "No battle in progress"),
        }
    }
}

impl std::error::Error for TurnError {}

#[derive(Debug, Clone)]
pub struct TurnCoordinator {
    state: TurnState,
    turn_limit: u32,
    pre_battle_limit: u32,
    remaining: Option<u32>,
    pre_battle: Option<u32>,
    showing_own_grid: bool,
}

impl TurnCoordinator {
    pub fn new(turn_limit: u32, pre_battle_limit: u32) -> Self {
        Self {
            state: TurnState::Placing,
            turn_limit: turn_limit.max(1),
            pre_battle_limit: pre_battle_limit.max(1),
            remaining: None,
            pre_battle: None,
            showing_own_grid: true,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Back to Placing with every countdown cleared.
    pub fn reset(&mut self) {
        self.state = TurnState::Placing;
        self.remaining = None;
        self.pre_battle = None;
        self.showing_own_grid = true;
    }

    fn expect(&self, expected: TurnState) -> Result<(), TurnError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(TurnError::WrongState {
                expected,
                found: self.state,
            })
        }
    }

    /// Our five ships are down.
    pub fn fleet_placed(&mut self) -> Result<(), TurnError> {
        self.expect(TurnState::Placing)?;
        self.state = TurnState::WaitingForOpponentReady;
        Ok(())
    }

    /// Both sides are ready. Picks the first turn and arms the pre-battle
    /// countdown; local input stays disabled until it finishes.
    pub fn begin_battle(&mut self, local_first: bool) -> Result<TurnState, TurnError> {
        self.expect(TurnState::WaitingForOpponentReady)?;
        self.enter_turn(if local_first {
            TurnState::LocalTurn
        } else {
            TurnState::RemoteTurn
        });
        self.pre_battle = Some(self.pre_battle_limit);
        Ok(self.state)
    }

    pub fn in_pre_battle(&self) -> bool {
        self.pre_battle.is_some()
    }

    /// Advance the pre-battle narration. `None` when no count is running.
    pub fn pre_battle_tick(&mut self) -> Option<PreBattleTick> {
        let left = self.pre_battle?;
        let left = left.saturating_sub(1);
        if left == 0 {
            self.pre_battle = None;
            Some(PreBattleTick::Finished)
        } else {
            self.pre_battle = Some(left);
            Some(PreBattleTick::Counting(left))
        }
    }

    /// Local fire input is accepted.
    pub fn can_fire(&self) -> bool {
        self.state == TurnState::LocalTurn && self.pre_battle.is_none()
    }

    /// Arm the turn countdown at the configured limit.
    pub fn start_countdown(&mut self) -> Result<u32, TurnError> {
        if !self.can_fire() {
            return Err(TurnError::NotYourTurn);
        }
        self.remaining = Some(self.turn_limit);
        Ok(self.turn_limit)
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    /// One countdown tick. `None` when no countdown is armed.
    pub fn tick(&mut self) -> Option<TurnTick> {
        let left = self.remaining?.saturating_sub(1);
        if left == 0 {
            self.remaining = None;
            Some(TurnTick::Expired)
        } else {
            self.remaining = Some(left);
            Some(TurnTick::Remaining(left))
        }
    }

    /// Bookkeeping after a shot (real or forfeited) was resolved.
    ///
    /// Goes to GameOver when the defender's fleet is gone, otherwise flips
    /// the turn. Either way the countdowns are cleared.
    pub fn shot_resolved(
        &mut self,
        shooter: Shooter,
        defender_sunk: bool,
    ) -> Result<TurnState, TurnError> {
        let expected = match shooter {
            Shooter::Local => TurnState::LocalTurn,
            Shooter::Remote => TurnState::RemoteTurn,
        };
        self.expect(expected)?;
        self.remaining = None;
        self.pre_battle = None;
        if defender_sunk {
            self.state = TurnState::GameOver;
        } else {
            self.enter_turn(match shooter {
                Shooter::Local => TurnState::RemoteTurn,
                Shooter::Remote => TurnState::LocalTurn,
            });
        }
        Ok(self.state)
    }

    /// Force GameOver (abort). Returns false if already there.
    pub fn finish(&mut self) -> bool {
        self.remaining = None;
        self.pre_battle = None;
        if self.state == TurnState::GameOver {
            return false;
        }
        self.state = TurnState::GameOver;
        true
    }

    pub fn is_battle(&self) -> bool {
        matches!(self.state, TurnState::LocalTurn | TurnState::RemoteTurn)
    }

    /// True while the own grid is the one on display; false while the
    /// target grid is.
    pub fn showing_own_grid(&self) -> bool {
        self.showing_own_grid
    }

    pub fn swap_view(&mut self) -> Result<bool, TurnError> {
        if !self.is_battle() {
            return Err(TurnError::NoActiveMatch);
        }
        self.showing_own_grid = !self.showing_own_grid;
        Ok(self.showing_own_grid)
    }

    fn enter_turn(&mut self, state: TurnState) {
        self.state = state;
        // own grid while the opponent aims at it, target grid on our turn
        self.showing_own_grid = state == TurnState::RemoteTurn;
    }
}

impl Default for TurnCoordinator {
    fn default() -> Self {
        Self::new(crate::config::TURN_TICKS, crate::config::PRE_BATTLE_TICKS)
    }
}
