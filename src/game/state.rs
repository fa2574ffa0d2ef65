//! Game state and round sequencing types
//!
//! Every pending delay in the flip/match/mismatch sequence is a tick counter
//! inside `RoundPhase`. Dropping a `GameState` (replay, back to menu) drops
//! all outstanding resolutions with it, so nothing can fire against a
//! torn-down scene.

use crate::consts::*;

use super::deck::{Card, build_deck};

/// Phase of the two-card resolution cycle.
///
/// The input gate is closed exactly while the phase is not `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Accepting flips
    Idle,
    /// Two cards face up, comparison pending until the flip lands
    Reveal { ticks: u32 },
    /// Pair confirmed, lock-in pending
    MatchHold { ticks: u32 },
    /// Mismatched pair lingering face up
    MismatchHold { ticks: u32 },
    /// Mismatched cards flipping back down
    FlipBack { ticks: u32 },
    /// All pairs found, win transition pending
    WinHold { ticks: u32 },
    /// Run finished
    Won,
}

/// Result of a finished run, passed to the win screen by value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub moves: u32,
    pub seconds: u32,
}

/// Events the simulation emits for the shell (audio cues, screen transitions)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A card flipped, up or back down
    Flip,
    /// A pair locked in
    Match,
    /// Two revealed cards did not match
    Mismatch,
    /// The final pair locked in; the timer stops here
    AllMatched(SessionStats),
    /// Win transition, fires exactly once after the hold
    Won(SessionStats),
}

/// Complete state for one play-through
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Cards by grid slot
    pub cards: Vec<Card>,
    /// Revealed-but-unresolved slots (never more than two)
    pub revealed: Vec<u8>,
    /// Resolution phase, doubling as the input gate
    pub round: RoundPhase,
    /// Pairs locked in so far
    pub matched_pairs: u32,
    /// Two-card attempts made
    pub moves: u32,
    /// Elapsed play time in ticks (frozen once stats are captured)
    pub time_ticks: u64,
    /// Captured when the final pair locks in
    pub stats: Option<SessionStats>,
    /// Pending events, drained by the shell each frame
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh board from the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            cards: build_deck(seed),
            revealed: Vec::with_capacity(2),
            round: RoundPhase::Idle,
            matched_pairs: 0,
            moves: 0,
            time_ticks: 0,
            stats: None,
            events: Vec::new(),
        }
    }

    /// Elapsed play time in whole seconds
    pub fn elapsed_seconds(&self) -> u32 {
        (self.time_ticks / TICK_RATE as u64) as u32
    }

    /// True while a two-card comparison is outstanding
    pub fn gate_closed(&self) -> bool {
        self.round != RoundPhase::Idle
    }

    /// Drain pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle() {
        let state = GameState::new(9);
        assert_eq!(state.round, RoundPhase::Idle);
        assert!(!state.gate_closed());
        assert_eq!(state.cards.len(), CARD_COUNT);
        assert!(state.revealed.is_empty());
        assert_eq!(state.moves, 0);
        assert!(state.stats.is_none());
    }

    #[test]
    fn test_elapsed_seconds_rounds_down() {
        let mut state = GameState::new(9);
        state.time_ticks = (TICK_RATE as u64) * 3 + TICK_RATE as u64 - 1;
        assert_eq!(state.elapsed_seconds(), 3);
    }

    #[test]
    fn test_take_events_drains() {
        let mut state = GameState::new(9);
        state.events.push(GameEvent::Flip);
        assert_eq!(state.take_events(), vec![GameEvent::Flip]);
        assert!(state.take_events().is_empty());
    }
}
