//! Fixed timestep game tick
//!
//! Advances card animations and the match-arbitration state machine. All
//! sequencing (flip, wait, compare, wait, resolve) is tick counters in
//! `RoundPhase`; there are no engine callbacks to cancel.

use crate::consts::*;

use super::state::{GameEvent, GameState, RoundPhase, SessionStats};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Grid slot pressed this frame (one-shot, cleared by the shell)
    pub press: Option<usize>,
    /// Grid slot under the pointer
    pub hover: Option<usize>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // The play timer stops once the final pair is in
    if state.stats.is_none() {
        state.time_ticks += 1;
    }

    for (slot, card) in state.cards.iter_mut().enumerate() {
        card.animate(dt, input.hover == Some(slot));
    }

    if let Some(slot) = input.press {
        press(state, slot);
    }

    state.round = match state.round {
        RoundPhase::Idle => RoundPhase::Idle,
        RoundPhase::Reveal { ticks: 0 } => resolve_reveal(state),
        RoundPhase::Reveal { ticks } => RoundPhase::Reveal { ticks: ticks - 1 },
        RoundPhase::MatchHold { ticks: 0 } => resolve_match(state),
        RoundPhase::MatchHold { ticks } => RoundPhase::MatchHold { ticks: ticks - 1 },
        RoundPhase::MismatchHold { ticks: 0 } => resolve_mismatch(state),
        RoundPhase::MismatchHold { ticks } => RoundPhase::MismatchHold { ticks: ticks - 1 },
        RoundPhase::FlipBack { ticks: 0 } => {
            state.revealed.clear();
            RoundPhase::Idle
        }
        RoundPhase::FlipBack { ticks } => RoundPhase::FlipBack { ticks: ticks - 1 },
        RoundPhase::WinHold { ticks: 0 } => resolve_win(state),
        RoundPhase::WinHold { ticks } => RoundPhase::WinHold { ticks: ticks - 1 },
        RoundPhase::Won => RoundPhase::Won,
    };
}

/// Route a press. No-ops: gate closed, already face up, already matched.
fn press(state: &mut GameState, slot: usize) {
    if state.gate_closed() || slot >= state.cards.len() {
        return;
    }

    {
        let card = &mut state.cards[slot];
        if card.face_up || card.matched {
            return;
        }
        card.face_up = true;
    }

    state.events.push(GameEvent::Flip);
    state.revealed.push(slot as u8);

    // Second card up: count the attempt and close the gate until resolved
    if state.revealed.len() == 2 {
        state.moves += 1;
        state.round = RoundPhase::Reveal { ticks: FLIP_TICKS };
    }
}

/// The flip animation has landed: compare the two revealed pair ids
fn resolve_reveal(state: &mut GameState) -> RoundPhase {
    let (a, b) = (state.revealed[0] as usize, state.revealed[1] as usize);
    if state.cards[a].pair == state.cards[b].pair {
        RoundPhase::MatchHold {
            ticks: MATCH_HOLD_TICKS,
        }
    } else {
        state.events.push(GameEvent::Mismatch);
        RoundPhase::MismatchHold {
            ticks: MISMATCH_HOLD_TICKS,
        }
    }
}

/// Lock the revealed pair in permanently
fn resolve_match(state: &mut GameState) -> RoundPhase {
    for &slot in &state.revealed {
        state.cards[slot as usize].matched = true;
    }
    state.revealed.clear();
    state.matched_pairs += 1;
    state.events.push(GameEvent::Match);

    if state.matched_pairs as usize == PAIR_COUNT {
        let stats = SessionStats {
            moves: state.moves,
            seconds: state.elapsed_seconds(),
        };
        state.stats = Some(stats);
        state.events.push(GameEvent::AllMatched(stats));
        RoundPhase::WinHold {
            ticks: WIN_HOLD_TICKS,
        }
    } else {
        RoundPhase::Idle
    }
}

/// Start flipping the mismatched pair back down
fn resolve_mismatch(state: &mut GameState) -> RoundPhase {
    for &slot in &state.revealed {
        state.cards[slot as usize].face_up = false;
        state.events.push(GameEvent::Flip);
    }
    RoundPhase::FlipBack { ticks: FLIP_TICKS }
}

/// Fire the win transition (exactly once)
fn resolve_win(state: &mut GameState) -> RoundPhase {
    if let Some(stats) = state.stats {
        state.events.push(GameEvent::Won(stats));
    }
    RoundPhase::Won
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn press_slot(slot: usize) -> TickInput {
        TickInput {
            press: Some(slot),
            ..Default::default()
        }
    }

    fn run_ticks(state: &mut GameState, n: u32) {
        let input = TickInput::default();
        for _ in 0..n {
            tick(state, &input, SIM_DT);
        }
    }

    /// Slots of two cards sharing a pair id, and one slot that breaks it
    fn find_pair(state: &GameState) -> (usize, usize, usize) {
        let target = state.cards[0].pair;
        let partner = state
            .cards
            .iter()
            .position(|c| c.id != 0 && c.pair == target)
            .expect("deck always holds the partner");
        let odd = state
            .cards
            .iter()
            .position(|c| c.pair != target)
            .expect("deck holds more than one pair id");
        (0, partner, odd)
    }

    #[test]
    fn test_press_flips_card() {
        let mut state = GameState::new(42);
        tick(&mut state, &press_slot(3), SIM_DT);

        assert!(state.cards[3].face_up);
        assert_eq!(state.revealed, vec![3]);
        assert!(!state.gate_closed());
        assert_eq!(state.moves, 0);
        assert_eq!(state.take_events(), vec![GameEvent::Flip]);
    }

    #[test]
    fn test_second_press_counts_move_and_closes_gate() {
        let mut state = GameState::new(42);
        tick(&mut state, &press_slot(0), SIM_DT);
        tick(&mut state, &press_slot(1), SIM_DT);

        assert_eq!(state.revealed.len(), 2);
        assert_eq!(state.moves, 1);
        assert!(state.gate_closed());
        assert!(matches!(state.round, RoundPhase::Reveal { .. }));
    }

    #[test]
    fn test_third_press_is_noop() {
        let mut state = GameState::new(42);
        tick(&mut state, &press_slot(0), SIM_DT);
        tick(&mut state, &press_slot(1), SIM_DT);
        state.take_events();

        tick(&mut state, &press_slot(2), SIM_DT);
        assert!(!state.cards[2].face_up);
        assert_eq!(state.revealed.len(), 2);
        assert_eq!(state.moves, 1);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_press_on_face_up_card_is_noop() {
        let mut state = GameState::new(42);
        tick(&mut state, &press_slot(0), SIM_DT);
        state.take_events();

        tick(&mut state, &press_slot(0), SIM_DT);
        assert_eq!(state.revealed, vec![0]);
        assert_eq!(state.moves, 0);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_match_locks_pair_and_reopens_gate() {
        let mut state = GameState::new(42);
        let (a, b, _) = find_pair(&state);

        tick(&mut state, &press_slot(a), SIM_DT);
        tick(&mut state, &press_slot(b), SIM_DT);
        run_ticks(&mut state, FLIP_TICKS + 1);
        assert!(matches!(state.round, RoundPhase::MatchHold { .. }));

        run_ticks(&mut state, MATCH_HOLD_TICKS + 1);
        assert!(state.cards[a].matched);
        assert!(state.cards[b].matched);
        assert_eq!(state.matched_pairs, 1);
        assert_eq!(state.moves, 1);
        assert!(state.revealed.is_empty());
        assert_eq!(state.round, RoundPhase::Idle);
        assert!(state.take_events().contains(&GameEvent::Match));
    }

    #[test]
    fn test_press_on_matched_card_is_noop() {
        let mut state = GameState::new(42);
        let (a, b, _) = find_pair(&state);
        tick(&mut state, &press_slot(a), SIM_DT);
        tick(&mut state, &press_slot(b), SIM_DT);
        run_ticks(&mut state, FLIP_TICKS + MATCH_HOLD_TICKS + 2);
        state.take_events();

        tick(&mut state, &press_slot(a), SIM_DT);
        assert!(state.revealed.is_empty());
        assert_eq!(state.moves, 1);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_mismatch_flips_back_and_reopens_gate() {
        let mut state = GameState::new(42);
        let (a, _, odd) = find_pair(&state);

        tick(&mut state, &press_slot(a), SIM_DT);
        tick(&mut state, &press_slot(odd), SIM_DT);
        run_ticks(&mut state, FLIP_TICKS + 1);
        assert!(matches!(state.round, RoundPhase::MismatchHold { .. }));
        assert!(state.take_events().contains(&GameEvent::Mismatch));

        run_ticks(&mut state, MISMATCH_HOLD_TICKS + 1);
        assert!(!state.cards[a].face_up);
        assert!(!state.cards[odd].face_up);
        assert!(matches!(state.round, RoundPhase::FlipBack { .. }));
        // One flip-back sound per card
        let flips = state
            .take_events()
            .iter()
            .filter(|e| **e == GameEvent::Flip)
            .count();
        assert_eq!(flips, 2);

        run_ticks(&mut state, FLIP_TICKS + 1);
        assert!(state.revealed.is_empty());
        assert_eq!(state.round, RoundPhase::Idle);

        // The attempt still counted; nothing was matched
        assert_eq!(state.moves, 1);
        assert_eq!(state.matched_pairs, 0);
    }

    /// Press every card pair by pair until the run is over, draining events
    fn solve(state: &mut GameState) -> Vec<GameEvent> {
        let mut order: Vec<usize> = Vec::new();
        for pair in 0..PAIR_COUNT as u8 {
            for (slot, card) in state.cards.iter().enumerate() {
                if card.pair == pair {
                    order.push(slot);
                }
            }
        }

        let mut presses = order.into_iter();
        let mut events = Vec::new();
        for _ in 0..100_000 {
            let mut input = TickInput::default();
            if !state.gate_closed() {
                input.press = presses.next();
            }
            tick(state, &input, SIM_DT);
            events.extend(state.take_events());
            if state.round == RoundPhase::Won {
                break;
            }
        }
        events
    }

    #[test]
    fn test_win_fires_exactly_once_with_exact_stats() {
        let mut state = GameState::new(7);
        let events = solve(&mut state);

        let wins: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Won(stats) => Some(*stats),
                _ => None,
            })
            .collect();
        assert_eq!(wins.len(), 1);
        assert_eq!(wins[0].moves, 8);
        assert_eq!(wins[0].seconds, state.elapsed_seconds());
        assert_eq!(state.stats, Some(wins[0]));
        assert_eq!(state.matched_pairs as usize, PAIR_COUNT);

        // The terminal phase is inert: no further events, no re-fire
        run_ticks(&mut state, 1000);
        assert!(state.take_events().is_empty());
        assert_eq!(state.round, RoundPhase::Won);
    }

    #[test]
    fn test_all_matched_precedes_win_and_freezes_timer() {
        let mut state = GameState::new(7);
        let events = solve(&mut state);

        let all_matched = events
            .iter()
            .position(|e| matches!(e, GameEvent::AllMatched(_)));
        let won = events.iter().position(|e| matches!(e, GameEvent::Won(_)));
        assert!(all_matched.expect("AllMatched fired") < won.expect("Won fired"));

        let frozen = state.time_ticks;
        run_ticks(&mut state, 500);
        assert_eq!(state.time_ticks, frozen);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99999);
        let mut b = GameState::new(99999);
        let ev_a = solve(&mut a);
        let ev_b = solve(&mut b);
        assert_eq!(ev_a, ev_b);
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.moves, b.moves);
    }

    proptest! {
        /// Arbitrary press sequences never break the round invariants
        #[test]
        fn prop_invariants_hold(
            seed: u64,
            steps in prop::collection::vec((0usize..CARD_COUNT, 0u32..40), 1..200),
        ) {
            let mut state = GameState::new(seed);
            let mut won_count = 0;

            for (slot, gap) in steps {
                tick(&mut state, &press_slot(slot), SIM_DT);
                for _ in 0..gap {
                    tick(&mut state, &TickInput::default(), SIM_DT);
                }

                prop_assert!(state.revealed.len() <= 2);
                prop_assert!(state.matched_pairs as usize <= PAIR_COUNT);
                for card in &state.cards {
                    if card.matched {
                        prop_assert!(card.face_up);
                    }
                }
                won_count += state
                    .take_events()
                    .iter()
                    .filter(|e| matches!(e, GameEvent::Won(_)))
                    .count();
            }
            prop_assert!(won_count <= 1);
        }
    }
}
