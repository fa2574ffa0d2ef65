//! Card entities and deck generation

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use crate::consts::*;

/// One cell of the board grid
#[derive(Debug, Clone)]
pub struct Card {
    /// Grid slot (row-major)
    pub id: u8,
    /// Pair identifier; exactly two cards share each value
    pub pair: u8,
    /// Showing its front face
    pub face_up: bool,
    /// Set permanently once the pair is confirmed, never unset
    pub matched: bool,

    // Visual scalars (not gameplay-affecting, advanced each tick)
    /// Flip progress: 0 = back showing, 1 = front showing
    pub flip_t: f32,
    /// Seconds since the card was marked matched (drives the pulse)
    pub match_t: f32,
    /// Hover ease, 0..1
    pub hover_t: f32,
    /// Deal-in progress, 0..1 after the staggered delay
    pub deal_t: f32,
    deal_delay: u32,
}

impl Card {
    fn new(id: u8, pair: u8) -> Self {
        Self {
            id,
            pair,
            face_up: false,
            matched: false,
            flip_t: 0.0,
            match_t: 0.0,
            hover_t: 0.0,
            deal_t: 0.0,
            deal_delay: id as u32 * DEAL_STAGGER_TICKS,
        }
    }

    /// Advance the visual scalars by one timestep
    pub fn animate(&mut self, dt: f32, hovered: bool) {
        if self.deal_delay > 0 {
            self.deal_delay -= 1;
        } else if self.deal_t < 1.0 {
            self.deal_t = (self.deal_t + dt / DEAL_SECS).min(1.0);
        }

        // flip_t chases face_up; the card reads edge-on at the midpoint
        let target = if self.face_up { 1.0 } else { 0.0 };
        if self.flip_t < target {
            self.flip_t = (self.flip_t + dt / FLIP_SECS).min(target);
        } else if self.flip_t > target {
            self.flip_t = (self.flip_t - dt / FLIP_SECS).max(target);
        }

        if self.matched {
            self.match_t += dt;
        }

        // Hover feedback only on cards that can still be flipped
        let hover_target = if hovered && !self.face_up && !self.matched {
            1.0
        } else {
            0.0
        };
        if self.hover_t < hover_target {
            self.hover_t = (self.hover_t + dt / HOVER_SECS).min(1.0);
        } else if self.hover_t > hover_target {
            self.hover_t = (self.hover_t - dt / HOVER_SECS).max(0.0);
        }
    }
}

/// Build a shuffled deck: `PAIR_COUNT` pair identifiers, each appearing twice
pub fn build_deck(seed: u64) -> Vec<Card> {
    let mut pairs: Vec<u8> = (0..PAIR_COUNT as u8).flat_map(|p| [p, p]).collect();
    let mut rng = Pcg32::seed_from_u64(seed);
    pairs.shuffle(&mut rng);

    pairs
        .into_iter()
        .enumerate()
        .map(|(slot, pair)| Card::new(slot as u8, pair))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_deck_shape() {
        let deck = build_deck(1234);
        assert_eq!(deck.len(), CARD_COUNT);
        for (slot, card) in deck.iter().enumerate() {
            assert_eq!(card.id as usize, slot);
            assert!(!card.face_up);
            assert!(!card.matched);
        }
    }

    #[test]
    fn test_deck_deterministic() {
        let a = build_deck(777);
        let b = build_deck(777);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.pair, y.pair);
        }
    }

    #[test]
    fn test_flip_animation_converges() {
        let mut card = Card::new(0, 0);
        card.face_up = true;
        for _ in 0..(FLIP_TICKS + 1) {
            card.animate(SIM_DT, false);
        }
        assert_eq!(card.flip_t, 1.0);

        card.face_up = false;
        for _ in 0..(FLIP_TICKS + 1) {
            card.animate(SIM_DT, false);
        }
        assert_eq!(card.flip_t, 0.0);
    }

    #[test]
    fn test_hover_ignored_while_face_up() {
        let mut card = Card::new(0, 0);
        card.face_up = true;
        for _ in 0..60 {
            card.animate(SIM_DT, true);
        }
        assert_eq!(card.hover_t, 0.0);
    }

    proptest! {
        /// Every shuffle yields each pair identifier exactly twice
        #[test]
        fn prop_deck_pairs_balanced(seed: u64) {
            let deck = build_deck(seed);
            prop_assert_eq!(deck.len(), CARD_COUNT);

            let mut counts = [0usize; PAIR_COUNT];
            for card in &deck {
                prop_assert!((card.pair as usize) < PAIR_COUNT);
                counts[card.pair as usize] += 1;
            }
            for count in counts {
                prop_assert_eq!(count, 2);
            }
        }
    }
}
