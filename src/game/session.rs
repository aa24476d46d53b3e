use rand::Rng;

use super::types::{CandyKind, GameOutcome, MIN_MATCH_POINTS};

const MIN_MOVES: u32 = 15;
const MAX_MOVES: u32 = 25;
/// Random headroom added on top of the minimal reachable target.
const TARGET_SPREAD: u32 = 50;

/// Score, move budget and target for one playthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    score: u32,
    moves_left: u32,
    target_score: u32,
}

impl Session {
    pub fn new_random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let moves_left = rng.gen_range(MIN_MOVES..=MAX_MOVES);
        let min_target = moves_left * MIN_MATCH_POINTS;
        Self {
            score: 0,
            moves_left,
            target_score: rng.gen_range(min_target..=min_target + TARGET_SPREAD),
        }
    }

    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Self::new_random(rng);
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves_left(&self) -> u32 {
        self.moves_left
    }

    pub fn target_score(&self) -> u32 {
        self.target_score
    }

    /// Credit a matched pair and spend one move. Returns the points earned.
    pub fn register_match(&mut self, kind: CandyKind) -> u32 {
        assert!(self.moves_left > 0, "match registered with no moves left");
        let points = 2 * kind.points();
        self.score += points;
        self.moves_left -= 1;
        points
    }

    pub fn outcome(&self) -> GameOutcome {
        GameOutcome::evaluate(self.score, self.target_score, self.moves_left)
    }

    #[cfg(test)]
    pub fn with_values(score: u32, moves_left: u32, target_score: u32) -> Self {
        Self {
            score,
            moves_left,
            target_score,
        }
    }
}
