use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use super::field::{Board, BOARD_COLS, BOARD_ROWS};
use super::session::Session;
use super::types::{CandyKind, Coord, GameOutcome};
use crate::hint;

/// Central game state for one playthrough plus the pending selection.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    session: Session,
    outcome: GameOutcome,
    selected: Option<Coord>,
    tip: Option<(Coord, Coord)>,
    rng: StdRng,
}

/// What a click did to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickResult {
    /// Click was outside the board or the game is over.
    Ignored,
    /// The cell became the selection, replacing any previous one.
    Selected(Coord),
    /// The selected cell was clicked again.
    Deselected,
    /// A pair was removed and the board refilled.
    Matched {
        kind: CandyKind,
        points: u32,
        at: Coord,
        /// The pair that was cleared, in click order.
        removed: [Coord; 2],
        refilled: Vec<Coord>,
        outcome: GameOutcome,
    },
}

/// Read-only view of the game after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub board: Board,
    pub score: u32,
    pub moves_left: u32,
    pub target_score: u32,
    pub outcome: GameOutcome,
    pub selected: Option<Coord>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    #[cfg(test)]
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let board = Board::new_random(BOARD_ROWS, BOARD_COLS, &mut rng);
        let session = Session::new_random(&mut rng);
        let outcome = session.outcome();
        Self {
            board,
            session,
            outcome,
            selected: None,
            tip: None,
            rng,
        }
    }

    /// Start a fresh round with a new board, move budget and target.
    pub fn reset(&mut self) {
        self.board = Board::new_random(self.board.rows(), self.board.cols(), &mut self.rng);
        self.session.reset(&mut self.rng);
        self.outcome = self.session.outcome();
        self.selected = None;
        self.tip = None;
        info!(
            moves_left = self.session.moves_left(),
            target_score = self.session.target_score(),
            "new game"
        );
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.session.score()
    }

    pub fn moves_left(&self) -> u32 {
        self.session.moves_left()
    }

    pub fn target_score(&self) -> u32 {
        self.session.target_score()
    }

    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    pub fn selected(&self) -> Option<Coord> {
        self.selected
    }

    pub fn tip(&self) -> Option<(Coord, Coord)> {
        self.tip
    }

    /// `true` once a match has been made in the current round.
    pub fn has_progress(&self) -> bool {
        self.session.score() > 0
    }

    /// Handle a click on the cell at (row, col).
    pub fn click(&mut self, row: usize, col: usize) -> ClickResult {
        let at = Coord::new(row, col);
        if self.outcome.is_terminal()
            || self.session.moves_left() == 0
            || !self.board.contains(at)
        {
            return ClickResult::Ignored;
        }

        let Some(prev) = self.selected else {
            debug!(row, col, "selected");
            self.selected = Some(at);
            return ClickResult::Selected(at);
        };

        if prev == at {
            debug!(row, col, "deselected");
            self.selected = None;
            return ClickResult::Deselected;
        }

        let kind = match self.board.get(prev).candy() {
            Some(kind)
                if Board::are_adjacent(prev, at) && self.board.get(at).candy() == Some(kind) =>
            {
                kind
            }
            _ => {
                debug!(row, col, "reselected");
                self.selected = Some(at);
                return ClickResult::Selected(at);
            }
        };

        let points = self.session.register_match(kind);
        self.board.remove_pair(prev, at);
        self.board.collapse();
        let refilled = self.board.refill(&mut self.rng);
        debug_assert!(self.board.is_full());
        self.outcome = self.session.outcome();
        self.selected = None;
        self.tip = None;

        debug!(?kind, points, score = self.session.score(), "matched pair");
        if self.outcome.is_terminal() {
            info!(
                outcome = ?self.outcome,
                score = self.session.score(),
                target_score = self.session.target_score(),
                "game over"
            );
        }

        ClickResult::Matched {
            kind,
            points,
            at,
            removed: [prev, at],
            refilled,
            outcome: self.outcome,
        }
    }

    /// Compute and remember a suggested pair for the player.
    pub fn hint(&mut self) -> Option<(Coord, Coord)> {
        if self.outcome.is_terminal() {
            return None;
        }
        self.tip = hint::find_first_match(&self.board);
        self.tip
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            score: self.session.score(),
            moves_left: self.session.moves_left(),
            target_score: self.session.target_score(),
            outcome: self.outcome,
            selected: self.selected,
        }
    }

    #[cfg(test)]
    pub fn from_parts(board: Board, session: Session) -> Self {
        let outcome = session.outcome();
        Self {
            board,
            session,
            outcome,
            selected: None,
            tip: None,
            rng: StdRng::seed_from_u64(0),
        }
    }
}
