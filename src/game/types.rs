use serde::Serialize;

/// The kinds of candy that can occupy a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CandyKind {
    Apple,
    Banana,
    Grapes,
    Cherry,
    Pineapple,
}

impl CandyKind {
    /// Every kind, in points-guide order.
    pub const ALL: [CandyKind; 5] = [
        CandyKind::Apple,
        CandyKind::Banana,
        CandyKind::Grapes,
        CandyKind::Cherry,
        CandyKind::Pineapple,
    ];

    /// Point value of a single candy of this kind.
    pub const fn points(self) -> u32 {
        match self {
            CandyKind::Apple => 3,
            CandyKind::Banana => 4,
            CandyKind::Grapes => 5,
            CandyKind::Cherry => 6,
            CandyKind::Pineapple => 7,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            CandyKind::Apple => "🍎",
            CandyKind::Banana => "🍌",
            CandyKind::Grapes => "🍇",
            CandyKind::Cherry => "🍒",
            CandyKind::Pineapple => "🍍",
        }
    }

    /// Base name of the image in the resources directory.
    pub const fn resource_name(self) -> &'static str {
        match self {
            CandyKind::Apple => "apple",
            CandyKind::Banana => "banana",
            CandyKind::Grapes => "grapes",
            CandyKind::Cherry => "cherry",
            CandyKind::Pineapple => "pineapple",
        }
    }
}

/// Points for matching a pair of the cheapest kind.
pub const MIN_MATCH_POINTS: u32 = 2 * min_points();

const fn min_points() -> u32 {
    let mut min = CandyKind::ALL[0].points();
    let mut i = 1;
    while i < CandyKind::ALL.len() {
        if CandyKind::ALL[i].points() < min {
            min = CandyKind::ALL[i].points();
        }
        i += 1;
    }
    min
}

/// A single cell on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Cell {
    #[default]
    Empty,
    Candy(CandyKind),
}

impl Cell {
    pub fn candy(self) -> Option<CandyKind> {
        match self {
            Cell::Candy(kind) => Some(kind),
            Cell::Empty => None,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

/// Board coordinate; row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn manhattan(self, other: Coord) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Outcome of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameOutcome {
    InProgress,
    Won,
    Lost,
}

impl GameOutcome {
    /// Derive the outcome from the session counters. A win takes priority
    /// over running out of moves.
    pub fn evaluate(score: u32, target_score: u32, moves_left: u32) -> Self {
        if score >= target_score {
            GameOutcome::Won
        } else if moves_left == 0 {
            GameOutcome::Lost
        } else {
            GameOutcome::InProgress
        }
    }

    pub fn is_terminal(self) -> bool {
        self != GameOutcome::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cheapest_match_is_a_pair_of_apples() {
        assert_eq!(MIN_MATCH_POINTS, 6);
    }

    #[test]
    fn every_kind_is_worth_something() {
        for kind in CandyKind::ALL {
            assert!(kind.points() > 0, "{kind:?}");
        }
    }

    #[test]
    fn manhattan_distance() {
        let a = Coord::new(3, 3);
        assert_eq!(a.manhattan(Coord::new(3, 4)), 1);
        assert_eq!(a.manhattan(Coord::new(2, 3)), 1);
        assert_eq!(a.manhattan(Coord::new(4, 4)), 2);
        assert_eq!(a.manhattan(a), 0);
    }

    #[test]
    fn outcome_prefers_win_over_loss() {
        assert_eq!(GameOutcome::evaluate(100, 100, 0), GameOutcome::Won);
        assert_eq!(GameOutcome::evaluate(101, 100, 3), GameOutcome::Won);
        assert_eq!(GameOutcome::evaluate(99, 100, 0), GameOutcome::Lost);
        assert_eq!(GameOutcome::evaluate(99, 100, 1), GameOutcome::InProgress);
    }

    #[test]
    fn outcome_is_pure() {
        for _ in 0..3 {
            assert_eq!(GameOutcome::evaluate(42, 90, 7), GameOutcome::InProgress);
        }
    }
}
