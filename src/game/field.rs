use rand::Rng;
use serde::Serialize;

use super::types::{CandyKind, Cell, Coord};

pub const BOARD_ROWS: usize = 8;
pub const BOARD_COLS: usize = 8;

/// The candy grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

fn random_kind<R: Rng + ?Sized>(rng: &mut R) -> CandyKind {
    CandyKind::ALL[rng.gen_range(0..CandyKind::ALL.len())]
}

impl Board {
    /// Create a board with every cell filled by a uniformly random candy.
    /// Pre-existing pairs are left as they fall.
    pub fn new_random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let cells = (0..rows * cols)
            .map(|_| Cell::Candy(random_kind(rng)))
            .collect();
        Self { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    /// Panics if `at` lies outside the board.
    pub fn get(&self, at: Coord) -> Cell {
        self.cells[self.index(at)]
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    fn index(&self, at: Coord) -> usize {
        assert!(self.contains(at), "{at:?} outside {}x{} board", self.rows, self.cols);
        at.row * self.cols + at.col
    }

    #[cfg(test)]
    pub fn swap(&mut self, a: Coord, b: Coord) {
        let (ia, ib) = (self.index(a), self.index(b));
        self.cells.swap(ia, ib);
    }

    pub fn are_adjacent(a: Coord, b: Coord) -> bool {
        a.manhattan(b) == 1
    }

    /// Clear a matched pair. The caller guarantees both cells hold the same
    /// candy and are adjacent.
    pub fn remove_pair(&mut self, a: Coord, b: Coord) {
        let (first, second) = (self.get(a), self.get(b));
        assert!(
            Self::are_adjacent(a, b),
            "remove_pair on non-adjacent cells {a:?} and {b:?}"
        );
        assert!(
            !first.is_empty() && first == second,
            "remove_pair on non-matching cells {first:?} and {second:?}"
        );
        let (ia, ib) = (self.index(a), self.index(b));
        self.cells[ia] = Cell::Empty;
        self.cells[ib] = Cell::Empty;
    }

    /// Let candies fall to the bottom of each column. Relative order inside
    /// a column is preserved; vacated top cells become empty.
    pub fn collapse(&mut self) {
        for col in 0..self.cols {
            let mut write = self.rows;
            for row in (0..self.rows).rev() {
                let cell = self.cells[row * self.cols + col];
                if !cell.is_empty() {
                    write -= 1;
                    self.cells[write * self.cols + col] = cell;
                }
            }
            for row in 0..write {
                self.cells[row * self.cols + col] = Cell::Empty;
            }
        }
    }

    /// Fill every empty cell with a fresh random candy and return the
    /// refilled coordinates in row-major order.
    pub fn refill<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Coord> {
        let mut filled = Vec::new();
        for (i, cell) in self.cells.iter_mut().enumerate() {
            if cell.is_empty() {
                *cell = Cell::Candy(random_kind(rng));
                filled.push(Coord::new(i / self.cols, i % self.cols));
            }
        }
        filled
    }

    /// Build a board from explicit rows, `None` meaning an empty cell.
    #[cfg(test)]
    pub fn from_rows(rows: &[Vec<Option<CandyKind>>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        assert!(rows.iter().all(|r| r.len() == cols), "ragged board");
        let cells = rows
            .iter()
            .flatten()
            .map(|kind| kind.map_or(Cell::Empty, Cell::Candy))
            .collect();
        Self {
            rows: rows.len(),
            cols,
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use CandyKind::*;

    fn gravity_holds(board: &Board) -> bool {
        (0..board.cols()).all(|col| {
            let mut seen_candy = false;
            (0..board.rows()).all(|row| {
                let empty = board.get(Coord::new(row, col)).is_empty();
                if !empty {
                    seen_candy = true;
                }
                !(empty && seen_candy)
            })
        })
    }

    fn column(board: &Board, col: usize) -> Vec<Cell> {
        (0..board.rows())
            .map(|row| board.get(Coord::new(row, col)))
            .collect()
    }

    #[test]
    fn new_random_fills_every_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::new_random(BOARD_ROWS, BOARD_COLS, &mut rng);
        assert_eq!(board.rows(), 8);
        assert_eq!(board.cols(), 8);
        assert!(board.is_full());
    }

    #[test]
    fn adjacency_is_manhattan_one() {
        let c = Coord::new(4, 4);
        assert!(Board::are_adjacent(c, Coord::new(3, 4)));
        assert!(Board::are_adjacent(c, Coord::new(4, 5)));
        assert!(!Board::are_adjacent(c, Coord::new(5, 5)));
        assert!(!Board::are_adjacent(c, c));
        assert!(!Board::are_adjacent(c, Coord::new(4, 6)));
    }

    #[test]
    fn remove_pair_empties_both_cells() {
        let mut board = Board::from_rows(&[
            vec![Some(Apple), Some(Apple)],
            vec![Some(Cherry), Some(Grapes)],
        ]);
        board.remove_pair(Coord::new(0, 0), Coord::new(0, 1));
        assert!(board.get(Coord::new(0, 0)).is_empty());
        assert!(board.get(Coord::new(0, 1)).is_empty());
        assert_eq!(board.get(Coord::new(1, 0)), Cell::Candy(Cherry));
    }

    #[test]
    #[should_panic(expected = "non-matching")]
    fn remove_pair_rejects_different_kinds() {
        let mut board = Board::from_rows(&[vec![Some(Apple), Some(Banana)]]);
        board.remove_pair(Coord::new(0, 0), Coord::new(0, 1));
    }

    #[test]
    #[should_panic(expected = "non-adjacent")]
    fn remove_pair_rejects_distant_cells() {
        let mut board = Board::from_rows(&[vec![Some(Apple), Some(Banana), Some(Apple)]]);
        board.remove_pair(Coord::new(0, 0), Coord::new(0, 2));
    }

    #[test]
    fn collapse_is_stable_per_column() {
        let mut board = Board::from_rows(&[
            vec![Some(Apple), None],
            vec![None, Some(Banana)],
            vec![Some(Grapes), None],
            vec![None, Some(Cherry)],
        ]);
        board.collapse();
        assert_eq!(
            column(&board, 0),
            vec![Cell::Empty, Cell::Empty, Cell::Candy(Apple), Cell::Candy(Grapes)]
        );
        assert_eq!(
            column(&board, 1),
            vec![Cell::Empty, Cell::Empty, Cell::Candy(Banana), Cell::Candy(Cherry)]
        );
    }

    #[test]
    fn collapse_leaves_full_column_untouched() {
        let rows = vec![vec![Some(Apple)], vec![Some(Banana)], vec![Some(Pineapple)]];
        let mut board = Board::from_rows(&rows);
        let before = board.clone();
        board.collapse();
        assert_eq!(board, before);
    }

    #[test]
    fn collapse_restores_gravity_on_random_boards() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let mut board = Board::new_random(BOARD_ROWS, BOARD_COLS, &mut rng);
            for i in 0..board.cells.len() {
                if rng.gen_bool(0.4) {
                    board.cells[i] = Cell::Empty;
                }
            }
            let survivors = board.cells.iter().filter(|c| !c.is_empty()).count();
            board.collapse();
            assert!(gravity_holds(&board));
            assert_eq!(
                board.cells.iter().filter(|c| !c.is_empty()).count(),
                survivors
            );
        }
    }

    #[test]
    fn refill_fills_exactly_the_empty_cells() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut board = Board::from_rows(&[
            vec![None, Some(Apple), None],
            vec![Some(Banana), Some(Grapes), Some(Cherry)],
        ]);
        let filled = board.refill(&mut rng);
        assert_eq!(filled, vec![Coord::new(0, 0), Coord::new(0, 2)]);
        assert!(board.is_full());
        assert_eq!(board.get(Coord::new(0, 1)), Cell::Candy(Apple));
        assert_eq!(board.get(Coord::new(1, 2)), Cell::Candy(Cherry));
    }

    #[test]
    fn refill_on_full_board_is_noop() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut board = Board::new_random(4, 4, &mut rng);
        let before = board.clone();
        assert!(board.refill(&mut rng).is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn swap_exchanges_cells() {
        let mut board = Board::from_rows(&[vec![Some(Apple), Some(Pineapple)]]);
        board.swap(Coord::new(0, 0), Coord::new(0, 1));
        assert_eq!(board.get(Coord::new(0, 0)), Cell::Candy(Pineapple));
        assert_eq!(board.get(Coord::new(0, 1)), Cell::Candy(Apple));
    }
}
