use crate::game::field::Board;
use crate::game::types::Coord;

/// Find the first pair of adjacent identical candies: horizontal pairs row by
/// row first, then vertical pairs column by column.
pub fn find_first_match(board: &Board) -> Option<(Coord, Coord)> {
    let same = |a: Coord, b: Coord| {
        let cell = board.get(a);
        !cell.is_empty() && cell == board.get(b)
    };

    for row in 0..board.rows() {
        for col in 0..board.cols().saturating_sub(1) {
            let (a, b) = (Coord::new(row, col), Coord::new(row, col + 1));
            if same(a, b) {
                return Some((a, b));
            }
        }
    }

    for col in 0..board.cols() {
        for row in 0..board.rows().saturating_sub(1) {
            let (a, b) = (Coord::new(row, col), Coord::new(row + 1, col));
            if same(a, b) {
                return Some((a, b));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::CandyKind::*;

    #[test]
    fn horizontal_pairs_win_over_earlier_vertical_ones() {
        let board = Board::from_rows(&[
            vec![Some(Apple), Some(Banana), Some(Grapes)],
            vec![Some(Apple), Some(Cherry), Some(Cherry)],
        ]);
        assert_eq!(
            find_first_match(&board),
            Some((Coord::new(1, 1), Coord::new(1, 2)))
        );
    }

    #[test]
    fn vertical_scan_is_column_major() {
        let board = Board::from_rows(&[
            vec![Some(Apple), Some(Banana)],
            vec![Some(Grapes), Some(Banana)],
            vec![Some(Grapes), Some(Cherry)],
        ]);
        assert_eq!(
            find_first_match(&board),
            Some((Coord::new(1, 0), Coord::new(2, 0)))
        );
    }

    #[test]
    fn empty_cells_never_pair() {
        let board = Board::from_rows(&[vec![None, None], vec![Some(Apple), Some(Banana)]]);
        assert_eq!(find_first_match(&board), None);
    }

    #[test]
    fn no_pair_on_checkerboard() {
        let board = Board::from_rows(&[
            vec![Some(Apple), Some(Banana), Some(Apple)],
            vec![Some(Banana), Some(Apple), Some(Banana)],
        ]);
        assert_eq!(find_first_match(&board), None);
    }
}
