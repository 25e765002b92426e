//! Terminal rendering of puzzles.

use owo_colors::OwoColorize;
use puzzlefeed::{BoardColors, Color, PuzzleRow};

/// Pieces by rank (8 down to 1) and file (a to h)
pub type Placement = [[Option<char>; 8]; 8];

/// Parse the piece-placement field of a FEN string
pub fn parse_placement(fen: &str) -> Option<Placement> {
    let field = fen.split_whitespace().next()?;
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return None;
    }

    let mut board: Placement = [[None; 8]; 8];
    for (rank, squares) in ranks.iter().enumerate() {
        let mut file = 0usize;
        for c in squares.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as usize;
            } else if "pnbrqkPNBRQK".contains(c) {
                if file >= 8 {
                    return None;
                }
                board[rank][file] = Some(c);
                file += 1;
            } else {
                return None;
            }
        }
        if file != 8 {
            return None;
        }
    }
    Some(board)
}

fn glyph(piece: char) -> char {
    match piece.to_ascii_lowercase() {
        'p' => '♟',
        'n' => '♞',
        'b' => '♝',
        'r' => '♜',
        'q' => '♛',
        'k' => '♚',
        _ => ' ',
    }
}

/// Board lines with colored squares, rank 8 first
pub fn board_lines(fen: &str, colors: &BoardColors) -> Option<Vec<String>> {
    let board = parse_placement(fen)?;
    let mut lines = Vec::with_capacity(9);

    for (rank, squares) in board.iter().enumerate() {
        let mut line = format!("{} ", 8 - rank);
        for (file, square) in squares.iter().enumerate() {
            let background = if (rank + file) % 2 == 0 {
                colors.light_square
            } else {
                colors.dark_square
            };
            let (text, foreground) = match square {
                Some(piece) if piece.is_ascii_uppercase() => (glyph(*piece), colors.piece_white),
                Some(piece) => (glyph(*piece), colors.piece_black),
                None => (' ', background),
            };
            line.push_str(&paint(&format!(" {} ", text), foreground, background));
        }
        lines.push(line);
    }
    lines.push("   a  b  c  d  e  f  g  h".to_string());
    Some(lines)
}

fn paint(text: &str, foreground: Color, background: Color) -> String {
    text.truecolor(foreground.r, foreground.g, foreground.b)
        .on_truecolor(background.r, background.g, background.b)
        .to_string()
}

/// One-line summary of a puzzle
pub fn summary(index: usize, puzzle: &PuzzleRow) -> String {
    let id = puzzle
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| puzzle.key.clone());
    format!(
        "#{:<3} {:>8}  {}  {}",
        index,
        id,
        puzzle.turn_text.bold(),
        puzzle.prompt_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use puzzlefeed::Theme;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    #[test]
    fn test_parse_placement() {
        let board = parse_placement(START_FEN).unwrap();
        assert_eq!(board[0][0], Some('r'));
        assert_eq!(board[0][4], Some('k'));
        assert_eq!(board[4][4], Some('P'));
        assert_eq!(board[6][4], None);
        assert_eq!(board[7][7], Some('R'));
    }

    #[test]
    fn test_parse_placement_rejects_malformed() {
        assert!(parse_placement("").is_none());
        assert!(parse_placement("8/8/8/8/8/8/8 w - - 0 1").is_none());
        assert!(parse_placement("9/8/8/8/8/8/8/8 w - - 0 1").is_none());
        assert!(parse_placement("7/8/8/8/8/8/8/8 w - - 0 1").is_none());
        assert!(parse_placement("8/8/8/8/8/8/8/7x w - - 0 1").is_none());
    }

    #[test]
    fn test_board_lines() {
        let lines = board_lines(START_FEN, &Theme::classic().board_colors()).unwrap();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("8 "));
        assert!(lines[0].contains('♜'));
        assert!(lines[7].starts_with("1 "));
        assert!(lines[8].ends_with('h'));
    }

    #[test]
    fn test_summary_falls_back_to_key() {
        let puzzle = PuzzleRow {
            id: None,
            key: "abc".to_string(),
            fen: START_FEN.to_string(),
            turn_text: "Black to play".to_string(),
            prompt_text: "Can you solve this puzzle?".to_string(),
            correct_move: None,
        };
        let line = summary(3, &puzzle);
        assert!(line.starts_with("#3"));
        assert!(line.contains("abc"));
        assert!(line.contains("Can you solve this puzzle?"));
    }
}
