//! Textual board notation.
//!
//! A board prints as a header line `"<width> <height>"` followed by an
//! interleaved glyph grid: node rows alternate `+` with horizontal edge
//! glyphs, cell rows alternate vertical edge glyphs with clue digits.
//! `-` and `|` mark on-edges, `x` off-edges, space undetermined.

use std::fmt;

use thiserror::Error;

use super::{Board, EdgeStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing or malformed header line (expected \"<width> <height>\")")]
    BadHeader,
    #[error("unexpected character {ch:?} at line {line}, column {col}")]
    BadGlyph { line: usize, col: usize, ch: char },
}

fn h_glyph(status: EdgeStatus) -> char {
    match status {
        EdgeStatus::On => '-',
        EdgeStatus::Off => 'x',
        EdgeStatus::Unset => ' ',
    }
}

fn v_glyph(status: EdgeStatus) -> char {
    match status {
        EdgeStatus::On => '|',
        EdgeStatus::Off => 'x',
        EdgeStatus::Unset => ' ',
    }
}

impl Board {
    /// Render the board in glyph notation.
    pub fn dump(&self) -> String {
        let mut out = format!("{} {}\n", self.width(), self.height());
        for y in 0..=self.height() {
            for x in 0..self.width() {
                out.push('+');
                out.push(h_glyph(self.edge(self.h_edge_id(x, y)).status));
            }
            out.push('+');
            out.push('\n');
            if y < self.height() {
                for x in 0..=self.width() {
                    out.push(v_glyph(self.edge(self.v_edge_id(x, y)).status));
                    if x < self.width() {
                        let number = self.cell(self.cell_id(x, y)).number;
                        out.push(if number >= 0 {
                            (b'0' + number as u8) as char
                        } else {
                            ' '
                        });
                    }
                }
                out.push('\n');
            }
        }
        out
    }

    /// Parse a board from glyph notation. Short or missing lines are read
    /// as undetermined edges and blank clues.
    pub fn parse(input: &str) -> Result<Board, ParseError> {
        let mut lines = input.lines();
        let header = lines.next().ok_or(ParseError::BadHeader)?;
        let mut parts = header.split_whitespace();
        let width: usize = parts
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or(ParseError::BadHeader)?;
        let height: usize = parts
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or(ParseError::BadHeader)?;
        if width == 0 || height == 0 || parts.next().is_some() {
            return Err(ParseError::BadHeader);
        }

        let grid: Vec<Vec<char>> = lines.map(|l| l.chars().collect()).collect();
        let at = |row: usize, col: usize| -> char {
            grid.get(row)
                .and_then(|l| l.get(col))
                .copied()
                .unwrap_or(' ')
        };

        let mut numbers = vec![-1i8; width * height];
        for y in 0..height {
            for x in 0..width {
                let ch = at(2 * y + 1, 2 * x + 1);
                numbers[y * width + x] = match ch {
                    '0'..='3' => (ch as u8 - b'0') as i8,
                    ' ' | '.' => -1,
                    _ => {
                        return Err(ParseError::BadGlyph {
                            line: 2 * y + 2,
                            col: 2 * x + 1,
                            ch,
                        })
                    }
                };
            }
        }

        let mut board = Board::new(width, height, &numbers);
        for y in 0..=height {
            for x in 0..width {
                let ch = at(2 * y, 2 * x + 1);
                let status = match ch {
                    '-' => EdgeStatus::On,
                    'x' => EdgeStatus::Off,
                    ' ' => EdgeStatus::Unset,
                    _ => {
                        return Err(ParseError::BadGlyph {
                            line: 2 * y + 1,
                            col: 2 * x + 1,
                            ch,
                        })
                    }
                };
                if status.is_determined() {
                    board.set_edge_raw(board.h_edge_id(x, y), EdgeStatus::Unset, status);
                }
            }
        }
        for y in 0..height {
            for x in 0..=width {
                let ch = at(2 * y + 1, 2 * x);
                let status = match ch {
                    '|' => EdgeStatus::On,
                    'x' => EdgeStatus::Off,
                    ' ' => EdgeStatus::Unset,
                    _ => {
                        return Err(ParseError::BadGlyph {
                            line: 2 * y + 2,
                            col: 2 * x,
                            ch,
                        })
                    }
                };
                if status.is_determined() {
                    board.set_edge_raw(board.v_edge_id(x, y), EdgeStatus::Unset, status);
                }
            }
        }
        Ok(board)
    }

    /// Build a board from compact clue rows: one string per cell row, one
    /// character per cell, digits `0`-`3` for clues and anything else blank.
    /// Short rows are padded with blanks.
    ///
    /// # Panics
    ///
    /// Panics if `rows` is empty or every row is empty.
    pub fn from_clue_rows(rows: &[&str]) -> Board {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        assert!(width > 0 && height > 0, "clue rows must be non-empty");
        let mut numbers = vec![-1i8; width * height];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch.is_ascii_digit() && ch <= '3' {
                    numbers[y * width + x] = (ch as u8 - b'0') as i8;
                }
            }
        }
        Board::new(width, height, &numbers)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}
