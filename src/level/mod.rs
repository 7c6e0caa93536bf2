//! Level grammar: a plain-text grid of glyphs, one tile per character.
//!
//! `x` wall, `h` hole, `s` star, `f` fuel, `z` finish, space empty and `p`
//! the player start. The *last* text line is row 0 so the file reads the
//! same way the level looks on screen (bottom-left origin). Anything else
//! is a fatal parse error; no partial level is ever usable.

use bevy::math::Vec2;
use bevy::prelude::Resource;
use std::fmt;

pub mod loader;

/// World-space side length of one grid cell.
pub const TILE_SIZE: f32 = 64.0;

/// Player start used when the grid carries no `p` marker. Matches the
/// historical level 1 layout (column 1, row 10).
pub const DEFAULT_START: Vec2 = Vec2::new(96.0, 672.0);

/// What a grid glyph places in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Wall,
    Hole,
    Star,
    Fuel,
    Finish,
}

impl TileKind {
    /// Map a grid glyph to a tile kind. Space and `p` are handled by the
    /// parser itself; everything else unknown is a parse error.
    #[must_use]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            'x' => Some(TileKind::Wall),
            'h' => Some(TileKind::Hole),
            's' => Some(TileKind::Star),
            'f' => Some(TileKind::Fuel),
            'z' => Some(TileKind::Finish),
            _ => None,
        }
    }

    /// Walls block the player; everything else only reports overlap.
    #[must_use]
    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Wall)
    }

    /// Stars and fuel are removed on pickup; walls, holes and the finish
    /// tile live for the whole level.
    #[must_use]
    pub fn is_collectible(self) -> bool {
        matches!(self, TileKind::Star | TileKind::Fuel)
    }
}

/// One tile placed by the parser. Position is the cell centre and never
/// changes after the parse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    pub kind: TileKind,
    pub row: usize,
    pub column: usize,
    pub position: Vec2,
}

/// Parsed level: the placed tiles plus the player start position.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ParsedLevel {
    pub tiles: Vec<PlacedTile>,
    pub start: Vec2,
}

/// Unknown glyph in the level text. `line` and `column` are 1-based and
/// reported in original text order (top line is line 1), which is what an
/// editor shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub glyph: char,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown level glyph {:?} at line {}, column {}",
            self.glyph, self.line, self.column
        )
    }
}

impl std::error::Error for ParseError {}

/// Centre of the cell at `(row, column)` in world space.
#[must_use]
pub fn tile_centre(row: usize, column: usize) -> Vec2 {
    Vec2::new(
        TILE_SIZE * column as f32 + TILE_SIZE / 2.0,
        TILE_SIZE * row as f32 + TILE_SIZE / 2.0,
    )
}

/// Parse level text into placed tiles and the start position.
///
/// The last text line becomes row 0. A trailing newline does not create a
/// phantom bottom row, and one trailing `\r` per line is stripped so CRLF
/// files parse. A `p` glyph moves the start to that cell's centre (last one
/// wins); without it the start is [`DEFAULT_START`].
///
/// # Errors
/// Fails on the first glyph outside the grammar; the whole level is
/// unusable on error.
pub fn parse_level(text: &str) -> Result<ParsedLevel, ParseError> {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
    let row_count = lines.len();

    let mut tiles = Vec::new();
    let mut start = DEFAULT_START;

    for (line_index, line) in lines.iter().enumerate() {
        let row = row_count - 1 - line_index;
        for (column, glyph) in line.chars().enumerate() {
            if glyph == ' ' {
                continue;
            }
            if glyph == 'p' {
                start = tile_centre(row, column);
                continue;
            }
            let Some(kind) = TileKind::from_glyph(glyph) else {
                return Err(ParseError {
                    line: line_index + 1,
                    column: column + 1,
                    glyph,
                });
            };
            tiles.push(PlacedTile {
                kind,
                row,
                column,
                position: tile_centre(row, column),
            });
        }
    }

    Ok(ParsedLevel { tiles, start })
}
