//! Core value types that travel on the wire.
//!
//! Identities are opaque strings issued by the upstream account service;
//! the coordinator never interprets them. Game values (symbols, cells, the
//! board) have fixed compact encodings that browser clients render directly.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The authenticated identity of a user, as carried in their token.
///
/// `#[serde(transparent)]` keeps it a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The name of a room, chosen by the client in its connection query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Game values
// ---------------------------------------------------------------------------

/// The mark a seat plays with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// The opposing symbol.
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("X"),
            Self::O => f.write_str("O"),
        }
    }
}

/// One board cell. Empty cells encode as `"-"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    X,
    O,
    #[default]
    #[serde(rename = "-")]
    Empty,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<Symbol> for Cell {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => Self::X,
            Symbol::O => Self::O,
        }
    }
}

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// A 3×3 board in row-major order, encoded as a 9-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board(pub [Cell; BOARD_CELLS]);

impl Board {
    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.0.get(index).copied()
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().all(|c| !c.is_empty())
    }

    pub fn occupied(&self) -> usize {
        self.0.iter().filter(|c| !c.is_empty()).count()
    }
}

/// Renders the compact form used in logs, e.g. `----X----`.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.0 {
            let c = match cell {
                Cell::X => 'X',
                Cell::O => 'O',
                Cell::Empty => '-',
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    InProgress,
    Finished,
}

/// The result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    X,
    O,
    #[serde(rename = "draw")]
    Draw,
}

impl From<Symbol> for Winner {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => Self::X,
            Symbol::O => Self::O,
        }
    }
}

/// One applied move. `timestamp` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub cell_index: u8,
    pub symbol: Symbol,
    pub timestamp: u64,
}

/// Which user plays which symbol in a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    #[serde(rename = "X")]
    pub x: UserId,
    #[serde(rename = "O")]
    pub o: UserId,
}

impl Players {
    pub fn symbol_of(&self, user: &UserId) -> Option<Symbol> {
        if &self.x == user {
            Some(Symbol::X)
        } else if &self.o == user {
            Some(Symbol::O)
        } else {
            None
        }
    }

    pub fn user_of(&self, symbol: Symbol) -> &UserId {
        match symbol {
            Symbol::X => &self.x,
            Symbol::O => &self.o,
        }
    }
}

// ---------------------------------------------------------------------------
// Room views
// ---------------------------------------------------------------------------

/// How a user participates in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Player,
    Spectator,
}

/// A filled seat as clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub user_id: UserId,
    pub symbol: Symbol,
}

/// Both seats in order; `None` encodes as `null`.
pub type Seats = [Option<SeatView>; 2];

/// Full game state sent when a game starts or a client joins mid-game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub board: Board,
    pub current_turn: Symbol,
    pub status: GameStatus,
    pub winner: Option<Winner>,
    pub moves: Vec<MoveRecord>,
    pub players: Players,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        assert_eq!(serde_json::to_string(&UserId::from("u-1")).unwrap(), "\"u-1\"");
        assert_eq!(serde_json::to_string(&RoomId::from("r")).unwrap(), "\"r\"");
    }

    #[test]
    fn test_empty_board_encodes_as_dashes() {
        let json = serde_json::to_value(Board::default()).unwrap();
        assert_eq!(json, serde_json::json!(["-", "-", "-", "-", "-", "-", "-", "-", "-"]));
    }

    #[test]
    fn test_board_display_is_compact() {
        let mut board = Board::default();
        board.0[4] = Cell::X;
        board.0[0] = Cell::O;
        assert_eq!(board.to_string(), "O---X----");
    }

    #[test]
    fn test_board_decodes_from_wire_array() {
        let board: Board =
            serde_json::from_str(r#"["X","X","X","-","-","-","-","-","O"]"#).unwrap();
        assert_eq!(board.cell(2), Some(Cell::X));
        assert_eq!(board.cell(8), Some(Cell::O));
        assert_eq!(board.cell(9), None);
        assert_eq!(board.occupied(), 4);
        assert!(!board.is_full());
    }

    #[test]
    fn test_status_and_winner_encodings() {
        assert_eq!(serde_json::to_string(&GameStatus::InProgress).unwrap(), "\"IN_PROGRESS\"");
        assert_eq!(serde_json::to_string(&GameStatus::Finished).unwrap(), "\"FINISHED\"");
        assert_eq!(serde_json::to_string(&Winner::Draw).unwrap(), "\"draw\"");
        assert_eq!(serde_json::to_string(&Winner::X).unwrap(), "\"X\"");
        assert_eq!(serde_json::to_string(&Role::Spectator).unwrap(), "\"spectator\"");
    }

    #[test]
    fn test_seats_encode_empty_as_null() {
        let seats: Seats = [
            Some(SeatView { user_id: "a".into(), symbol: Symbol::X }),
            None,
        ];
        let json = serde_json::to_value(&seats).unwrap();
        assert_eq!(json[0]["userId"], "a");
        assert_eq!(json[0]["symbol"], "X");
        assert!(json[1].is_null());
    }

    #[test]
    fn test_players_lookup() {
        let players = Players { x: "a".into(), o: "b".into() };
        assert_eq!(players.symbol_of(&"b".into()), Some(Symbol::O));
        assert_eq!(players.symbol_of(&"c".into()), None);
        assert_eq!(players.user_of(Symbol::X), &UserId::from("a"));
        let json = serde_json::to_value(&players).unwrap();
        assert_eq!(json, serde_json::json!({"X": "a", "O": "b"}));
    }

    #[test]
    fn test_symbol_other() {
        assert_eq!(Symbol::X.other(), Symbol::O);
        assert_eq!(Symbol::O.other(), Symbol::X);
    }
}
