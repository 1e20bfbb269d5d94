//! The tic-tac-toe engine.
//!
//! A [`Game`] is a pure state machine: `IN_PROGRESS → FINISHED`. It knows
//! which user plays which symbol but nothing about rooms or connections,
//! and it never reads a clock (move timestamps are supplied by the caller).

use noughts_protocol::{
    Board, Cell, GameSnapshot, GameStatus, GameUpdate, MoveRecord, Players,
    Symbol, UserId, Winner, BOARD_CELLS,
};

use crate::GameError;

/// The eight lines that win the game: rows, columns, diagonals.
const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// One game between two seated users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    current_turn: Symbol,
    moves: Vec<MoveRecord>,
    status: GameStatus,
    winner: Option<Winner>,
    players: Players,
}

impl Game {
    /// Starts a fresh game: empty board, X to move.
    pub fn new(players: Players) -> Self {
        Self {
            board: Board::default(),
            current_turn: Symbol::X,
            moves: Vec::new(),
            status: GameStatus::InProgress,
            winner: None,
            players,
        }
    }

    /// Places the mover's symbol at `cell_index`.
    ///
    /// Every precondition is checked before anything changes, so a rejected
    /// move leaves the game exactly as it was.
    pub fn apply_move(
        &mut self,
        user: &UserId,
        cell_index: i64,
        timestamp: u64,
    ) -> Result<MoveRecord, GameError> {
        if self.is_finished() {
            return Err(GameError::Finished);
        }
        let symbol = self
            .players
            .symbol_of(user)
            .ok_or(GameError::NotAPlayer)?;
        if symbol != self.current_turn {
            return Err(GameError::NotYourTurn);
        }
        let index = usize::try_from(cell_index)
            .ok()
            .filter(|i| *i < BOARD_CELLS)
            .ok_or(GameError::OutOfRange(cell_index))?;
        if !self.board.0[index].is_empty() {
            return Err(GameError::Occupied(index));
        }

        self.board.0[index] = Cell::from(symbol);
        let record = MoveRecord {
            // Bounded by BOARD_CELLS above.
            cell_index: index as u8,
            symbol,
            timestamp,
        };
        self.moves.push(record);

        if completes_line(&self.board, symbol) {
            self.finish(Winner::from(symbol));
        } else if self.board.is_full() {
            self.finish(Winner::Draw);
        } else {
            self.current_turn = symbol.other();
        }
        Ok(record)
    }

    /// Ends an in-progress game with `user`'s opponent as the winner.
    ///
    /// Returns `false` (and changes nothing) when the game is already
    /// finished or `user` isn't playing in it.
    pub fn forfeit(&mut self, user: &UserId) -> bool {
        if self.is_finished() {
            return false;
        }
        match self.players.symbol_of(user) {
            Some(symbol) => {
                self.finish(Winner::from(symbol.other()));
                true
            }
            None => false,
        }
    }

    fn finish(&mut self, winner: Winner) {
        self.status = GameStatus::Finished;
        self.winner = Some(winner);
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Symbol {
        self.current_turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// The full wire view of this game.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board,
            current_turn: self.current_turn,
            status: self.status,
            winner: self.winner,
            moves: self.moves.clone(),
            players: self.players.clone(),
        }
    }

    /// The `game:update` payload for the current state.
    pub fn update(
        &self,
        last_move: Option<MoveRecord>,
        forfeited_by: Option<UserId>,
    ) -> GameUpdate {
        GameUpdate {
            board: self.board,
            current_turn: self.current_turn,
            status: self.status,
            winner: self.winner,
            last_move,
            forfeited_by,
        }
    }
}

fn completes_line(board: &Board, symbol: Symbol) -> bool {
    let mark = Cell::from(symbol);
    WIN_LINES
        .iter()
        .any(|line| line.iter().all(|&i| board.0[i] == mark))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players() -> Players {
        Players {
            x: UserId::from("alice"),
            o: UserId::from("bob"),
        }
    }

    fn alice() -> UserId {
        UserId::from("alice")
    }

    fn bob() -> UserId {
        UserId::from("bob")
    }

    /// Plays alternating moves starting with X.
    fn play(game: &mut Game, cells: &[i64]) {
        for (n, cell) in cells.iter().enumerate() {
            let user = if n % 2 == 0 { alice() } else { bob() };
            game.apply_move(&user, *cell, n as u64).unwrap();
        }
    }

    #[test]
    fn test_first_move_flips_turn() {
        let mut game = Game::new(players());
        let record = game.apply_move(&alice(), 4, 1_000).unwrap();
        assert_eq!(record.cell_index, 4);
        assert_eq!(record.symbol, Symbol::X);
        assert_eq!(record.timestamp, 1_000);
        assert_eq!(game.board().to_string(), "----X----");
        assert_eq!(game.current_turn(), Symbol::O);
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_top_row_wins_for_x() {
        let mut game = Game::new(players());
        play(&mut game, &[0, 3, 1, 4, 2]);
        assert_eq!(game.board().to_string(), "XXXOO----");
        assert_eq!(game.status(), GameStatus::Finished);
        assert_eq!(game.winner(), Some(Winner::X));
    }

    #[test]
    fn test_anti_diagonal_win_for_o() {
        let mut game = Game::new(players());
        play(&mut game, &[0, 2, 1, 4, 8, 6]);
        assert_eq!(game.winner(), Some(Winner::O));
        assert_eq!(game.moves().len(), 6);
    }

    #[test]
    fn test_full_board_without_line_is_draw() {
        let mut game = Game::new(players());
        play(&mut game, &[0, 1, 2, 4, 3, 5, 7, 6, 8]);
        assert_eq!(game.board().to_string(), "XOXXOOOXX");
        assert_eq!(game.status(), GameStatus::Finished);
        assert_eq!(game.winner(), Some(Winner::Draw));
    }

    #[test]
    fn test_occupied_cell_rejected_without_mutation() {
        let mut game = Game::new(players());
        play(&mut game, &[4]);
        let before = game.clone();
        let err = game.apply_move(&bob(), 4, 99).unwrap_err();
        assert!(matches!(err, GameError::Occupied(4)));
        assert_eq!(game, before);
    }

    #[test]
    fn test_wrong_turn_and_outsider_rejected() {
        let mut game = Game::new(players());
        assert!(matches!(
            game.apply_move(&bob(), 0, 0),
            Err(GameError::NotYourTurn)
        ));
        assert!(matches!(
            game.apply_move(&UserId::from("carol"), 0, 0),
            Err(GameError::NotAPlayer)
        ));
        assert_eq!(game.moves().len(), 0);
    }

    #[test]
    fn test_out_of_range_indices() {
        let mut game = Game::new(players());
        for cell in [-1, 9, 100, i64::MAX, i64::MIN] {
            assert!(matches!(
                game.apply_move(&alice(), cell, 0),
                Err(GameError::OutOfRange(c)) if c == cell
            ));
        }
        assert_eq!(game.board(), &Board::default());
    }

    #[test]
    fn test_finished_game_is_frozen() {
        let mut game = Game::new(players());
        play(&mut game, &[0, 3, 1, 4, 2]);
        let before = game.clone();
        assert!(matches!(
            game.apply_move(&bob(), 5, 0),
            Err(GameError::Finished)
        ));
        assert!(!game.forfeit(&alice()));
        assert_eq!(game, before);
    }

    #[test]
    fn test_forfeit_awards_opponent() {
        let mut game = Game::new(players());
        play(&mut game, &[4]);
        assert!(game.forfeit(&alice()));
        assert_eq!(game.winner(), Some(Winner::O));
        assert!(game.is_finished());

        let mut game = Game::new(players());
        assert!(!game.forfeit(&UserId::from("carol")));
        assert!(!game.is_finished());
    }

    #[test]
    fn test_snapshot_and_update_views() {
        let mut game = Game::new(players());
        let record = game.apply_move(&alice(), 8, 5).unwrap();

        let snap = game.snapshot();
        assert_eq!(snap.moves, vec![record]);
        assert_eq!(snap.players, players());
        assert_eq!(snap.winner, None);

        let update = game.update(Some(record), None);
        assert_eq!(update.board, *game.board());
        assert_eq!(update.current_turn, Symbol::O);
        assert_eq!(update.last_move, Some(record));
    }
}
