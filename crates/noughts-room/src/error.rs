//! Error types for the room layer.

use noughts_protocol::{ErrorCode, RoomId};

/// Why the engine refused a move. Always reported as `INVALID_MOVE`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("no game in progress")]
    NoGame,

    #[error("game already finished")]
    Finished,

    #[error("not a player in this game")]
    NotAPlayer,

    #[error("not your turn")]
    NotYourTurn,

    #[error("cell index {0} out of range")]
    OutOfRange(i64),

    #[error("cell {0} already occupied")]
    Occupied(usize),
}

/// Errors that can occur during room operations.
///
/// Apart from [`Unavailable`](Self::Unavailable), every variant is a
/// rejected precondition: the room's state is unchanged and nothing was
/// broadcast.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The move was refused by the engine.
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("both seats must be filled to start a game")]
    NotEnoughPlayers,

    #[error("a game is already in progress")]
    GameInProgress,

    #[error("the most recent game has not finished")]
    NotFinished,

    #[error("a rematch request is already pending")]
    AlreadyPending,

    #[error("no rematch request is pending")]
    NoPendingRequest,

    #[error("only the opponent can accept a rematch")]
    NotOpponent,

    /// The requester holds no seat.
    #[error("only seated players can do that")]
    NotAPlayer,

    #[error("seated players cannot spectate")]
    AlreadySeated,

    /// The room's command loop has stopped.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}

impl RoomError {
    /// The wire code reported to the client.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Game(_) => ErrorCode::InvalidMove,
            Self::NotEnoughPlayers => ErrorCode::NotEnoughPlayers,
            Self::GameInProgress => ErrorCode::GameInProgress,
            Self::NotFinished => ErrorCode::NotFinished,
            Self::AlreadyPending => ErrorCode::AlreadyPending,
            Self::NoPendingRequest => ErrorCode::NoPendingRequest,
            Self::NotOpponent => ErrorCode::NotOpponent,
            Self::NotAPlayer => ErrorCode::NotAPlayer,
            Self::AlreadySeated => ErrorCode::AlreadySeated,
            Self::Unavailable(_) => ErrorCode::InternalError,
        }
    }
}
