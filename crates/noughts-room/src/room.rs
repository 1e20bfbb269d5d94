//! Room actor: an isolated Tokio task that owns one room.
//!
//! Each room runs in its own task and is reached only through its command
//! channel, so every operation on a room runs to completion before the next
//! one starts: read, validate, mutate, broadcast. Rooms never share state.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{SystemTime, UNIX_EPOCH};

use noughts_protocol::{
    ClientMessage, Codec, GameSnapshot, GameStarted, Joined, JsonCodec,
    MemberEvent, Players, RematchPending, Role, RoomId, SeatView, Seats,
    ServerMessage, SpectatorAction, SpectatorUpdate, Symbol, UserId,
};
use noughts_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::sink::Frame;
use crate::{ConnectionSink, Game, GameError, RoomConfig, RoomError};

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in most variants is a reply channel: the caller
/// sends a command and waits for the room to finish processing it.
pub(crate) enum RoomCommand {
    /// Subscribe a connection to the room's broadcasts.
    Attach {
        user_id: UserId,
        sink: ConnectionSink,
        reply: oneshot::Sender<()>,
    },

    /// Unsubscribe a connection. Drops the user's role if this was their
    /// last connection.
    Detach {
        conn_id: ConnectionId,
        reply: oneshot::Sender<()>,
    },

    /// Run one client request on behalf of a subscribed connection.
    Request {
        conn_id: ConnectionId,
        msg: ClientMessage,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Info {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown,
}

/// A read-only snapshot of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub seats: Seats,
    pub spectators: Vec<UserId>,
    /// Attached connections, whatever their user's role.
    pub subscribers: usize,
    /// The current or most recent game.
    pub active_game: Option<GameSnapshot>,
    /// Games superseded by a later `start_game`.
    pub past_games: usize,
    pub rematch_requested_by: Option<UserId>,
}

/// Handle to a running room actor.
///
/// Cheap to clone; it's just an `mpsc::Sender` wrapper. Every method fails
/// with [`RoomError::Unavailable`] once the actor has stopped.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Whether the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn call<R>(
        &self,
        command: impl FnOnce(oneshot::Sender<R>) -> RoomCommand,
    ) -> Result<R, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Subscribes a connection. It receives every broadcast from now on
    /// but holds no role until it joins.
    pub async fn attach(
        &self,
        user_id: UserId,
        sink: ConnectionSink,
    ) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::Attach {
            user_id,
            sink,
            reply,
        })
        .await
    }

    pub async fn detach(&self, conn_id: ConnectionId) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::Detach { conn_id, reply }).await
    }

    /// Runs a client request for an attached connection.
    ///
    /// Requests from connections that aren't attached are ignored.
    pub async fn submit(
        &self,
        conn_id: ConnectionId,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::Request {
            conn_id,
            msg,
            reply,
        })
        .await?
    }

    pub async fn join(&self, conn_id: ConnectionId) -> Result<(), RoomError> {
        self.submit(conn_id, ClientMessage::Join).await
    }

    pub async fn leave(&self, conn_id: ConnectionId) -> Result<(), RoomError> {
        self.submit(conn_id, ClientMessage::Leave).await
    }

    pub async fn start_game(&self, conn_id: ConnectionId) -> Result<(), RoomError> {
        self.submit(conn_id, ClientMessage::StartGame).await
    }

    pub async fn make_move(
        &self,
        conn_id: ConnectionId,
        cell_index: i64,
    ) -> Result<(), RoomError> {
        self.submit(conn_id, ClientMessage::Move { cell_index }).await
    }

    pub async fn request_rematch(
        &self,
        conn_id: ConnectionId,
    ) -> Result<(), RoomError> {
        self.submit(conn_id, ClientMessage::RematchRequest).await
    }

    pub async fn accept_rematch(
        &self,
        conn_id: ConnectionId,
    ) -> Result<(), RoomError> {
        self.submit(conn_id, ClientMessage::RematchAccept).await
    }

    pub async fn spectator_join(
        &self,
        conn_id: ConnectionId,
    ) -> Result<(), RoomError> {
        self.submit(conn_id, ClientMessage::SpectatorJoin).await
    }

    pub async fn spectator_leave(
        &self,
        conn_id: ConnectionId,
    ) -> Result<(), RoomError> {
        self.submit(conn_id, ClientMessage::SpectatorLeave).await
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        self.call(|reply| RoomCommand::Info { reply }).await
    }

    /// Tells the room to stop. Commands already queued are discarded.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

#[derive(Debug)]
struct Seat {
    user_id: UserId,
    symbol: Symbol,
}

struct Subscriber {
    user_id: UserId,
    sink: ConnectionSink,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    seats: [Option<Seat>; 2],
    /// Symbol each seat index plays in the current (or next) game.
    seat_symbols: [Symbol; 2],
    spectators: BTreeSet<UserId>,
    subscribers: BTreeMap<ConnectionId, Subscriber>,
    active_game: Option<Game>,
    past_games: Vec<Game>,
    rematch: Option<UserId>,
    /// Connections whose sinks refused a frame during this command.
    dropped: Vec<ConnectionId>,
    codec: JsonCodec,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Attach {
                    user_id,
                    sink,
                    reply,
                } => {
                    self.attach(user_id, sink);
                    self.reap();
                    let _ = reply.send(());
                }
                RoomCommand::Detach { conn_id, reply } => {
                    self.detach(conn_id);
                    self.reap();
                    let _ = reply.send(());
                }
                RoomCommand::Request {
                    conn_id,
                    msg,
                    reply,
                } => {
                    let result = self.handle_request(conn_id, msg);
                    self.reap();
                    let _ = reply.send(result);
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room_id = %self.room_id, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn attach(&mut self, user_id: UserId, sink: ConnectionSink) {
        let conn_id = sink.conn_id();
        tracing::debug!(
            room_id = %self.room_id,
            %conn_id,
            %user_id,
            "connection attached"
        );
        self.subscribers.insert(conn_id, Subscriber { user_id, sink });
    }

    fn detach(&mut self, conn_id: ConnectionId) {
        let Some(sub) = self.subscribers.remove(&conn_id) else {
            return;
        };
        tracing::debug!(
            room_id = %self.room_id,
            %conn_id,
            user_id = %sub.user_id,
            "connection detached"
        );
        if !self.is_connected(&sub.user_id) {
            self.remove_user(&sub.user_id, None);
        }
    }

    fn handle_request(
        &mut self,
        conn_id: ConnectionId,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        let Some(user_id) = self.subscribers.get(&conn_id).map(|s| s.user_id.clone()) else {
            tracing::warn!(
                room_id = %self.room_id,
                %conn_id,
                "request from unattached connection, ignoring"
            );
            return Ok(());
        };
        let kind = msg.kind();

        let result = match msg {
            ClientMessage::Join => {
                self.join(conn_id, user_id.clone());
                Ok(())
            }
            ClientMessage::Leave => {
                self.leave(conn_id, &user_id);
                Ok(())
            }
            ClientMessage::StartGame => self.start_game(&user_id),
            ClientMessage::Move { cell_index } => self.make_move(&user_id, cell_index),
            ClientMessage::RematchRequest => self.request_rematch(&user_id),
            ClientMessage::RematchAccept => self.accept_rematch(&user_id),
            ClientMessage::SpectatorJoin => self.spectator_join(conn_id, &user_id),
            ClientMessage::SpectatorLeave => {
                self.spectator_leave(&user_id);
                Ok(())
            }
        };

        if let Err(e) = &result {
            tracing::debug!(
                room_id = %self.room_id,
                %conn_id,
                %user_id,
                kind,
                reason = %e,
                "request rejected"
            );
        }
        result
    }

    // -- membership --------------------------------------------------------

    fn join(&mut self, conn_id: ConnectionId, user_id: UserId) {
        if let Some(role) = self.role_of(&user_id) {
            let msg = ServerMessage::Joined(self.joined(role));
            self.send_to(conn_id, &msg);
            return;
        }

        let role = match self.seats.iter().position(Option::is_none) {
            Some(idx) => {
                self.seats[idx] = Some(Seat {
                    user_id: user_id.clone(),
                    symbol: self.seat_symbols[idx],
                });
                Role::Player
            }
            None => {
                self.spectators.insert(user_id.clone());
                Role::Spectator
            }
        };
        tracing::info!(
            room_id = %self.room_id,
            %user_id,
            ?role,
            "user joined"
        );

        let msg = ServerMessage::Joined(self.joined(role));
        self.send_to(conn_id, &msg);

        let event = self.member_event(&user_id, Some(role));
        let msg = match role {
            Role::Player => ServerMessage::PlayerJoined(event),
            Role::Spectator => ServerMessage::SpectatorJoined(event),
        };
        self.broadcast(&msg, Some(conn_id));
    }

    fn leave(&mut self, conn_id: ConnectionId, user_id: &UserId) {
        let role = self.remove_user(user_id, Some(conn_id));
        let msg = ServerMessage::Left(self.member_event(user_id, role));
        self.send_to(conn_id, &msg);
    }

    /// Takes away whatever role `user_id` holds and tells the room.
    ///
    /// A seated player leaving mid-game forfeits it, and any pending
    /// rematch request dies with the seat.
    fn remove_user(
        &mut self,
        user_id: &UserId,
        exclude: Option<ConnectionId>,
    ) -> Option<Role> {
        if let Some(idx) = self.seat_of(user_id) {
            self.seats[idx] = None;
            self.rematch = None;

            let forfeited = self
                .active_game
                .as_mut()
                .is_some_and(|game| game.forfeit(user_id));
            if forfeited {
                tracing::info!(
                    room_id = %self.room_id,
                    %user_id,
                    "game forfeited"
                );
                let update = self
                    .active_game
                    .as_ref()
                    .map(|game| game.update(None, Some(user_id.clone())));
                if let Some(update) = update {
                    self.broadcast(&ServerMessage::GameUpdate(update), None);
                }
            }

            tracing::info!(room_id = %self.room_id, %user_id, "player left");
            let event = self.member_event(user_id, Some(Role::Player));
            self.broadcast(&ServerMessage::PlayerLeft(event), exclude);
            Some(Role::Player)
        } else if self.spectators.remove(user_id) {
            tracing::info!(room_id = %self.room_id, %user_id, "spectator left");
            let msg = self.spectator_update(user_id, SpectatorAction::Left);
            self.broadcast(&msg, exclude);
            Some(Role::Spectator)
        } else {
            None
        }
    }

    fn spectator_join(
        &mut self,
        conn_id: ConnectionId,
        user_id: &UserId,
    ) -> Result<(), RoomError> {
        if self.seat_of(user_id).is_some() {
            return Err(RoomError::AlreadySeated);
        }
        if self.spectators.contains(user_id) {
            let msg = self.spectator_update(user_id, SpectatorAction::Joined);
            self.send_to(conn_id, &msg);
            return Ok(());
        }
        self.spectators.insert(user_id.clone());
        tracing::info!(room_id = %self.room_id, %user_id, "spectator joined");
        let msg = self.spectator_update(user_id, SpectatorAction::Joined);
        self.broadcast(&msg, None);
        Ok(())
    }

    fn spectator_leave(&mut self, user_id: &UserId) {
        if self.spectators.remove(user_id) {
            tracing::info!(room_id = %self.room_id, %user_id, "spectator left");
            let msg = self.spectator_update(user_id, SpectatorAction::Left);
            self.broadcast(&msg, None);
        }
    }

    // -- game --------------------------------------------------------------

    fn start_game(&mut self, user_id: &UserId) -> Result<(), RoomError> {
        if self.seat_of(user_id).is_none() {
            return Err(RoomError::NotAPlayer);
        }
        if self.seats.iter().any(Option::is_none) {
            return Err(RoomError::NotEnoughPlayers);
        }
        if self.active_game.as_ref().is_some_and(|g| !g.is_finished()) {
            return Err(RoomError::GameInProgress);
        }
        self.begin_game()
    }

    /// Seats the next game. Every game after the first swaps symbols.
    fn begin_game(&mut self) -> Result<(), RoomError> {
        let [Some(first), Some(second)] = &mut self.seats else {
            return Err(RoomError::NotEnoughPlayers);
        };
        if self.active_game.is_some() {
            self.seat_symbols = self.seat_symbols.map(Symbol::other);
        }
        first.symbol = self.seat_symbols[0];
        second.symbol = self.seat_symbols[1];
        let players = if first.symbol == Symbol::X {
            Players {
                x: first.user_id.clone(),
                o: second.user_id.clone(),
            }
        } else {
            Players {
                x: second.user_id.clone(),
                o: first.user_id.clone(),
            }
        };

        tracing::info!(
            room_id = %self.room_id,
            x = %players.x,
            o = %players.o,
            "game started"
        );
        let game = Game::new(players);
        let snapshot = game.snapshot();
        if let Some(previous) = self.active_game.replace(game) {
            self.past_games.push(previous);
        }
        self.rematch = None;

        self.broadcast(
            &ServerMessage::GameStarted(GameStarted { game: snapshot }),
            None,
        );
        Ok(())
    }

    fn make_move(&mut self, user_id: &UserId, cell_index: i64) -> Result<(), RoomError> {
        let game = self.active_game.as_mut().ok_or(GameError::NoGame)?;
        let record = game.apply_move(user_id, cell_index, now_ms())?;
        let update = game.update(Some(record), None);
        let finished = game.is_finished();

        tracing::debug!(
            room_id = %self.room_id,
            %user_id,
            cell = record.cell_index,
            "move applied"
        );
        if finished {
            tracing::info!(
                room_id = %self.room_id,
                winner = ?update.winner,
                "game finished"
            );
        }
        self.broadcast(&ServerMessage::GameUpdate(update), None);
        Ok(())
    }

    fn request_rematch(&mut self, user_id: &UserId) -> Result<(), RoomError> {
        if self.seat_of(user_id).is_none() {
            return Err(RoomError::NotAPlayer);
        }
        if !self.active_game.as_ref().is_some_and(Game::is_finished) {
            return Err(RoomError::NotFinished);
        }
        if self.rematch.is_some() {
            return Err(RoomError::AlreadyPending);
        }
        self.rematch = Some(user_id.clone());
        self.broadcast(
            &ServerMessage::RematchPending(RematchPending {
                requested_by: user_id.clone(),
            }),
            None,
        );
        Ok(())
    }

    fn accept_rematch(&mut self, user_id: &UserId) -> Result<(), RoomError> {
        let Some(requester) = &self.rematch else {
            return Err(RoomError::NoPendingRequest);
        };
        if requester == user_id || self.seat_of(user_id).is_none() {
            return Err(RoomError::NotOpponent);
        }
        self.begin_game()
    }

    // -- views -------------------------------------------------------------

    fn seat_of(&self, user_id: &UserId) -> Option<usize> {
        self.seats
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| &s.user_id == user_id))
    }

    fn role_of(&self, user_id: &UserId) -> Option<Role> {
        if self.seat_of(user_id).is_some() {
            Some(Role::Player)
        } else if self.spectators.contains(user_id) {
            Some(Role::Spectator)
        } else {
            None
        }
    }

    fn is_connected(&self, user_id: &UserId) -> bool {
        self.subscribers.values().any(|s| &s.user_id == user_id)
    }

    fn seat_views(&self) -> Seats {
        self.seats.each_ref().map(|seat| {
            seat.as_ref().map(|s| SeatView {
                user_id: s.user_id.clone(),
                symbol: s.symbol,
            })
        })
    }

    fn joined(&self, role: Role) -> Joined {
        Joined {
            role,
            seats: self.seat_views(),
            spectator_count: self.spectators.len(),
            game: self.active_game.as_ref().map(Game::snapshot),
        }
    }

    fn member_event(&self, user_id: &UserId, role: Option<Role>) -> MemberEvent {
        MemberEvent {
            user_id: user_id.clone(),
            role,
            seats: self.seat_views(),
            spectator_count: self.spectators.len(),
        }
    }

    fn spectator_update(&self, user_id: &UserId, action: SpectatorAction) -> ServerMessage {
        ServerMessage::SpectatorUpdate(SpectatorUpdate {
            user_id: user_id.clone(),
            action,
            spectator_count: self.spectators.len(),
        })
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            seats: self.seat_views(),
            spectators: self.spectators.iter().cloned().collect(),
            subscribers: self.subscribers.len(),
            active_game: self.active_game.as_ref().map(Game::snapshot),
            past_games: self.past_games.len(),
            rematch_requested_by: self.rematch.clone(),
        }
    }

    // -- delivery ----------------------------------------------------------

    fn encode(&self, msg: &ServerMessage) -> Option<Frame> {
        match self.codec.encode(msg) {
            Ok(text) => Some(Frame::from(text)),
            Err(e) => {
                tracing::error!(
                    room_id = %self.room_id,
                    kind = msg.kind(),
                    error = %e,
                    "failed to encode message"
                );
                None
            }
        }
    }

    /// Sends to every subscriber except `exclude`. Encodes once.
    fn broadcast(&mut self, msg: &ServerMessage, exclude: Option<ConnectionId>) {
        let Some(frame) = self.encode(msg) else {
            return;
        };
        for (conn_id, sub) in &self.subscribers {
            if Some(*conn_id) == exclude || self.dropped.contains(conn_id) {
                continue;
            }
            if !sub.sink.deliver(&frame) {
                self.dropped.push(*conn_id);
            }
        }
    }

    fn send_to(&mut self, conn_id: ConnectionId, msg: &ServerMessage) {
        if self.dropped.contains(&conn_id) {
            return;
        }
        let Some(sub) = self.subscribers.get(&conn_id) else {
            return;
        };
        let Some(frame) = self.encode(msg) else {
            return;
        };
        if !sub.sink.deliver(&frame) {
            self.dropped.push(conn_id);
        }
    }

    /// Removes connections whose sinks failed, running the implicit leave
    /// for users left with no connection. That leave broadcasts too, so
    /// this repeats until nothing more fails.
    fn reap(&mut self) {
        while let Some(conn_id) = self.dropped.pop() {
            let Some(sub) = self.subscribers.remove(&conn_id) else {
                continue;
            };
            tracing::warn!(
                room_id = %self.room_id,
                %conn_id,
                user_id = %sub.user_id,
                "connection fell behind, dropping"
            );
            if !self.is_connected(&sub.user_id) {
                self.remove_user(&sub.user_id, None);
            }
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Spawns a new room actor task and returns a handle to communicate with it.
pub(crate) fn spawn_room(room_id: RoomId, config: &RoomConfig) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_capacity.max(1));

    let actor = RoomActor {
        room_id: room_id.clone(),
        seats: [None, None],
        seat_symbols: [Symbol::X, Symbol::O],
        spectators: BTreeSet::new(),
        subscribers: BTreeMap::new(),
        active_game: None,
        past_games: Vec::new(),
        rematch: None,
        dropped: Vec::new(),
        codec: JsonCodec,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { room_id, sender: tx }
}
