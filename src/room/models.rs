use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use uuid::Uuid;

use super::errors::RoomError;
use crate::game::{Board, Coord, Role, Win};

/// Handle of one live transport connection
pub type ConnectionId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Coarse lifecycle state derived from the room contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    Waiting,
    Active,
    Finished,
}

/// Full state snapshot sent to clients on join, reconnect and name changes
#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub board: Board,
    pub turn_number: u32,
    pub winner: Option<Role>,
    pub line: Option<Vec<Coord>>,
    pub names: HashMap<String, String>,
    pub scores: HashMap<String, u32>,
    pub role_map: BTreeMap<Role, String>,
    pub messages: Vec<ChatMessage>,
    pub host_id: Option<String>,
    pub connected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub role: Role,
    pub reconnected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub coord: Coord,
    pub role: Role,
    /// Turn number after the move was applied
    pub turn_number: u32,
    pub win: Option<Win>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Identity still holding a role after the departure
    pub remaining: Option<String>,
    /// Set when host status moved to `remaining`
    pub new_host: Option<String>,
    pub room_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    pub remaining: Option<String>,
    pub new_host: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KickOutcome {
    pub kicked: String,
    pub kicked_connection: Option<ConnectionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewGameProposal {
    /// Opponent is gone, the board was reset without a handshake
    ResetImmediately,
    Pending {
        opponent: String,
        opponent_connection: ConnectionId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchProposal {
    pub opponent: String,
    pub opponent_connection: ConnectionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalResponse {
    Accepted { proposer: String },
    Declined { proposer: String },
}

/// Per-room game and session state.
///
/// `players` and `role_map` are only ever changed together through
/// `assign_role`, `remove_role` and `swap_roles`, so they stay exact inverses.
#[derive(Debug, Clone)]
pub struct Room {
    id: String,
    board: Board,
    turn_number: u32,
    winner: Option<Role>,
    winning_line: Option<Vec<Coord>>,
    players: HashMap<String, Role>,
    role_map: BTreeMap<Role, String>,
    connections: HashMap<String, ConnectionId>,
    names: HashMap<String, String>,
    scores: HashMap<String, u32>,
    host_id: Option<String>,
    messages: Vec<ChatMessage>,
    chat_limit: Option<usize>,
    pending_new_game: Option<String>,
    pending_switch: Option<String>,
    closed: bool,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl Room {
    /// Creates an empty room. `chat_limit` caps the retained chat history.
    pub fn new(id: String, chat_limit: Option<usize>) -> Self {
        let now = Utc::now();
        Self {
            id,
            board: Board::new(),
            turn_number: 1,
            winner: None,
            winning_line: None,
            players: HashMap::new(),
            role_map: BTreeMap::new(),
            connections: HashMap::new(),
            names: HashMap::new(),
            scores: HashMap::new(),
            host_id: None,
            messages: Vec::new(),
            chat_limit,
            pending_new_game: None,
            pending_switch: None,
            closed: false,
            created_at: now,
            last_activity_at: now,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn winner(&self) -> Option<Role> {
        self.winner
    }

    pub fn winning_line(&self) -> Option<&[Coord]> {
        self.winning_line.as_deref()
    }

    pub fn players(&self) -> &HashMap<String, Role> {
        &self.players
    }

    pub fn role_map(&self) -> &BTreeMap<Role, String> {
        &self.role_map
    }

    pub fn role_of(&self, identity: &str) -> Option<Role> {
        self.players.get(identity).copied()
    }

    pub fn has_player(&self, identity: &str) -> bool {
        self.players.contains_key(identity)
    }

    pub fn host_id(&self) -> Option<&str> {
        self.host_id.as_deref()
    }

    pub fn is_host(&self, identity: &str) -> bool {
        self.host_id.as_deref() == Some(identity)
    }

    pub fn name_of(&self, identity: &str) -> Option<&str> {
        self.names.get(identity).map(String::as_str)
    }

    pub fn score_of(&self, identity: &str) -> Option<u32> {
        self.scores.get(identity).copied()
    }

    pub fn scores(&self) -> &HashMap<String, u32> {
        &self.scores
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn connection_of(&self, identity: &str) -> Option<ConnectionId> {
        self.connections.get(identity).copied()
    }

    /// Every live connection bound to this room
    pub fn connections(&self) -> Vec<ConnectionId> {
        self.connections.values().copied().collect()
    }

    pub fn has_live_connections(&self) -> bool {
        !self.connections.is_empty()
    }

    /// The other identity holding a role, if any
    pub fn opponent_of(&self, identity: &str) -> Option<&str> {
        self.players
            .keys()
            .find(|other| other.as_str() != identity)
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Marks a room as removed from the registry; stale handles observe it
    pub fn close(&mut self) {
        self.closed = true;
        self.connections.clear();
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    pub fn phase(&self) -> RoomPhase {
        if self.winner.is_some() {
            RoomPhase::Finished
        } else if self.players.len() < 2 {
            RoomPhase::Waiting
        } else {
            RoomPhase::Active
        }
    }

    /// Whether a new-game or role-switch proposal is outstanding
    pub fn is_negotiating(&self) -> bool {
        self.pending_new_game.is_some() || self.pending_switch.is_some()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id.clone(),
            board: self.board.clone(),
            turn_number: self.turn_number,
            winner: self.winner,
            line: self.winning_line.clone(),
            names: self.names.clone(),
            scores: self.scores.clone(),
            role_map: self.role_map.clone(),
            messages: self.messages.clone(),
            host_id: self.host_id.clone(),
            connected: self.connections.keys().cloned().collect(),
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Binds `identity` to the room.
    ///
    /// A returning identity only has its connection rebound. A new identity takes
    /// the lowest vacant role; the first identity in an empty room becomes host.
    pub fn join(
        &mut self,
        identity: &str,
        connection: ConnectionId,
        default_name: &str,
    ) -> Result<JoinOutcome, RoomError> {
        if let Some(role) = self.role_of(identity) {
            self.connections.insert(identity.to_string(), connection);
            self.touch();
            debug!(room_id = %self.id, player_uuid = %identity, role = %role, "Player reconnected");
            return Ok(JoinOutcome {
                role,
                reconnected: true,
            });
        }

        let role = Role::ALL
            .into_iter()
            .find(|role| !self.role_map.contains_key(role))
            .ok_or(RoomError::RoomFull)?;

        self.assign_role(identity, role);
        self.connections.insert(identity.to_string(), connection);
        self.scores.entry(identity.to_string()).or_insert(0);
        self.names
            .entry(identity.to_string())
            .or_insert_with(|| default_name.to_string());
        if self.host_id.is_none() {
            self.host_id = Some(identity.to_string());
        }
        self.touch();

        debug!(room_id = %self.id, player_uuid = %identity, role = %role, "Player assigned role");
        Ok(JoinOutcome {
            role,
            reconnected: false,
        })
    }

    pub fn set_name(&mut self, identity: &str, name: &str) -> Result<(), RoomError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomError::EmptyName);
        }
        if !self.has_player(identity) {
            return Err(RoomError::NotInRoom);
        }
        self.names.insert(identity.to_string(), name.to_string());
        self.touch();
        Ok(())
    }

    /// Validates and applies a move for `claimed_role` at (`row`, `col`).
    ///
    /// State is unchanged when an error is returned.
    pub fn make_move(
        &mut self,
        identity: &str,
        row: i64,
        col: i64,
        claimed_role: Role,
    ) -> Result<MoveOutcome, RoomError> {
        if self.winner.is_some() {
            return Err(RoomError::GameOver);
        }
        if self.role_of(identity) != Some(claimed_role) {
            return Err(RoomError::WrongRole);
        }
        if Role::for_turn(self.turn_number) != claimed_role {
            return Err(RoomError::WrongTurn);
        }
        let coord = Coord::checked(row, col).ok_or(RoomError::OutOfBounds)?;
        self.board.place(coord, claimed_role)?;

        self.turn_number += 1;
        let win = self.board.check_win(coord);
        if let Some(win) = &win {
            self.winner = Some(win.role);
            self.winning_line = Some(win.line.clone());
            *self.scores.entry(identity.to_string()).or_insert(0) += 1;
        }
        self.touch();

        Ok(MoveOutcome {
            coord,
            role: claimed_role,
            turn_number: self.turn_number,
            win,
        })
    }

    /// Clears the board and starts again from turn 1
    pub fn reset(&mut self) {
        self.board.clear();
        self.turn_number = 1;
        self.winner = None;
        self.winning_line = None;
        self.pending_new_game = None;
        self.pending_switch = None;
        self.touch();
    }

    /// Intentional departure: drops role, name, score and chat history and resets
    /// the game. Host status moves to the remaining identity.
    pub fn leave(&mut self, identity: &str) -> Result<LeaveOutcome, RoomError> {
        if !self.has_player(identity) {
            return Err(RoomError::NotInRoom);
        }

        let was_host = self.is_host(identity);
        self.connections.remove(identity);
        self.remove_role(identity);
        self.names.remove(identity);
        self.scores.remove(identity);
        self.messages.clear();
        self.reset();

        let remaining = self.players.keys().next().cloned();
        let mut new_host = None;
        if was_host {
            self.host_id = remaining.clone();
            new_host = remaining.clone();
        }

        Ok(LeaveOutcome {
            room_empty: remaining.is_none(),
            remaining,
            new_host,
        })
    }

    /// Transport closure for `identity`'s `connection`.
    ///
    /// Role, name and score are kept. Returns `None` when the identity is no longer
    /// bound to that connection (it already reconnected elsewhere or left).
    pub fn disconnect(
        &mut self,
        identity: &str,
        connection: ConnectionId,
    ) -> Option<DisconnectOutcome> {
        if self.connections.get(identity) != Some(&connection) {
            return None;
        }
        self.connections.remove(identity);

        let remaining = self.opponent_of(identity).map(str::to_string);
        let mut new_host = None;
        if self.is_host(identity) {
            if let Some(other) = &remaining {
                self.host_id = Some(other.clone());
                new_host = Some(other.clone());
            }
        }

        Some(DisconnectOutcome {
            remaining,
            new_host,
        })
    }

    /// Host-only removal of the other identity, followed by a game reset
    pub fn kick(&mut self, requester: &str) -> Result<KickOutcome, RoomError> {
        if !self.has_player(requester) {
            return Err(RoomError::NotInRoom);
        }
        if !self.is_host(requester) {
            return Err(RoomError::NotHost);
        }
        let kicked = self
            .opponent_of(requester)
            .map(str::to_string)
            .ok_or(RoomError::NoOpponent)?;

        let kicked_connection = self.connections.remove(&kicked);
        self.remove_role(&kicked);
        self.names.remove(&kicked);
        self.scores.remove(&kicked);
        self.reset();

        Ok(KickOutcome {
            kicked,
            kicked_connection,
        })
    }

    pub fn propose_new_game(&mut self, identity: &str) -> Result<NewGameProposal, RoomError> {
        if !self.has_player(identity) {
            return Err(RoomError::NotInRoom);
        }

        let opponent = self.opponent_of(identity).map(str::to_string);
        let live_opponent = opponent.and_then(|opponent| {
            self.connection_of(&opponent)
                .map(|connection| (opponent, connection))
        });

        match live_opponent {
            None => {
                self.reset();
                Ok(NewGameProposal::ResetImmediately)
            }
            Some((opponent, opponent_connection)) => {
                self.pending_new_game = Some(identity.to_string());
                Ok(NewGameProposal::Pending {
                    opponent,
                    opponent_connection,
                })
            }
        }
    }

    pub fn respond_new_game(
        &mut self,
        identity: &str,
        accept: bool,
    ) -> Result<ProposalResponse, RoomError> {
        let proposer = Self::take_pending(&mut self.pending_new_game, &self.players, identity)?;
        if accept {
            self.reset();
            Ok(ProposalResponse::Accepted { proposer })
        } else {
            Ok(ProposalResponse::Declined { proposer })
        }
    }

    pub fn propose_switch_roles(&mut self, identity: &str) -> Result<SwitchProposal, RoomError> {
        if !self.has_player(identity) {
            return Err(RoomError::NotInRoom);
        }

        let opponent = self
            .opponent_of(identity)
            .map(str::to_string)
            .ok_or(RoomError::NoOpponent)?;
        let opponent_connection = self
            .connection_of(&opponent)
            .ok_or(RoomError::NoOpponent)?;

        self.pending_switch = Some(identity.to_string());
        Ok(SwitchProposal {
            opponent,
            opponent_connection,
        })
    }

    pub fn respond_switch_roles(
        &mut self,
        identity: &str,
        accepted: bool,
    ) -> Result<ProposalResponse, RoomError> {
        let proposer = Self::take_pending(&mut self.pending_switch, &self.players, identity)?;
        if accepted {
            self.swap_roles();
            self.touch();
            Ok(ProposalResponse::Accepted { proposer })
        } else {
            Ok(ProposalResponse::Declined { proposer })
        }
    }

    pub fn post_message(&mut self, identity: &str, text: &str) -> Result<ChatMessage, RoomError> {
        if !self.has_player(identity) {
            return Err(RoomError::NotInRoom);
        }
        if text.trim().is_empty() {
            return Err(RoomError::EmptyMessage);
        }

        let message = ChatMessage {
            sender: identity.to_string(),
            text: text.to_string(),
            sent_at: Utc::now(),
        };
        self.messages.push(message.clone());
        if let Some(limit) = self.chat_limit {
            if self.messages.len() > limit {
                let overflow = self.messages.len() - limit;
                self.messages.drain(..overflow);
            }
        }
        self.touch();
        Ok(message)
    }

    // ------------------------------------------------------------------
    // Role bookkeeping
    // ------------------------------------------------------------------

    fn assign_role(&mut self, identity: &str, role: Role) {
        self.players.insert(identity.to_string(), role);
        self.role_map.insert(role, identity.to_string());
    }

    fn remove_role(&mut self, identity: &str) {
        if let Some(role) = self.players.remove(identity) {
            self.role_map.remove(&role);
        }
        if self.pending_new_game.as_deref() == Some(identity) {
            self.pending_new_game = None;
        }
        if self.pending_switch.as_deref() == Some(identity) {
            self.pending_switch = None;
        }
    }

    fn swap_roles(&mut self) {
        for role in self.players.values_mut() {
            *role = role.opponent();
        }
        self.role_map = self
            .players
            .iter()
            .map(|(identity, role)| (*role, identity.clone()))
            .collect();
    }

    /// Takes a pending proposal that `responder` is allowed to answer
    fn take_pending(
        pending: &mut Option<String>,
        players: &HashMap<String, Role>,
        responder: &str,
    ) -> Result<String, RoomError> {
        if !players.contains_key(responder) {
            return Err(RoomError::NotInRoom);
        }
        let answerable = matches!(
            pending.as_deref(),
            Some(proposer) if proposer != responder && players.contains_key(proposer)
        );
        if !answerable {
            return Err(RoomError::NoPendingProposal);
        }
        pending.take().ok_or(RoomError::NoPendingProposal)
    }

    fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    #[cfg(test)]
    pub(crate) fn set_last_activity_at(&mut self, at: DateTime<Utc>) {
        self.last_activity_at = at;
    }
}
