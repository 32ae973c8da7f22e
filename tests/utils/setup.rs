#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use gomoku_server::{
    room::{repository::InMemoryRoomRepository, RoomService},
    websockets::{ConnectionContext, ConnectionManager, WebsocketReceiveHandler},
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub room_service: Arc<RoomService>,
    pub input_handler: WebsocketReceiveHandler,
    /// Player alias -> live connection for that player
    pub players: HashMap<String, Arc<ConnectionContext>>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    chat_limit: Option<usize>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            chat_limit: None,
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "carol"])
    }

    pub fn with_chat_limit(mut self, limit: usize) -> Self {
        self.chat_limit = Some(limit);
        self
    }

    pub async fn build(self) -> TestSetup {
        let repo = Arc::new(InMemoryRoomRepository::new());
        let room_service = Arc::new(RoomService::new(repo, self.chat_limit));
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let connection_manager: Arc<dyn ConnectionManager> = mock_conn_manager.clone();

        let input_handler = WebsocketReceiveHandler::new(room_service.clone(), connection_manager);

        let mut setup = TestSetup {
            mock_conn_manager,
            room_service,
            input_handler,
            players: HashMap::new(),
        };
        for player in &self.players {
            setup.connect(player).await;
        }
        setup
    }
}

impl TestSetup {
    /// Persistent identity used for a player alias
    pub fn uuid_of(alias: &str) -> String {
        format!("uuid-{}", alias)
    }

    pub fn context(&self, alias: &str) -> &Arc<ConnectionContext> {
        self.players
            .get(alias)
            .unwrap_or_else(|| panic!("no connection for {}", alias))
    }

    /// Opens a fresh connection for the alias, replacing any previous one.
    /// Returns the replaced connection, if there was one.
    pub async fn connect(&mut self, alias: &str) -> Option<Arc<ConnectionContext>> {
        let context = Arc::new(ConnectionContext::new(Self::uuid_of(alias), alias));
        let (sender, _receiver) = tokio::sync::mpsc::unbounded_channel();
        self.mock_conn_manager
            .add_connection(context.connection_id, sender)
            .await;
        self.players.insert(alias.to_string(), context)
    }
}
