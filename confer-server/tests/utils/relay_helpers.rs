use confer_core::{ClientMessage, ConnectionId, JoinRoom, RoomId, ServerMessage, UserId};
use confer_server::{RelayCommand, SignalingRelay};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::mock_signaling::MockSignalingOutput;

/// A relay driven command by command, without its event loop, so every
/// assertion sees the state after the command has been fully handled.
pub struct TestRelay {
    pub relay: SignalingRelay,
    pub signaling: MockSignalingOutput,
    _cmd_tx: mpsc::Sender<RelayCommand>,
}

/// One simulated client connection.
#[derive(Debug, Clone, Copy)]
pub struct TestMember {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
}

impl TestMember {
    pub fn new() -> Self {
        Self {
            connection_id: ConnectionId::new(),
            user_id: UserId::new(),
        }
    }

    /// A second connection of the same user.
    pub fn another_tab(&self) -> Self {
        Self {
            connection_id: ConnectionId::new(),
            user_id: self.user_id,
        }
    }
}

impl TestRelay {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (signaling, _rx) = MockSignalingOutput::new();
        let relay = SignalingRelay::new(cmd_rx, Arc::new(signaling.clone()));
        Self {
            relay,
            signaling,
            _cmd_tx: cmd_tx,
        }
    }

    pub async fn send(&mut self, from: &TestMember, message: ClientMessage) {
        self.relay
            .handle_command(RelayCommand::Inbound {
                connection_id: from.connection_id,
                message,
            })
            .await;
    }

    pub async fn join(&mut self, member: &TestMember, room: &str) {
        self.send(
            member,
            ClientMessage::JoinRoom(JoinRoom {
                room_id: RoomId::from(room),
                user_id: member.user_id,
            }),
        )
        .await;
    }

    pub async fn disconnect(&mut self, member: &TestMember) {
        self.relay
            .handle_command(RelayCommand::Disconnect {
                connection_id: member.connection_id,
            })
            .await;
    }

    pub async fn received(&self, member: &TestMember) -> Vec<ServerMessage> {
        self.signaling.messages_for(&member.connection_id).await
    }
}
