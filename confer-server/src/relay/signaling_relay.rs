use crate::relay::RelayCommand;
use crate::room::RoomRegistry;
use crate::signaling::SignalingOutput;
use confer_core::{
    ClientMessage, ConnectionId, JoinRoom, MemberIdentity, ModerationTarget, PeerNotice, RoomId,
    ServerMessage, UserId,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The relay actor. Owns room membership and the per-user unicast channels,
/// and forwards signaling payloads without looking inside them.
///
/// Every command runs to completion before the next one is taken, so the
/// registry needs no locking.
pub struct SignalingRelay {
    registry: RoomRegistry,

    /// User channel -> connections subscribed to it.
    user_channels: HashMap<UserId, HashSet<ConnectionId>>,

    /// Connection -> the user channel it subscribed to on join.
    subscriptions: HashMap<ConnectionId, UserId>,

    command_rx: mpsc::Receiver<RelayCommand>,

    signaling: Arc<dyn SignalingOutput>,
}

impl SignalingRelay {
    pub fn new(command_rx: mpsc::Receiver<RelayCommand>, signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            registry: RoomRegistry::new(),
            user_channels: HashMap::new(),
            subscriptions: HashMap::new(),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!("Relay event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Relay event loop finished");
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub async fn handle_command(&mut self, cmd: RelayCommand) {
        match cmd {
            RelayCommand::Inbound {
                connection_id,
                message,
            } => {
                debug!("'{}' from {}", message.op(), connection_id);
                self.handle_message(connection_id, message).await;
            }
            RelayCommand::Disconnect { connection_id } => {
                self.handle_disconnect(connection_id).await;
            }
        }
    }

    async fn handle_message(&mut self, from: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::JoinRoom(join) => self.join(from, join).await,

            ClientMessage::Offer(signal) => {
                let target = signal.target;
                self.send_to_user(&target, ServerMessage::Offer(signal)).await;
            }
            ClientMessage::Answer(signal) => {
                let target = signal.target;
                self.send_to_user(&target, ServerMessage::Answer(signal)).await;
            }
            ClientMessage::IceCandidate(signal) => {
                let target = signal.target;
                self.send_to_user(&target, ServerMessage::IceCandidate(signal))
                    .await;
            }

            ClientMessage::EndRoom => self.end_room(from).await,

            ClientMessage::ToggleHand(toggle) => {
                let room_id = toggle.room_id.clone();
                self.broadcast(&room_id, Some(from), ServerMessage::HandToggled(toggle))
                    .await;
            }
            ClientMessage::SendMessage(chat) => {
                let room_id = chat.room_id.clone();
                self.broadcast(&room_id, Some(from), ServerMessage::ReceiveMessage(chat))
                    .await;
            }
            ClientMessage::SendReaction(reaction) => {
                let room_id = reaction.room_id.clone();
                self.broadcast(&room_id, Some(from), ServerMessage::ReceiveReaction(reaction))
                    .await;
            }

            ClientMessage::KickUser(target) => self.kick(from, target).await,
            ClientMessage::MuteUser(target) => {
                if !self.authorize_host(&from, &target.room_id, "mute-user") {
                    return;
                }
                info!(
                    "Host muted {} in room '{}'",
                    target.target_user_id, target.room_id
                );
                self.send_to_user(&target.target_user_id, ServerMessage::MutedByHost)
                    .await;
            }
        }
    }

    async fn join(&mut self, from: ConnectionId, join: JoinRoom) {
        let JoinRoom { room_id, user_id } = join;
        let identity = MemberIdentity::new(from, user_id);

        let outcome = self.registry.join(room_id.clone(), identity);
        info!(
            "User {} joined room '{}' (host: {})",
            user_id, room_id, outcome.is_host
        );

        if let Some(left) = outcome.left {
            self.send_all(
                &left.remaining,
                ServerMessage::PeerLeft(PeerNotice {
                    user_id: left.member.user_id,
                }),
            )
            .await;
        }

        self.subscribe(from, user_id);

        self.signaling
            .send(from, ServerMessage::YouAreHost(outcome.is_host))
            .await;

        self.send_all(&outcome.others, ServerMessage::PeerJoined(PeerNotice { user_id }))
            .await;
    }

    async fn end_room(&mut self, from: ConnectionId) {
        let Some(room_id) = self.registry.room_of(&from).cloned() else {
            debug!("end-room from {} which is in no room", from);
            return;
        };
        if !self.authorize_host(&from, &room_id, "end-room") {
            return;
        }

        info!("Room '{}' ended by host", room_id);
        let members = self.registry.connections(&room_id);
        self.send_all(&members, ServerMessage::RoomEnded).await;
        self.registry.end(&room_id);
    }

    async fn kick(&mut self, from: ConnectionId, target: ModerationTarget) {
        let ModerationTarget {
            target_user_id,
            room_id,
        } = target;
        if !self.authorize_host(&from, &room_id, "kick-user") {
            return;
        }

        info!("Host kicked {} from room '{}'", target_user_id, room_id);
        self.send_to_user(&target_user_id, ServerMessage::Kicked).await;

        let evicted = self.registry.evict_user(&room_id, &target_user_id);
        if evicted.is_empty() {
            return;
        }
        self.broadcast(
            &room_id,
            None,
            ServerMessage::PeerLeft(PeerNotice {
                user_id: target_user_id,
            }),
        )
        .await;
    }

    async fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        if let Some(departure) = self.registry.leave(&connection_id) {
            info!(
                "User {} left room '{}'",
                departure.member.user_id, departure.room_id
            );
            self.send_all(
                &departure.remaining,
                ServerMessage::PeerLeft(PeerNotice {
                    user_id: departure.member.user_id,
                }),
            )
            .await;
        }
        self.unsubscribe(&connection_id);
    }

    fn authorize_host(&self, from: &ConnectionId, room_id: &RoomId, op: &str) -> bool {
        if self.registry.is_host_of(room_id, from) {
            return true;
        }
        warn!(
            "Ignoring '{}' from {}: not the host of room '{}'",
            op, from, room_id
        );
        false
    }

    fn subscribe(&mut self, connection_id: ConnectionId, user_id: UserId) {
        if let Some(previous) = self.subscriptions.insert(connection_id, user_id) {
            if previous != user_id {
                self.remove_from_channel(&previous, &connection_id);
            }
        }
        self.user_channels
            .entry(user_id)
            .or_default()
            .insert(connection_id);
    }

    fn unsubscribe(&mut self, connection_id: &ConnectionId) {
        if let Some(user_id) = self.subscriptions.remove(connection_id) {
            self.remove_from_channel(&user_id, connection_id);
        }
    }

    fn remove_from_channel(&mut self, user_id: &UserId, connection_id: &ConnectionId) {
        if let Some(channel) = self.user_channels.get_mut(user_id) {
            channel.remove(connection_id);
            if channel.is_empty() {
                self.user_channels.remove(user_id);
            }
        }
    }

    /// Unicast to every connection subscribed to the user's channel.
    /// A user nobody is subscribed to is silently skipped.
    async fn send_to_user(&self, user_id: &UserId, msg: ServerMessage) {
        let Some(channel) = self.user_channels.get(user_id) else {
            debug!("No connection for user {}, dropping '{}'", user_id, msg.op());
            return;
        };
        let targets: Vec<ConnectionId> = channel.iter().copied().collect();
        self.send_all(&targets, msg).await;
    }

    async fn broadcast(&self, room_id: &RoomId, except: Option<ConnectionId>, msg: ServerMessage) {
        let targets: Vec<ConnectionId> = self
            .registry
            .connections(room_id)
            .into_iter()
            .filter(|c| Some(*c) != except)
            .collect();
        if targets.is_empty() {
            debug!("Nobody to receive '{}' in room '{}'", msg.op(), room_id);
            return;
        }
        self.send_all(&targets, msg).await;
    }

    async fn send_all(&self, targets: &[ConnectionId], msg: ServerMessage) {
        for connection_id in targets {
            self.signaling.send(*connection_id, msg.clone()).await;
        }
    }
}
