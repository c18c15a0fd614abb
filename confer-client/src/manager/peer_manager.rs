use super::peer_session::PeerSession;
use crate::{
    ClientConfig, ConferenceEvent, EarlyCandidatePolicy, LocalMedia, ManagerCommand,
    PeerConnectionState, PeerTable, PeerTransport, PeerView, Result, SdpKind, SessionDescription,
    SessionKey, SignalingOutput, TransportEvent, TransportFactory,
};
use confer_core::{
    ChatMessage, ClientMessage, HandToggle, IceServerConfig, IceSignal, JoinRoom, MediaKind,
    ModerationTarget, Reaction, RoomId, ServerMessage, SessionSignal, UserId,
};
use chrono::Local;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

/// Capacity of the queue transports report their callbacks on.
const TRANSPORT_EVENT_CAPACITY: usize = 256;

/// Client-side actor owning one session per remote participant.
///
/// Server messages, transport callbacks and local commands are handled one at
/// a time. Every handler re-checks that the session it started with still
/// exists (same epoch) after each await, since the session may have been
/// closed or re-created in between.
pub struct PeerManager {
    room_id: RoomId,
    user_id: UserId,
    display_name: String,
    early_candidates: EarlyCandidatePolicy,
    ice_servers: Vec<IceServerConfig>,

    is_host: bool,
    hand_raised: bool,
    finished: bool,

    local_media: LocalMedia,
    sessions: HashMap<UserId, PeerSession>,
    next_epoch: u64,

    factory: Arc<dyn TransportFactory>,
    signaling: Arc<dyn SignalingOutput>,

    peers_tx: watch::Sender<PeerTable>,
    events_tx: mpsc::UnboundedSender<ConferenceEvent>,

    transport_tx: mpsc::Sender<TransportEvent>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    server_rx: mpsc::Receiver<ServerMessage>,
    command_rx: mpsc::Receiver<ManagerCommand>,
}

impl PeerManager {
    /// Returns the manager along with the observable peer table and the
    /// stream of conference events.
    pub fn new(
        config: &ClientConfig,
        local_media: LocalMedia,
        factory: Arc<dyn TransportFactory>,
        signaling: Arc<dyn SignalingOutput>,
        server_rx: mpsc::Receiver<ServerMessage>,
        command_rx: mpsc::Receiver<ManagerCommand>,
    ) -> (
        Self,
        watch::Receiver<PeerTable>,
        mpsc::UnboundedReceiver<ConferenceEvent>,
    ) {
        let (peers_tx, peers_rx) = watch::channel(PeerTable::new());
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (transport_tx, transport_rx) = mpsc::channel(TRANSPORT_EVENT_CAPACITY);

        let manager = Self {
            room_id: config.room_id.clone(),
            user_id: config.user_id,
            display_name: config.display_name.clone(),
            early_candidates: config.early_candidates,
            ice_servers: config.ice_servers.clone(),
            is_host: false,
            hand_raised: false,
            finished: false,
            local_media,
            sessions: HashMap::new(),
            next_epoch: 0,
            factory,
            signaling,
            peers_tx,
            events_tx,
            transport_tx,
            transport_rx,
            server_rx,
            command_rx,
        };

        (manager, peers_rx, events_rx)
    }

    pub async fn run(mut self) {
        self.join().await;

        while !self.finished {
            tokio::select! {
                msg = self.server_rx.recv() => match msg {
                    Some(msg) => self.handle_server_message(msg).await,
                    None => {
                        warn!("Signaling connection lost");
                        self.finish(ConferenceEvent::Disconnected).await;
                    }
                },
                Some(event) = self.transport_rx.recv() => {
                    self.handle_transport_event(event).await;
                }
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => self.leave().await,
                },
            }
        }

        info!("Peer manager for room '{}' finished", self.room_id);
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    pub fn hand_raised(&self) -> bool {
        self.hand_raised
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_state(&self, remote: &UserId) -> Option<PeerConnectionState> {
        self.sessions.get(remote).map(|s| s.state)
    }

    pub fn peers(&self) -> PeerTable {
        self.peers_tx.borrow().clone()
    }

    pub async fn join(&mut self) {
        info!("Joining room '{}' as {}", self.room_id, self.user_id);
        self.signaling
            .send(ClientMessage::JoinRoom(JoinRoom {
                room_id: self.room_id.clone(),
                user_id: self.user_id,
            }))
            .await;
    }

    pub async fn handle_command(&mut self, cmd: ManagerCommand) {
        if self.finished {
            debug!("Ignoring {:?} after the conference finished", cmd);
            return;
        }
        match cmd {
            ManagerCommand::SetLocalMedia(media) => self.handle_local_media_change(media).await,
            ManagerCommand::ToggleHand(raised) => self.toggle_hand(raised).await,
            ManagerCommand::SendChat(text) => self.send_chat(text).await,
            ManagerCommand::SendReaction(emoji) => self.send_reaction(emoji).await,
            ManagerCommand::Kick(target) => self.kick(target).await,
            ManagerCommand::Mute(target) => self.mute(target).await,
            ManagerCommand::EndMeetingForAll => self.end_meeting_for_all().await,
            ManagerCommand::Leave => self.leave().await,
        }
    }

    pub async fn handle_server_message(&mut self, msg: ServerMessage) {
        if self.finished {
            debug!("Ignoring '{}' after the conference finished", msg.op());
            return;
        }

        match msg {
            ServerMessage::IceConfig(config) => {
                if config.ice_servers.is_empty() {
                    debug!("Server sent no ICE servers, keeping defaults");
                } else {
                    debug!("Using {} ICE server(s) from server", config.ice_servers.len());
                    self.ice_servers = config.ice_servers;
                }
            }
            ServerMessage::YouAreHost(is_host) => {
                info!("Joined room '{}' (host: {})", self.room_id, is_host);
                self.is_host = is_host;
                self.emit(ConferenceEvent::HostStatus(is_host));
            }
            ServerMessage::PeerJoined(notice) => {
                if notice.user_id == self.user_id {
                    debug!("Ignoring peer-joined about ourselves");
                    return;
                }
                self.initiate(notice.user_id).await;
            }
            ServerMessage::PeerLeft(notice) => self.teardown(notice.user_id).await,
            ServerMessage::Offer(signal) => {
                if self.addressed_to_us(&signal) {
                    self.handle_offer(signal.caller, signal.sdp, signal.username)
                        .await;
                }
            }
            ServerMessage::Answer(signal) => {
                if self.addressed_to_us(&signal) {
                    self.handle_answer(signal.caller, signal.sdp, signal.username)
                        .await;
                }
            }
            ServerMessage::IceCandidate(signal) => {
                self.handle_ice_candidate(signal.caller, signal.candidate)
                    .await;
            }
            ServerMessage::RoomEnded => {
                info!("The host ended the meeting");
                self.finish(ConferenceEvent::RoomEnded).await;
            }
            ServerMessage::HandToggled(toggle) => self.handle_hand_toggled(toggle),
            ServerMessage::ReceiveMessage(chat) => self.emit(ConferenceEvent::Chat(chat)),
            ServerMessage::ReceiveReaction(reaction) => {
                self.emit(ConferenceEvent::Reaction(reaction))
            }
            ServerMessage::Kicked => {
                info!("Removed from room '{}' by the host", self.room_id);
                self.finish(ConferenceEvent::Kicked).await;
            }
            ServerMessage::MutedByHost => {
                info!("Muted by the host");
                self.emit(ConferenceEvent::MutedByHost);
            }
        }
    }

    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        let key = event.key();
        if self.current_session(key).is_none() {
            debug!("Dropping transport event of a closed session with {}", key.remote);
            return;
        }

        match event {
            TransportEvent::CandidateGenerated(_, candidate) => {
                self.signaling
                    .send(ClientMessage::IceCandidate(IceSignal {
                        target: key.remote,
                        caller: self.user_id,
                        candidate,
                    }))
                    .await;
            }
            TransportEvent::TrackReceived(_, track) => {
                debug!("Received {} track '{}' from {}", track.kind, track.id, key.remote);
                self.update_peer(key.remote, |view| view.add_track(track));
            }
            TransportEvent::StateChanged(_, state) => {
                if let Some(session) = self.current_session_mut(key) {
                    session.state = state;
                }
                self.update_peer(key.remote, |view| view.connection_state = state);
            }
        }
    }

    /// Opens a session towards `remote` and sends it an offer. Skipped when a
    /// session is already connecting or connected.
    pub async fn initiate(&mut self, remote: UserId) {
        if let Some(session) = self.sessions.get(&remote) {
            if session.state.is_established() {
                debug!(
                    "Session with {} is already {}, not initiating",
                    remote, session.state
                );
                return;
            }
        }

        let key = match self.create_session(remote).await {
            Ok(key) => key,
            Err(e) => {
                error!("Failed to create session with {}: {}", remote, e);
                return;
            }
        };
        self.send_offer(key).await;
    }

    pub async fn handle_offer(&mut self, from: UserId, offer: Value, their_name: Option<String>) {
        let offer = match SessionDescription::from_value(offer) {
            Ok(desc) if desc.kind == SdpKind::Offer => desc,
            Ok(_) => {
                warn!("Ignoring offer from {}: description is not an offer", from);
                return;
            }
            Err(e) => {
                warn!("Ignoring malformed offer from {}: {}", from, e);
                return;
            }
        };

        let live_epoch = self
            .sessions
            .get(&from)
            .filter(|s| s.state.is_live())
            .map(|s| s.epoch);

        let key = match live_epoch {
            Some(epoch) => {
                debug!("Renegotiation offer from {}", from);
                SessionKey {
                    remote: from,
                    epoch,
                }
            }
            None => match self.create_session(from).await {
                Ok(key) => key,
                Err(e) => {
                    error!("Failed to create session with {}: {}", from, e);
                    return;
                }
            },
        };

        if let Some(name) = their_name {
            self.update_peer(from, |view| view.display_name = Some(name));
        }

        let Some(transport) = self.transport_of(key) else {
            return;
        };
        if let Err(e) = transport.set_remote_description(offer).await {
            error!("Failed to apply offer from {}: {}", from, e);
            return;
        }
        if !self.remote_description_applied(key).await {
            return;
        }

        let answer = match transport.create_answer().await {
            Ok(answer) => answer,
            Err(e) => {
                error!("Failed to create answer for {}: {}", from, e);
                return;
            }
        };
        if self.current_session(key).is_none() {
            debug!("Session with {} closed while answering", from);
            return;
        }

        let signal = self.session_signal(from, &answer);
        self.signaling.send(ClientMessage::Answer(signal)).await;
    }

    /// Applies an answer. Only accepted while our offer to that peer is
    /// outstanding.
    pub async fn handle_answer(&mut self, from: UserId, answer: Value, their_name: Option<String>) {
        let answer = match SessionDescription::from_value(answer) {
            Ok(desc) if desc.kind == SdpKind::Answer => desc,
            Ok(_) => {
                warn!("Ignoring answer from {}: description is not an answer", from);
                return;
            }
            Err(e) => {
                warn!("Ignoring malformed answer from {}: {}", from, e);
                return;
            }
        };

        let Some(session) = self.sessions.get(&from) else {
            debug!("Ignoring answer from {}: no session", from);
            return;
        };
        if !session.awaiting_answer {
            warn!("Ignoring answer from {}: no offer outstanding", from);
            return;
        }
        let key = SessionKey {
            remote: from,
            epoch: session.epoch,
        };
        let transport = Arc::clone(&session.transport);

        if let Some(name) = their_name {
            self.update_peer(from, |view| view.display_name = Some(name));
        }

        if let Err(e) = transport.set_remote_description(answer).await {
            error!("Failed to apply answer from {}: {}", from, e);
            return;
        }
        self.remote_description_applied(key).await;
    }

    pub async fn handle_ice_candidate(&mut self, from: UserId, candidate: Value) {
        let policy = self.early_candidates;
        let Some(session) = self.sessions.get_mut(&from) else {
            debug!("Ignoring ICE candidate from {}: no session", from);
            return;
        };

        if !session.has_remote_description {
            match policy {
                EarlyCandidatePolicy::Drop => {
                    warn!("Dropping ICE candidate from {}: no remote description yet", from);
                }
                EarlyCandidatePolicy::Buffer => {
                    debug!("Buffering ICE candidate from {}", from);
                    session.pending_candidates.push(candidate);
                }
            }
            return;
        }

        let transport = Arc::clone(&session.transport);
        if let Err(e) = transport.add_ice_candidate(candidate).await {
            error!("Failed to add ICE candidate from {}: {}", from, e);
        }
    }

    /// Pushes the new local tracks to every live session. A kind that already
    /// has a sender gets its track swapped in place. A kind without one gets a
    /// new sender, and that session alone is renegotiated once. Dead sessions
    /// pick up the new media when they are re-created.
    pub async fn handle_local_media_change(&mut self, media: LocalMedia) {
        self.local_media = media;

        let keys: Vec<SessionKey> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.state.is_live())
            .map(|(remote, session)| SessionKey {
                remote: *remote,
                epoch: session.epoch,
            })
            .collect();

        for key in keys {
            let Some(transport) = self.transport_of(key) else {
                continue;
            };

            let mut needs_renegotiation = false;
            for kind in MediaKind::ALL {
                let Some(track) = self.local_media.track(kind).cloned() else {
                    continue;
                };

                match transport.sender_track(kind).await {
                    Some(current) if current == track.id() => {}
                    Some(_) => match transport.replace_track(&track).await {
                        Ok(()) => debug!("Replaced {} track towards {}", kind, key.remote),
                        Err(e) => error!("Failed to replace {} track towards {}: {}", kind, key.remote, e),
                    },
                    None => match transport.add_track(&track).await {
                        Ok(()) => needs_renegotiation = true,
                        Err(e) => error!("Failed to add {} track towards {}: {}", kind, key.remote, e),
                    },
                }
            }

            if needs_renegotiation {
                info!("Renegotiating with {}", key.remote);
                self.send_offer(key).await;
            }
        }
    }

    /// Closes and forgets the session with `remote`. Idempotent.
    pub async fn teardown(&mut self, remote: UserId) {
        if let Some(session) = self.sessions.remove(&remote) {
            info!("Closing session with {}", remote);
            close_transport(remote, &session.transport).await;
        }
        self.peers_tx
            .send_if_modified(|table| table.remove(&remote).is_some());
    }

    /// Our own hand is updated right away; peers learn it from the broadcast.
    pub async fn toggle_hand(&mut self, raised: bool) {
        self.hand_raised = raised;
        self.emit(ConferenceEvent::HandRaised(raised));
        self.signaling
            .send(ClientMessage::ToggleHand(HandToggle {
                room_id: self.room_id.clone(),
                user_id: self.user_id,
                raised,
                extra: Default::default(),
            }))
            .await;
    }

    pub async fn send_chat(&mut self, text: String) {
        let chat = ChatMessage {
            room_id: self.room_id.clone(),
            user_id: self.user_id,
            username: self.display_name.clone(),
            text,
            time: clock_time(),
            extra: Default::default(),
        };
        self.emit(ConferenceEvent::Chat(chat.clone()));
        self.signaling.send(ClientMessage::SendMessage(chat)).await;
    }

    pub async fn send_reaction(&mut self, emoji: String) {
        let reaction = Reaction {
            room_id: self.room_id.clone(),
            user_id: self.user_id,
            emoji,
            extra: Default::default(),
        };
        self.emit(ConferenceEvent::Reaction(reaction.clone()));
        self.signaling
            .send(ClientMessage::SendReaction(reaction))
            .await;
    }

    pub async fn kick(&mut self, target: UserId) {
        if !self.require_host("kick") {
            return;
        }
        let target = self.moderation_target(target);
        self.signaling.send(ClientMessage::KickUser(target)).await;
    }

    pub async fn mute(&mut self, target: UserId) {
        if !self.require_host("mute") {
            return;
        }
        let target = self.moderation_target(target);
        self.signaling.send(ClientMessage::MuteUser(target)).await;
    }

    /// Sessions are closed when the server's `room-ended` comes back, like
    /// for every other member.
    pub async fn end_meeting_for_all(&mut self) {
        if !self.require_host("end the meeting") {
            return;
        }
        self.signaling.send(ClientMessage::EndRoom).await;
    }

    pub async fn leave(&mut self) {
        if self.finished {
            return;
        }
        info!("Leaving room '{}'", self.room_id);
        self.finish(ConferenceEvent::Left).await;
    }

    async fn create_session(&mut self, remote: UserId) -> Result<SessionKey> {
        if let Some(previous) = self.sessions.remove(&remote) {
            debug!("Closing previous session with {} before re-creating it", remote);
            close_transport(remote, &previous.transport).await;
        }

        self.next_epoch += 1;
        let key = SessionKey {
            remote,
            epoch: self.next_epoch,
        };

        let transport = match self
            .factory
            .create(key, &self.ice_servers, self.transport_tx.clone())
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                self.update_peer(remote, |view| {
                    view.connection_state = PeerConnectionState::Closed
                });
                return Err(e);
            }
        };

        for track in self.local_media.tracks() {
            if let Err(e) = transport.add_track(track).await {
                error!("Failed to attach {} track for {}: {}", track.kind(), remote, e);
            }
        }

        self.sessions
            .insert(remote, PeerSession::new(key.epoch, transport));

        // Name and hand survive a re-creation.
        self.update_peer(remote, |view| {
            view.stream = None;
            view.connection_state = PeerConnectionState::New;
        });

        debug!("Created session with {} (epoch {})", remote, key.epoch);
        Ok(key)
    }

    async fn send_offer(&mut self, key: SessionKey) {
        let Some(transport) = self.transport_of(key) else {
            return;
        };

        let offer = match transport.create_offer().await {
            Ok(offer) => offer,
            Err(e) => {
                error!("Failed to create offer for {}: {}", key.remote, e);
                return;
            }
        };

        let Some(session) = self.current_session_mut(key) else {
            debug!("Session with {} closed while creating an offer", key.remote);
            return;
        };
        session.awaiting_answer = true;

        let signal = self.session_signal(key.remote, &offer);
        self.signaling.send(ClientMessage::Offer(signal)).await;
    }

    /// Marks the remote description as set and applies buffered candidates.
    /// Returns false when the session went away meanwhile.
    async fn remote_description_applied(&mut self, key: SessionKey) -> bool {
        let Some(session) = self.current_session_mut(key) else {
            debug!(
                "Session with {} closed while applying the remote description",
                key.remote
            );
            return false;
        };
        session.has_remote_description = true;
        session.awaiting_answer = false;

        let pending = std::mem::take(&mut session.pending_candidates);
        if pending.is_empty() {
            return true;
        }

        let transport = Arc::clone(&session.transport);
        debug!(
            "Applying {} buffered ICE candidate(s) from {}",
            pending.len(),
            key.remote
        );
        for candidate in pending {
            if let Err(e) = transport.add_ice_candidate(candidate).await {
                error!("Failed to add ICE candidate from {}: {}", key.remote, e);
            }
        }
        true
    }

    fn handle_hand_toggled(&mut self, toggle: HandToggle) {
        let changed = self
            .peers_tx
            .send_if_modified(|table| match table.get_mut(&toggle.user_id) {
                Some(view) => {
                    view.hand_raised = toggle.raised;
                    true
                }
                None => false,
            });
        if !changed {
            debug!("Ignoring hand toggle of unknown peer {}", toggle.user_id);
        }
    }

    async fn close_all(&mut self) {
        let sessions: Vec<(UserId, PeerSession)> = self.sessions.drain().collect();
        for (remote, session) in sessions {
            close_transport(remote, &session.transport).await;
            self.peers_tx
                .send_if_modified(|table| table.remove(&remote).is_some());
        }
        self.peers_tx.send_if_modified(|table| {
            let had_peers = !table.is_empty();
            table.clear();
            had_peers
        });
    }

    async fn finish(&mut self, event: ConferenceEvent) {
        self.close_all().await;
        self.finished = true;
        self.emit(event);
    }

    fn current_session(&self, key: SessionKey) -> Option<&PeerSession> {
        self.sessions
            .get(&key.remote)
            .filter(|s| s.epoch == key.epoch)
    }

    fn current_session_mut(&mut self, key: SessionKey) -> Option<&mut PeerSession> {
        self.sessions
            .get_mut(&key.remote)
            .filter(|s| s.epoch == key.epoch)
    }

    fn transport_of(&self, key: SessionKey) -> Option<Arc<dyn PeerTransport>> {
        self.current_session(key).map(|s| Arc::clone(&s.transport))
    }

    fn update_peer(&self, remote: UserId, f: impl FnOnce(&mut PeerView)) {
        self.peers_tx
            .send_modify(|table| f(table.entry(remote).or_default()));
    }

    fn session_signal(&self, target: UserId, desc: &SessionDescription) -> SessionSignal {
        SessionSignal {
            target,
            caller: self.user_id,
            username: Some(self.display_name.clone()),
            sdp: desc.to_value(),
        }
    }

    fn moderation_target(&self, target: UserId) -> ModerationTarget {
        ModerationTarget {
            target_user_id: target,
            room_id: self.room_id.clone(),
        }
    }

    fn addressed_to_us(&self, signal: &SessionSignal) -> bool {
        if signal.target == self.user_id {
            return true;
        }
        warn!(
            "Ignoring signal from {} addressed to {}",
            signal.caller, signal.target
        );
        false
    }

    fn require_host(&self, action: &str) -> bool {
        if self.is_host {
            return true;
        }
        warn!("Only the host can {}", action);
        false
    }

    fn emit(&self, event: ConferenceEvent) {
        let _ = self.events_tx.send(event);
    }
}

async fn close_transport(remote: UserId, transport: &Arc<dyn PeerTransport>) {
    if let Err(e) = transport.close().await {
        warn!("Failed to close session with {}: {}", remote, e);
    }
}

/// `HH:MM` in local time, as shown next to chat lines.
fn clock_time() -> String {
    Local::now().format("%H:%M").to_string()
}
