use crate::{
    ClientConfig, ClientError, ConferenceEvent, LocalMedia, ManagerCommand, PeerManager,
    PeerTable, Result, RtcTransportFactory, SignalingClient, SignalingOutput, TransportFactory,
};
use confer_core::{ServerMessage, UserId};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::warn;

const COMMAND_CAPACITY: usize = 64;

/// Entry point for joining a room.
///
/// ```no_run
/// # async fn demo() -> confer_client::Result<()> {
/// use confer_client::{ClientConfig, Conference};
///
/// let config = ClientConfig::new("ws://localhost:5000/ws", "standup", "alice");
/// let (handle, mut events) = Conference::new(config).join().await?;
/// while let Some(event) = events.recv().await {
///     if event.is_terminal() {
///         break;
///     }
/// }
/// handle.leave().await;
/// # Ok(())
/// # }
/// ```
pub struct Conference {
    config: ClientConfig,
    local_media: LocalMedia,
    factory: Arc<dyn TransportFactory>,
}

impl Conference {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            local_media: LocalMedia::default(),
            factory: Arc::new(RtcTransportFactory),
        }
    }

    pub fn with_local_media(mut self, local_media: LocalMedia) -> Self {
        self.local_media = local_media;
        self
    }

    pub fn with_transport_factory(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Connects to the signaling server and joins the configured room.
    pub async fn join(self) -> Result<(ConferenceHandle, mpsc::UnboundedReceiver<ConferenceEvent>)> {
        let (client, server_rx) = SignalingClient::connect(&self.config.server_url).await?;
        Ok(self.join_over(Arc::new(client), server_rx))
    }

    /// Joins over an already established signaling channel.
    pub fn join_over(
        self,
        signaling: Arc<dyn SignalingOutput>,
        server_rx: mpsc::Receiver<ServerMessage>,
    ) -> (ConferenceHandle, mpsc::UnboundedReceiver<ConferenceEvent>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let user_id = self.config.user_id;

        let (manager, peers, events) = PeerManager::new(
            &self.config,
            self.local_media,
            self.factory,
            signaling,
            server_rx,
            command_rx,
        );
        let task = tokio::spawn(manager.run());

        let handle = ConferenceHandle {
            user_id,
            commands: command_tx,
            peers,
            task,
        };
        (handle, events)
    }
}

/// Control surface of a running conference.
pub struct ConferenceHandle {
    user_id: UserId,
    commands: mpsc::Sender<ManagerCommand>,
    peers: watch::Receiver<PeerTable>,
    task: JoinHandle<()>,
}

impl ConferenceHandle {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Live peer table. Changes on every single peer transition.
    pub fn peers(&self) -> watch::Receiver<PeerTable> {
        self.peers.clone()
    }

    pub async fn set_local_media(&self, media: LocalMedia) -> Result<()> {
        self.command(ManagerCommand::SetLocalMedia(media)).await
    }

    pub async fn toggle_hand(&self, raised: bool) -> Result<()> {
        self.command(ManagerCommand::ToggleHand(raised)).await
    }

    pub async fn send_chat(&self, text: impl Into<String>) -> Result<()> {
        self.command(ManagerCommand::SendChat(text.into())).await
    }

    pub async fn send_reaction(&self, emoji: impl Into<String>) -> Result<()> {
        self.command(ManagerCommand::SendReaction(emoji.into())).await
    }

    pub async fn kick(&self, target: UserId) -> Result<()> {
        self.command(ManagerCommand::Kick(target)).await
    }

    pub async fn mute(&self, target: UserId) -> Result<()> {
        self.command(ManagerCommand::Mute(target)).await
    }

    pub async fn end_meeting_for_all(&self) -> Result<()> {
        self.command(ManagerCommand::EndMeetingForAll).await
    }

    /// Closes every session and waits for the manager to stop. Also fine to
    /// call after the conference already ended.
    pub async fn leave(self) {
        let _ = self.commands.send(ManagerCommand::Leave).await;
        if let Err(e) = self.task.await {
            warn!("Peer manager task failed: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    async fn command(&self, cmd: ManagerCommand) -> Result<()> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| ClientError::ChannelClosed("conference command"))
    }
}
