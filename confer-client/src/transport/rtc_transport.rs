use crate::{
    ClientError, LocalTrack, PeerConnectionState, PeerTransport, RemoteTrack, Result, SdpKind,
    SessionDescription, SessionKey, TransportEvent, TransportFactory,
};
use async_trait::async_trait;
use confer_core::{IceServerConfig, MediaKind};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_remote::TrackRemote;

/// [`PeerTransport`] over a webrtc-rs `RTCPeerConnection`.
pub struct RtcTransport {
    key: SessionKey,
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcTransport {
    /// Builds the peer connection and wires its callbacks into `event_tx`.
    pub async fn new(
        key: SessionKey,
        ice_servers: &[IceServerConfig],
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers.iter().map(to_rtc_ice_server).collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Connection state with {}: {}", key.remote, s);
                    let _ = tx
                        .send(TransportEvent::StateChanged(key, map_state(s)))
                        .await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let Ok(value) = serde_json::to_value(init) else {
                    return;
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(key, value))
                    .await;
            })
        }));

        let track_tx = event_tx;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();

                Box::pin(async move {
                    let kind = match track.kind() {
                        RTPCodecType::Audio => MediaKind::Audio,
                        RTPCodecType::Video => MediaKind::Video,
                        _ => return,
                    };
                    debug!("Track '{}' ({}) from {}", track.id(), kind, key.remote);

                    let remote_track = RemoteTrack {
                        id: track.id(),
                        kind,
                        stream_id: track.stream_id(),
                        remote: Some(track),
                    };
                    let _ = tx
                        .send(TransportEvent::TrackReceived(key, remote_track))
                        .await;
                })
            },
        ));

        Ok(Self {
            key,
            peer_connection,
        })
    }

    async fn sender_for(&self, kind: MediaKind) -> Option<Arc<RTCRtpSender>> {
        for sender in self.peer_connection.get_senders().await {
            if let Some(track) = sender.track().await {
                if track.kind() == codec_type(kind) {
                    return Some(sender);
                }
            }
        }
        None
    }
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()> {
        let desc = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
        };
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: Value) -> Result<()> {
        let candidate: RTCIceCandidateInit = serde_json::from_value(candidate)?;
        self.peer_connection.add_ice_candidate(candidate).await?;
        Ok(())
    }

    async fn sender_track(&self, kind: MediaKind) -> Option<String> {
        let sender = self.sender_for(kind).await?;
        sender.track().await.map(|t| t.id().to_owned())
    }

    async fn replace_track(&self, track: &LocalTrack) -> Result<()> {
        let sender = self.sender_for(track.kind()).await.ok_or_else(|| {
            ClientError::Transport(format!("no {} sender towards {}", track.kind(), self.key.remote))
        })?;
        sender.replace_track(Some(track.track())).await?;
        Ok(())
    }

    async fn add_track(&self, track: &LocalTrack) -> Result<()> {
        let rtp_sender = self.peer_connection.add_track(track.track()).await?;

        // Incoming RTCP has to be drained for the interceptors to work.
        tokio::spawn(async move {
            let mut rtcp_buf = vec![0u8; 1500];
            while let Ok((_, _)) = rtp_sender.read(&mut rtcp_buf).await {}
        });
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Creates an [`RtcTransport`] per session.
#[derive(Debug, Clone, Copy, Default)]
pub struct RtcTransportFactory;

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        key: SessionKey,
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        let transport = RtcTransport::new(key, ice_servers, events).await?;
        Ok(Arc::new(transport))
    }
}

fn to_rtc_ice_server(server: &IceServerConfig) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn codec_type(kind: MediaKind) -> RTPCodecType {
    match kind {
        MediaKind::Audio => RTPCodecType::Audio,
        MediaKind::Video => RTPCodecType::Video,
    }
}

fn map_state(state: RTCPeerConnectionState) -> PeerConnectionState {
    match state {
        RTCPeerConnectionState::Unspecified | RTCPeerConnectionState::New => {
            PeerConnectionState::New
        }
        RTCPeerConnectionState::Connecting => PeerConnectionState::Connecting,
        RTCPeerConnectionState::Connected => PeerConnectionState::Connected,
        RTCPeerConnectionState::Disconnected => PeerConnectionState::Disconnected,
        RTCPeerConnectionState::Failed => PeerConnectionState::Failed,
        RTCPeerConnectionState::Closed => PeerConnectionState::Closed,
    }
}
