use confer_core::IceServerConfig;
use confer_core::utils::{DEFAULT_SIGNALING_PORT, DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2};
use std::net::{Ipv4Addr, SocketAddr};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,

    /// Pushed to every client as `ice-config` right after it connects.
    pub ice_servers: Vec<IceServerConfig>,

    /// Bound of the relay command queue.
    pub relay_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_SIGNALING_PORT)),
            ice_servers: vec![
                IceServerConfig::stun(DEFAULT_STUN_ADDR),
                IceServerConfig::stun(DEFAULT_STUN_ADDR_2),
            ],
            relay_capacity: 256,
        }
    }
}

impl ServerConfig {
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    pub fn with_turn(
        mut self,
        url: impl Into<String>,
        username: Option<String>,
        credential: Option<String>,
    ) -> Self {
        self.ice_servers.push(IceServerConfig {
            urls: vec![url.into()],
            username,
            credential,
        });
        self
    }
}
