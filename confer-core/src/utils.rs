pub const DEFAULT_STUN_ADDR: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_STUN_ADDR_2: &str = "stun:stun1.l.google.com:19302";

/// Default port of the signaling server.
pub const DEFAULT_SIGNALING_PORT: u16 = 5000;
