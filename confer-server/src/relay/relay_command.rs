use confer_core::{ClientMessage, ConnectionId};

/// Input of the relay actor, produced by the WebSocket layer.
#[derive(Debug)]
pub enum RelayCommand {
    /// A decoded message from one connection.
    Inbound {
        connection_id: ConnectionId,
        message: ClientMessage,
    },

    /// The connection's socket is gone. Acts as an implicit leave.
    Disconnect { connection_id: ConnectionId },
}
