//! Frame codec for the transport layer.
//!
//! - Text/Binary frames => raw bytes for the envelope decoder
//! - Ping/Pong/Close are surfaced for liveness and lifecycle management
//! - Outbound control frames are built here so the session never formats them inline

use bytes::Bytes;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug)]
pub enum Inbound {
    Data(Bytes),
    Ping,
    Pong,
    Close(Option<u16>),
    /// Raw frame; only produced on the write path.
    Raw,
}

pub fn decode(msg: Message) -> Inbound {
    match msg {
        Message::Text(s) => Inbound::Data(Bytes::from(s)),
        Message::Binary(b) => Inbound::Data(b),
        Message::Ping(_) => Inbound::Ping,
        Message::Pong(_) => Inbound::Pong,
        Message::Close(frame) => Inbound::Close(frame.map(|f| u16::from(f.code))),
        Message::Frame(_) => Inbound::Raw,
    }
}

/// Outbound control frames.
#[derive(Debug, Clone)]
pub enum ControlFrame {
    /// Liveness frame with an opaque payload.
    Ping(Bytes),
    /// Normal closure (1000).
    Close,
}

impl ControlFrame {
    pub fn kind(&self) -> &'static str {
        match self {
            ControlFrame::Ping(_) => "ping",
            ControlFrame::Close => "close",
        }
    }

    pub fn into_message(self) -> Message {
        match self {
            ControlFrame::Ping(payload) => Message::Ping(payload),
            ControlFrame::Close => Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "".into(),
            })),
        }
    }
}
