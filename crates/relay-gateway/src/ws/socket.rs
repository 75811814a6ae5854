//! axum `WebSocket` as a hub [`Connection`].

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use relay_hub::{Connection, MessageSink, MessageSource, TransportError};

pub struct WsConnection {
    socket: WebSocket,
}

impl WsConnection {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl Connection for WsConnection {
    type Source = WsSource;
    type Sink = WsSink;

    fn split(self) -> (WsSource, WsSink) {
        let (tx, rx) = self.socket.split();
        (WsSource { rx }, WsSink { tx })
    }
}

pub struct WsSource {
    rx: SplitStream<WebSocket>,
}

#[async_trait]
impl MessageSource for WsSource {
    async fn recv(&mut self) -> Result<String, TransportError> {
        loop {
            match self.rx.next().await {
                Some(Ok(Message::Text(text))) => return Ok(text.as_str().to_owned()),
                Some(Ok(Message::Binary(data))) => {
                    return Ok(String::from_utf8_lossy(&data).into_owned())
                }
                // pongs are answered by the protocol layer
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::Closed),
                Some(Err(e)) => return Err(TransportError::Transport(e.to_string())),
            }
        }
    }
}

pub struct WsSink {
    tx: SplitSink<WebSocket, Message>,
}

impl WsSink {
    async fn send(&mut self, msg: Message) -> Result<(), TransportError> {
        self.tx
            .send(msg)
            .await
            .map_err(|e| TransportError::Transport(e.to_string()))
    }
}

#[async_trait]
impl MessageSink for WsSink {
    async fn send_text(&mut self, payload: String) -> Result<(), TransportError> {
        self.send(Message::Text(payload.into())).await
    }

    async fn send_ping(&mut self) -> Result<(), TransportError> {
        self.send(Message::Ping(Default::default())).await
    }

    async fn send_close(&mut self) -> Result<(), TransportError> {
        self.send(Message::Close(None)).await
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        SinkExt::close(&mut self.tx)
            .await
            .map_err(|e| TransportError::Transport(e.to_string()))
    }
}
