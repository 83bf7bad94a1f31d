//! Local websocket server harness shared by the stream tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, WebSocketStream};
use tokio_util::sync::CancellationToken;

use pushwire_client::config::TimingSection;
use pushwire_client::transport::Session;
use pushwire_client::{Client, Endpoint, EventStreams};

pub type ServerWs = WebSocketStream<TcpStream>;

/// Accept one websocket connection and hand it to `script`.
pub async fn serve_once<F, Fut>(script: F) -> (String, JoinHandle<()>)
where
    F: FnOnce(ServerWs) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let ws = accept_async(tcp).await.unwrap();
        script(ws).await;
    });
    (format!("ws://{addr}/ws/connector"), handle)
}

/// Keep reading (which also answers pings and the close handshake) until the client goes away.
pub async fn drain(ws: &mut ServerWs) {
    while let Some(Ok(_)) = ws.next().await {}
}

pub fn timing(pong_wait_ms: u64, ping_period_ms: u64) -> TimingSection {
    TimingSection {
        pong_wait_ms,
        ping_period_ms: Some(ping_period_ms),
        write_wait_ms: 200,
        close_grace_ms: 300,
        connect_timeout_ms: 2000,
    }
}

/// Liveness settings long enough to never interfere with a test.
pub fn relaxed() -> TimingSection {
    timing(30_000, 27_000)
}

pub fn client(timing: &TimingSection) -> (Client, EventStreams) {
    let endpoint = Endpoint::new("wss://push.example.test/ws/connector", "client", "access").unwrap();
    Client::with_endpoint(endpoint, timing.clone())
}

pub async fn connect(client: &Client, url: &str, timing: &TimingSection) -> CancellationToken {
    let session = Session::open_url(url, timing).await.unwrap();
    let cancel = CancellationToken::new();
    client.connect_with(session, cancel.clone()).await.unwrap();
    cancel
}

pub async fn recv<T>(rx: &mut mpsc::Receiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(3), rx.recv())
        .await
        .expect("timed out waiting for queue")
        .expect("queue closed")
}

pub fn envelope(events: &[String]) -> String {
    format!(r#"{{"Events":[{}]}}"#, events.join(","))
}

pub fn space(id: &str) -> String {
    format!(r#"{{"Type":"Space","Id":"{id}","State":"Clean"}}"#)
}

pub fn command(id: &str) -> String {
    format!(r#"{{"Type":"DeviceCommand","Id":"{id}","State":"Pending"}}"#)
}

pub fn reservation(id: &str) -> String {
    format!(
        r#"{{"Type":"Reservation","Id":"{id}","State":"Confirmed","StartUtc":"2024-01-01T00:00:00Z","EndUtc":"2024-01-02T00:00:00Z"}}"#
    )
}
