//! Subscription feed: a long-lived server-push stream of created records.
//!
//! The stream is consumed in a dedicated tokio task and surfaced through a
//! notification channel, keeping the transport decoupled from the store
//! that applies the events. The feed is deliberately never restarted; when
//! it is lost, the session surfaces the loss instead.

use futures::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use tableside_shared::constants::{
    API_KEY_HEADER, EVENT_STREAM_MIME, FEED_CHANNEL_CAPACITY, RESTAURANT_CREATED_EVENT,
};
use tableside_shared::{Restaurant, TransportError};

use crate::config::ApiConfig;
use crate::graphql::{decode_created_event, ON_CREATE_RESTAURANT};

/// Notifications sent from the feed task to the session.
#[derive(Debug)]
pub enum FeedEvent {
    /// A restaurant was created somewhere. May be this client's own echo;
    /// suppression is the store's job, not the transport's.
    Created(Restaurant),
    /// The feed is gone for good: connect failure, protocol violation, or
    /// stream end. No further events will arrive.
    Lost(TransportError),
}

/// Handle owning the feed task.
///
/// Dropping the handle aborts the task, so the stream is released on every
/// exit path; [`FeedHandle::shutdown`] ends it gracefully.
#[derive(Debug)]
pub struct FeedHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl FeedHandle {
    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the subscription feed task.
///
/// Returns the owning handle and the notification receiver.
pub fn spawn_feed(config: &ApiConfig) -> (FeedHandle, mpsc::Receiver<FeedEvent>) {
    let (event_tx, event_rx) = mpsc::channel(FEED_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let config = config.clone();
    let task = tokio::spawn(async move {
        match run_feed(&config, &event_tx, shutdown_rx).await {
            Ok(()) => info!("Feed shut down"),
            Err(e) => {
                error!(error = %e, "Feed lost");
                let _ = event_tx.send(FeedEvent::Lost(e)).await;
            }
        }
    });

    (
        FeedHandle {
            shutdown_tx: Some(shutdown_tx),
            task,
        },
        event_rx,
    )
}

/// Consume the stream until shutdown is requested or the feed dies.
async fn run_feed(
    config: &ApiConfig,
    event_tx: &mpsc::Sender<FeedEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> Result<(), TransportError> {
    // The stream must outlive any request timeout, so it gets its own
    // client rather than sharing the query/mutation one. The subscription
    // document rides along as a query parameter.
    let mut request = reqwest::Client::new()
        .get(&config.stream_endpoint)
        .query(&[("query", ON_CREATE_RESTAURANT)])
        .header(reqwest::header::ACCEPT, EVENT_STREAM_MIME);
    if let Some(ref key) = config.api_key {
        request = request.header(API_KEY_HEADER, key);
    }

    let response = request
        .send()
        .await
        .map_err(|e| TransportError::Http(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Http(format!("stream status {status}")));
    }

    info!(endpoint = %config.stream_endpoint, "Subscription stream open");

    let mut body = response.bytes_stream();
    let mut parser = FrameParser::new();

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                return Ok(());
            }
            chunk = body.next() => {
                let chunk = match chunk {
                    Some(Ok(bytes)) => bytes,
                    Some(Err(e)) => return Err(TransportError::Http(e.to_string())),
                    None => return Err(TransportError::StreamClosed),
                };

                for frame in parser.push(&chunk)? {
                    let restaurant = decode_frame(&frame)?;
                    debug!(
                        name = %restaurant.name,
                        client = %restaurant.client_id,
                        "Creation event received"
                    );
                    if event_tx.send(FeedEvent::Created(restaurant)).await.is_err() {
                        // Receiver gone; nobody is listening anymore.
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Decode one frame, rejecting event kinds this client does not know.
fn decode_frame(frame: &Frame) -> Result<Restaurant, TransportError> {
    match frame.event.as_deref() {
        None | Some(RESTAURANT_CREATED_EVENT) => decode_created_event(&frame.data),
        Some(other) => Err(TransportError::UnrecognizedEvent(other.to_string())),
    }
}

/// One decoded server-sent event.
#[derive(Debug, PartialEq, Eq)]
pub struct Frame {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental parser for `text/event-stream` framing.
///
/// Frames are separated by a blank line; chunk boundaries may fall
/// anywhere, including inside a multi-byte character, so the buffer stays
/// bytes until a full frame is cut out. `data:` lines accumulate (joined
/// with newlines), an optional `event:` line names the frame, and comment
/// lines starting with `:` (keepalives) are ignored.
#[derive(Debug, Default)]
pub struct FrameParser {
    buf: Vec<u8>,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes; returns every frame it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>, TransportError> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some((end, sep_len)) = find_boundary(&self.buf) {
            let raw: Vec<u8> = self.buf.drain(..end + sep_len).collect();
            let text = std::str::from_utf8(&raw[..end])
                .map_err(|e| TransportError::Decode(format!("stream is not UTF-8: {e}")))?;
            if let Some(frame) = parse_frame(text) {
                frames.push(frame);
            }
        }
        Ok(frames)
    }
}

/// Find the first blank-line boundary; returns (frame end, separator length).
fn find_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    for i in 0..buf.len() {
        if buf[i..].starts_with(b"\r\n\r\n") {
            return Some((i, 4));
        }
        if buf[i..].starts_with(b"\n\n") {
            return Some((i, 2));
        }
    }
    None
}

/// Parse the lines of one frame. Returns `None` for frames that carry no
/// event name and no data (pure keepalives).
fn parse_frame(text: &str) -> Option<Frame> {
    let mut event = None;
    let mut data_lines = Vec::new();

    for line in text.lines() {
        if line.starts_with(':') {
            // Comment / keepalive.
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.strip_prefix(' ').unwrap_or(rest).to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
        // id: and retry: fields are not used by this protocol.
    }

    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(Frame {
        event,
        data: data_lines.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::time::Duration;

    use axum::response::sse::{Event, Sse};
    use axum::routing::get;
    use axum::Router;
    use futures::stream;

    fn frame(event: Option<&str>, data: &str) -> Frame {
        Frame {
            event: event.map(str::to_string),
            data: data.to_string(),
        }
    }

    #[test]
    fn test_single_frame() {
        let mut parser = FrameParser::new();
        let frames = parser.push(b"data: {\"a\":1}\n\n").unwrap();
        assert_eq!(frames, vec![frame(None, "{\"a\":1}")]);
    }

    #[test]
    fn test_event_name_and_crlf() {
        let mut parser = FrameParser::new();
        let frames = parser
            .push(b"event: restaurantCreated\r\ndata: {}\r\n\r\n")
            .unwrap();
        assert_eq!(frames, vec![frame(Some("restaurantCreated"), "{}")]);
    }

    #[test]
    fn test_chunk_boundary_inside_frame() {
        let mut parser = FrameParser::new();
        // First chunk ends halfway through the two-byte encoding of 'é'.
        assert!(parser.push(b"data: {\"name\":\"Caf\xc3").unwrap().is_empty());
        let frames = parser.push(b"\xa9\"}\n\n").unwrap();
        assert_eq!(frames, vec![frame(None, "{\"name\":\"Caf\u{e9}\"}")]);
    }

    #[test]
    fn test_two_frames_in_one_chunk() {
        let mut parser = FrameParser::new();
        let frames = parser.push(b"data: 1\n\ndata: 2\n\n").unwrap();
        assert_eq!(frames, vec![frame(None, "1"), frame(None, "2")]);
    }

    #[test]
    fn test_keepalive_comments_are_dropped() {
        let mut parser = FrameParser::new();
        let frames = parser.push(b": keep-alive\n\ndata: 1\n\n").unwrap();
        assert_eq!(frames, vec![frame(None, "1")]);
    }

    #[test]
    fn test_multi_line_data_is_joined() {
        let mut parser = FrameParser::new();
        let frames = parser.push(b"data: {\ndata: }\n\n").unwrap();
        assert_eq!(frames, vec![frame(None, "{\n}")]);
    }

    #[test]
    fn test_unknown_event_kind_is_rejected() {
        let result = decode_frame(&frame(Some("restaurantDeleted"), "{}"));
        assert!(matches!(
            result,
            Err(TransportError::UnrecognizedEvent(name)) if name == "restaurantDeleted"
        ));
    }

    fn created_payload(name: &str, client_id: &str) -> String {
        serde_json::json!({
            "data": { "onCreateRestaurant": {
                "name": name, "description": "d", "city": "LA", "clientId": client_id
            }}
        })
        .to_string()
    }

    async fn spawn_sse_server(events: Vec<Event>, hold_open: bool) -> String {
        let app = Router::new().route(
            "/stream",
            get(move || {
                let events = events.clone();
                async move {
                    let head = stream::iter(events.into_iter().map(Ok::<_, Infallible>));
                    if hold_open {
                        Sse::new(head.chain(stream::pending()).boxed())
                    } else {
                        Sse::new(head.boxed())
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/stream")
    }

    fn config_for(stream_endpoint: String) -> ApiConfig {
        ApiConfig {
            stream_endpoint,
            ..ApiConfig::default()
        }
    }

    #[tokio::test]
    async fn test_feed_delivers_created_records() {
        let event = Event::default()
            .event(RESTAURANT_CREATED_EVENT)
            .data(created_payload("Sushi", "C2"));
        let endpoint = spawn_sse_server(vec![event], true).await;

        let (handle, mut rx) = spawn_feed(&config_for(endpoint));
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        match event {
            FeedEvent::Created(restaurant) => assert_eq!(restaurant.name, "Sushi"),
            other => panic!("expected Created, got {other:?}"),
        }

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_feed_surfaces_stream_end() {
        let event = Event::default().data(created_payload("Sushi", "C2"));
        let endpoint = spawn_sse_server(vec![event], false).await;

        let (_handle, mut rx) = spawn_feed(&config_for(endpoint));
        let mut seen_created = false;
        loop {
            match tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .unwrap()
            {
                Some(FeedEvent::Created(_)) => seen_created = true,
                Some(FeedEvent::Lost(TransportError::StreamClosed)) => break,
                other => panic!("unexpected feed event: {other:?}"),
            }
        }
        assert!(seen_created);
    }

    #[tokio::test]
    async fn test_feed_surfaces_connect_failure() {
        let (_handle, mut rx) = spawn_feed(&config_for("http://127.0.0.1:1/stream".to_string()));
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, FeedEvent::Lost(TransportError::Http(_))));
    }
}
