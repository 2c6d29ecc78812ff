//! SSE framing for the wire event stream.

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::mpsc;

/// Frame one protocol event as an SSE data chunk.
///
/// Returns `None` when serialization fails; the failure is logged and the
/// stream continues without the frame.
pub fn event_frame<E: Serialize>(event: &E) -> Option<Bytes> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Bytes::from(format!("data: {json}\n\n"))),
        Err(error) => {
            tracing::warn!(%error, "failed to serialize SSE protocol event");
            None
        }
    }
}

/// Adapt a channel of framed chunks into a response body stream.
pub fn sse_body_stream(
    mut rx: mpsc::Receiver<Bytes>,
) -> impl futures::Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    async_stream::stream! {
        while let Some(chunk) = rx.recv().await {
            yield Ok::<Bytes, Infallible>(chunk);
        }
    }
}

/// Wrap a chunk stream in an SSE response with the standard headers.
pub fn sse_response<S>(stream: S) -> Response
where
    S: futures::Stream<Item = Result<Bytes, Infallible>> + Send + 'static,
{
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    (headers, Body::from_stream(stream)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    #[test]
    fn frame_wraps_json_in_sse_data_lines() {
        let frame = event_frame(&json!({"type": "TEST"})).unwrap();
        assert_eq!(frame, Bytes::from("data: {\"type\":\"TEST\"}\n\n"));
    }

    #[test]
    fn frame_skips_unserializable_events() {
        let mut bad_keys = std::collections::HashMap::new();
        bad_keys.insert((1u8, 2u8), 3u8);
        assert!(event_frame(&bad_keys).is_none());
    }

    #[tokio::test]
    async fn body_stream_yields_all_chunks() {
        let (tx, rx) = mpsc::channel::<Bytes>(4);
        let stream = sse_body_stream(rx);
        tokio::pin!(stream);

        tx.send(Bytes::from("a")).await.unwrap();
        tx.send(Bytes::from("b")).await.unwrap();
        drop(tx);

        let items: Vec<Bytes> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(items, vec![Bytes::from("a"), Bytes::from("b")]);
    }
}
