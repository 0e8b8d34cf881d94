//! SSE stream decoding
//!
//! Incremental decoding of the vendor's server-sent-event token stream.
//! Frames are split on the blank-line delimiter; only `data: ` frames are
//! significant, `[DONE]` terminates, and frames without a content delta
//! (role or finish-reason frames) are skipped silently. The decoder only
//! consumes complete frames, so a delimiter split across read boundaries
//! is handled by buffering the trailing partial data.

use futures_util::StreamExt;
use serde_json::Value;

use crate::error::LlmError;
use crate::types::ChatResponse;

const FRAME_DELIMITER: &[u8] = b"\n\n";
const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Incremental SSE frame splitter over an append-only buffer
#[derive(Debug, Default)]
pub struct SseFrameDecoder {
    buffer: Vec<u8>,
}

impl SseFrameDecoder {
    /// New decoder with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes from the transport
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Split off the next complete frame, leaving partial data buffered
    pub fn next_frame(&mut self) -> Option<String> {
        let pos = self
            .buffer
            .windows(FRAME_DELIMITER.len())
            .position(|w| w == FRAME_DELIMITER)?;
        let frame: Vec<u8> = self.buffer.drain(..pos + FRAME_DELIMITER.len()).collect();
        Some(String::from_utf8_lossy(&frame[..pos]).into_owned())
    }
}

/// Outcome of decoding one frame
#[derive(Debug, PartialEq)]
pub enum FrameEvent {
    /// A content delta to append and forward
    Content(String),
    /// Frame carried no content (role/finish-reason frames, non-data
    /// frames, unparsable JSON); skipped without error
    Skip,
    /// The `[DONE]` sentinel; normal termination
    Done,
}

/// Decode one complete frame into an event.
pub fn decode_frame(frame: &str) -> FrameEvent {
    let Some(payload) = frame.strip_prefix(DATA_PREFIX) else {
        return FrameEvent::Skip;
    };
    if payload.trim() == DONE_SENTINEL {
        return FrameEvent::Done;
    }

    let Ok(json) = serde_json::from_str::<Value>(payload) else {
        return FrameEvent::Skip;
    };
    match json
        .pointer("/choices/0/delta/content")
        .and_then(|v| v.as_str())
    {
        Some(content) => FrameEvent::Content(content.to_string()),
        None => FrameEvent::Skip,
    }
}

/// Consume an SSE byte stream into an accumulated response.
///
/// Each content delta is appended to the response and passed to
/// `on_delta` (the delta only, never the cumulative text). A transport
/// failure mid-stream discards accumulated content and surfaces a
/// `StreamError` wrapping the cause. Single task, no internal concurrency.
pub async fn collect_stream<S, E, F>(mut stream: S, mut on_delta: F) -> Result<ChatResponse, LlmError>
where
    S: futures_util::Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
    F: FnMut(&str),
{
    let mut decoder = SseFrameDecoder::new();
    let mut response = ChatResponse::streaming();

    'read: while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| LlmError::StreamError {
            message: "transport failure while reading stream".to_string(),
            source: Some(Box::new(e)),
        })?;
        decoder.push(&chunk);

        while let Some(frame) = decoder.next_frame() {
            match decode_frame(&frame) {
                FrameEvent::Content(delta) => {
                    response.content.push_str(&delta);
                    on_delta(&delta);
                }
                FrameEvent::Skip => {}
                FrameEvent::Done => break 'read,
            }
        }
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    const HI_STREAM: &str =
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: [DONE]\n\n";

    fn ok_chunks(parts: Vec<&str>) -> impl futures_util::Stream<Item = Result<bytes::Bytes, std::io::Error>> + Unpin
    {
        stream::iter(
            parts
                .into_iter()
                .map(|p| Ok(bytes::Bytes::copy_from_slice(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn decodes_single_chunk() {
        let mut deltas = Vec::new();
        let response = collect_stream(ok_chunks(vec![HI_STREAM]), |d| deltas.push(d.to_string()))
            .await
            .unwrap();
        assert_eq!(deltas, vec!["Hi"]);
        assert_eq!(response.content, "Hi");
        assert!(response.streaming);
    }

    #[tokio::test]
    async fn decodes_across_every_split_point() {
        for split in 1..HI_STREAM.len() {
            let (a, b) = HI_STREAM.split_at(split);
            let mut deltas = Vec::new();
            let response = collect_stream(ok_chunks(vec![a, b]), |d| deltas.push(d.to_string()))
                .await
                .unwrap();
            assert_eq!(deltas, vec!["Hi"], "split at {split}");
            assert_eq!(response.content, "Hi", "split at {split}");
        }
    }

    #[tokio::test]
    async fn ignores_non_data_and_unparsable_frames() {
        let input = ": keep-alive\n\ndata: not json\n\ndata: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\ndata: [DONE]\n\n";
        let mut deltas = Vec::new();
        let response = collect_stream(ok_chunks(vec![input]), |d| deltas.push(d.to_string()))
            .await
            .unwrap();
        assert_eq!(deltas, vec!["ok"]);
        assert_eq!(response.content, "ok");
    }

    #[tokio::test]
    async fn stops_at_done_ignoring_trailing_frames() {
        let input = "data: [DONE]\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n";
        let mut calls = 0usize;
        let response = collect_stream(ok_chunks(vec![input]), |_| calls += 1)
            .await
            .unwrap();
        assert_eq!(calls, 0);
        assert!(response.content.is_empty());
    }

    #[tokio::test]
    async fn transport_failure_discards_partial_content() {
        let chunks: Vec<Result<bytes::Bytes, std::io::Error>> = vec![
            Ok(bytes::Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n\n",
            )),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            )),
        ];
        let err = collect_stream(stream::iter(chunks), |_| {})
            .await
            .unwrap_err();
        match err {
            LlmError::StreamError { source, .. } => assert!(source.is_some()),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn frame_decoder_buffers_partial_frames() {
        let mut decoder = SseFrameDecoder::new();
        decoder.push(b"data: one\n");
        assert_eq!(decoder.next_frame(), None);
        decoder.push(b"\ndata: two\n\n");
        assert_eq!(decoder.next_frame(), Some("data: one".to_string()));
        assert_eq!(decoder.next_frame(), Some("data: two".to_string()));
        assert_eq!(decoder.next_frame(), None);
    }
}
