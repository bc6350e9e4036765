//! Byte-for-byte relay of a streamed backend response.
//!
//! Chunks are forwarded exactly as they arrive, without parsing or
//! re-framing the event stream. The relay is a two-state machine:
//! `Copying` until the backend stream ends or fails, then `Done`.
//!
//! A backend read error is passed on once so the client connection is
//! aborted instead of ending as if the stream were complete.

use std::fmt::Display;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};

enum RelayState<S> {
    Copying { upstream: S, chunks: u64 },
    Done,
}

/// Relay `upstream` chunk by chunk.
pub fn relay<S, E>(upstream: S) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin,
    E: Display + Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let initial = RelayState::Copying {
        upstream,
        chunks: 0,
    };

    futures_util::stream::unfold(initial, |state| async move {
        let RelayState::Copying {
            mut upstream,
            chunks,
        } = state
        else {
            return None;
        };

        match upstream.next().await {
            Some(Ok(chunk)) => Some((
                Ok(chunk),
                RelayState::Copying {
                    upstream,
                    chunks: chunks + 1,
                },
            )),
            Some(Err(e)) => {
                warn!(chunks, error = %e, "Backend stream failed, aborting relay");
                Some((Err(std::io::Error::other(e)), RelayState::Done))
            }
            None => {
                debug!(chunks, "Backend stream finished");
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn frames(n: usize) -> Vec<Bytes> {
        (0..n)
            .map(|i| Bytes::from(format!("data: {{\"choices\":[{{\"index\":{i}}}]}}\n\n")))
            .chain(std::iter::once(Bytes::from_static(b"data: [DONE]\n\n")))
            .collect()
    }

    #[tokio::test]
    async fn test_relays_frames_unchanged() {
        let input = frames(16);
        let upstream = stream::iter(input.clone().into_iter().map(Ok::<_, std::io::Error>));

        let output: Vec<Bytes> = relay(upstream)
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn test_partial_frames_pass_through() {
        // Chunk boundaries need not line up with event boundaries.
        let input = vec![
            Bytes::from_static(b"data: {\"a\""),
            Bytes::from_static(b":1}\n"),
            Bytes::from_static(b"\n"),
        ];
        let upstream = stream::iter(input.clone().into_iter().map(Ok::<_, std::io::Error>));
        let output: Vec<Bytes> = relay(upstream).map(Result::unwrap).collect().await;
        assert_eq!(output.concat(), b"data: {\"a\":1}\n\n");
        assert_eq!(output.len(), 3);
    }

    #[tokio::test]
    async fn test_error_ends_relay() {
        let upstream = stream::iter(vec![
            Ok(Bytes::from_static(b"data: 1\n\n")),
            Err(std::io::Error::other("connection reset")),
            Ok(Bytes::from_static(b"data: 2\n\n")),
        ]);

        let output: Vec<Result<Bytes, std::io::Error>> = relay(upstream).collect().await;
        assert_eq!(output.len(), 2);
        assert_eq!(output[0].as_ref().unwrap(), &Bytes::from_static(b"data: 1\n\n"));
        assert!(output[1].is_err());
    }

    #[tokio::test]
    async fn test_empty_upstream() {
        let upstream = stream::iter(Vec::<Result<Bytes, std::io::Error>>::new());
        assert_eq!(relay(upstream).count().await, 0);
    }
}
