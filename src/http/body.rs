use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

/// Largest chunk handed to the connection per read.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Streams a report payload to the connection in bounded chunks.
///
/// Chunks are zero-copy slices of the payload buffer; `offset` marks how much
/// has been handed out so far.
#[derive(Debug, Clone)]
pub struct PayloadCursor {
    payload: Bytes,
    offset: usize,
    chunk_size: usize,
}

impl PayloadCursor {
    #[must_use]
    pub fn new(payload: Bytes) -> Self {
        Self::with_chunk_size(payload, DEFAULT_CHUNK_SIZE)
    }

    #[must_use]
    pub fn with_chunk_size(payload: Bytes, chunk_size: usize) -> Self {
        Self {
            payload,
            offset: 0,
            chunk_size: chunk_size.max(1),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.payload.len() - self.offset
    }

    /// Returns the next at most `limit` unread bytes, or `None` once the
    /// payload is exhausted.
    pub fn next_chunk(&mut self, limit: usize) -> Option<Bytes> {
        let unread = self.remaining();
        if unread == 0 || limit == 0 {
            return None;
        }
        let take = unread.min(limit);
        let chunk = self.payload.slice(self.offset..self.offset + take);
        self.offset += take;
        Some(chunk)
    }
}

impl Stream for PayloadCursor {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let limit = self.chunk_size;
        Poll::Ready(self.next_chunk(limit).map(Ok))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let chunks = self.remaining().div_ceil(self.chunk_size);
        (chunks, Some(chunks))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn next_chunk_advances_offset() {
        let mut cursor = PayloadCursor::new(Bytes::from_static(b"hello world"));
        assert_eq!(cursor.next_chunk(5).as_deref(), Some(&b"hello"[..]));
        assert_eq!(cursor.remaining(), 6);
        assert_eq!(cursor.next_chunk(100).as_deref(), Some(&b" world"[..]));
        assert_eq!(cursor.next_chunk(100), None);
    }

    #[test]
    fn empty_payload_yields_nothing() {
        let mut cursor = PayloadCursor::new(Bytes::new());
        assert_eq!(cursor.next_chunk(16), None);
    }

    #[tokio::test]
    async fn stream_reassembles_payload() {
        let payload = Bytes::from(vec![7u8; 10_000]);
        let cursor = PayloadCursor::with_chunk_size(payload.clone(), 4096);
        assert_eq!(cursor.size_hint(), (3, Some(3)));

        let chunks: Vec<Bytes> = cursor.map(|chunk| chunk.unwrap()).collect().await;
        assert_eq!(chunks.iter().map(Bytes::len).collect::<Vec<_>>(), vec![4096, 4096, 1808]);
        assert_eq!(chunks.concat(), payload.to_vec());
    }
}
