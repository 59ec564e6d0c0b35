//! Short-read payload framing.
//!
//! The wire carries raw payload bytes with no header or length prefix.
//! A payload is read in fixed-size chunks and ends at the first chunk
//! that comes back shorter than the chunk size, including a zero-length
//! chunk when the peer half-closes.
//!
//! ## Limitations
//!
//! The rule cannot tell a message boundary from a transport stall:
//!
//! - A payload whose length is an exact multiple of the chunk size stays
//!   open until the next short read, which in practice is the peer's
//!   half-close (zero-length read) or bytes of the following message.
//! - A peer that pauses mid-message so that a read returns early splits
//!   the message into two payloads.
//!
//! Both behaviors are kept as-is; the protocol has no delimiter to do
//! better.

use bytes::{Bytes, BytesMut};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// Result of one framing round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A complete, non-empty payload.
    Payload {
        data: Bytes,
        /// Number of reads it took, including the terminating short read.
        chunks: usize,
    },
    /// The first read of the round returned zero bytes: the peer is done.
    Closed,
}

/// Reads payloads off a stream using the short-read rule.
#[derive(Debug)]
pub struct FrameReader {
    chunk: Vec<u8>,
}

impl FrameReader {
    /// Create a reader with the given chunk size.
    ///
    /// # Panics
    ///
    /// If `buffer_size` is zero; a zero-sized chunk can never read anything.
    pub fn new(buffer_size: usize) -> Self {
        assert!(buffer_size > 0, "buffer size must be non-zero");
        Self {
            chunk: vec![0u8; buffer_size],
        }
    }

    /// Read one payload. Blocks until a short read is observed.
    pub async fn next_frame<R>(&mut self, reader: &mut R) -> io::Result<Frame>
    where
        R: AsyncRead + Unpin,
    {
        let buffer_size = self.chunk.len();
        let mut payload = BytesMut::new();
        let mut chunks = 0;

        loop {
            let n = reader.read(&mut self.chunk).await?;
            chunks += 1;
            payload.extend_from_slice(&self.chunk[..n]);
            debug!(chunk = chunks, bytes = n, total = payload.len(), "read chunk");

            if n < buffer_size {
                break;
            }
        }

        if payload.is_empty() {
            return Ok(Frame::Closed);
        }

        Ok(Frame::Payload {
            data: payload.freeze(),
            chunks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn payload(frame: Frame) -> (Bytes, usize) {
        match frame {
            Frame::Payload { data, chunks } => (data, chunks),
            Frame::Closed => panic!("expected a payload, got Closed"),
        }
    }

    #[tokio::test]
    async fn test_short_final_chunk_ends_payload() {
        let sent: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let mut stream = Builder::new().read(&sent).build();
        let mut reader = FrameReader::new(4096);

        let (data, chunks) = payload(reader.next_frame(&mut stream).await.unwrap());
        assert_eq!(&data[..], &sent[..]);
        assert_eq!(chunks, 2);
    }

    #[tokio::test]
    async fn test_payload_smaller_than_one_chunk() {
        let mut stream = Builder::new().read(b"frame").build();
        let mut reader = FrameReader::new(4096);

        let (data, chunks) = payload(reader.next_frame(&mut stream).await.unwrap());
        assert_eq!(&data[..], b"frame");
        assert_eq!(chunks, 1);
    }

    #[tokio::test]
    async fn test_exact_multiple_ends_on_close() {
        let mut stream = Builder::new().read(&[5u8; 8]).build();
        let mut reader = FrameReader::new(4);

        // 4 + 4 + 0: the zero-length read at EOF closes the round.
        let (data, chunks) = payload(reader.next_frame(&mut stream).await.unwrap());
        assert_eq!(data.len(), 8);
        assert_eq!(chunks, 3);

        assert_eq!(reader.next_frame(&mut stream).await.unwrap(), Frame::Closed);
    }

    #[tokio::test]
    async fn test_exact_multiple_absorbs_following_bytes() {
        let mut stream = Builder::new().read(&[3u8; 8]).read(&[4u8; 3]).build();
        let mut reader = FrameReader::new(4);

        let (data, chunks) = payload(reader.next_frame(&mut stream).await.unwrap());
        assert_eq!(&data[..8], &[3u8; 8]);
        assert_eq!(&data[8..], &[4u8; 3]);
        assert_eq!(chunks, 3);
    }

    #[tokio::test]
    async fn test_early_short_read_splits_message() {
        let mut stream = Builder::new().read(&[1u8; 100]).read(&[2u8; 100]).build();
        let mut reader = FrameReader::new(4096);

        let (first, _) = payload(reader.next_frame(&mut stream).await.unwrap());
        let (second, _) = payload(reader.next_frame(&mut stream).await.unwrap());
        assert_eq!(&first[..], &[1u8; 100]);
        assert_eq!(&second[..], &[2u8; 100]);
    }

    #[tokio::test]
    async fn test_immediate_eof_is_closed() {
        let mut stream = Builder::new().build();
        let mut reader = FrameReader::new(4096);

        assert_eq!(reader.next_frame(&mut stream).await.unwrap(), Frame::Closed);
    }

    #[tokio::test]
    async fn test_read_error_propagates() {
        let mut stream = Builder::new()
            .read(&[9u8; 4])
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut reader = FrameReader::new(4);

        let err = reader.next_frame(&mut stream).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }

    #[test]
    #[should_panic(expected = "buffer size must be non-zero")]
    fn test_zero_buffer_size_panics() {
        let _ = FrameReader::new(0);
    }
}
