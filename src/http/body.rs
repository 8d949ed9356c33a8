//! Streaming file bodies
//!
//! A file span is read in chunks of a fixed size and handed to hyper one
//! frame at a time, so memory per transfer stays bounded whatever the file
//! size. The shutdown flag is checked before every chunk.

use crate::http::response::ResponseBody;
use crate::server::Shutdown;
use futures::{stream, TryStreamExt};
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Bytes, Frame};
use std::io::{self, SeekFrom};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

struct ChunkReader {
    file: File,
    remaining: u64,
    chunk_size: usize,
    shutdown: Shutdown,
}

impl ChunkReader {
    async fn next_chunk(&mut self) -> io::Result<Option<Bytes>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        if self.shutdown.is_requested() {
            return Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "server shutting down",
            ));
        }

        let want = usize::try_from(self.remaining)
            .unwrap_or(usize::MAX)
            .min(self.chunk_size);
        let mut buf = vec![0u8; want];
        let read = self.file.read(&mut buf).await?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "file shrank while streaming",
            ));
        }
        buf.truncate(read);
        self.remaining -= read as u64;
        Ok(Some(Bytes::from(buf)))
    }
}

/// Body streaming `len` bytes of `file` starting at `start`
pub async fn file_body(
    mut file: File,
    start: u64,
    len: u64,
    chunk_size: usize,
    shutdown: Shutdown,
) -> io::Result<ResponseBody> {
    if start > 0 {
        file.seek(SeekFrom::Start(start)).await?;
    }

    let reader = ChunkReader {
        file,
        remaining: len,
        chunk_size: chunk_size.max(1),
        shutdown,
    };

    let chunks = stream::try_unfold(reader, |mut reader| async move {
        let chunk = reader.next_chunk().await?;
        Ok::<_, io::Error>(chunk.map(|chunk| (chunk, reader)))
    });

    Ok(StreamBody::new(chunks.map_ok(Frame::data)).boxed_unsync())
}
