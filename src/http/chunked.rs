//! Chunked transfer coding, both directions.

use async_std::io::prelude::*;
use async_std::io::BufRead;

use crate::error::FramingError;
use crate::http::CRLF;

/// Payload size of every chunk but the last when encoding.
pub const CHUNK_SIZE: usize = 1024;

/// Reads a chunked body up to the zero-size chunk and returns the payload.
///
/// Nothing after the `0` size line is read, so a client that stops sending
/// there still gets its reply. Chunk sizes are not capped.
pub async fn decode<R: BufRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, FramingError> {
    let mut body = Vec::new();

    loop {
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Err(FramingError::UnexpectedEof);
        }

        let line = String::from_utf8_lossy(&line);
        // chunk extensions are ignored
        let size = line.split(';').next().unwrap_or_default().trim();
        if size.is_empty() {
            break;
        }
        let size = u64::from_str_radix(size, 16)
            .map_err(|_| FramingError::InvalidChunkSize(line.trim().to_string()))?;
        if size == 0 {
            break;
        }

        let read = (&mut *reader).take(size).read_to_end(&mut body).await?;
        if (read as u64) < size {
            return Err(FramingError::UnexpectedEof);
        }

        let mut line_break = Vec::new();
        reader.read_until(b'\n', &mut line_break).await?;
    }

    Ok(body)
}

/// Frames `body` as fixed-size chunks followed by the zero-length terminator.
pub fn encode(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + body.len() / CHUNK_SIZE * 8 + 16);

    for chunk in body.chunks(CHUNK_SIZE) {
        out.extend_from_slice(format!("{:x}{}", chunk.len(), CRLF).as_bytes());
        out.extend_from_slice(chunk);
        out.extend_from_slice(CRLF.as_bytes());
    }

    out.extend_from_slice(b"0\r\n\r\n");
    out
}
