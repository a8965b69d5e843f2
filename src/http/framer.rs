//! Splits a request off the wire into its header block and body.
//!
//! The header section is found with a small scanner over the bytes as they
//! arrive, so it does not matter how the client's writes are cut into TCP
//! segments. Once the header block has been parsed, the caller hands the
//! headers back to [`RequestFramer::read_body`], which picks fixed-length or
//! chunked reading.

use async_std::io::prelude::*;
use async_std::io::{BufReader, Read};

use crate::error::FramingError;
use crate::http::chunked;
use crate::http::headers::HttpHeaders;

/// Position inside a possible `\r\n\r\n` terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    SawCr,
    SawCrLf,
    SawCrLfCr,
}

pub struct RequestFramer<R> {
    reader: BufReader<R>,
}

impl<R: Read + Unpin> RequestFramer<R> {
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
        }
    }

    /// Reads up to the blank line ending the header section.
    ///
    /// The returned block ends with the CRLF of the last header line; the
    /// blank line itself is consumed but not included.
    pub async fn read_head(&mut self) -> Result<String, FramingError> {
        let mut block = Vec::new();
        let mut state = ScanState::Normal;

        loop {
            let byte = self.next_byte().await?.ok_or(FramingError::UnexpectedEof)?;

            state = match (state, byte) {
                (ScanState::SawCrLfCr, b'\n') => {
                    // drop the '\r' of the blank line
                    block.pop();
                    break;
                }
                (ScanState::SawCr, b'\n') => ScanState::SawCrLf,
                (ScanState::SawCrLf, b'\r') => ScanState::SawCrLfCr,
                (_, b'\r') => ScanState::SawCr,
                _ => ScanState::Normal,
            };
            block.push(byte);
        }

        let head = String::from_utf8_lossy(&block).into_owned();
        if head.trim().is_empty() {
            return Err(FramingError::EmptyRequest);
        }
        Ok(head)
    }

    /// Reads the body announced by `headers`, if any.
    ///
    /// Without `Content-Length` there is no body, even for a chunked request.
    /// A fixed-length body that ends early is returned truncated.
    pub async fn read_body(
        &mut self,
        headers: &HttpHeaders,
    ) -> Result<Option<Vec<u8>>, FramingError> {
        let Some(content_length) = headers.get("Content-Length") else {
            return Ok(None);
        };

        let chunked = headers
            .get("Transfer-Encoding")
            .is_some_and(|te| te.eq_ignore_ascii_case("chunked"));
        if chunked {
            return chunked::decode(&mut self.reader).await.map(Some);
        }

        let len = content_length
            .trim()
            .parse::<u64>()
            .map_err(|_| FramingError::InvalidContentLength(content_length.clone()))?;

        let mut body = Vec::new();
        (&mut self.reader).take(len).read_to_end(&mut body).await?;
        if (body.len() as u64) < len {
            tracing::debug!(expected = len, received = body.len(), "short request body");
        }
        Ok(Some(body))
    }

    async fn next_byte(&mut self) -> Result<Option<u8>, FramingError> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte).await {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(FramingError::Io(e)),
            }
        }
    }
}
