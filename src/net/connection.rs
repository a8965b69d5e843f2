//! One request/response exchange on an accepted socket.
//!
//! A connection walks `ReadingRequest -> Routing -> WritingResponse -> Closed`.
//! Errors raised before the response is on its way are answered with a
//! best-effort error page; errors while writing are only logged. Whatever
//! happens, the socket is shut down exactly once.

use std::io;
use std::net::Shutdown;
use std::sync::Arc;

use async_std::io::prelude::*;
use async_std::net::TcpStream;
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::error::{FramingError, SecurityError};
use crate::handler::{self, resolver};
use crate::http::framer::RequestFramer;
use crate::http::parser::parse_head;
use crate::http::request::RequestContext;
use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnState {
    ReadingRequest,
    Routing,
    WritingResponse,
    Closed,
}

/// Anything that stops a request short of a normal reply.
#[derive(Debug)]
enum Failure {
    Framing(FramingError),
    Security(SecurityError),
    Io(io::Error),
}

impl Failure {
    fn status(&self) -> HttpStatus {
        match self {
            Failure::Framing(e) if e.is_client_error() => HttpStatus::BadRequest,
            Failure::Security(_) => HttpStatus::BadRequest,
            Failure::Framing(_) | Failure::Io(_) => HttpStatus::InternalServerError,
        }
    }
}

impl From<FramingError> for Failure {
    fn from(e: FramingError) -> Self {
        Failure::Framing(e)
    }
}

impl From<SecurityError> for Failure {
    fn from(e: SecurityError) -> Self {
        Failure::Security(e)
    }
}

impl From<io::Error> for Failure {
    fn from(e: io::Error) -> Self {
        Failure::Io(e)
    }
}

struct Connection {
    stream: TcpStream,
    config: Arc<ServerConfig>,
    state: ConnState,
}

/// Serves a single request on `stream`, then closes it.
pub async fn handle_connection(stream: TcpStream, config: Arc<ServerConfig>) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let conn = Connection {
        stream,
        config,
        state: ConnState::ReadingRequest,
    };
    conn.run()
        .instrument(tracing::info_span!("connection", %peer))
        .await;
}

impl Connection {
    async fn run(mut self) {
        if let Err(failure) = self.serve().await {
            self.recover(failure).await;
        }
        self.close();
    }

    async fn serve(&mut self) -> Result<(), Failure> {
        let ctx = self.read_request().await?;

        self.state = ConnState::Routing;
        let response = handler::handle_request(&ctx, &self.config).await?;
        tracing::info!(
            method = ctx.line.method.as_str(),
            target = %ctx.line.target,
            status = response.status.code(),
            "request served"
        );

        self.state = ConnState::WritingResponse;
        if let Err(e) = write_response(&self.stream, &response, ctx.wants_chunked_reply()).await {
            tracing::warn!(error = %e, "failed to write response");
        }
        Ok(())
    }

    async fn read_request(&self) -> Result<RequestContext, Failure> {
        let mut framer = RequestFramer::new(&self.stream);

        let head = framer.read_head().await?;
        let (line, headers) = parse_head(&head)?;
        let body = framer.read_body(&headers).await?;
        tracing::debug!(
            method = line.method.as_str(),
            target = %line.target,
            headers = headers.len(),
            body = body.as_ref().map_or(0, Vec::len),
            "request framed"
        );

        let resolved = resolver::resolve(&line.target, &self.config.root, &self.config.default_page)?;

        let mut ctx = RequestContext::new(head, line, headers, body);
        ctx.vars.resolved_path = resolved;
        Ok(ctx)
    }

    /// Answers a failed request if the response has not started yet.
    async fn recover(&mut self, failure: Failure) {
        match &failure {
            Failure::Framing(FramingError::Io(e)) | Failure::Io(e) => {
                tracing::error!(error = %e, state = ?self.state, "request failed");
            }
            Failure::Framing(e) => tracing::warn!(error = %e, "bad request"),
            Failure::Security(e) => tracing::warn!(error = %e, "rejected request target"),
        }

        if self.state == ConnState::WritingResponse {
            return;
        }

        self.state = ConnState::WritingResponse;
        let response = handler::handle_error(failure.status(), &self.config).await;
        if let Err(e) = write_response(&self.stream, &response, false).await {
            tracing::debug!(error = %e, "failed to write error response");
        }
    }

    fn close(&mut self) {
        if self.state == ConnState::Closed {
            return;
        }
        self.state = ConnState::Closed;
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::debug!(error = %e, "socket shutdown failed");
        }
    }
}

/// Writes the given `HttpResponse` back to the TCP stream, chunked or as a
/// single framed message.
async fn write_response(
    mut stream: &TcpStream,
    response: &HttpResponse,
    chunked: bool,
) -> io::Result<()> {
    let bytes = if chunked {
        response.to_chunked_bytes()
    } else {
        response.to_bytes()
    };
    stream.write_all(&bytes).await?;
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_map_to_status() {
        assert_eq!(
            Failure::from(FramingError::EmptyRequest).status(),
            HttpStatus::BadRequest
        );
        assert_eq!(
            Failure::from(SecurityError::Traversal("/..".into())).status(),
            HttpStatus::BadRequest
        );
        assert_eq!(
            Failure::from(io::Error::other("boom")).status(),
            HttpStatus::InternalServerError
        );
        assert_eq!(
            Failure::from(FramingError::Io(io::Error::other("reset"))).status(),
            HttpStatus::InternalServerError
        );
    }
}
