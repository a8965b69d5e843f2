use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::http::headers::HttpHeaders;
use crate::http::{CRLF, HttpMethod};

/// `METHOD target [version]`, as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: HttpMethod,

    /// Raw request target, neither decoded nor sanitized.
    pub target: String,
    pub version: Option<String>,
}

/// Values derived from the request before routing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestVars {
    /// Target after resolution, relative to the document root.
    pub resolved_path: PathBuf,

    /// Header block, CRLF, then [`body_text`](Self::body_text). Echoed by TRACE.
    pub raw_request: String,

    /// Body as UTF-8 text for textual content types, base64 otherwise.
    pub body_text: String,

    /// The client asked for a chunked reply with a `chunked: yes` header.
    pub chunked_response: bool,
}

/// Everything known about the single request carried by a connection.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub line: RequestLine,
    pub headers: HttpHeaders,

    /// Header block exactly as framed off the wire.
    pub head: String,
    pub body: Option<Vec<u8>>,
    pub vars: RequestVars,
}

impl RequestContext {
    pub fn new(
        head: String,
        line: RequestLine,
        headers: HttpHeaders,
        body: Option<Vec<u8>>,
    ) -> Self {
        let mut ctx = Self {
            line,
            headers,
            head,
            body,
            vars: RequestVars::default(),
        };

        ctx.vars.body_text = ctx.render_body();
        ctx.vars.raw_request = format!("{}{}{}", ctx.head, CRLF, ctx.vars.body_text);
        ctx.vars.chunked_response = ctx
            .headers
            .get("chunked")
            .is_some_and(|v| v.eq_ignore_ascii_case("yes"));
        ctx
    }

    /// `Content-Type` names a `text/*` or `application/*` type.
    pub fn has_textual_body(&self) -> bool {
        self.headers
            .get("Content-Type")
            .is_some_and(|ct| ct.starts_with("text") || ct.starts_with("application"))
    }

    pub fn is_chunked_transfer(&self) -> bool {
        self.headers
            .get("Transfer-Encoding")
            .is_some_and(|te| te.eq_ignore_ascii_case("chunked"))
    }

    /// The reply goes out chunked only when the request itself was chunked
    /// and also asked for it.
    pub fn wants_chunked_reply(&self) -> bool {
        self.is_chunked_transfer() && self.vars.chunked_response
    }

    fn render_body(&self) -> String {
        match &self.body {
            Some(body) if self.has_textual_body() => String::from_utf8_lossy(body).into_owned(),
            Some(body) => BASE64.encode(body),
            None => BASE64.encode([]),
        }
    }
}
