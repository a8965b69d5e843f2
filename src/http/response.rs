use crate::http::chunked;
use crate::http::headers::HttpHeaders;
use crate::http::status::HttpStatus;
use crate::http::CRLF;

/// The only headers a response ever carries.
pub enum ResponseHeader {
    ContentType,
    ContentLength,
    TransferEncoding,
}

impl ResponseHeader {
    fn name(&self) -> &'static str {
        match self {
            ResponseHeader::ContentType => "Content-Type",
            ResponseHeader::ContentLength => "Content-Length",
            ResponseHeader::TransferEncoding => "Transfer-Encoding",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: HttpStatus,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,

    /// Cleared for HEAD: headers still describe the body, but it is not written.
    pub send_body: bool,
}

impl HttpResponse {
    pub fn new(status: HttpStatus) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: Vec::new(),
            send_body: true,
        }
    }

    /// Response with a typed body. `Content-Length` is left out for an empty body.
    pub fn with_content(status: HttpStatus, content_type: &str, body: Vec<u8>) -> Self {
        let mut res = Self::new(status);
        res.set_header(ResponseHeader::ContentType, content_type);
        if !body.is_empty() {
            res.set_header(ResponseHeader::ContentLength, &body.len().to_string());
        }
        res.body = body;
        res
    }

    pub fn set_header(&mut self, h: ResponseHeader, value: &str) {
        self.headers.set_raw(h.name(), value);
    }

    /// Status line followed by the header lines, without the blank line.
    pub fn build_headers(&self) -> String {
        // HTTP/1.1 <status> <reason>\r\n
        // <header_name>: <header_value>\r\n
        // ...
        format!(
            "HTTP/1.1 {} {}\r\n{}",
            self.status.code(),
            self.status.reason(),
            self.headers.stringify(),
        )
    }

    /// Header block, blank line, then the body if it is to be sent.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = self.build_headers().into_bytes();
        out.extend_from_slice(CRLF.as_bytes());
        if self.send_body {
            out.extend_from_slice(&self.body);
        }
        out
    }

    /// Same as [`to_bytes`](Self::to_bytes) but with the body re-framed as
    /// chunks. `Content-Length` is replaced by `Transfer-Encoding: chunked`.
    pub fn to_chunked_bytes(&self) -> Vec<u8> {
        let mut framed = self.clone();
        framed.headers.remove(ResponseHeader::ContentLength.name());
        framed.set_header(ResponseHeader::TransferEncoding, "chunked");

        let mut out = framed.build_headers().into_bytes();
        out.extend_from_slice(CRLF.as_bytes());
        if self.send_body {
            out.extend_from_slice(&chunked::encode(&self.body));
        }
        out
    }
}
