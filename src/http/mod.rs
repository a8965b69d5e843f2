pub mod chunked;
pub mod framer;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;

pub const CRLF: &str = "\r\n";

/// Request methods the router distinguishes.
/// Tokens are matched exactly; anything else is kept verbatim in
/// [`HttpMethod::Other`] and answered with 501.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Trace,
    Other(String),
}

impl HttpMethod {
    pub fn from_token(token: &str) -> HttpMethod {
        match token {
            "GET" => HttpMethod::Get,
            "HEAD" => HttpMethod::Head,
            "POST" => HttpMethod::Post,
            "TRACE" => HttpMethod::Trace,
            other => HttpMethod::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Other(token) => token,
        }
    }
}
