//! Turns a framed header block into a request line and a header map.
//!
//! Parsing is deliberately permissive: header names keep their case, values
//! are not trimmed, repeated names overwrite, and lines without a `": "`
//! separator are skipped.

use crate::error::FramingError;
use crate::http::HttpMethod;
use crate::http::headers::HttpHeaders;
use crate::http::request::RequestLine;

pub fn parse_head(head: &str) -> Result<(RequestLine, HttpHeaders), FramingError> {
    let mut lines = head.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

    let request_line = parse_request_line(lines.next().unwrap_or_default())?;

    let mut headers = HttpHeaders::new();
    for line in lines.filter(|line| !line.is_empty()) {
        if let Some((name, value)) = line.split_once(": ") {
            headers.set_raw(name, value);
        }
    }

    Ok((request_line, headers))
}

fn parse_request_line(line: &str) -> Result<RequestLine, FramingError> {
    let mut parts = line.split(' ');

    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) if !method.is_empty() && !target.is_empty() => {
            (method, target)
        }
        _ => return Err(FramingError::MalformedRequestLine(line.to_string())),
    };

    Ok(RequestLine {
        method: HttpMethod::from_token(method),
        target: target.to_string(),
        version: parts.next().map(str::to_string),
    })
}
