//! The built-in form echo endpoint.
//!
//! A POST to any path whose file name is [`PARAMS_INFO_PAGE`] has its
//! `key=value&...` body rendered back as an HTML list.

use std::path::Path;

use indexmap::IndexMap;

use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;

pub const PARAMS_INFO_PAGE: &str = "params_info.html";

pub fn is_endpoint(resolved: &Path) -> bool {
    resolved
        .file_name()
        .is_some_and(|name| name == PARAMS_INFO_PAGE)
}

/// Splits `a=1&b&c=3` into ordered pairs; a key without `=` gets an empty value.
///
/// Empty pairs and pairs with more than one `=` are dropped. A repeated key
/// keeps its first position and its last value.
pub fn parse_form(body: &str) -> IndexMap<String, String> {
    let body = body.replace("\r\n", "");
    let mut form = IndexMap::new();

    for param in body.trim().split('&').filter(|p| !p.is_empty()) {
        let (key, value) = match param.split_once('=') {
            None => (param, ""),
            Some((_, value)) if value.contains('=') => continue,
            Some(pair) => pair,
        };
        form.insert(key.to_string(), value.to_string());
    }

    form
}

pub fn render(form: &IndexMap<String, String>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<title>Form Data</title>\n</head>\n<body>\n",
    );
    html.push_str("<h1>Form Data</h1>\n<ul>\n");
    for (key, value) in form {
        html.push_str(&format!("<li>{}: {}</li>\n", key, value));
    }
    html.push_str("</ul>\n</body>\n</html>");
    html
}

pub fn params_info(body_text: &str) -> HttpResponse {
    let html = render(&parse_form(body_text));
    HttpResponse::with_content(HttpStatus::Ok, "text/html", html.into_bytes())
}
