use std::io;
use std::path::Path;

use async_std::fs;
use async_std::path::PathBuf;

use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;

pub const NOT_FOUND_PAGE: &str = "_404.html";
pub const BAD_REQUEST_PAGE: &str = "_400.html";
pub const NOT_IMPLEMENTED_PAGE: &str = "_501.html";

/// Error response whose body is an HTML page from the document root.
async fn from_template(root: &Path, status: HttpStatus, page: &str) -> io::Result<HttpResponse> {
    let path: PathBuf = root.join(page).into();
    let body = fs::read(&path).await?;
    Ok(HttpResponse::with_content(status, "text/html", body))
}

pub async fn not_found(root: &Path) -> io::Result<HttpResponse> {
    from_template(root, HttpStatus::NotFound, NOT_FOUND_PAGE).await
}

pub async fn bad_request(root: &Path) -> io::Result<HttpResponse> {
    from_template(root, HttpStatus::BadRequest, BAD_REQUEST_PAGE).await
}

pub async fn not_implemented(root: &Path) -> io::Result<HttpResponse> {
    from_template(root, HttpStatus::NotImplemented, NOT_IMPLEMENTED_PAGE).await
}

/// Bare 500: status line only, nothing else is sent.
pub fn internal_server_error() -> HttpResponse {
    let mut res = HttpResponse::new(HttpStatus::InternalServerError);
    res.send_body = false;
    res
}

/// Echoes the request back verbatim.
pub fn trace(raw_request: &str) -> HttpResponse {
    HttpResponse::with_content(HttpStatus::Ok, "text/html", raw_request.as_bytes().to_vec())
}
