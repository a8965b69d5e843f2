pub mod params;
pub mod resolver;
pub mod responses;
pub mod router;
pub mod static_files;

use std::io;

use crate::config::ServerConfig;
use crate::http::request::RequestContext;
use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;

pub async fn handle_request(ctx: &RequestContext, config: &ServerConfig) -> io::Result<HttpResponse> {
    router::route(ctx, config).await
}

/// Best-effort response for a request that never reached routing.
/// Falls back to a bare 500 when the 400 page cannot be read.
pub async fn handle_error(err: HttpStatus, config: &ServerConfig) -> HttpResponse {
    if err == HttpStatus::BadRequest {
        match responses::bad_request(&config.root).await {
            Ok(res) => return res,
            Err(e) => tracing::warn!(error = %e, "cannot load 400 page"),
        }
    }
    responses::internal_server_error()
}
