use std::io;
use std::path::Path;

use crate::config::ServerConfig;
use crate::handler::{params, responses, static_files};
use crate::http::HttpMethod;
use crate::http::request::RequestContext;
use crate::http::response::HttpResponse;

/// Picks the response for a request whose target has already been resolved.
///
/// Missing error templates and file read failures come back as `Err`; the
/// connection handler turns those into a bare 500.
pub async fn route(ctx: &RequestContext, config: &ServerConfig) -> io::Result<HttpResponse> {
    let resolved = ctx.vars.resolved_path.as_path();

    match &ctx.line.method {
        HttpMethod::Get => serve_file(config, resolved).await,
        HttpMethod::Head => {
            let mut res = serve_file(config, resolved).await?;
            res.send_body = false;
            Ok(res)
        }
        HttpMethod::Post if params::is_endpoint(resolved) => {
            Ok(params::params_info(&ctx.vars.body_text))
        }
        // static files cannot be posted to
        HttpMethod::Post => responses::bad_request(&config.root).await,
        HttpMethod::Trace => Ok(responses::trace(&ctx.vars.raw_request)),
        HttpMethod::Other(_) => responses::not_implemented(&config.root).await,
    }
}

async fn serve_file(config: &ServerConfig, resolved: &Path) -> io::Result<HttpResponse> {
    match static_files::serve(&config.root, resolved).await? {
        Some(res) => Ok(res),
        None => responses::not_found(&config.root).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::parser::parse_head;
    use crate::http::status::HttpStatus;
    use std::path::PathBuf;

    fn site() -> (tempfile::TempDir, ServerConfig) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(dir.path().join(responses::NOT_FOUND_PAGE), "404 page").unwrap();
        std::fs::write(dir.path().join(responses::BAD_REQUEST_PAGE), "400 page").unwrap();
        std::fs::write(dir.path().join(responses::NOT_IMPLEMENTED_PAGE), "501 page").unwrap();

        let config = ServerConfig {
            root: dir.path().to_path_buf(),
            ..ServerConfig::default()
        };
        (dir, config)
    }

    fn request(head: &str, resolved: &str, body: Option<&[u8]>) -> RequestContext {
        let (line, headers) = parse_head(head).unwrap();
        let mut ctx = RequestContext::new(head.to_string(), line, headers, body.map(<[u8]>::to_vec));
        ctx.vars.resolved_path = PathBuf::from(resolved);
        ctx
    }

    #[async_std::test]
    async fn get_existing_file() {
        let (_dir, config) = site();
        let ctx = request("GET /index.html HTTP/1.1\r\n", "index.html", None);

        let res = route(&ctx, &config).await.unwrap();
        assert_eq!(res.status, HttpStatus::Ok);
        assert_eq!(res.body, b"<h1>home</h1>");
        assert!(res.send_body);
    }

    #[async_std::test]
    async fn head_suppresses_body_only() {
        let (_dir, config) = site();
        let get = route(&request("GET /index.html HTTP/1.1\r\n", "index.html", None), &config)
            .await
            .unwrap();
        let head = route(&request("HEAD /index.html HTTP/1.1\r\n", "index.html", None), &config)
            .await
            .unwrap();

        assert_eq!(head.build_headers(), get.build_headers());
        assert!(!head.send_body);
    }

    #[async_std::test]
    async fn missing_file_is_404_template() {
        let (_dir, config) = site();
        let res = route(&request("GET /nope HTTP/1.1\r\n", "nope", None), &config)
            .await
            .unwrap();

        assert_eq!(res.status, HttpStatus::NotFound);
        assert_eq!(res.body, b"404 page");
    }

    #[async_std::test]
    async fn post_to_static_file_is_400() {
        let (_dir, config) = site();
        let res = route(&request("POST /index.html HTTP/1.1\r\n", "index.html", Some(b"x=1")), &config)
            .await
            .unwrap();

        assert_eq!(res.status, HttpStatus::BadRequest);
        assert_eq!(res.body, b"400 page");
    }

    #[async_std::test]
    async fn post_to_params_endpoint() {
        let (_dir, config) = site();
        let head = "POST /params_info.html HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 7\r\n";
        let res = route(&request(head, "params_info.html", Some(b"a=1&b=2")), &config)
            .await
            .unwrap();

        assert_eq!(res.status, HttpStatus::Ok);
        let body = String::from_utf8(res.body).unwrap();
        assert!(body.contains("<li>a: 1</li>\n<li>b: 2</li>"));
    }

    #[async_std::test]
    async fn trace_echoes_raw_request() {
        let (_dir, config) = site();
        let head = "TRACE / HTTP/1.1\r\nContent-Type: text/plain\r\nContent-Length: 4\r\n";
        let res = route(&request(head, "index.html", Some(b"ping")), &config)
            .await
            .unwrap();

        assert_eq!(res.status, HttpStatus::Ok);
        assert_eq!(res.body, format!("{head}\r\nping").into_bytes());
    }

    #[async_std::test]
    async fn unknown_method_is_501_template() {
        let (_dir, config) = site();
        let res = route(&request("PUT /index.html HTTP/1.1\r\n", "index.html", None), &config)
            .await
            .unwrap();

        assert_eq!(res.status, HttpStatus::NotImplemented);
        assert_eq!(res.body, b"501 page");
    }

    #[async_std::test]
    async fn missing_template_is_an_error() {
        let (dir, config) = site();
        std::fs::remove_file(dir.path().join(responses::NOT_FOUND_PAGE)).unwrap();

        assert!(route(&request("GET /nope HTTP/1.1\r\n", "nope", None), &config).await.is_err());
    }
}
