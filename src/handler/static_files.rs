use std::io;
use std::path::Path;

use async_std::fs;
use async_std::path::PathBuf;

use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;

/// The content categories a static file can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Icon,
    Image,
    Html,
    Other,
}

/// Reads the regular file at `root/relative` into a 200 response.
///
/// Returns `Ok(None)` when there is no regular file at that path.
pub async fn serve(root: &Path, relative: &Path) -> io::Result<Option<HttpResponse>> {
    let full_path: PathBuf = root.join(relative).into();

    match fs::metadata(&full_path).await {
        Ok(meta) if meta.is_file() => {}
        _ => {
            tracing::debug!(path = %full_path.display(), "no such file");
            return Ok(None);
        }
    }

    let body = fs::read(&full_path).await?;
    tracing::debug!(path = %full_path.display(), bytes = body.len(), "serving static file");

    Ok(Some(HttpResponse::with_content(
        HttpStatus::Ok,
        guess_mime(relative),
        body,
    )))
}

pub fn classify(path: &Path) -> FileKind {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("ico") => FileKind::Icon,
        Some("bmp") | Some("gif") | Some("png") | Some("jpg") => FileKind::Image,
        Some("html") => FileKind::Html,
        _ => FileKind::Other,
    }
}

fn guess_mime(path: &Path) -> &'static str {
    match classify(path) {
        FileKind::Icon => "image/x-icon",
        FileKind::Image => match path.extension().and_then(|ext| ext.to_str()) {
            Some("bmp") => "image/bmp",
            Some("gif") => "image/gif",
            Some("png") => "image/png",
            _ => "image/jpeg",
        },
        FileKind::Html => "text/html",
        FileKind::Other => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_by_extension() {
        assert_eq!(classify(Path::new("favicon.ico")), FileKind::Icon);
        assert_eq!(classify(Path::new("a/b.png")), FileKind::Image);
        assert_eq!(classify(Path::new("photo.jpg")), FileKind::Image);
        assert_eq!(classify(Path::new("index.html")), FileKind::Html);
        assert_eq!(classify(Path::new("page.htm")), FileKind::Other);
        assert_eq!(classify(Path::new("README")), FileKind::Other);
    }

    #[test]
    fn mime_per_kind() {
        assert_eq!(guess_mime(Path::new("x.gif")), "image/gif");
        assert_eq!(guess_mime(Path::new("x.jpg")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("x.ico")), "image/x-icon");
        assert_eq!(guess_mime(Path::new("x.css")), "application/octet-stream");
    }

    #[async_std::test]
    async fn serves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();

        let res = serve(dir.path(), Path::new("logo.png")).await.unwrap().unwrap();
        assert_eq!(res.status, HttpStatus::Ok);
        assert_eq!(res.headers.get("Content-Type"), Some(&"image/png".to_string()));
        assert_eq!(res.headers.get("Content-Length"), Some(&"4".to_string()));
        assert_eq!(res.body, [0x89, b'P', b'N', b'G']);
    }

    #[async_std::test]
    async fn missing_file_and_directory_are_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        assert!(serve(dir.path(), Path::new("nope.html")).await.unwrap().is_none());
        assert!(serve(dir.path(), Path::new("sub")).await.unwrap().is_none());
        assert!(serve(dir.path(), Path::new("")).await.unwrap().is_none());
    }
}
