//! Static asset fallback.
//!
//! Requests outside the API prefix are handed to an [`AssetStore`]. Its only
//! contract is "serve matching static content or respond 404".

use std::convert::Infallible;
use std::path::Path;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// Collaborator serving everything that is not API traffic.
pub trait AssetStore: Send + Sync {
    fn fetch(&self, request: Request<Body>) -> BoxFuture<'static, Response>;
}

/// Serves files from a directory, `index.html` for directories.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    dir: ServeDir,
}

impl DirectoryAssets {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: ServeDir::new(root).append_index_html_on_directories(true),
        }
    }
}

impl AssetStore for DirectoryAssets {
    fn fetch(&self, request: Request<Body>) -> BoxFuture<'static, Response> {
        self.dir
            .clone()
            .oneshot(request)
            .map(|result: Result<_, Infallible>| match result {
                Ok(response) => response.map(Body::new),
                Err(never) => match never {},
            })
            .boxed()
    }
}

/// Used when no asset directory is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundAssets;

impl AssetStore for NotFoundAssets {
    fn fetch(&self, _request: Request<Body>) -> BoxFuture<'static, Response> {
        async { StatusCode::NOT_FOUND.into_response() }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_directory_serves_files_and_404s() {
        let root = std::env::temp_dir().join(format!("cors-relay-assets-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("index.html"), "<h1>home</h1>").unwrap();

        let assets = DirectoryAssets::new(&root);

        let response = assets.fetch(get("/index.html")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"<h1>home</h1>");

        let response = assets.fetch(get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = assets.fetch(get("/missing.js")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let _ = fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_not_found_assets() {
        let response = NotFoundAssets.fetch(get("/index.html")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
