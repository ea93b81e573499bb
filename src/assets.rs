use axum::{
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "static/"]
struct Assets;

/// GET /static/{*path}
pub async fn serve(Path(path): Path<String>) -> Response {
    match Assets::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();

            (
                [(header::CONTENT_TYPE, mime.as_ref().to_owned())],
                content.data,
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_embedded_script() {
        let response = serve(Path("js/toggle.js".to_owned())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.contains("javascript"));
    }

    #[tokio::test]
    async fn test_unknown_asset_is_not_found() {
        let response = serve(Path("js/missing.js".to_owned())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
