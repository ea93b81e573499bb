use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Response},
};
use std::convert::Infallible;

pub const SERVER_ERROR_MESSAGE: &str = "Something went wrong, please retry later";

/// Page renderer extracted per request.
pub struct Template {
    pub current_path: String,
}

impl Template {
    pub fn render<T: askama::Template>(&self, template: T) -> Response {
        self.render_with_status(StatusCode::OK, template)
    }

    pub fn render_with_status<T: askama::Template>(
        &self,
        status: StatusCode,
        template: T,
    ) -> Response {
        match template.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!(path = %self.current_path, "{err}");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template. Error: {err}"),
                )
                    .into_response()
            }
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Template {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Template {
            current_path: parts.uri.path().to_owned(),
        })
    }
}

#[derive(askama::Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate;

#[derive(askama::Template)]
#[template(path = "500.html")]
pub struct ServerTemplate;

#[derive(askama::Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub status_code: u16,
    pub title: &'a str,
    pub message: &'a str,
}

#[macro_export]
macro_rules! try_page_response {
    ($result:expr, $template:expr) => {
        $crate::try_page_response!(sync: $result.await, $template)
    };

    (sync: $result:expr, $template:expr) => {
        match $result {
            Ok(r) => r,
            Err(err) => {
                tracing::error!("{err}");

                return $template
                    .render_with_status(
                        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                        $crate::template::ServerTemplate,
                    )
                    .into_response();
            }
        }
    };
}
