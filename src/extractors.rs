use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body whose rejections use the common error body (400).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::warn!(error = %rejection.body_text(), "rejected request body");
                Err(AppError::BadRequest(rejection.body_text()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use serde::Deserialize;
    use serde_json::Value;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Named {
        name: String,
    }

    fn app() -> Router {
        Router::new().route(
            "/named",
            post(|JsonBody(body): JsonBody<Named>| async move { body.name }),
        )
    }

    async fn send(body: &'static str, content_type: &str) -> (StatusCode, Vec<u8>) {
        let req = HttpRequest::builder()
            .method("POST")
            .uri("/named")
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn well_formed_body_passes_through() {
        let (status, body) = send(r#"{"name":"Genel"}"#, "application/json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Genel");
    }

    #[tokio::test]
    async fn missing_field_is_a_bad_request_with_the_common_body() {
        let (status, body) = send(r#"{"other":1}"#, "application/json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("name"));
    }

    #[tokio::test]
    async fn wrong_content_type_is_a_bad_request() {
        let (status, _) = send(r#"{"name":"Genel"}"#, "text/plain").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
