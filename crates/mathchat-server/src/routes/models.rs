use axum::{routing::get, Json, Router};
use mathchat::providers::factory::ProviderType;
use serde::Serialize;
use strum::IntoEnumIterator;

#[derive(Debug, Serialize)]
struct ProviderModels {
    provider: &'static str,
    models: &'static [&'static str],
}

// List every supported provider and the models known to work with it
async fn models_handler() -> Json<Vec<ProviderModels>> {
    Json(
        ProviderType::iter()
            .map(|provider_type| ProviderModels {
                provider: provider_type.name(),
                models: provider_type.known_models(),
            })
            .collect(),
    )
}

// Configure routes for this module
pub fn routes() -> Router {
    Router::new().route("/models", get(models_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_models_route() {
        let app = routes();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/models")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let providers: Vec<&str> = parsed
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["provider"].as_str().unwrap())
            .collect();

        assert!(providers.contains(&"openai"));
        assert!(providers.contains(&"groq"));
        assert!(providers.contains(&"xai"));
        assert_eq!(providers.len(), 5);
    }
}
