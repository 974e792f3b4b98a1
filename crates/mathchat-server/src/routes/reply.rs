use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use mathchat::models::message::Message;
use mathchat::models::role::Role;
use mathchat::normalize::normalize;
use mathchat::prompt_template::render_system_prompt;
use mathchat::providers::base::Usage;
use mathchat::providers::factory;
use mathchat::providers::unify::search_performed;
use mathchat::search::arxiv::ArxivClient;
use mathchat::search::exa::ExaClient;
use mathchat::search::format_results;
use serde::{Deserialize, Serialize};

// Types matching the incoming JSON structure
#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<IncomingMessage>,
    #[serde(default)]
    search: bool,
    #[serde(default)]
    arxiv: bool,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    searched: bool,
    tool_steps: usize,
    usage: Usage,
}

// Convert incoming messages to our internal Message type
fn convert_messages(incoming: Vec<IncomingMessage>) -> Vec<Message> {
    let mut messages = Vec::new();
    for msg in incoming {
        match msg.role.as_str() {
            "user" => messages.push(Message::user(msg.content)),
            "assistant" => messages.push(Message::assistant(msg.content)),
            _ => {
                tracing::warn!("Unknown role: {}", msg.role);
            }
        }
    }
    messages
}

// Best effort: a failed or empty search degrades to answering without context
async fn gather_search_context(state: &AppState, query: &str) -> Option<String> {
    let config = state.exa_config.clone()?;
    let client = match ExaClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build search client: {}", e);
            return None;
        }
    };

    match client.search(query).await {
        Ok(results) if !results.is_empty() => Some(format_results(query, &results)),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("Search failed, continuing without context: {}", e);
            None
        }
    }
}

async fn gather_arxiv_context(state: &AppState, query: &str) -> Option<String> {
    let client = match ArxivClient::new(state.arxiv_config.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build arXiv client: {}", e);
            return None;
        }
    };

    match client.search(query).await {
        Ok(results) if !results.is_empty() => Some(format_results(query, &results)),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("arXiv lookup failed, continuing without context: {}", e);
            None
        }
    }
}

async fn reply_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    let messages = convert_messages(request.messages);
    if messages.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    // The latest user message is the lookup query
    let query = messages
        .iter()
        .rev()
        .find(|message| message.role == Role::User)
        .map(|message| message.content.clone());

    let mut context_blocks = Vec::new();
    if let Some(query) = &query {
        if request.search {
            if state.exa_config.is_some() {
                if let Some(block) = gather_search_context(&state, query).await {
                    context_blocks.push(block);
                }
            } else {
                tracing::warn!("Search requested but no Exa API key is configured");
            }
        }
        if request.arxiv {
            if let Some(block) = gather_arxiv_context(&state, query).await {
                context_blocks.push(block);
            }
        }
    }
    let search_context = if context_blocks.is_empty() {
        None
    } else {
        Some(context_blocks.join("\n"))
    };

    let system = render_system_prompt(search_context.as_deref()).map_err(|e| {
        tracing::error!("Failed to render system prompt: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let provider = factory::get_provider(state.provider_config.clone())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let reply = provider.complete(&system, &messages).await.map_err(|e| {
        tracing::error!("Provider call failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let response = normalize(&reply.message.content);
    let searched = search_context.is_some() || search_performed(&response, &reply.tool_steps);

    Ok(Json(ChatResponse {
        response,
        searched,
        tool_steps: reply.tool_steps.len(),
        usage: reply.usage,
    }))
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    response: String,
}

// simple ask an AI for a response, no history and no search
async fn ask_handler(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, StatusCode> {
    let system = render_system_prompt(None).map_err(|e| {
        tracing::error!("Failed to render system prompt: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let provider = factory::get_provider(state.provider_config.clone())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let reply = provider
        .complete(&system, &[Message::user(request.prompt)])
        .await
        .map_err(|e| {
            tracing::error!("Provider call failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(AskResponse {
        response: normalize(&reply.message.content),
    }))
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/reply", post(reply_handler))
        .route("/ask", post(ask_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use mathchat::providers::configs::{OpenAiProviderConfig, ProviderConfig};
    use mathchat::search::arxiv::ArxivConfig;
    use mathchat::search::exa::ExaConfig;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(provider_host: String, exa_host: Option<String>) -> AppState {
        AppState {
            provider_config: ProviderConfig::OpenAi(OpenAiProviderConfig {
                host: provider_host,
                api_key: "test_api_key".to_string(),
                model: "gpt-4o".to_string(),
                temperature: None,
                max_tokens: None,
            }),
            exa_config: exa_host.map(|host| ExaConfig {
                host,
                api_key: "exa_key".to_string(),
                num_results: 2,
            }),
            arxiv_config: ArxivConfig::default(),
        }
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let parsed = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, parsed)
    }

    #[tokio::test]
    async fn test_reply_normalizes_output() {
        let provider_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "The answer is [ \\boxed{ 42 } ]"
                    }
                }],
                "usage": {"prompt_tokens": 4, "completion_tokens": 6, "total_tokens": 10}
            })))
            .mount(&provider_server)
            .await;

        let app = routes(test_state(provider_server.uri(), None));
        let (status, body) = post_json(
            app,
            "/reply",
            json!({"messages": [{"role": "user", "content": "What is the answer?"}]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "The answer is \\[ \\boxed{42} \\]");
        assert_eq!(body["searched"], false);
        assert_eq!(body["tool_steps"], 0);
        assert_eq!(body["usage"]["total_tokens"], 10);
    }

    #[tokio::test]
    async fn test_reply_with_search() {
        let provider_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "Based on the results..."}
                }]
            })))
            .mount(&provider_server)
            .await;

        let exa_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "title": "A source",
                    "url": "https://example.com",
                    "text": "relevant text"
                }]
            })))
            .mount(&exa_server)
            .await;

        let app = routes(test_state(provider_server.uri(), Some(exa_server.uri())));
        let (status, body) = post_json(
            app,
            "/reply",
            json!({
                "messages": [{"role": "user", "content": "latest results?"}],
                "search": true
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["searched"], true);
    }

    #[tokio::test]
    async fn test_reply_with_arxiv() {
        let provider_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "According to the paper..."}
                }]
            })))
            .mount(&provider_server)
            .await;

        let arxiv_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<feed><entry>\
                 <id>http://arxiv.org/abs/2101.00001v1</id>\
                 <title>Spectral Theory</title>\
                 <summary>An abstract.</summary>\
                 </entry></feed>",
            ))
            .mount(&arxiv_server)
            .await;

        let mut state = test_state(provider_server.uri(), None);
        state.arxiv_config = ArxivConfig {
            host: arxiv_server.uri(),
            max_results: 3,
        };

        let (status, body) = post_json(
            routes(state),
            "/reply",
            json!({
                "messages": [{"role": "user", "content": "spectral theory papers?"}],
                "arxiv": true
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["searched"], true);
    }

    #[tokio::test]
    async fn test_reply_search_failure_degrades() {
        let provider_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "Answer without search."}
                }]
            })))
            .mount(&provider_server)
            .await;

        let exa_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&exa_server)
            .await;

        let app = routes(test_state(provider_server.uri(), Some(exa_server.uri())));
        let (status, body) = post_json(
            app,
            "/reply",
            json!({
                "messages": [{"role": "user", "content": "anything"}],
                "search": true
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["searched"], false);
        assert_eq!(body["response"], "Answer without search.");
    }

    #[tokio::test]
    async fn test_reply_empty_messages_rejected() {
        let app = routes(test_state("http://localhost:9".to_string(), None));
        let (status, _) = post_json(app, "/reply", json!({"messages": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ask_route() {
        let provider_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "Short answer."}
                }]
            })))
            .mount(&provider_server)
            .await;

        let app = routes(test_state(provider_server.uri(), None));
        let (status, body) = post_json(app, "/ask", json!({"prompt": "hi"})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["response"], "Short answer.");
    }
}
