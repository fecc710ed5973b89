//! services/api/src/bin/api.rs

use api_lib::{
    adapters::completion::OpenAiCompletionAdapter,
    config::Config,
    error::ApiError,
    prompts,
    web::{
        ask_question_handler, clear_history_handler, generate_quiz_handler, get_chat_handler,
        get_history_handler, record_answer_handler, rest::ApiDoc, state::AppState,
        submit_quiz_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load the Course Material Context ---
    let context = match &config.context_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => {
                info!(path = %path.display(), chars = text.len(), "Loaded course material");
                text
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Could not read course material; using the built-in context"
                );
                prompts::FALLBACK_CONTEXT.to_string()
            }
        },
        None => prompts::FALLBACK_CONTEXT.to_string(),
    };

    // --- 3. Initialize the Completion Adapter ---
    let openai_config = OpenAIConfig::new()
        .with_api_base(&config.completion_base_url)
        .with_api_key(&config.completion_api_key);
    let openai_client = Client::with_config(openai_config);
    let completion_adapter = Arc::new(OpenAiCompletionAdapter::new(
        openai_client,
        config.quiz_model.clone(),
    ));
    info!(
        base_url = %config.completion_base_url,
        model = %config.quiz_model,
        "Completion adapter ready"
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), completion_adapter, context));

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().map_err(|e| {
            ApiError::Internal(format!("Invalid CORS origin: {e}"))
        })?)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/quiz", post(generate_quiz_handler))
        .route("/quiz/answers", post(record_answer_handler))
        .route("/quiz/submit", post(submit_quiz_handler))
        .route("/ask", post(ask_question_handler))
        .route("/chat", get(get_chat_handler))
        .route(
            "/history",
            get(get_history_handler).delete(clear_history_handler),
        )
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
