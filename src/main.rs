use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use spectro_backend::{
    config::Config,
    routes,
    services::{
        chatbot::ChatService, knowledge::KnowledgeBase, matcher::KeywordMatcher,
        provider::ProviderClient,
    },
    state::AppState,
};

const CONVERSATION_TTL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let knowledge = Arc::new(KnowledgeBase::load(&config.knowledge_base_path)?);
    let provider = ProviderClient::from_config(&config)?;

    tracing::info!(lessons = knowledge.len(), "knowledge base loaded");
    match &provider {
        Some(client) => tracing::info!(model = client.model(), "provider configured"),
        None => tracing::info!("no provider key set, answering from the knowledge base only"),
    }
    if let (Some(bucket), Some(region)) = (&config.aws_s3_bucket, &config.aws_region) {
        tracing::info!(%bucket, %region, "course assets hosted externally");
    }

    let chat = ChatService::new(
        Arc::clone(&knowledge),
        Box::new(KeywordMatcher::new()),
        provider.clone(),
    );
    let state = Arc::new(AppState::new(
        chat,
        provider,
        config.admin_api_key.clone(),
        CONVERSATION_TTL,
    ));

    let cors = CorsLayer::very_permissive();
    let app = routes::create_router(state).layer(cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "chatbot backend listening");
    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
