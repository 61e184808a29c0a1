//! Tutor Web API
//!
//! 启动: cargo run --bin tutor-web --features web
//! 路由：POST /api/query、GET /api/courses、DELETE /api/session/{id}

#![cfg(feature = "web")]

use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use tutor::config::load_config;
use tutor::core::AgentError;
use tutor::runtime::{create_model_from_config, QaRuntime};
use tutor::tools::Source;

/// 问答请求；session_id 缺省时新建会话
#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
    session_id: Option<String>,
}

/// 问答响应：回答、来源与会话 ID
#[derive(Debug, Serialize)]
struct QueryResponse {
    answer: String,
    sources: Vec<Source>,
    session_id: String,
}

/// 课程统计响应
#[derive(Debug, Serialize)]
struct CourseStats {
    total_courses: usize,
    course_titles: Vec<String>,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    status: String,
    message: String,
}

async fn api_query(
    State(runtime): State<Arc<QaRuntime>>,
    Json(request): Json<QueryRequest>,
) -> Json<QueryResponse> {
    let session_id = match request.session_id {
        Some(id) => id,
        None => runtime.create_session().await,
    };
    let (answer, sources) = runtime.ask(&request.query, &session_id).await;
    Json(QueryResponse {
        answer,
        sources,
        session_id,
    })
}

async fn api_courses(State(runtime): State<Arc<QaRuntime>>) -> Json<CourseStats> {
    let analytics = runtime.analytics();
    Json(CourseStats {
        total_courses: analytics.total_courses,
        course_titles: analytics.course_titles,
    })
}

async fn api_session_clear(
    State(runtime): State<Arc<QaRuntime>>,
    Path(session_id): Path<String>,
) -> Json<StatusResponse> {
    runtime.clear_session(&session_id).await;
    Json(StatusResponse {
        status: "success".to_string(),
        message: format!("Session {} cleared", session_id),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tutor::observability::init();

    let cfg = load_config(None).map_err(|e| AgentError::ConfigError(e.to_string()))?;
    let client = create_model_from_config(&cfg);
    let runtime = Arc::new(
        QaRuntime::from_docs_folder(&cfg, client).context("Failed to load course documents")?,
    );

    let app = Router::new()
        .route("/api/query", post(api_query))
        .route("/api/courses", get(api_courses))
        .route("/api/session/:session_id", delete(api_session_clear))
        .with_state(runtime);

    let addr = "127.0.0.1:8080";
    tracing::info!(addr, "tutor-web listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind")?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
