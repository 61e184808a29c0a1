//! 无头问答运行时
//!
//! 组装课程库、检索工具、会话管理与编排器；ask 对单个问题跑一次编排并维护会话历史。
//! 供 CLI 与 Web API 共用。

use std::path::Path;
use std::sync::Arc;

use crate::catalog::{load_course_folder, ChunkingConfig, CourseLibrary, CourseStore};
use crate::config::AppConfig;
use crate::core::{AgentError, ConversationOrchestrator, RunOutcome};
use crate::llm::{MockModelClient, ModelClient, OpenAiClient};
use crate::session::SessionManager;
use crate::tools::{CourseOutlineTool, CourseSearchTool, Source, ToolRegistry};

/// 课程统计
#[derive(Clone, Debug)]
pub struct CourseAnalytics {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}

/// 问答运行时：编排器、工具注册表、会话与课程库
pub struct QaRuntime {
    orchestrator: ConversationOrchestrator,
    registry: ToolRegistry,
    sessions: SessionManager,
    library: Arc<CourseLibrary>,
}

impl QaRuntime {
    /// 从已构建的课程库与模型客户端组装运行时
    pub fn new(cfg: &AppConfig, client: Arc<dyn ModelClient>, library: Arc<CourseLibrary>) -> Self {
        let store: Arc<dyn CourseStore> = library.clone();
        let mut registry = ToolRegistry::new();
        registry.register(CourseSearchTool::new(store.clone()));
        registry.register(CourseOutlineTool::new(store));

        Self {
            orchestrator: ConversationOrchestrator::new(client),
            registry,
            sessions: SessionManager::new(cfg.search.max_history),
            library,
        }
    }

    /// 装载课程文档目录后组装运行时
    pub fn from_docs_folder(
        cfg: &AppConfig,
        client: Arc<dyn ModelClient>,
    ) -> Result<Self, AgentError> {
        let chunking = ChunkingConfig {
            chunk_chars: cfg.search.chunk_chars,
            chunk_overlap: cfg.search.chunk_overlap,
        };
        let mut library = CourseLibrary::new(cfg.search.max_results);
        for (meta, chunks) in load_course_folder(Path::new(&cfg.app.docs_dir), chunking)? {
            library.add_course(meta, chunks);
        }
        Ok(Self::new(cfg, client, Arc::new(library)))
    }

    /// 回答一个问题：拼接会话历史 → 跑编排 → 记录本轮问答
    pub async fn ask(&self, query: &str, session_id: &str) -> (String, Vec<Source>) {
        let prompt = format!("Answer this question about course materials: {}", query);
        let history = self.sessions.formatted_history(session_id).await;
        let schemas = self.registry.schemas();

        let RunOutcome { answer, sources } = self
            .orchestrator
            .run(
                &prompt,
                history.as_deref(),
                Some(&schemas),
                Some(&self.registry),
            )
            .await;

        self.sessions.add_exchange(session_id, query, &answer).await;
        (answer, sources)
    }

    pub async fn create_session(&self) -> String {
        self.sessions.create_session().await
    }

    pub async fn clear_session(&self, session_id: &str) {
        self.sessions.clear_session(session_id).await;
    }

    pub fn analytics(&self) -> CourseAnalytics {
        CourseAnalytics {
            total_courses: self.library.course_count(),
            course_titles: self.library.course_titles(),
        }
    }
}

/// 根据环境变量选择模型后端（OpenAI 兼容 / Mock）
pub fn create_model_from_config(cfg: &AppConfig) -> Arc<dyn ModelClient> {
    if std::env::var("OPENAI_API_KEY").is_ok() {
        tracing::info!(model = %cfg.llm.model, "Using OpenAI-compatible model client");
        Arc::new(OpenAiClient::new(
            cfg.llm.base_url.as_deref(),
            &cfg.llm.model,
            std::env::var("OPENAI_API_KEY").ok().as_deref(),
        ))
    } else {
        tracing::warn!("No API key set, using Mock model client");
        Arc::new(MockModelClient::new())
    }
}
