//! 问答集成测试
//!
//! 用脚本化 Mock 模型与临时课程目录，验证从文档装载到一次工具回合问答的完整链路。

use std::sync::Arc;

use tutor::config::AppConfig;
use tutor::llm::{Completion, ContentBlock, MockModelClient, StopReason};
use tutor::runtime::QaRuntime;

const COURSE_DOC: &str = "\
Course Title: Intro to Testing
Course Link: https://example.com/intro
Course Instructor: Ada

Lesson 0: Welcome
Lesson Link: https://example.com/intro/lesson-0
Welcome content about the basics of test design.

Lesson 2: Fixtures and Mocks
Lesson Link: https://example.com/intro/lesson-2
Fixtures isolate collaborators. Mocks script completions deterministically.
";

fn docs_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("intro.txt"), COURSE_DOC).unwrap();
    dir
}

fn config_for(dir: &tempfile::TempDir) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.app.docs_dir = dir.path().to_string_lossy().into_owned();
    cfg
}

#[tokio::test]
async fn test_tool_round_answers_with_sources() {
    let dir = docs_dir();
    let cfg = config_for(&dir);

    let client = Arc::new(MockModelClient::with_script(vec![
        Ok(Completion {
            stop_reason: StopReason::ToolUse,
            content: vec![ContentBlock::ToolUse {
                id: "call_1".to_string(),
                name: "search_course_content".to_string(),
                input: serde_json::json!({
                    "query": "fixtures mocks",
                    "course_name": "Intro",
                    "lesson_number": 2
                }),
            }],
        }),
        Ok(Completion {
            stop_reason: StopReason::EndTurn,
            content: vec![ContentBlock::text(
                "Lesson 2 introduces fixtures and mocks.",
            )],
        }),
    ]));

    let runtime = QaRuntime::from_docs_folder(&cfg, client.clone()).unwrap();
    let session_id = runtime.create_session().await;

    let (answer, sources) = runtime
        .ask("Summarize lesson 2 of the Intro course", &session_id)
        .await;

    assert_eq!(answer, "Lesson 2 introduces fixtures and mocks.");
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].text, "Intro to Testing - Lesson 2");
    assert_eq!(
        sources[0].url.as_deref(),
        Some("https://example.com/intro/lesson-2")
    );
    // 一个工具回合 + 最终回答
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn test_echo_mock_answers_without_tools() {
    let dir = docs_dir();
    let cfg = config_for(&dir);

    // 无脚本 Mock：直接回显，不触发工具回合
    let runtime = QaRuntime::from_docs_folder(&cfg, Arc::new(MockModelClient::new())).unwrap();
    let session_id = runtime.create_session().await;

    let (answer, sources) = runtime.ask("What is covered in lesson 0?", &session_id).await;

    assert!(answer.starts_with("Echo from Mock:"));
    assert!(answer.contains("What is covered in lesson 0?"));
    assert!(sources.is_empty());
}

#[tokio::test]
async fn test_analytics_reflect_loaded_courses() {
    let dir = docs_dir();
    let cfg = config_for(&dir);

    let runtime = QaRuntime::from_docs_folder(&cfg, Arc::new(MockModelClient::new())).unwrap();
    let analytics = runtime.analytics();

    assert_eq!(analytics.total_courses, 1);
    assert_eq!(analytics.course_titles, vec!["Intro to Testing".to_string()]);
}

#[tokio::test]
async fn test_missing_docs_folder_fails_startup() {
    let mut cfg = AppConfig::default();
    cfg.app.docs_dir = "./no-such-docs-folder".to_string();

    let result = QaRuntime::from_docs_folder(&cfg, Arc::new(MockModelClient::new()));
    assert!(result.is_err());
}
