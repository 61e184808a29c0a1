//! Tutor - 课程资料问答智能体
//!
//! 模块划分：
//! - **catalog**: 课程库（文档加载、课程目录、内容块检索）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 核心编排层（工具调用回合循环、错误类型）
//! - **llm**: 模型客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **runtime**: 无头问答运行时（供 CLI / Web API 调用）
//! - **session**: 会话 ID 与对话历史
//! - **tools**: 检索工具（课程内容搜索、课程大纲）与注册表

pub mod catalog;
pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod runtime;
pub mod session;
pub mod tools;
