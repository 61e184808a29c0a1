//! 模型客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 ModelClient：complete 接收 system 指令、
//! 交替消息与可选工具 schema，返回结构化完成。失败以 Err(错误文本) 表达，不产生部分响应。

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{ChatMessage, Completion};

/// 一次完成请求
#[derive(Clone, Copy, Debug)]
pub struct CompletionRequest<'a> {
    /// system 指令（含可选的历史对话段落）
    pub system: &'a str,
    /// user/assistant 交替的消息序列
    pub messages: &'a [ChatMessage],
    /// 工具 schema 列表；Some 时请求携带 tools 与自动 tool_choice
    pub tools: Option<&'a [Value]>,
}

/// 模型客户端 trait：非流式完成
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, String>;
}
