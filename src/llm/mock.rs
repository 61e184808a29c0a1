//! Mock 模型客户端（用于测试与无 Key 场景）
//!
//! 按脚本顺序弹出预置完成结果；脚本耗尽后回显最后一条用户文本，
//! 便于无 API Key 时本地跑通问答流程。

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{Completion, CompletionRequest, ContentBlock, ModelClient, Role, StopReason};

/// Mock 客户端：可编排完成序列，记录调用次数
#[derive(Debug, Default)]
pub struct MockModelClient {
    scripted: Mutex<VecDeque<Result<Completion, String>>>,
    calls: AtomicUsize,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一串完成结果，complete 按顺序弹出
    pub fn with_script(script: Vec<Result<Completion, String>>) -> Self {
        Self {
            scripted: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// 已发生的 complete 调用次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Ok(mut script) = self.scripted.lock() {
            if let Some(next) = script.pop_front() {
                return next;
            }
        }

        // 脚本耗尽：回显最后一条用户文本
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .and_then(|m| m.content.iter().find_map(ContentBlock::as_text))
            .unwrap_or("(no input)");

        Ok(Completion {
            stop_reason: StopReason::EndTurn,
            content: vec![ContentBlock::text(format!("Echo from Mock: {}", last_user))],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    #[tokio::test]
    async fn test_scripted_then_echo() {
        let mock = MockModelClient::with_script(vec![Ok(Completion {
            stop_reason: StopReason::EndTurn,
            content: vec![ContentBlock::text("scripted")],
        })]);
        let messages = vec![ChatMessage::user("hello")];
        let request = CompletionRequest {
            system: "sys",
            messages: &messages,
            tools: None,
        };

        let first = mock.complete(request).await.unwrap();
        assert_eq!(first.first_text(), Some("scripted"));

        let second = mock.complete(request).await.unwrap();
        assert_eq!(second.first_text(), Some("Echo from Mock: hello"));
        assert_eq!(mock.calls(), 2);
    }
}
