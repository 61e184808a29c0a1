//! 对话消息与内容块
//!
//! 消息按 user/assistant 轮次严格交替（user 起始），内容为内容块列表：
//! 文本、模型发起的工具调用、回传的工具结果，与工具调用型 LLM API 的消息结构一致。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 消息角色
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

/// 内容块：文本 / 工具调用请求 / 工具结果
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    /// 模型发起的工具调用；id 用于与结果关联
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    /// 工具结果，tool_use_id 对应发起调用的 id
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// 文本块的内容；其他块返回 None
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// 单条消息：角色 + 内容块列表
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(content)],
        }
    }

    pub fn user_blocks(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    pub fn assistant_blocks(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }
}

/// 完成停止原因：请求工具调用，或正常结束
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    ToolUse,
    EndTurn,
}

/// 一次模型完成：停止原因与有序内容块
#[derive(Clone, Debug)]
pub struct Completion {
    pub stop_reason: StopReason,
    pub content: Vec<ContentBlock>,
}

impl Completion {
    /// 首个文本块的内容
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(ContentBlock::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_skips_tool_blocks() {
        let completion = Completion {
            stop_reason: StopReason::ToolUse,
            content: vec![
                ContentBlock::ToolUse {
                    id: "t1".to_string(),
                    name: "search_course_content".to_string(),
                    input: serde_json::json!({"query": "x"}),
                },
                ContentBlock::text("checking the materials"),
            ],
        };
        assert_eq!(completion.first_text(), Some("checking the materials"));
    }

    #[test]
    fn test_first_text_none_without_text_block() {
        let completion = Completion {
            stop_reason: StopReason::EndTurn,
            content: vec![],
        };
        assert_eq!(completion.first_text(), None);
    }
}
