//! 会话管理：会话 ID 与对话历史
//!
//! 每会话保留最近 N 轮问答，格式化为 "User: ...\nAssistant: ..." 段落拼入 system 指令。
//! 历史只存于内存；持久化策略归上层所有。

use std::collections::HashMap;

use tokio::sync::RwLock;

/// 单轮问答
#[derive(Clone, Debug)]
struct Exchange {
    user: String,
    assistant: String,
}

/// 会话管理器：会话 ID 分配、历史记录与格式化
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Vec<Exchange>>>,
    max_history: usize,
}

impl SessionManager {
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_history,
        }
    }

    /// 新建会话，返回会话 ID
    pub async fn create_session(&self) -> String {
        let id = format!("session_{}", uuid::Uuid::new_v4());
        self.sessions.write().await.insert(id.clone(), Vec::new());
        id
    }

    /// 追加一轮问答；超出 max_history 时丢弃最旧的
    pub async fn add_exchange(&self, session_id: &str, user: &str, assistant: &str) {
        let mut sessions = self.sessions.write().await;
        let exchanges = sessions.entry(session_id.to_string()).or_default();
        exchanges.push(Exchange {
            user: user.to_string(),
            assistant: assistant.to_string(),
        });
        if exchanges.len() > self.max_history {
            let overflow = exchanges.len() - self.max_history;
            exchanges.drain(..overflow);
        }
    }

    /// 渲染历史为 "User: ...\nAssistant: ..." 段落；无历史返回 None
    pub async fn formatted_history(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        let exchanges = sessions.get(session_id)?;
        if exchanges.is_empty() {
            return None;
        }
        Some(
            exchanges
                .iter()
                .map(|e| format!("User: {}\nAssistant: {}", e.user, e.assistant))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    pub async fn clear_session(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }
}
