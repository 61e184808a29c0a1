//! LLM 层：模型客户端抽象与实现（OpenAI 兼容 / Mock）

pub mod message;
pub mod mock;
pub mod openai;
pub mod traits;

pub use message::{ChatMessage, Completion, ContentBlock, Role, StopReason};
pub use mock::MockModelClient;
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{CompletionRequest, ModelClient};
