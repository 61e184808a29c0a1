//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；
//! 使用原生工具调用接口：请求携带 tools 与自动 tool_choice，
//! 响应的 tool_calls 映射为 ToolUse 内容块，finish_reason 映射为停止原因。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolChoiceOption,
    ChatCompletionTools, CreateChatCompletionRequestArgs, FinishReason, FunctionCall,
    FunctionObjectArgs, ToolChoiceOptions,
};
use async_openai::Client;
use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{
    ChatMessage, Completion, CompletionRequest, ContentBlock, ModelClient, Role, StopReason,
};

/// 固定采样参数：确定性输出（温度 0）与回答长度上限
const TEMPERATURE: f32 = 0.0;
const MAX_COMPLETION_TOKENS: u32 = 800;

/// Token 使用统计（累计值）
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: Arc<AtomicU64>,
    pub completion_tokens: Arc<AtomicU64>,
    pub total_tokens: Arc<AtomicU64>,
}

impl TokenUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, prompt: u64, completion: u64) {
        self.prompt_tokens.fetch_add(prompt, Ordering::Relaxed);
        self.completion_tokens.fetch_add(completion, Ordering::Relaxed);
        self.total_tokens.fetch_add(prompt + completion, Ordering::Relaxed);
    }

    pub fn get(&self) -> (u64, u64, u64) {
        (
            self.prompt_tokens.load(Ordering::Relaxed),
            self.completion_tokens.load(Ordering::Relaxed),
            self.total_tokens.load(Ordering::Relaxed),
        )
    }
}

/// OpenAI 兼容客户端：持有 Client 与 model 名，complete 时转消息与工具 schema 为 API 格式
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    /// 累计 token 使用统计
    pub usage: TokenUsage,
}

impl OpenAiClient {
    pub fn new(base_url: Option<&str>, model: &str, api_key: Option<&str>) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "sk-placeholder".to_string());

        let config = if let Some(url) = base_url {
            OpenAIConfig::new().with_api_base(url).with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            usage: TokenUsage::new(),
        }
    }

    /// 获取累计 token 使用统计
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.usage.get()
    }

    fn to_api_messages(
        &self,
        system: &str,
        messages: &[ChatMessage],
    ) -> Vec<ChatCompletionRequestMessage> {
        let mut api = Vec::with_capacity(messages.len() + 1);
        api.push(ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system.to_string())
                .build()
                .unwrap(),
        ));
        for message in messages {
            match message.role {
                Role::User => push_user_turn(&mut api, message),
                Role::Assistant => push_assistant_turn(&mut api, message),
            }
        }
        api
    }
}

/// user 轮：工具结果块逐个转为 tool 消息，文本块合并为一条 user 消息
fn push_user_turn(api: &mut Vec<ChatCompletionRequestMessage>, message: &ChatMessage) {
    let mut texts: Vec<&str> = Vec::new();
    for block in &message.content {
        match block {
            ContentBlock::Text { text } => texts.push(text),
            ContentBlock::ToolResult {
                tool_use_id,
                content,
            } => {
                api.push(ChatCompletionRequestMessage::Tool(
                    ChatCompletionRequestToolMessageArgs::default()
                        .tool_call_id(tool_use_id.clone())
                        .content(content.clone())
                        .build()
                        .unwrap(),
                ));
            }
            ContentBlock::ToolUse { .. } => {}
        }
    }
    if !texts.is_empty() {
        api.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(texts.join("\n"))
                .build()
                .unwrap(),
        ));
    }
}

/// assistant 轮：文本合并为 content，ToolUse 块转为 tool_calls
fn push_assistant_turn(api: &mut Vec<ChatCompletionRequestMessage>, message: &ChatMessage) {
    let mut texts: Vec<&str> = Vec::new();
    let mut tool_calls = Vec::new();
    for block in &message.content {
        match block {
            ContentBlock::Text { text } => texts.push(text),
            ContentBlock::ToolUse { id, name, input } => {
                tool_calls.push(ChatCompletionMessageToolCalls::Function(
                    ChatCompletionMessageToolCall {
                        id: id.clone(),
                        function: FunctionCall {
                            name: name.clone(),
                            arguments: input.to_string(),
                        },
                    },
                ));
            }
            ContentBlock::ToolResult { .. } => {}
        }
    }
    let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
    if !texts.is_empty() {
        builder.content(texts.join("\n"));
    }
    if !tool_calls.is_empty() {
        builder.tool_calls(tool_calls);
    }
    api.push(ChatCompletionRequestMessage::Assistant(
        builder.build().unwrap(),
    ));
}

/// 工具 schema（{name, description, parameters}）转 API tools 参数
fn to_api_tools(schemas: &[Value]) -> Result<Vec<ChatCompletionTools>, String> {
    let mut tools = Vec::with_capacity(schemas.len());
    for schema in schemas {
        let mut function = FunctionObjectArgs::default();
        function.name(
            schema
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        );
        if let Some(description) = schema.get("description").and_then(Value::as_str) {
            function.description(description.to_string());
        }
        if let Some(parameters) = schema.get("parameters") {
            function.parameters(parameters.clone());
        }
        let tool = ChatCompletionTool {
            function: function.build().map_err(|e| e.to_string())?,
        };
        tools.push(ChatCompletionTools::Function(tool));
    }
    Ok(tools)
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, String> {
        let messages = self.to_api_messages(request.system, request.messages);

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .temperature(TEMPERATURE)
            .max_completion_tokens(MAX_COMPLETION_TOKENS)
            .messages(messages);
        if let Some(schemas) = request.tools {
            builder.tools(to_api_tools(schemas)?);
            builder.tool_choice(ChatCompletionToolChoiceOption::Mode(ToolChoiceOptions::Auto));
        }
        let api_request = builder.build().map_err(|e| e.to_string())?;

        let response = self
            .client
            .chat()
            .create(api_request)
            .await
            .map_err(|e| e.to_string())?;

        if let Some(usage) = &response.usage {
            self.usage
                .add(usage.prompt_tokens as u64, usage.completion_tokens as u64);
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "empty completion: no choices returned".to_string())?;

        let mut content = Vec::new();
        if let Some(text) = choice.message.content {
            if !text.is_empty() {
                content.push(ContentBlock::Text { text });
            }
        }
        let mut requested_tools = false;
        if let Some(calls) = choice.message.tool_calls {
            for call in calls {
                requested_tools = true;
                let (id, name, arguments) = match call {
                    ChatCompletionMessageToolCalls::Function(f) => {
                        (f.id, f.function.name, f.function.arguments)
                    }
                    ChatCompletionMessageToolCalls::Custom(c) => {
                        (c.id, c.custom_tool.name, c.custom_tool.input)
                    }
                };
                // 参数解析失败时回退为空对象，由工具侧报缺参
                let input = serde_json::from_str(&arguments)
                    .unwrap_or(Value::Object(serde_json::Map::new()));
                content.push(ContentBlock::ToolUse { id, name, input });
            }
        }

        let stop_reason = if requested_tools || choice.finish_reason == Some(FinishReason::ToolCalls)
        {
            StopReason::ToolUse
        } else {
            StopReason::EndTurn
        };

        Ok(Completion {
            stop_reason,
            content,
        })
    }
}
