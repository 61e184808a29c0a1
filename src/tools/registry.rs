//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），
//! 由 ToolRegistry 按名注册与查找。工具结果为类型化 ToolOutput（正文 + 来源列表），
//! 失败经 Result 传递；旧式 "Error:" 前缀正文仅在注册表出口做一次兼容转换。

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 旧式工具错误前缀（模型侧文本约定）
const ERROR_SENTINEL: &str = "Error:";

/// 检索来源：展示文本与可选链接，随工具结果一并返回给调用方
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// 工具执行结果：回传给模型的正文与本次检索产生的来源
#[derive(Clone, Debug, Default)]
pub struct ToolOutput {
    pub content: String,
    pub sources: Vec<Source>,
}

impl ToolOutput {
    /// 仅有正文、无来源的结果
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sources: Vec::new(),
        }
    }
}

/// 工具 trait：名称、描述（供模型理解）、参数 schema、异步执行（args 为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（模型工具调用中的 name）
    fn name(&self) -> &str;

    /// 工具描述（供模型理解功能）
    fn description(&self) -> &str;

    /// 参数 JSON Schema（驱动模型生成结构化工具调用）
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 执行工具
    async fn execute(&self, args: Value) -> Result<ToolOutput, String>;
}

/// 工具注册表：按名称查找与执行，schema 列表驱动模型的工具选择
#[derive(Default)]
pub struct ToolRegistry {
    // 注册顺序即 schema 顺序，保证同一输入多次运行发出相同请求
    tools: Vec<(String, Arc<dyn Tool>)>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工具；同名工具覆盖旧注册
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.retain(|(existing, _)| existing != &name);
        self.tools.push((name, Arc::new(tool)));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, tool)| tool.clone())
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|(name, _)| name.clone()).collect()
    }

    /// 按名执行；未注册的工具名与 "Error:" 前缀正文均按失败处理，每次调用输出审计日志
    pub async fn execute(&self, name: &str, args: Value) -> Result<ToolOutput, String> {
        let Some(tool) = self.get(name) else {
            return Err(format!("Tool '{}' not found", name));
        };

        let start = Instant::now();
        let args_preview = args_preview(&args);
        let result = tool.execute(args).await;
        let ok = matches!(&result, Ok(output) if !output.content.starts_with(ERROR_SENTINEL));
        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(tool = name, ok, duration_ms, args_preview = %args_preview, "tool dispatch");

        let output = result?;
        // 兼容旧式约定：正文以 "Error:" 开头的结果按失败处理
        if output.content.starts_with(ERROR_SENTINEL) {
            return Err(output.content);
        }
        Ok(output)
    }

    /// 所有工具的 schema（{name, description, parameters}），供模型生成结构化工具调用
    pub fn schemas(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|(name, tool)| {
                serde_json::json!({
                    "name": name,
                    "description": tool.description(),
                    "parameters": tool.parameters_schema(),
                })
            })
            .collect()
    }
}

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTool {
        name: &'static str,
        content: &'static str,
    }

    #[async_trait]
    impl Tool for FixedTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "fixed test tool"
        }

        async fn execute(&self, _args: Value) -> Result<ToolOutput, String> {
            Ok(ToolOutput::text(self.content))
        }
    }

    #[tokio::test]
    async fn test_execute_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(FixedTool {
            name: "alpha",
            content: "alpha result",
        });

        let output = registry
            .execute("alpha", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(output.content, "alpha result");
        assert!(output.sources.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_failure() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute("missing", serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(err, "Tool 'missing' not found");
    }

    #[tokio::test]
    async fn test_error_prefixed_content_becomes_failure() {
        let mut registry = ToolRegistry::new();
        registry.register(FixedTool {
            name: "broken",
            content: "Error: index unavailable",
        });

        let err = registry
            .execute("broken", serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(err, "Error: index unavailable");
    }

    #[test]
    fn test_schemas_preserve_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(FixedTool {
            name: "first",
            content: "",
        });
        registry.register(FixedTool {
            name: "second",
            content: "",
        });

        let schemas = registry.schemas();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0]["name"], "first");
        assert_eq!(schemas[1]["name"], "second");
        assert_eq!(schemas[0]["parameters"]["type"], "object");
    }

    #[test]
    fn test_register_same_name_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(FixedTool {
            name: "dup",
            content: "old",
        });
        registry.register(FixedTool {
            name: "dup",
            content: "new",
        });
        assert_eq!(registry.tool_names(), vec!["dup".to_string()]);
    }
}
