//! 对话编排器：有界工具回合循环
//!
//! 单次提问驱动「模型完成 ⇄ 工具执行」的回合序列：构建交替消息、限制回合数、
//! 识别终止条件并在任何失败下降级为可读回答。终止优先级固定：
//! 直接回答 > 无注册表 > 工具执行失败 > 回合上限（上限后追加一次强制完成）。

use std::sync::Arc;

use serde_json::Value;

use crate::llm::{
    ChatMessage, Completion, CompletionRequest, ContentBlock, ModelClient, StopReason,
};
use crate::tools::{Source, ToolRegistry};

/// 单次提问允许的最大工具回合数
pub const MAX_TOOL_ROUNDS: usize = 2;

/// 固定 system 指令：检索与通用知识的分工、多回合工具使用、输出格式约定
const SYSTEM_PROMPT: &str = "\
You are an AI assistant specialized in course materials and educational content with access to \
comprehensive search tools for course information.

Available Tools:
1. **Content Search Tool** - For searching within course materials and lessons
2. **Course Outline Tool** - For retrieving complete course structure and metadata

Tool Usage Guidelines:
- Use the **content search tool** for questions about specific course content or detailed educational materials
- Use the **course outline tool** for questions about course structure, lesson lists, or course metadata
- **You can use tools multiple times** to gather complete information before answering
- **Search iteratively**: If initial results are insufficient or you need to compare information, use tools again with refined parameters
- Example: First get a course outline to identify relevant lessons, then search specific lesson content for details
- Synthesize tool results into accurate, fact-based responses
- If a tool yields no results, state this clearly without offering alternatives

Response Protocol:
- **General knowledge questions**: Answer using existing knowledge without using tools
- **Course content questions**: Use content search tool (multiple times if needed), then answer
- **Course outline questions**: Use course outline tool to retrieve full course details (title, link, lesson list)
- **Multi-part questions**: Use tools sequentially to gather all needed information before answering
- **No meta-commentary**:
 - Provide direct answers only — no reasoning process, tool explanations, or question-type analysis
 - Do not mention \"based on the search results\" or \"using the tool\"

All responses must be:
1. **Brief, Concise and focused** - Get to the point quickly
2. **Educational** - Maintain instructional value
3. **Clear** - Use accessible language
4. **Example-supported** - Include relevant examples when they aid understanding
Provide only the direct answer to what was asked.";

/// 一次编排运行的结果：最终回答与工具执行期间累计的来源
#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub answer: String,
    pub sources: Vec<Source>,
}

/// 一个工具回合的产物：与请求关联的结果块与本回合来源
struct RoundResults {
    results: Vec<ContentBlock>,
    sources: Vec<Source>,
}

/// 对话编排器：持有模型客户端，驱动单次提问的回合循环
pub struct ConversationOrchestrator {
    client: Arc<dyn ModelClient>,
}

impl ConversationOrchestrator {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// 回答一个问题。history 为已格式化的历史对话段落；tools 为工具 schema 列表；
    /// registry 缺省时工具调用请求按「尽力而为」处理（返回完成中的文本）。
    /// 任何运行期失败都折叠为回答文本，本方法不返回错误。
    pub async fn run(
        &self,
        query: &str,
        history: Option<&str>,
        tools: Option<&[Value]>,
        registry: Option<&ToolRegistry>,
    ) -> RunOutcome {
        let system = build_system(history);
        let mut messages = vec![ChatMessage::user(query)];
        let mut sources: Vec<Source> = Vec::new();
        let mut rounds = 0usize;
        let mut current: Option<Completion> = None;

        while rounds < MAX_TOOL_ROUNDS {
            let request = CompletionRequest {
                system: &system,
                messages: &messages,
                tools,
            };
            let completion = match self.client.complete(request).await {
                Ok(completion) => completion,
                Err(e) => {
                    return RunOutcome {
                        answer: format!(
                            "I encountered an error while processing your request: {}",
                            e
                        ),
                        sources,
                    };
                }
            };

            // 终止条件 1：模型直接给出回答
            if completion.stop_reason != StopReason::ToolUse {
                current = Some(completion);
                break;
            }

            // 终止条件 2：请求了工具但没有执行方，返回完成中已有的文本
            let Some(registry) = registry else {
                let answer = extract_text(Some(&completion));
                return RunOutcome { answer, sources };
            };

            // 终止条件 3：工具执行失败，降级回答
            match execute_round(&completion, registry).await {
                Ok(round) => {
                    sources.extend(round.sources);
                    messages.push(ChatMessage::assistant_blocks(completion.content.clone()));
                    messages.push(ChatMessage::user_blocks(round.results));
                    current = Some(completion);
                    rounds += 1;
                }
                Err(e) => {
                    return RunOutcome {
                        answer: degraded_answer(&completion, &e),
                        sources,
                    };
                }
            }
            // 终止条件 4：回合上限由 while 条件收口
        }

        // 回合耗尽但模型仍在请求工具：追加一次完成请求拿最终回答（工具仍然可用）
        let exhausted_on_tool_use = rounds >= MAX_TOOL_ROUNDS
            && current
                .as_ref()
                .is_some_and(|c| c.stop_reason == StopReason::ToolUse);
        if exhausted_on_tool_use {
            let request = CompletionRequest {
                system: &system,
                messages: &messages,
                tools,
            };
            match self.client.complete(request).await {
                Ok(completion) => current = Some(completion),
                Err(e) => {
                    return RunOutcome {
                        answer: format!(
                            "I encountered an error while generating final response: {}",
                            e
                        ),
                        sources,
                    };
                }
            }
        }

        RunOutcome {
            answer: extract_text(current.as_ref()),
            sources,
        }
    }
}

/// system 指令 = 固定块 + 可选的历史对话段落
fn build_system(history: Option<&str>) -> String {
    match history {
        Some(history) => format!("{}\n\nPrevious conversation:\n{}", SYSTEM_PROMPT, history),
        None => SYSTEM_PROMPT.to_string(),
    }
}

/// 按出现顺序执行完成中的全部工具调用块；任何失败即中止，本回合结果整体丢弃
async fn execute_round(
    completion: &Completion,
    registry: &ToolRegistry,
) -> Result<RoundResults, String> {
    let mut results = Vec::new();
    let mut sources = Vec::new();
    for block in &completion.content {
        let ContentBlock::ToolUse { id, name, input } = block else {
            continue;
        };
        let output = registry
            .execute(name, input.clone())
            .await
            .map_err(|e| format!("Tool execution failed: {}", e))?;
        results.push(ContentBlock::ToolResult {
            tool_use_id: id.clone(),
            content: output.content,
        });
        sources.extend(output.sources);
    }
    Ok(RoundResults { results, sources })
}

/// 降级回答：带上模型在请求工具前给出的文本（若有），并附错误注记
fn degraded_answer(completion: &Completion, error: &str) -> String {
    match completion.first_text() {
        Some(text) => format!(
            "{}\n\n[Note: Unable to complete search due to error: {}]",
            text, error
        ),
        None => format!("I encountered an error while searching: {}", error),
    }
}

/// 完成中的首个文本块；完成缺失或无文本块时用固定回退文案
fn extract_text(completion: Option<&Completion>) -> String {
    let Some(completion) = completion else {
        return "I was unable to generate a response.".to_string();
    };
    completion
        .first_text()
        .map(str::to_string)
        .unwrap_or_else(|| "I was unable to generate a text response.".to_string())
}
