//! 课程内容检索工具
//!
//! search_course_content：按课程名（部分匹配）与课时号过滤，调用课程库统一检索；
//! 命中格式化为 "[课程 - Lesson N]" 头部加块正文，并为每条命中记录一个来源（含课时链接）。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog::CourseStore;
use crate::tools::{Source, Tool, ToolOutput};

pub struct CourseSearchTool {
    store: Arc<dyn CourseStore>,
}

impl CourseSearchTool {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CourseSearchTool {
    fn name(&self) -> &str {
        "search_course_content"
    }

    fn description(&self) -> &str {
        "Search course materials with smart course name matching and lesson filtering"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for in the course content"
                },
                "course_name": {
                    "type": "string",
                    "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                },
                "lesson_number": {
                    "type": "integer",
                    "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, String> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| "Missing required argument: query".to_string())?;
        let course_name = args.get("course_name").and_then(Value::as_str);
        let lesson_number = args
            .get("lesson_number")
            .and_then(Value::as_u64)
            .map(|n| n as u32);

        let hits = match self.store.search(query, course_name, lesson_number) {
            Ok(hits) => hits,
            // 库层错误作为正文回给模型，与检索无果同等处理
            Err(message) => return Ok(ToolOutput::text(message)),
        };

        if hits.is_empty() {
            if self.store.max_results() == 0 {
                return Ok(ToolOutput::text(
                    "Configuration error: max_results is set to 0. No search results can be \
                     returned. Please update [search].max_results to a positive value (e.g., 5).",
                ));
            }
            let mut filter_info = String::new();
            if let Some(name) = course_name {
                filter_info.push_str(&format!(" in course '{}'", name));
            }
            if let Some(number) = lesson_number {
                filter_info.push_str(&format!(" in lesson {}", number));
            }
            return Ok(ToolOutput::text(format!(
                "No relevant content found{}.",
                filter_info
            )));
        }

        let mut formatted = Vec::with_capacity(hits.len());
        let mut sources = Vec::with_capacity(hits.len());
        for hit in hits {
            let mut header = format!("[{}", hit.course_title);
            let mut source_text = hit.course_title.clone();
            if let Some(number) = hit.lesson_number {
                header.push_str(&format!(" - Lesson {}", number));
                source_text.push_str(&format!(" - Lesson {}", number));
            }
            header.push(']');
            formatted.push(format!("{}\n{}", header, hit.text));
            sources.push(Source {
                text: source_text,
                url: hit.lesson_link,
            });
        }

        Ok(ToolOutput {
            content: formatted.join("\n\n"),
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CourseMeta, SearchHit};

    /// 固定命中的课程库替身
    struct StubStore {
        hits: Vec<SearchHit>,
        max_results: usize,
    }

    impl CourseStore for StubStore {
        fn resolve_course(&self, _name: &str) -> Option<CourseMeta> {
            None
        }

        fn search(
            &self,
            _query: &str,
            _course_name: Option<&str>,
            _lesson_number: Option<u32>,
        ) -> Result<Vec<SearchHit>, String> {
            Ok(self.hits.clone())
        }

        fn course_count(&self) -> usize {
            0
        }

        fn course_titles(&self) -> Vec<String> {
            Vec::new()
        }

        fn max_results(&self) -> usize {
            self.max_results
        }
    }

    #[tokio::test]
    async fn test_formats_hits_and_records_sources() {
        let tool = CourseSearchTool::new(Arc::new(StubStore {
            hits: vec![SearchHit {
                course_title: "Intro".to_string(),
                lesson_number: Some(2),
                lesson_link: Some("https://example.com/2".to_string()),
                text: "Lesson two content.".to_string(),
            }],
            max_results: 5,
        }));

        let output = tool
            .execute(serde_json::json!({"query": "content"}))
            .await
            .unwrap();

        assert_eq!(output.content, "[Intro - Lesson 2]\nLesson two content.");
        assert_eq!(output.sources.len(), 1);
        assert_eq!(output.sources[0].text, "Intro - Lesson 2");
        assert_eq!(output.sources[0].url.as_deref(), Some("https://example.com/2"));
    }

    #[tokio::test]
    async fn test_empty_hits_reports_filters() {
        let tool = CourseSearchTool::new(Arc::new(StubStore {
            hits: vec![],
            max_results: 5,
        }));

        let output = tool
            .execute(serde_json::json!({
                "query": "x",
                "course_name": "Intro",
                "lesson_number": 3
            }))
            .await
            .unwrap();

        assert_eq!(
            output.content,
            "No relevant content found in course 'Intro' in lesson 3."
        );
        assert!(output.sources.is_empty());
    }

    #[tokio::test]
    async fn test_zero_max_results_reports_configuration_problem() {
        let tool = CourseSearchTool::new(Arc::new(StubStore {
            hits: vec![],
            max_results: 0,
        }));

        let output = tool.execute(serde_json::json!({"query": "x"})).await.unwrap();
        assert!(output.content.starts_with("Configuration error:"));
    }

    #[tokio::test]
    async fn test_missing_query_is_failure() {
        let tool = CourseSearchTool::new(Arc::new(StubStore {
            hits: vec![],
            max_results: 5,
        }));

        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert_eq!(err, "Missing required argument: query");
    }
}
