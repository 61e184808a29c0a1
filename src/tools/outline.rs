//! 课程大纲工具
//!
//! get_course_outline：按完整或部分名称解析课程，输出标题、讲师、链接与编号课时列表。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog::CourseStore;
use crate::tools::{Tool, ToolOutput};

pub struct CourseOutlineTool {
    store: Arc<dyn CourseStore>,
}

impl CourseOutlineTool {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for CourseOutlineTool {
    fn name(&self) -> &str {
        "get_course_outline"
    }

    fn description(&self) -> &str {
        "Get the complete outline for a course including title, link, and all lessons"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "course_name": {
                    "type": "string",
                    "description": "Course title or partial name to get outline for (e.g. 'MCP', 'Introduction')"
                }
            },
            "required": ["course_name"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, String> {
        let course_name = args
            .get("course_name")
            .and_then(Value::as_str)
            .ok_or_else(|| "Missing required argument: course_name".to_string())?;

        let Some(course) = self.store.resolve_course(course_name) else {
            // 未命中作为正文回给模型，让其直接告知用户
            return Ok(ToolOutput::text(format!(
                "No course found matching '{}'",
                course_name
            )));
        };

        let mut lines = vec![
            format!("Course: {}", course.title),
            format!(
                "Instructor: {}",
                course.instructor.as_deref().unwrap_or("Unknown")
            ),
            format!(
                "Course Link: {}",
                course.link.as_deref().unwrap_or("No link available")
            ),
            String::new(),
            "Lessons:".to_string(),
        ];

        if course.lessons.is_empty() {
            lines.push("  No lessons available".to_string());
        } else {
            for lesson in &course.lessons {
                let mut line = format!("  {}. {}", lesson.number, lesson.title);
                if let Some(link) = &lesson.link {
                    line.push_str(&format!(" ({})", link));
                }
                lines.push(line);
            }
        }

        Ok(ToolOutput::text(lines.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CourseMeta, Lesson, SearchHit};

    struct StubStore {
        course: Option<CourseMeta>,
    }

    impl CourseStore for StubStore {
        fn resolve_course(&self, _name: &str) -> Option<CourseMeta> {
            self.course.clone()
        }

        fn search(
            &self,
            _query: &str,
            _course_name: Option<&str>,
            _lesson_number: Option<u32>,
        ) -> Result<Vec<SearchHit>, String> {
            Ok(Vec::new())
        }

        fn course_count(&self) -> usize {
            0
        }

        fn course_titles(&self) -> Vec<String> {
            Vec::new()
        }

        fn max_results(&self) -> usize {
            5
        }
    }

    #[tokio::test]
    async fn test_outline_lists_lessons_with_links() {
        let tool = CourseOutlineTool::new(Arc::new(StubStore {
            course: Some(CourseMeta {
                title: "Intro to MCP".to_string(),
                link: Some("https://example.com/mcp".to_string()),
                instructor: Some("Lin".to_string()),
                lessons: vec![
                    Lesson {
                        number: 0,
                        title: "Overview".to_string(),
                        link: Some("https://example.com/mcp/0".to_string()),
                    },
                    Lesson {
                        number: 1,
                        title: "Servers".to_string(),
                        link: None,
                    },
                ],
            }),
        }));

        let output = tool
            .execute(serde_json::json!({"course_name": "MCP"}))
            .await
            .unwrap();

        let expected = "Course: Intro to MCP\n\
                        Instructor: Lin\n\
                        Course Link: https://example.com/mcp\n\
                        \n\
                        Lessons:\n  0. Overview (https://example.com/mcp/0)\n  1. Servers";
        assert_eq!(output.content, expected);
        assert!(output.sources.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_course_is_plain_content() {
        let tool = CourseOutlineTool::new(Arc::new(StubStore { course: None }));
        let output = tool
            .execute(serde_json::json!({"course_name": "Nope"}))
            .await
            .unwrap();
        assert_eq!(output.content, "No course found matching 'Nope'");
    }

    #[tokio::test]
    async fn test_missing_course_name_is_failure() {
        let tool = CourseOutlineTool::new(Arc::new(StubStore { course: None }));
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert_eq!(err, "Missing required argument: course_name");
    }
}
