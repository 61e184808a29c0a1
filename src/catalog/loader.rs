//! 课程文档加载
//!
//! 解析 docs 目录下的纯文本课程文档：头部元数据行（Course Title / Course Link /
//! Course Instructor），随后按 "Lesson N: 标题" 分课时，课时下可带 "Lesson Link:" 行；
//! 正文按字符上限与分隔符切块（带重叠），供课程库检索使用。

use std::path::Path;

use walkdir::WalkDir;

use crate::catalog::{CourseChunk, CourseMeta, Lesson};
use crate::core::AgentError;

/// 切块参数
#[derive(Clone, Copy, Debug)]
pub struct ChunkingConfig {
    /// 目标块大小（字符数）
    pub chunk_chars: usize,
    /// 相邻块重叠（字符数）
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_chars: 800,
            chunk_overlap: 100,
        }
    }
}

/// 切块时优先断开的分隔符（从高到低）
const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", "! ", "? "];

/// 扫描目录下所有 .txt 课程文档；单个文件读取或解析失败仅告警跳过
pub fn load_course_folder(
    dir: &Path,
    chunking: ChunkingConfig,
) -> Result<Vec<(CourseMeta, Vec<CourseChunk>)>, AgentError> {
    if !dir.is_dir() {
        return Err(AgentError::DocumentLoad(format!(
            "course folder not found: {}",
            dir.display()
        )));
    }

    let mut courses = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| AgentError::DocumentLoad(e.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable course document");
                continue;
            }
        };
        let fallback_title = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Untitled Course");
        match parse_course_document(&text, fallback_title, chunking) {
            Ok(parsed) => {
                tracing::info!(path = %path.display(), course = %parsed.0.title, chunks = parsed.1.len(), "course loaded");
                courses.push(parsed);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unparsable course document");
            }
        }
    }
    Ok(courses)
}

/// 解析单个课程文档；标题缺省时用文件名
pub fn parse_course_document(
    text: &str,
    fallback_title: &str,
    chunking: ChunkingConfig,
) -> Result<(CourseMeta, Vec<CourseChunk>), String> {
    let mut meta = CourseMeta {
        title: fallback_title.to_string(),
        ..Default::default()
    };
    let mut chunks = Vec::new();
    let mut current_lesson: Option<u32> = None;
    let mut buffer = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(value) = trimmed.strip_prefix("Course Title:") {
            meta.title = value.trim().to_string();
        } else if let Some(value) = trimmed.strip_prefix("Course Link:") {
            meta.link = non_empty(value);
        } else if let Some(value) = trimmed.strip_prefix("Course Instructor:") {
            meta.instructor = non_empty(value);
        } else if let Some((number, title)) = parse_lesson_header(trimmed) {
            flush_buffer(&mut chunks, &meta.title, current_lesson, &mut buffer, chunking);
            meta.lessons.push(Lesson {
                number,
                title,
                link: None,
            });
            current_lesson = Some(number);
        } else if let Some(value) = trimmed.strip_prefix("Lesson Link:") {
            if let Some(lesson) = meta.lessons.last_mut() {
                lesson.link = non_empty(value);
            }
        } else if !trimmed.is_empty() {
            if !buffer.is_empty() {
                buffer.push('\n');
            }
            buffer.push_str(trimmed);
        }
    }
    flush_buffer(&mut chunks, &meta.title, current_lesson, &mut buffer, chunking);

    if meta.title.is_empty() {
        return Err("course document has no title".to_string());
    }
    Ok((meta, chunks))
}

/// 解析 "Lesson N: 标题" 行；"Lesson Link:" 等非数字行不匹配
fn parse_lesson_header(line: &str) -> Option<(u32, String)> {
    let rest = line.strip_prefix("Lesson ")?;
    let (number_part, title_part) = rest.split_once(':')?;
    let number = number_part.trim().parse().ok()?;
    Some((number, title_part.trim().to_string()))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// 将累积正文切块后登记到当前课时
fn flush_buffer(
    chunks: &mut Vec<CourseChunk>,
    course_title: &str,
    lesson_number: Option<u32>,
    buffer: &mut String,
    chunking: ChunkingConfig,
) {
    if buffer.trim().is_empty() {
        buffer.clear();
        return;
    }
    for piece in split_chunks(buffer, chunking) {
        chunks.push(CourseChunk {
            course_title: course_title.to_string(),
            lesson_number,
            text: piece,
        });
    }
    buffer.clear();
}

/// 按字符上限切块（UTF-8 安全），优先在分隔符处断开，相邻块带重叠
fn split_chunks(text: &str, chunking: ChunkingConfig) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut pieces = Vec::new();
    if total == 0 || chunking.chunk_chars == 0 {
        return pieces;
    }

    let mut start = 0;
    while start < total {
        let target_end = (start + chunking.chunk_chars).min(total);
        let mut end = target_end;

        // 不在文档末尾时尝试在分隔符处断开
        if target_end < total {
            let window: String = chars[start..target_end].iter().collect();
            for sep in SEPARATORS {
                if let Some(pos) = window.rfind(sep) {
                    let chars_to_sep = window[..pos].chars().count() + sep.chars().count();
                    if chars_to_sep > 0 {
                        end = start + chars_to_sep;
                        break;
                    }
                }
            }
        }

        // 至少前进一个字符
        if end <= start {
            end = (start + 1).min(total);
        }

        let piece: String = chars[start..end].iter().collect();
        let trimmed = piece.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed.to_string());
        }

        let overlap = chunking.chunk_overlap.min(end - start);
        let next_start = end.saturating_sub(overlap);
        start = if next_start > start { next_start } else { end };
    }
    pieces
}
