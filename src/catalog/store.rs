//! 课程库：课程目录与内容块检索
//!
//! 目录保存课程元数据（标题、链接、讲师、课时列表），内容块按课程/课时打标签；
//! 检索用小写字母数字词元的重叠评分（Jaccard）。查询侧只依赖 CourseStore trait，
//! 便于以向量检索后端替换本实现。

use std::collections::HashSet;

/// 单个课时
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lesson {
    pub number: u32,
    pub title: String,
    pub link: Option<String>,
}

/// 课程元数据
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CourseMeta {
    pub title: String,
    pub link: Option<String>,
    pub instructor: Option<String>,
    pub lessons: Vec<Lesson>,
}

impl CourseMeta {
    /// 指定课时的链接
    pub fn lesson_link(&self, number: u32) -> Option<&str> {
        self.lessons
            .iter()
            .find(|lesson| lesson.number == number)
            .and_then(|lesson| lesson.link.as_deref())
    }
}

/// 内容块：归属课程与可选课时
#[derive(Clone, Debug)]
pub struct CourseChunk {
    pub course_title: String,
    pub lesson_number: Option<u32>,
    pub text: String,
}

/// 检索命中
#[derive(Clone, Debug)]
pub struct SearchHit {
    pub course_title: String,
    pub lesson_number: Option<u32>,
    pub lesson_link: Option<String>,
    pub text: String,
}

/// 课程库查询接口（检索工具的消费面）
pub trait CourseStore: Send + Sync {
    /// 按完整或部分名称解析课程（大小写不敏感）
    fn resolve_course(&self, name: &str) -> Option<CourseMeta>;

    /// 统一检索：按课程名与课时号过滤后取相关度最高的块
    fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> Result<Vec<SearchHit>, String>;

    fn course_count(&self) -> usize;

    fn course_titles(&self) -> Vec<String>;

    /// 配置的单次检索返回上限
    fn max_results(&self) -> usize;
}

/// 内存课程库
pub struct CourseLibrary {
    courses: Vec<CourseMeta>,
    chunks: Vec<CourseChunk>,
    max_results: usize,
}

impl CourseLibrary {
    pub fn new(max_results: usize) -> Self {
        Self {
            courses: Vec::new(),
            chunks: Vec::new(),
            max_results,
        }
    }

    /// 登记一门课程及其内容块；同名课程先删除旧版本
    pub fn add_course(&mut self, meta: CourseMeta, chunks: Vec<CourseChunk>) {
        self.chunks.retain(|chunk| chunk.course_title != meta.title);
        self.courses.retain(|course| course.title != meta.title);
        self.chunks.extend(chunks);
        self.courses.push(meta);
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

impl CourseStore for CourseLibrary {
    fn resolve_course(&self, name: &str) -> Option<CourseMeta> {
        let needle = name.to_lowercase();
        // 先精确再子串，避免部分名称命中多门课程时取错
        self.courses
            .iter()
            .find(|course| course.title.to_lowercase() == needle)
            .or_else(|| {
                self.courses
                    .iter()
                    .find(|course| course.title.to_lowercase().contains(&needle))
            })
            .cloned()
    }

    fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> Result<Vec<SearchHit>, String> {
        let course = match course_name {
            Some(name) => match self.resolve_course(name) {
                Some(course) => Some(course),
                None => return Err(format!("No course found matching '{}'", name)),
            },
            None => None,
        };

        let query_tokens = tokenize(query);
        let mut scored: Vec<(f32, &CourseChunk)> = self
            .chunks
            .iter()
            .filter(|chunk| {
                course
                    .as_ref()
                    .map_or(true, |c| chunk.course_title == c.title)
            })
            .filter(|chunk| lesson_number.map_or(true, |n| chunk.lesson_number == Some(n)))
            .map(|chunk| (jaccard_similarity(&query_tokens, &tokenize(&chunk.text)), chunk))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(self.max_results)
            .map(|(_, chunk)| {
                let lesson_link = chunk.lesson_number.and_then(|number| {
                    self.courses
                        .iter()
                        .find(|course| course.title == chunk.course_title)
                        .and_then(|course| course.lesson_link(number).map(str::to_string))
                });
                SearchHit {
                    course_title: chunk.course_title.clone(),
                    lesson_number: chunk.lesson_number,
                    lesson_link,
                    text: chunk.text.clone(),
                }
            })
            .collect())
    }

    fn course_count(&self) -> usize {
        self.courses.len()
    }

    fn course_titles(&self) -> Vec<String> {
        self.courses
            .iter()
            .map(|course| course.title.clone())
            .collect()
    }

    fn max_results(&self) -> usize {
        self.max_results
    }
}

/// 小写字母数字词元集合（过滤单字符词元）
fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() >= 2)
        .map(str::to_string)
        .collect()
}

/// Jaccard 相似度
fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f32;
    let union = a.union(b).count() as f32;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}
