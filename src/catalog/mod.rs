//! 课程库：文档加载、课程目录与内容检索

pub mod loader;
pub mod store;

pub use loader::{load_course_folder, parse_course_document, ChunkingConfig};
pub use store::{CourseChunk, CourseLibrary, CourseMeta, CourseStore, Lesson, SearchHit};
