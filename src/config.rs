//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `TUTOR__*` 覆盖（双下划线表示嵌套，
//! 如 `TUTOR__LLM__MODEL=gpt-4o`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub search: SearchSection,
}

/// [app] 段：应用名与课程文档目录
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 课程文档目录，未设置时用 ./docs
    pub docs_dir: String,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            docs_dir: "./docs".to_string(),
        }
    }
}

/// [llm] 段：模型名与端点
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub model: String,
    /// OpenAI 兼容端点；未设置时用官方端点
    pub base_url: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: None,
        }
    }
}

/// [search] 段：检索上限、历史轮数与切块参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// 单次检索返回的最大块数
    pub max_results: usize,
    /// 会话历史保留轮数
    pub max_history: usize,
    /// 切块字符上限
    pub chunk_chars: usize,
    /// 相邻块重叠字符数
    pub chunk_overlap: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            max_results: 5,
            max_history: 2,
            chunk_chars: 800,
            chunk_overlap: 100,
        }
    }
}

/// 从 config 目录加载配置，环境变量 TUTOR__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 TUTOR__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("TUTOR")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.app.docs_dir, "./docs");
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.search.max_results, 5);
        assert_eq!(cfg.search.max_history, 2);
        assert!(cfg.search.chunk_chars > cfg.search.chunk_overlap);
    }
}
