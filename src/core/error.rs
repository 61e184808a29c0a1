//! 库层错误类型
//!
//! 编排器不向调用方抛错（所有运行期失败折叠为回答文本），
//! 此处的错误覆盖配置加载与课程文档装载等启动路径。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Document load error: {0}")]
    DocumentLoad(String),
}
