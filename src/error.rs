//! 错误类型定义

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// 进程无法启动或读取输出失败
    #[error("{program} 执行失败: {source}")]
    Process {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// 进程以非零退出码结束
    #[error("{program} 退出码异常: {code}")]
    ToolExit { program: String, code: i32 },

    #[error("读取配置文件 {path} 失败: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件 {path} 格式错误: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("写入记录文件失败: {0}")]
    Transcript(#[source] std::io::Error),
}

impl Error {
    pub(crate) fn process(program: &str, source: std::io::Error) -> Self {
        Error::Process {
            program: program.to_string(),
            source,
        }
    }
}

/// 详情输出中单行解析失败（记录日志后跳过该行）
#[derive(Debug, Error, PartialEq)]
pub enum DetailLineError {
    #[error("字段 {field} 的 URL 无效: {value:?}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("字段 {field} 缺少值")]
    MissingValue { field: &'static str },
}
