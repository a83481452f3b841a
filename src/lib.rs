//! winget 输出解析
//!
//! 把 winget 的结构化输出（PowerShell 模块）与表格输出统一解析为包记录，
//! 并解析 `winget show` 的详情。

pub mod config;
pub mod error;
pub mod transcript;
pub mod winget;

pub use config::Config;
pub use error::{Error, Result};
pub use winget::WinGet;
