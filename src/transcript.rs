//! 进程输入输出记录

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// 记录一次外部调用的 stdin / stdout / stderr 与退出码。
///
/// 仅作为旁路输出，解析流程从不读取它。
pub trait TranscriptSink {
    fn stdin(&mut self, text: &str);
    fn stdout_line(&mut self, line: &str);
    fn stderr(&mut self, text: &str);
    fn close(&mut self, exit_code: Option<i32>);
}

/// 不记录任何内容
#[derive(Debug, Default)]
pub struct NullTranscript;

impl TranscriptSink for NullTranscript {
    fn stdin(&mut self, _text: &str) {}
    fn stdout_line(&mut self, _line: &str) {}
    fn stderr(&mut self, _text: &str) {}
    fn close(&mut self, _exit_code: Option<i32>) {}
}

/// 在内存中累积记录，`close` 时写入 `<dir>/YYYY/MM/DD/HH-MM-SS-<task>.log`
pub struct FileTranscript {
    base_dir: PathBuf,
    task: String,
    started: DateTime<Local>,
    stdin: String,
    stdout: String,
    stderr: String,
    saved: Option<PathBuf>,
}

impl FileTranscript {
    pub fn new(base_dir: &Path, task: &str) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            task: task.to_string(),
            started: Local::now(),
            stdin: String::new(),
            stdout: String::new(),
            stderr: String::new(),
            saved: None,
        }
    }

    /// 已保存的文件路径（`close` 之前为 None）
    pub fn saved_path(&self) -> Option<&Path> {
        self.saved.as_deref()
    }

    fn save(&self, exit_code: Option<i32>) -> Result<PathBuf> {
        // 目录结构: YYYY/MM/DD/
        let dir = self
            .base_dir
            .join(self.started.format("%Y").to_string())
            .join(self.started.format("%m").to_string())
            .join(self.started.format("%d").to_string());
        fs::create_dir_all(&dir).map_err(Error::Transcript)?;

        let filename = format!("{}-{}.log", self.started.format("%H-%M-%S"), self.task);
        let filepath = dir.join(filename);

        let finished = Local::now();
        let mut content = String::new();
        content.push_str(&format!(
            "任务: {}\n开始时间: {}\n结束时间: {}\n退出码: {}\n",
            self.task,
            self.started.format("%Y-%m-%d %H:%M:%S"),
            finished.format("%Y-%m-%d %H:%M:%S"),
            exit_code.map_or_else(|| "未知".to_string(), |c| c.to_string()),
        ));
        for (title, body) in [
            ("STDIN", &self.stdin),
            ("STDOUT", &self.stdout),
            ("STDERR", &self.stderr),
        ] {
            if !body.is_empty() {
                content.push_str(&format!("\n===== {} =====\n{}", title, body));
                if !body.ends_with('\n') {
                    content.push('\n');
                }
            }
        }

        fs::write(&filepath, content).map_err(Error::Transcript)?;
        Ok(filepath)
    }
}

impl TranscriptSink for FileTranscript {
    fn stdin(&mut self, text: &str) {
        self.stdin.push_str(text);
    }

    fn stdout_line(&mut self, line: &str) {
        self.stdout.push_str(line);
        self.stdout.push('\n');
    }

    fn stderr(&mut self, text: &str) {
        self.stderr.push_str(text);
    }

    fn close(&mut self, exit_code: Option<i32>) {
        match self.save(exit_code) {
            Ok(path) => {
                log::debug!("记录已保存: {}", path.display());
                self.saved = Some(path);
            }
            Err(e) => log::error!("保存记录失败: {}", e),
        }
    }
}

/// 根据配置创建记录器
pub fn open(dir: Option<&Path>, task: &str) -> Box<dyn TranscriptSink> {
    match dir {
        Some(dir) => Box::new(FileTranscript::new(dir, task)),
        None => Box::new(NullTranscript),
    }
}
