//! 外部进程的流式读取
//!
//! 每次查询只驱动一个进程：stdout 逐行读取、清理后立即交给解析器，
//! 读到流末尾后再取退出码。提前丢弃 [`LineStream`] 会终止子进程。

use crate::error::{Error, Result};
use crate::transcript::TranscriptSink;
use duct::ReaderHandle;
use std::io::{self, BufRead, BufReader};

/// winget 在没有匹配结果时返回的退出码（APPINSTALLER_CLI_ERROR_NO_APPLICATIONS_FOUND）
pub const NO_APPLICATIONS_FOUND: i32 = 0x8A15_0014_u32 as i32;

/// 清理单行终端输出：去掉 ANSI 转义序列，`\r` 刷新的进度帧只保留最后一帧
pub fn clean_line(raw: &str) -> String {
    let raw = raw.trim_end_matches(['\n', '\r']);
    let last_frame = match raw.rfind('\r') {
        Some(pos) => &raw[pos + 1..],
        None => raw,
    };

    let mut result = String::with_capacity(last_frame.len());
    let mut chars = last_frame.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\x1b' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    while let Some(next) = chars.next() {
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
            }
            // 结构化输出用制表符分隔字段，必须保留
            '\t' => result.push(c),
            c if c.is_control() => {}
            _ => result.push(c),
        }
    }
    result
}

/// 正在运行的进程的 stdout 行序列
///
/// 只能消费一次；每一行同时写入记录器。
pub struct LineStream<'t> {
    program: String,
    reader: BufReader<ReaderHandle>,
    transcript: &'t mut dyn TranscriptSink,
    error: Option<io::Error>,
    done: bool,
}

impl<'t> LineStream<'t> {
    /// 启动进程；`stdin` 不为空时写入其标准输入
    pub fn spawn(
        program: &str,
        args: &[String],
        stdin: Option<&str>,
        transcript: &'t mut dyn TranscriptSink,
    ) -> Result<Self> {
        log::debug!("启动进程: {} {}", program, args.join(" "));
        let mut expr = duct::cmd(program, args).stderr_capture().unchecked();
        if let Some(input) = stdin {
            transcript.stdin(input);
            expr = expr.stdin_bytes(input.as_bytes().to_vec());
        }
        let handle = expr.reader().map_err(|e| Error::process(program, e))?;

        Ok(Self {
            program: program.to_string(),
            reader: BufReader::new(handle),
            transcript,
            error: None,
            done: false,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// 读完剩余输出并返回退出码（被信号终止时为 -1）
    pub fn finish(mut self) -> Result<i32> {
        while self.next().is_some() {}
        if let Some(e) = self.error.take() {
            self.transcript.close(None);
            return Err(Error::process(&self.program, e));
        }

        let waited = self.reader.get_ref().try_wait();
        let output = match waited {
            Ok(Some(output)) => output,
            Ok(None) => {
                self.transcript.close(None);
                return Err(Error::process(
                    &self.program,
                    io::Error::new(io::ErrorKind::Other, "进程在输出结束后仍未退出"),
                ));
            }
            Err(e) => {
                self.transcript.close(None);
                return Err(Error::process(&self.program, e));
            }
        };

        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !stderr.trim().is_empty() {
            log::debug!("{} stderr: {}", self.program, stderr.trim());
        }
        self.transcript.stderr(&stderr);
        self.transcript.close(Some(code));
        Ok(code)
    }

    /// 放弃剩余输出：记录以未知退出码结束，丢弃读取端时子进程随之终止
    pub fn abandon(mut self) {
        log::debug!("{}: 提前结束读取", self.program);
        self.transcript.close(None);
    }

    /// 同 [`finish`](Self::finish)，但把非零退出码视为失败。
    ///
    /// "没有匹配结果"不算失败。
    pub fn finish_checked(self) -> Result<()> {
        let program = self.program.clone();
        match self.finish()? {
            0 | NO_APPLICATIONS_FOUND => Ok(()),
            code => {
                log::error!("{} 退出码异常: {}", program, code);
                Err(Error::ToolExit { program, code })
            }
        }
    }
}

impl Iterator for LineStream<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let mut buffer = Vec::new();
        match self.reader.read_until(b'\n', &mut buffer) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                let line = clean_line(&String::from_utf8_lossy(&buffer));
                self.transcript.stdout_line(&line);
                Some(line)
            }
            Err(e) => {
                self.error = Some(e);
                self.done = true;
                None
            }
        }
    }
}
