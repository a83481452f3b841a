//! 有序降级链
//!
//! 依次调用各个生产者，第一个给出结果的生效；返回 `Ok(None)` 或出错都会
//! 降级到下一个。最后一个生产者的结果无论如何都会被接受。
//! 结构化输出 → 表格输出、当前语言 → 英语 → 默认语言都用它实现。

use crate::error::Result;

type Producer<'a, T> = Box<dyn FnOnce() -> Result<Option<T>> + 'a>;
type Observer<'a> = Box<dyn FnMut(&str, &str) + 'a>;

pub struct FallbackChain<'a, T> {
    task: String,
    tiers: Vec<(String, Producer<'a, T>)>,
    on_downgrade: Option<Observer<'a>>,
}

impl<'a, T> FallbackChain<'a, T> {
    pub fn new(task: &str) -> Self {
        Self {
            task: task.to_string(),
            tiers: Vec::new(),
            on_downgrade: None,
        }
    }

    /// 追加一级；`Ok(None)` 表示这一级没有可用结果
    pub fn attempt<F>(mut self, label: impl Into<String>, producer: F) -> Self
    where
        F: FnOnce() -> Result<Option<T>> + 'a,
    {
        self.tiers.push((label.into(), Box::new(producer)));
        self
    }

    /// 每次降级时以 (放弃的级别, 接手的级别) 调用
    pub fn on_downgrade<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&str, &str) + 'a,
    {
        self.on_downgrade = Some(Box::new(observer));
        self
    }

    /// 依次尝试各级，全部落空时由 `last` 给出最终结果
    pub fn finally<F>(mut self, label: &str, last: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let tiers = std::mem::take(&mut self.tiers);
        let labels: Vec<String> = tiers
            .iter()
            .skip(1)
            .map(|(label, _)| label.clone())
            .chain(std::iter::once(label.to_string()))
            .collect();

        for ((current, producer), next) in tiers.into_iter().zip(labels.iter()) {
            match producer() {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => log::warn!("{}: {} 没有返回结果，改用 {}", self.task, current, next),
                Err(e) => log::warn!("{}: {} 失败（{}），改用 {}", self.task, current, e, next),
            }
            if let Some(observer) = self.on_downgrade.as_mut() {
                observer(&current, next);
            }
        }
        last()
    }
}

/// 空集合视为没有结果
pub fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
