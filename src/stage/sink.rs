//! 下游 Sink 抽象
//!
//! @yutiansut @quantaxis
//!
//! Sink 是算子的下游协作者，负责接收输出并暴露拒绝信号：
//! - VecSink: 收集全部输出，从不拒绝
//! - LimitSink: 收满 N 个后拒绝 (相当于下游的 take(n))
//! - FnSink: 回调式下游，回调返回 false 后进入拒绝状态

/// 下游 Sink
pub trait Sink<T> {
    /// 推送一个输出，返回下游是否还愿意继续接收
    fn push(&mut self, value: T) -> bool;

    /// 下游是否已经拒绝后续输出
    fn is_rejecting(&self) -> bool;
}

impl<T, S: Sink<T> + ?Sized> Sink<T> for &mut S {
    fn push(&mut self, value: T) -> bool {
        (**self).push(value)
    }

    fn is_rejecting(&self) -> bool {
        (**self).is_rejecting()
    }
}

/// 依次推送，下游拒绝后立即停止
///
/// 返回是否全部推送完毕。
pub fn push_all<T, I, S>(items: I, sink: &mut S) -> bool
where
    I: IntoIterator<Item = T>,
    S: Sink<T> + ?Sized,
{
    for item in items {
        if sink.is_rejecting() {
            return false;
        }
        sink.push(item);
    }
    !sink.is_rejecting()
}

// ═══════════════════════════════════════════════════════════════════════════
// VecSink
// ═══════════════════════════════════════════════════════════════════════════

/// 收集型 Sink
#[derive(Debug, Clone)]
pub struct VecSink<T> {
    items: Vec<T>,
}

impl<T> VecSink<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for VecSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for VecSink<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> Sink<T> for VecSink<T> {
    fn push(&mut self, value: T) -> bool {
        self.items.push(value);
        true
    }

    fn is_rejecting(&self) -> bool {
        false
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LimitSink
// ═══════════════════════════════════════════════════════════════════════════

/// 限量 Sink，收满 `limit` 个后拒绝
#[derive(Debug, Clone)]
pub struct LimitSink<T> {
    items: Vec<T>,
    limit: usize,
    /// 被拒绝的推送次数
    rejected: usize,
}

impl<T> LimitSink<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::with_capacity(limit.min(1024)),
            limit,
            rejected: 0,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// 拒绝状态下仍被推送的次数 (正确实现的算子应为 0)
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T> Sink<T> for LimitSink<T> {
    fn push(&mut self, value: T) -> bool {
        if self.items.len() >= self.limit {
            self.rejected += 1;
            return false;
        }
        self.items.push(value);
        self.items.len() < self.limit
    }

    fn is_rejecting(&self) -> bool {
        self.items.len() >= self.limit
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FnSink
// ═══════════════════════════════════════════════════════════════════════════

/// 回调型 Sink
pub struct FnSink<F> {
    callback: F,
    rejecting: bool,
}

impl<F> FnSink<F> {
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            rejecting: false,
        }
    }
}

impl<T, F> Sink<T> for FnSink<F>
where
    F: FnMut(T) -> bool,
{
    fn push(&mut self, value: T) -> bool {
        if self.rejecting {
            return false;
        }
        if !(self.callback)(value) {
            self.rejecting = true;
        }
        !self.rejecting
    }

    fn is_rejecting(&self) -> bool {
        self.rejecting
    }
}
