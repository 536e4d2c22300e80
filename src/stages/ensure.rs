//! 校验算子 - 顺序校验与长度校验
//!
//! @yutiansut @quantaxis
//!
//! - EnsureOrdered: 逐个透传，违反顺序的元素在 integrate 中报 InvariantViolation
//! - EnsureSize: 缓冲全部元素，finish 时校验长度，不满足时报 SizeViolation
//!   (或配置为静默输出空序列)

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::stage::{push_all, Sink, Stage};
use crate::{Result, StageError};

// ═══════════════════════════════════════════════════════════════════════════
// EnsureOrdered
// ═══════════════════════════════════════════════════════════════════════════

/// 要求的顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// 严格递增
    Ascending,
    /// 非递减
    AscendingOrEqual,
    /// 严格递减
    Descending,
    /// 非递增
    DescendingOrEqual,
}

impl Order {
    /// `next` 相对 `previous` 的比较结果是否满足该顺序
    pub fn allows(self, next_vs_previous: Ordering) -> bool {
        match self {
            Order::Ascending => next_vs_previous == Ordering::Greater,
            Order::AscendingOrEqual => next_vs_previous != Ordering::Less,
            Order::Descending => next_vs_previous == Ordering::Less,
            Order::DescendingOrEqual => next_vs_previous != Ordering::Greater,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Order::Ascending => "ascending",
            Order::AscendingOrEqual => "ascending or equal",
            Order::Descending => "descending",
            Order::DescendingOrEqual => "descending or equal",
        };
        f.write_str(name)
    }
}

/// 顺序校验算子
#[derive(Debug, Clone)]
pub struct EnsureOrdered<T, C> {
    order: Order,
    comparator: C,
    _element: PhantomData<fn(T) -> T>,
}

impl<T, C> EnsureOrdered<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    pub fn by(order: Order, comparator: C) -> Self {
        Self {
            order,
            comparator,
            _element: PhantomData,
        }
    }

    pub fn order(&self) -> Order {
        self.order
    }
}

impl<T: Ord> EnsureOrdered<T, fn(&T, &T) -> Ordering> {
    pub fn new(order: Order) -> Self {
        Self::by(order, T::cmp)
    }
}

/// 顺序校验状态：上一个元素 + 已见数量
#[derive(Debug, Clone)]
pub struct OrderedState<T> {
    previous: Option<T>,
    seen: u64,
}

impl<T, C> Stage for EnsureOrdered<T, C>
where
    T: Clone,
    C: Fn(&T, &T) -> Ordering,
{
    type State = OrderedState<T>;
    type Input = T;
    type Output = T;

    fn name(&self) -> &'static str {
        "ensure_ordered"
    }

    fn init(&self) -> Self::State {
        OrderedState {
            previous: None,
            seen: 0,
        }
    }

    fn integrate<S>(&self, state: &mut Self::State, element: T, sink: &mut S) -> Result<bool>
    where
        S: Sink<T> + ?Sized,
    {
        if let Some(previous) = &state.previous {
            if !self.order.allows((self.comparator)(&element, previous)) {
                log::warn!(
                    "ensure_ordered: element #{} breaks {} order",
                    state.seen,
                    self.order
                );
                return Err(StageError::InvariantViolation(format!(
                    "element #{} is not in {} order",
                    state.seen, self.order
                )));
            }
        }
        state.seen += 1;
        state.previous = Some(element.clone());
        if !sink.is_rejecting() {
            sink.push(element);
        }
        Ok(!sink.is_rejecting())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// EnsureSize
// ═══════════════════════════════════════════════════════════════════════════

/// 长度规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeRule {
    Equals,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
}

impl SizeRule {
    /// 再接收一个元素后 (长度 `length`) 是否仍有可能满足
    pub fn can_grow_to(self, length: u64, target: u64) -> bool {
        match self {
            SizeRule::Equals | SizeRule::LessThanOrEqualTo => length <= target,
            SizeRule::LessThan => length < target,
            SizeRule::GreaterThan | SizeRule::GreaterThanOrEqualTo => true,
        }
    }

    /// 最终长度是否满足
    pub fn accepts(self, length: u64, target: u64) -> bool {
        match self {
            SizeRule::Equals => length == target,
            SizeRule::GreaterThan => length > target,
            SizeRule::GreaterThanOrEqualTo => length >= target,
            SizeRule::LessThan => length < target,
            SizeRule::LessThanOrEqualTo => length <= target,
        }
    }
}

/// 长度校验算子
#[derive(Debug, Clone, Copy)]
pub struct EnsureSize<T> {
    rule: SizeRule,
    target: u64,
    or_else_empty: bool,
    _element: PhantomData<fn(T) -> T>,
}

impl<T> EnsureSize<T> {
    pub fn new(rule: SizeRule, target: u64) -> Self {
        Self {
            rule,
            target,
            or_else_empty: false,
            _element: PhantomData,
        }
    }

    /// 不满足时输出空序列而不是报错
    pub fn or_else_empty(mut self) -> Self {
        self.or_else_empty = true;
        self
    }
}

/// 长度校验状态
#[derive(Debug, Clone)]
pub struct SizeState<T> {
    elements: Vec<T>,
    failed: bool,
}

impl<T> Stage for EnsureSize<T> {
    type State = SizeState<T>;
    type Input = T;
    type Output = T;

    fn name(&self) -> &'static str {
        "ensure_size"
    }

    fn init(&self) -> Self::State {
        SizeState {
            elements: Vec::new(),
            failed: false,
        }
    }

    fn integrate<S>(&self, state: &mut Self::State, element: T, sink: &mut S) -> Result<bool>
    where
        S: Sink<T> + ?Sized,
    {
        if self.rule.can_grow_to(state.elements.len() as u64 + 1, self.target) {
            state.elements.push(element);
        } else {
            // 结果已确定，无需继续供数
            state.failed = true;
            state.elements.clear();
        }
        Ok(!state.failed && !sink.is_rejecting())
    }

    fn finish<S>(&self, state: Self::State, sink: &mut S) -> Result<()>
    where
        S: Sink<T> + ?Sized,
    {
        let length = state.elements.len() as u64;
        if !state.failed && self.rule.accepts(length, self.target) {
            push_all(state.elements, sink);
            return Ok(());
        }
        if self.or_else_empty {
            return Ok(());
        }
        log::warn!("ensure_size: wanted {:?} {}", self.rule, self.target);
        Err(StageError::SizeViolation(format!(
            "invalid stream size: wanted {:?} {}",
            self.rule, self.target
        )))
    }
}
