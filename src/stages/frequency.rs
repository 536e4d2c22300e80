//! 频次统计 - 可并行合并
//!
//! @yutiansut @quantaxis
//!
//! 计数映射满足交换律与结合律，是唯一支持 combine 的通用算子：
//! 分区各自计数后合并，与顺序执行结果一致。

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::stage::{push_all, Sink, Stage};
use crate::Result;

/// 输出排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyOrder {
    /// 次数从少到多
    Ascending,
    /// 次数从多到少
    #[default]
    Descending,
}

/// 值 + 出现次数
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WithCount<T> {
    pub value: T,
    pub count: u64,
}

/// 频次统计算子
#[derive(Debug, Clone, Copy)]
pub struct Frequency<T> {
    order: FrequencyOrder,
    _element: PhantomData<fn(T) -> T>,
}

impl<T: Ord> Frequency<T> {
    pub fn new(order: FrequencyOrder) -> Self {
        Self {
            order,
            _element: PhantomData,
        }
    }
}

impl<T: Ord> Stage for Frequency<T> {
    type State = BTreeMap<T, u64>;
    type Input = T;
    type Output = WithCount<T>;

    fn name(&self) -> &'static str {
        "frequency"
    }

    fn init(&self) -> Self::State {
        BTreeMap::new()
    }

    fn integrate<S>(&self, state: &mut Self::State, element: T, sink: &mut S) -> Result<bool>
    where
        S: Sink<WithCount<T>> + ?Sized,
    {
        *state.entry(element).or_insert(0) += 1;
        Ok(!sink.is_rejecting())
    }

    fn supports_combine(&self) -> bool {
        true
    }

    fn combine(&self, mut left: Self::State, right: Self::State) -> Result<Self::State> {
        for (value, count) in right {
            *left.entry(value).or_insert(0) += count;
        }
        Ok(left)
    }

    fn finish<S>(&self, state: Self::State, sink: &mut S) -> Result<()>
    where
        S: Sink<WithCount<T>> + ?Sized,
    {
        let mut counted: Vec<WithCount<T>> = state
            .into_iter()
            .map(|(value, count)| WithCount { value, count })
            .collect();
        // 稳定排序：次数相同时保持键的顺序
        match self.order {
            FrequencyOrder::Ascending => counted.sort_by(|a, b| a.count.cmp(&b.count)),
            FrequencyOrder::Descending => counted.sort_by(|a, b| b.count.cmp(&a.count)),
        }
        push_all(counted, sink);
        Ok(())
    }
}
