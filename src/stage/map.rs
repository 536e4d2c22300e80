//! 输入映射适配器

use std::marker::PhantomData;

use super::{Sink, Stage};
use crate::Result;

/// 在内层 Stage 之前应用映射函数
///
/// 例如 `MovingSum` 的输入是 `Option<BigDecimal>`，
/// 通过 `map_input` 可以直接接收业务记录并抽取字段。
pub struct MapInput<St, F, I> {
    inner: St,
    mapper: F,
    _input: PhantomData<fn(I)>,
}

impl<St, F, I> MapInput<St, F, I> {
    pub fn new(inner: St, mapper: F) -> Self {
        Self {
            inner,
            mapper,
            _input: PhantomData,
        }
    }

    pub fn inner(&self) -> &St {
        &self.inner
    }
}

impl<St, F, I> Stage for MapInput<St, F, I>
where
    St: Stage,
    F: Fn(I) -> St::Input,
{
    type State = St::State;
    type Input = I;
    type Output = St::Output;

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn init(&self) -> Self::State {
        self.inner.init()
    }

    fn integrate<S>(&self, state: &mut Self::State, element: I, sink: &mut S) -> Result<bool>
    where
        S: Sink<Self::Output> + ?Sized,
    {
        self.inner.integrate(state, (self.mapper)(element), sink)
    }

    fn supports_combine(&self) -> bool {
        self.inner.supports_combine()
    }

    fn combine(&self, left: Self::State, right: Self::State) -> Result<Self::State> {
        self.inner.combine(left, right)
    }

    fn finish<S>(&self, state: Self::State, sink: &mut S) -> Result<()>
    where
        S: Sink<Self::Output> + ?Sized,
    {
        self.inner.finish(state, sink)
    }
}
