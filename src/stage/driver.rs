//! 参考驱动器
//!
//! @yutiansut @quantaxis
//!
//! 驱动器是 Stage 的上游协作者，决定何时调用 init / integrate / combine / finish：
//! - drive: 顺序执行，尊重协作式取消，始终调用 finish
//! - collect: drive + VecSink 的便捷封装
//! - drive_partitioned: 分区并行 integrate (rayon)，左折叠 combine，单线程 finish
//!
//! 算子自身从不创建线程；并行只发生在驱动器层。

use rayon::prelude::*;

use super::{Sink, Stage, VecSink};
use crate::{Result, StageError};

/// 顺序驱动一个 Stage
///
/// integrate 报错时立即终止，不再调用 finish；
/// 报错前已推送到下游的输出保持有效。
pub fn drive<St, I, K>(stage: &St, input: I, sink: &mut K) -> Result<()>
where
    St: Stage,
    I: IntoIterator<Item = St::Input>,
    K: Sink<St::Output> + ?Sized,
{
    let mut state = stage.init();
    let mut integrated: u64 = 0;

    for element in input {
        if sink.is_rejecting() {
            log::debug!("{}: downstream rejecting after {} elements", stage.name(), integrated);
            break;
        }
        integrated += 1;
        if !stage.integrate(&mut state, element, sink)? {
            log::debug!("{}: upstream stopped after {} elements", stage.name(), integrated);
            break;
        }
    }

    stage.finish(state, sink)?;
    log::trace!("{}: finished after {} elements", stage.name(), integrated);
    Ok(())
}

/// 顺序驱动并收集全部输出
pub fn collect<St, I>(stage: &St, input: I) -> Result<Vec<St::Output>>
where
    St: Stage,
    I: IntoIterator<Item = St::Input>,
{
    let mut sink = VecSink::new();
    drive(stage, input, &mut sink)?;
    Ok(sink.into_inner())
}

/// 分区并行驱动
///
/// 每个分区独立 `init` + `integrate`，分区内输出按分区顺序拼接；
/// 随后按分区顺序左折叠 `combine`，最后对合并后的状态调用一次 `finish`。
/// 顺序敏感的算子 (窗口、限流、采样) 会被拒绝。
pub fn drive_partitioned<St, P>(stage: &St, partitions: Vec<P>) -> Result<Vec<St::Output>>
where
    St: Stage + Sync,
    St::State: Send,
    St::Output: Send,
    P: IntoIterator<Item = St::Input> + Send,
{
    if !stage.supports_combine() {
        return Err(StageError::CombineUnsupported(format!(
            "{} does not support partitioned execution",
            stage.name()
        )));
    }

    log::debug!("{}: driving {} partitions", stage.name(), partitions.len());

    let partials: Vec<Result<(St::State, Vec<St::Output>)>> = partitions
        .into_par_iter()
        .map(|partition| {
            let mut state = stage.init();
            let mut sink = VecSink::new();
            for element in partition {
                if !stage.integrate(&mut state, element, &mut sink)? {
                    break;
                }
            }
            Ok((state, sink.into_inner()))
        })
        .collect();

    let mut outputs = Vec::new();
    let mut merged: Option<St::State> = None;
    for partial in partials {
        let (state, emitted) = partial?;
        outputs.extend(emitted);
        merged = Some(match merged {
            None => state,
            Some(acc) => stage.combine(acc, state)?,
        });
    }

    let state = merged.unwrap_or_else(|| stage.init());
    let mut sink = VecSink::from(outputs);
    stage.finish(state, &mut sink)?;
    Ok(sink.into_inner())
}
