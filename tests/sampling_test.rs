// 采样统计性质测试
//
// 蓄水池采样：N 个元素抽 k 个，每个元素入选概率应为 k/N。
// 重复多次后每个元素的入选次数服从 Binomial(trials, k/N)。

mod common;

use qastream::sampling::{SampleFixedSize, Shuffle};
use qastream::{collect, ReservoirSampler, SharedRandom};

const ELEMENTS: usize = 10;
const SAMPLE: usize = 4;
const TRIALS: usize = 100_000;

#[test]
fn test_reservoir_inclusion_is_uniform() {
    common::init_logger();

    let random = SharedRandom::seeded(20240601);
    let stage = SampleFixedSize::new(SAMPLE, random).unwrap();
    let mut hits = [0u64; ELEMENTS];

    for _ in 0..TRIALS {
        let sample = collect(&stage, 0..ELEMENTS).unwrap();
        assert_eq!(sample.len(), SAMPLE);
        for index in sample {
            hits[index] += 1;
        }
    }

    // 期望 40000，标准差 sqrt(100000 * 0.4 * 0.6) ≈ 155，容差取 5 倍标准差
    let expected = (TRIALS * SAMPLE / ELEMENTS) as i64;
    assert_eq!(hits.iter().sum::<u64>(), (TRIALS * SAMPLE) as u64);
    for (index, count) in hits.iter().enumerate() {
        let deviation = (*count as i64 - expected).abs();
        assert!(deviation < 775, "element {} selected {} times", index, count);
    }
}

#[test]
fn test_reservoir_shorter_than_capacity() {
    let mut sampler = ReservoirSampler::new(8, SharedRandom::seeded(3));
    for i in 0..5 {
        assert!(sampler.offer(i));
    }
    assert_eq!(sampler.seen(), 5);
    assert_eq!(sampler.into_sample(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_shuffle_first_position_is_uniform() {
    let stage = Shuffle::new(SharedRandom::seeded(99));
    let mut first = [0u64; 5];
    for _ in 0..20_000 {
        let out = collect(&stage, 0..5usize).unwrap();
        let mut sorted = out.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
        first[out[0]] += 1;
    }
    // 期望 4000，标准差约 57
    for count in first {
        assert!((3700..4300).contains(&count), "first-position count {}", count);
    }
}
