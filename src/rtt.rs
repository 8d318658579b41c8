//! RTT 估算器。
//! An estimator for the round-trip time (RTT).

use crate::env::SimTime;

const ALPHA: f64 = 1.0 / 8.0;
const BETA: f64 = 1.0 / 4.0;

/// An adaptive round-trip-time estimator in the RFC 6298 family.
///
/// Seeded with a configured initial RTT and zero deviation; each accepted
/// sample is folded in by exponential smoothing. Callers must observe Karn's
/// rule and never feed samples taken from retransmitted packets.
///
/// 一个 RFC 6298 家族的自适应往返时间估算器。
///
/// 以配置的初始 RTT 和零偏差作为种子；每个被接受的样本通过指数平滑并入。
/// 调用方必须遵守 Karn 规则，绝不输入取自重传数据包的样本。
#[derive(Debug, Clone)]
pub struct RttEstimator {
    /// The smoothed round-trip time, in simulation time units.
    /// 平滑的往返时间（模拟时间单位）。
    estimated_rtt: SimTime,
    /// The smoothed round-trip-time deviation.
    /// 平滑的往返时间偏差。
    dev_rtt: SimTime,
}

impl RttEstimator {
    /// Creates a new estimator seeded with `initial_rtt`.
    /// 创建一个以 `initial_rtt` 为种子的新估算器。
    pub fn new(initial_rtt: SimTime) -> Self {
        Self {
            estimated_rtt: initial_rtt,
            dev_rtt: 0.0,
        }
    }

    /// Folds in a new sample. The mean is updated first and the deviation is
    /// measured against the freshly updated mean.
    ///
    /// 并入一个新样本。先更新均值，偏差以刚更新的均值为基准。
    pub fn update(&mut self, sample: SimTime) {
        self.estimated_rtt = (1.0 - ALPHA) * self.estimated_rtt + ALPHA * sample;
        self.dev_rtt = (1.0 - BETA) * self.dev_rtt + BETA * (sample - self.estimated_rtt).abs();
    }

    /// The current retransmission timeout: `EstimatedRTT + 4 * DevRTT`.
    /// 当前重传超时：`EstimatedRTT + 4 * DevRTT`。
    pub fn timeout_interval(&self) -> SimTime {
        self.estimated_rtt + 4.0 * self.dev_rtt
    }

    /// The smoothed mean of observed samples.
    pub fn estimated_rtt(&self) -> SimTime {
        self.estimated_rtt
    }

    /// The smoothed deviation of observed samples.
    pub fn dev_rtt(&self) -> SimTime {
        self.dev_rtt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_f64_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "floats not equal: {a} vs {b}");
    }

    #[test]
    fn seeded_timeout_equals_initial_rtt() {
        let estimator = RttEstimator::new(10.0);
        assert_f64_eq(estimator.timeout_interval(), 10.0);
    }

    #[test]
    fn single_sample_update() {
        let mut estimator = RttEstimator::new(10.0);
        estimator.update(18.0);

        // mean: 0.875 * 10 + 0.125 * 18 = 11, then dev: 0.25 * |18 - 11| = 1.75
        assert_f64_eq(estimator.estimated_rtt(), 11.0);
        assert_f64_eq(estimator.dev_rtt(), 1.75);
        assert_f64_eq(estimator.timeout_interval(), 18.0);
    }

    #[test]
    fn constant_samples_converge() {
        let mut estimator = RttEstimator::new(10.0);
        for _ in 0..200 {
            estimator.update(4.0);
        }
        assert!((estimator.estimated_rtt() - 4.0).abs() < 1e-6);
        assert!(estimator.dev_rtt() < 1e-6);
        assert!((estimator.timeout_interval() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn deviation_grows_with_jitter() {
        let mut steady = RttEstimator::new(10.0);
        let mut jittery = RttEstimator::new(10.0);
        for i in 0..50 {
            steady.update(10.0);
            jittery.update(if i % 2 == 0 { 5.0 } else { 15.0 });
        }
        assert!(jittery.dev_rtt() > steady.dev_rtt());
        assert!(jittery.timeout_interval() > steady.timeout_interval());
    }
}
