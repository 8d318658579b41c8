//! 定义了协议会话的可配置参数。
//! Defines configurable parameters for protocol sessions.

use crate::env::SimTime;
use crate::error::{Error, Result};

/// A structure containing all configurable parameters for a session.
///
/// A session captures its `Config` once at construction; the values never
/// change while the session runs.
///
/// 包含一个会话所有可配置参数的结构体。
///
/// 会话在构造时一次性捕获其 `Config`；会话运行期间这些值不再改变。
#[derive(Debug, Clone)]
pub struct Config {
    /// The sliding-window size N: the sender may have at most N packets
    /// outstanding. Ignored by the alternating-bit pair, whose window is
    /// fixed at one.
    ///
    /// 滑动窗口大小 N：发送方最多可有 N 个在途数据包。
    /// 交替位协议对忽略此值，其窗口固定为一。
    pub window_size: u32,

    /// The seed for the round-trip-time estimator, used as the timeout
    /// interval until real samples arrive.
    ///
    /// 往返时间估算器的种子，在真实样本到来之前用作超时间隔。
    pub initial_rtt: SimTime,

    /// The period of the selective-repeat sender's recurring clock tick,
    /// which dispatches due per-packet timers.
    ///
    /// 选择重传发送方周期性时钟滴答的周期，用于分发到期的逐包定时器。
    pub clock_tick: SimTime,

    /// Upper bound on messages a sender will track at once, in flight plus
    /// buffered. Replaces the silent fixed-array capacity of older
    /// implementations with an explicit error.
    ///
    /// 发送方同时跟踪的消息（在途加缓冲）的上限。
    /// 以显式错误取代旧实现中静默的定长数组容量。
    pub max_outstanding: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_size: 8,
            initial_rtt: 10.0,
            clock_tick: 0.1,
            max_outstanding: 1100,
        }
    }
}

impl Config {
    /// Checks the configuration for values the protocols cannot run with.
    /// 检查配置中协议无法运行的取值。
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(Error::InvalidConfig("window_size must be at least 1"));
        }
        if !(self.initial_rtt > 0.0) {
            return Err(Error::InvalidConfig("initial_rtt must be positive"));
        }
        if !(self.clock_tick > 0.0) {
            return Err(Error::InvalidConfig("clock_tick must be positive"));
        }
        if self.max_outstanding < 2 * self.window_size as usize {
            return Err(Error::InvalidConfig(
                "max_outstanding must be at least twice the window size",
            ));
        }
        Ok(())
    }
}
