#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the unidirectional reliable-data-transfer protocol library.
//! 单向可靠数据传输协议库的根。
//!
//! Three sender/receiver pairs of increasing sophistication share a common
//! packet vocabulary and round-trip-time estimator: [`ab`] (alternating bit,
//! stop-and-wait), [`gbn`] (go-back-N, cumulative acknowledgments) and [`sr`]
//! (selective repeat, per-packet timers). The discrete-event network emulator
//! that drives them is out of scope; it talks to the protocols through the
//! [`env::Environment`] trait.
//!
//! 三对复杂度递增的发送/接收状态机共享同一套数据包词汇与往返时间估算器：
//! [`ab`]（交替位，停等）、[`gbn`]（回退N，累积确认）和 [`sr`]（选择重传，
//! 逐包定时器）。驱动它们的离散事件网络模拟器不在本库范围内，
//! 它通过 [`env::Environment`] 特征与协议交互。

pub mod config;
pub mod env;
pub mod error;
pub mod packet;
pub mod rtt;
pub mod timer;

pub mod ab;
pub mod gbn;
pub mod sr;

mod testing;
