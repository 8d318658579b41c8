//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.
//!
//! Corruption, loss, duplicates and stale acknowledgments are *not* errors:
//! the protocols absorb them silently and recover through retransmission.
//! Only misconfiguration and explicit capacity limits fail loudly.
//!
//! 损坏、丢失、重复和过期确认*不是*错误：协议会静默吸收它们并通过重传恢复。
//! 只有配置错误和显式的容量上限才会大声失败。

use thiserror::Error;

/// The primary error type for the reliable-data-transfer library.
/// 可靠数据传输库的主要错误类型。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The provided configuration is unusable.
    /// 提供的配置不可用。
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// A stop-and-wait sender was asked to send while a packet is still in
    /// flight. The caller may retry once the outstanding packet is
    /// acknowledged.
    ///
    /// 停等发送方在仍有数据包在途时被要求发送。
    /// 调用方可在在途数据包被确认后重试。
    #[error("a packet is already in flight; stop-and-wait holds at most one")]
    SenderBusy,

    /// Accepting another message would exceed the configured bound on
    /// in-flight plus buffered messages.
    ///
    /// 接受另一条消息将超过在途加缓冲消息的配置上限。
    #[error("outstanding message records would exceed the configured capacity")]
    TooManyOutstanding,
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
