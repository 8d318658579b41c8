//! 数据包与消息的词汇表：构造、加性校验和与损坏检测。
//! The packet/message vocabulary: construction, additive checksum and
//! corruption detection.
//!
//! Packets are plain `Copy` value types; no I/O happens here.
//! 数据包是普通的 `Copy` 值类型；这里不发生任何 I/O。

use std::fmt;

/// Size in bytes of an application payload.
/// 应用载荷的字节大小。
pub const PAYLOAD_SIZE: usize = 20;

/// The opaque fixed-size payload carried by every data packet.
/// 每个数据包携带的不透明定长载荷。
pub type Payload = [u8; PAYLOAD_SIZE];

/// A fixed-size application message handed down by the layer above.
/// 上层下发的定长应用消息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    data: Payload,
}

impl Message {
    /// Creates a message from a full payload.
    /// 从完整载荷创建一条消息。
    pub fn new(data: Payload) -> Self {
        Self { data }
    }

    /// The message bytes.
    pub fn data(&self) -> &Payload {
        &self.data
    }
}

impl From<Payload> for Message {
    fn from(data: Payload) -> Self {
        Self::new(data)
    }
}

/// A protocol packet: sequence number, acknowledgment number, additive
/// checksum and a fixed-size payload.
///
/// 协议数据包：序号、确认号、加性校验和与定长载荷。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet {
    /// The sequence number of this packet (0 for pure acknowledgments).
    /// 此数据包的序号（纯确认包为 0）。
    pub seq: u32,
    /// The sequence number being acknowledged (0 for data packets).
    /// 被确认的序号（数据包为 0）。
    pub ack: u32,
    /// Additive checksum over `seq`, `ack` and every payload byte.
    /// 对 `seq`、`ack` 及每个载荷字节的加性校验和。
    pub checksum: i32,
    /// The application payload, zero-filled for pure acknowledgments.
    /// 应用载荷，纯确认包为全零。
    pub payload: Payload,
}

impl Packet {
    /// Builds a data packet carrying `message`, checksummed at construction.
    /// 构造携带 `message` 的数据包，构造时即计算校验和。
    pub fn data(seq: u32, ack: u32, message: &Message) -> Self {
        let payload = *message.data();
        Self {
            seq,
            ack,
            checksum: compute_checksum(seq, ack, &payload),
            payload,
        }
    }

    /// Builds a pure acknowledgment for `ack`: sequence 0, zero-filled
    /// payload, which checksums identically to "no original message".
    ///
    /// 构造对 `ack` 的纯确认包：序号 0、全零载荷，
    /// 其校验和与“没有原始消息”的情形完全一致。
    pub fn ack(ack: u32) -> Self {
        let payload = [0u8; PAYLOAD_SIZE];
        Self {
            seq: 0,
            ack,
            checksum: compute_checksum(0, ack, &payload),
            payload,
        }
    }

    /// Whether the stored checksum disagrees with the recomputed one.
    /// 存储的校验和是否与重新计算的结果不一致。
    pub fn is_corrupt(&self) -> bool {
        compute_checksum(self.seq, self.ack, &self.payload) != self.checksum
    }
}

/// Wrapping additive checksum: sequence number plus acknowledgment number
/// plus every payload byte.
///
/// 环绕加性校验和：序号加确认号再加每个载荷字节。
fn compute_checksum(seq: u32, ack: u32, payload: &Payload) -> i32 {
    let mut sum = (seq as i32).wrapping_add(ack as i32);
    for &byte in payload {
        sum = sum.wrapping_add(byte as i32);
    }
    sum
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{seq: {}, ack: {}, chks: {}",
            self.seq, self.ack, self.checksum
        )?;
        if self.payload[0] != 0 {
            write!(f, ", payload: {}", String::from_utf8_lossy(&self.payload))?;
        }
        write!(f, "}}")
    }
}
