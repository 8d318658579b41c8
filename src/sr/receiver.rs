//! 选择重传接收方状态机。
//! The selective-repeat receiver state machine.

use crate::config::Config;
use crate::env::Environment;
use crate::error::Result;
use crate::packet::Packet;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// A selective-repeat receiver with out-of-order buffering.
///
/// Packets inside the receive window `[rcv_base, rcv_base + N)` are always
/// acknowledged individually and buffered; when the packet at `rcv_base`
/// arrives, the whole contiguous buffered run is delivered upward. Packets
/// in the already-delivered window `[rcv_base - N, rcv_base)` are
/// re-acknowledged only — the sender's earlier acknowledgment was lost.
/// Corrupt or fully out-of-range packets are dropped silently.
///
/// 带乱序缓冲的选择重传接收方。
///
/// 接收窗口 `[rcv_base, rcv_base + N)` 内的数据包总是被逐个确认并缓冲；
/// 当 `rcv_base` 处的数据包到达时，整段连续的缓冲数据被向上交付。
/// 已交付窗口 `[rcv_base - N, rcv_base)` 内的数据包只被重新确认 ——
/// 发送方此前的确认丢失了。损坏或完全越界的数据包被静默丢弃。
#[derive(Debug)]
pub struct Receiver {
    rcv_base: u32,
    window_size: u32,
    /// Out-of-order packets waiting for the in-order run to reach them.
    /// 等待按序序列到达的乱序数据包。
    buffered: BTreeMap<u32, Packet>,
}

impl Receiver {
    /// Creates a receiver from a validated configuration, capturing the
    /// window size once.
    ///
    /// 从已验证的配置创建接收方，一次性捕获窗口大小。
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            rcv_base: 1,
            window_size: config.window_size,
            buffered: BTreeMap::new(),
        })
    }

    /// The next in-order sequence number this receiver will deliver.
    pub fn rcv_base(&self) -> u32 {
        self.rcv_base
    }

    /// Number of out-of-order packets currently buffered.
    pub fn buffered_len(&self) -> usize {
        self.buffered.len()
    }

    /// Handles a data packet arriving from the link.
    /// 处理从链路到达的数据包。
    pub fn on_packet_arrival<E: Environment>(&mut self, env: &mut E, packet: Packet) {
        if packet.is_corrupt() {
            trace!(%packet, "corrupt, dropping");
            return;
        }
        let seq = packet.seq;
        if seq >= self.rcv_base && seq < self.rcv_base + self.window_size {
            // Always acknowledge individually, duplicates included.
            env.transmit(Packet::ack(seq));
            self.buffered.entry(seq).or_insert(packet);

            if seq == self.rcv_base {
                // Deliver the contiguous run, including any gap that a
                // previously buffered packet already filled.
                while let Some(buffered) = self.buffered.remove(&self.rcv_base) {
                    env.deliver(buffered.payload);
                    self.rcv_base += 1;
                    debug!(rcv_base = self.rcv_base, "delivered, advanced window");
                }
            }
        } else if seq >= self.rcv_base.saturating_sub(self.window_size) && seq < self.rcv_base {
            // Already delivered; the sender never saw our acknowledgment.
            env.transmit(Packet::ack(seq));
            trace!(seq, "already delivered, re-acked");
        } else {
            trace!(seq, rcv_base = self.rcv_base, "outside both windows, dropping");
        }
    }
}
