//! 回退N接收方状态机。
//! The go-back-N receiver state machine.

use crate::env::Environment;
use crate::packet::Packet;
use tracing::{debug, trace};

/// A go-back-N receiver: strictly in-order acceptance with cumulative
/// acknowledgments.
///
/// Only the exact next expected sequence number is delivered. Everything
/// else, corrupt packets included, re-acknowledges the last in-order
/// sequence received; that cumulative duplicate-ack is the sender's fast
/// feedback signal.
///
/// 回退N接收方：严格按序接收，累积确认。
///
/// 只有恰好是下一个期望序号的数据包才被交付。其余一切（包括损坏的数据包）
/// 都会重新确认最后按序收到的序号；这个累积重复确认正是发送方的快速反馈
/// 信号。
#[derive(Debug)]
pub struct Receiver {
    expected_seq: u32,
}

impl Default for Receiver {
    fn default() -> Self {
        Self { expected_seq: 1 }
    }
}

impl Receiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next in-order sequence number this receiver will deliver.
    pub fn expected_seq(&self) -> u32 {
        self.expected_seq
    }

    /// Handles a data packet arriving from the link.
    /// 处理从链路到达的数据包。
    pub fn on_packet_arrival<E: Environment>(&mut self, env: &mut E, packet: Packet) {
        if !packet.is_corrupt() && packet.seq == self.expected_seq {
            env.deliver(packet.payload);
            env.transmit(Packet::ack(self.expected_seq));
            debug!(seq = packet.seq, "delivered in order");
            self.expected_seq += 1;
        } else {
            // Before anything arrived the duplicate-ack carries 0, a
            // sequence number no data packet ever uses.
            let last_in_order = self.expected_seq - 1;
            env.transmit(Packet::ack(last_in_order));
            trace!(%packet, ack = last_in_order, "corrupt or out of order, re-acked");
        }
    }
}
