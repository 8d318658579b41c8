//! 回退N发送方状态机。
//! The go-back-N sender state machine.

use crate::config::Config;
use crate::env::{Environment, SimTime};
use crate::error::{Error, Result};
use crate::packet::{Message, Packet};
use crate::rtt::RttEstimator;
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, trace, warn};

/// Send-side record of one outstanding packet.
/// 一个在途数据包的发送侧记录。
#[derive(Debug, Clone, Copy)]
struct SendSlot {
    packet: Packet,
    sent_at: SimTime,
    retransmitted: bool,
}

/// A go-back-N sender.
///
/// Sequence numbers are assigned monotonically from 1. The window
/// `[base, base + N)` bounds what may be outstanding; messages arriving
/// while it is full wait in a FIFO queue and are released in arrival order
/// as acknowledgments free window space. One timer covers the whole window:
/// when it fires, every outstanding packet is retransmitted.
///
/// 回退N发送方。
///
/// 序号从 1 起单调分配。窗口 `[base, base + N)` 限定可在途的范围；
/// 窗口满时到达的消息在 FIFO 队列中等待，并随确认释放窗口空间按到达顺序
/// 放行。单一定时器覆盖整个窗口：触发时重传所有在途数据包。
#[derive(Debug)]
pub struct Sender {
    base: u32,
    next_seq: u32,
    window_size: u32,
    max_outstanding: usize,
    /// Outstanding packets keyed by sequence number, always within
    /// `[base, next_seq)`.
    outstanding: BTreeMap<u32, SendSlot>,
    /// Messages waiting for window space, in arrival order.
    pending: VecDeque<Message>,
    rtt: RttEstimator,
}

impl Sender {
    /// Creates a sender from a validated configuration, capturing the window
    /// size once.
    ///
    /// 从已验证的配置创建发送方，一次性捕获窗口大小。
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            base: 1,
            next_seq: 1,
            window_size: config.window_size,
            max_outstanding: config.max_outstanding,
            outstanding: BTreeMap::new(),
            pending: VecDeque::new(),
            rtt: RttEstimator::new(config.initial_rtt),
        })
    }

    /// The oldest unacknowledged sequence number.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// The sequence number the next fresh packet will carry.
    pub fn next_seq(&self) -> u32 {
        self.next_seq
    }

    /// Number of messages waiting for window space.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// The current adaptive timeout interval, exposed for observation.
    pub fn timeout_interval(&self) -> SimTime {
        self.rtt.timeout_interval()
    }

    fn window_has_room(&self) -> bool {
        self.next_seq < self.base + self.window_size
    }

    fn assert_window_invariant(&self) {
        debug_assert!(
            self.base <= self.next_seq && self.next_seq <= self.base + self.window_size,
            "window invariant violated: base={} next_seq={} N={}",
            self.base,
            self.next_seq,
            self.window_size,
        );
    }

    /// Accepts an outbound application message: transmitted immediately if
    /// the window has room, otherwise queued. Fails only when the explicit
    /// capacity bound on tracked messages would be exceeded.
    ///
    /// 接受一条出向应用消息：窗口有空位则立即发送，否则排队。
    /// 仅当跟踪消息的显式容量上限将被超出时才失败。
    pub fn on_outbound_message<E: Environment>(
        &mut self,
        env: &mut E,
        message: Message,
    ) -> Result<()> {
        if self.outstanding.len() + self.pending.len() >= self.max_outstanding {
            return Err(Error::TooManyOutstanding);
        }
        if self.window_has_room() {
            self.transmit_fresh(env, message);
        } else {
            self.pending.push_back(message);
            debug!(pending = self.pending.len(), "window full, buffered");
        }
        self.assert_window_invariant();
        Ok(())
    }

    /// Transmits `message` at `next_seq`, arming the timer when it becomes
    /// the sole outstanding packet.
    fn transmit_fresh<E: Environment>(&mut self, env: &mut E, message: Message) {
        let seq = self.next_seq;
        let packet = Packet::data(seq, 0, &message);
        env.transmit(packet);
        self.outstanding.insert(
            seq,
            SendSlot {
                packet,
                sent_at: env.now(),
                retransmitted: false,
            },
        );
        if self.base == seq {
            env.arm_timer(self.rtt.timeout_interval());
        }
        self.next_seq += 1;
        debug!(seq, "sent");
    }

    /// Handles a packet arriving from the link (a cumulative acknowledgment).
    ///
    /// Corrupt packets, stale acknowledgments (`ack < base`) and
    /// acknowledgments beyond the window are ignored. A valid one samples
    /// the RTT of its slot when that slot was never retransmitted, slides
    /// `base` past everything acknowledged, stops the timer if the window
    /// emptied (restarts it otherwise), and drains the pending queue into
    /// the freed space.
    ///
    /// 处理从链路到达的数据包（累积确认）。
    ///
    /// 损坏的数据包、过期确认（`ack < base`）以及超出窗口的确认被忽略。
    /// 有效确认在对应槽位从未重传时采样其 RTT，将 `base` 滑过所有被确认的
    /// 序号，窗口清空时停止定时器（否则重启），并将等待队列排入腾出的空间。
    pub fn on_packet_arrival<E: Environment>(&mut self, env: &mut E, packet: Packet) {
        if packet.is_corrupt() {
            trace!(%packet, "corrupt ack, ignoring");
            return;
        }
        if packet.ack < self.base {
            trace!(ack = packet.ack, base = self.base, "stale ack, ignoring");
            return;
        }
        if packet.ack >= self.next_seq {
            trace!(ack = packet.ack, next_seq = self.next_seq, "ack beyond window, ignoring");
            return;
        }

        if let Some(slot) = self.outstanding.get(&packet.ack) {
            if !slot.retransmitted {
                self.rtt.update(env.now() - slot.sent_at);
            }
        }

        self.base = packet.ack + 1;
        self.outstanding = self.outstanding.split_off(&self.base);
        debug!(base = self.base, "cumulative ack advanced window");

        if self.base == self.next_seq {
            env.cancel_timer();
        } else {
            env.arm_timer(self.rtt.timeout_interval());
        }

        self.drain_pending(env);
        self.assert_window_invariant();
    }

    /// Handles the window timer firing: backs the timer off to double the
    /// estimated interval and retransmits every outstanding packet in
    /// sequence order. One loss costs the whole window; that is the
    /// defining go-back-N trade.
    ///
    /// 处理窗口定时器触发：将定时器退避到两倍估算间隔，并按序号顺序重传
    /// 所有在途数据包。一次丢失代价是整个窗口；这正是回退N的取舍所在。
    pub fn on_timer_fired<E: Environment>(&mut self, env: &mut E) {
        if self.outstanding.is_empty() {
            trace!("timer fired with empty window, ignoring");
            return;
        }
        env.arm_timer(self.rtt.timeout_interval() * 2.0);
        for (&seq, slot) in self.outstanding.iter_mut() {
            env.transmit(slot.packet);
            slot.retransmitted = true;
            warn!(seq, "timeout, retransmitted");
        }
    }

    /// Releases queued messages while the window has room, preserving
    /// arrival order.
    fn drain_pending<E: Environment>(&mut self, env: &mut E) {
        while self.window_has_room() {
            let Some(message) = self.pending.pop_front() else {
                break;
            };
            self.transmit_fresh(env, message);
        }
    }
}
