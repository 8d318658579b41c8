//! 选择重传发送方状态机。
//! The selective-repeat sender state machine.

use crate::config::Config;
use crate::env::{Environment, SimTime};
use crate::error::{Error, Result};
use crate::packet::{Message, Packet};
use crate::rtt::RttEstimator;
use crate::timer::TimerQueue;
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, trace, warn};

/// Send-side record of one outstanding packet.
/// 一个在途数据包的发送侧记录。
#[derive(Debug, Clone, Copy)]
struct SendSlot {
    packet: Packet,
    sent_at: SimTime,
    retransmitted: bool,
    acked: bool,
}

/// A selective-repeat sender.
///
/// Each outstanding packet carries its own retransmission timer in a
/// [`TimerQueue`]; a loss costs exactly one retransmission. The side's
/// single alarm is used as a recurring clock tick that dispatches due
/// per-packet timers. Slots are dropped once the window slides past them,
/// so an acknowledgment for a missing slot is a duplicate.
///
/// 选择重传发送方。
///
/// 每个在途数据包在 [`TimerQueue`] 中携带自己的重传定时器；一次丢失只需
/// 一次重传。本侧的单一定时器被用作周期性时钟滴答，分发到期的逐包定时器。
/// 窗口滑过的槽位即被丢弃，因此指向缺失槽位的确认就是重复确认。
#[derive(Debug)]
pub struct Sender {
    send_base: u32,
    next_seq: u32,
    window_size: u32,
    max_outstanding: usize,
    clock_tick: SimTime,
    /// Outstanding packets keyed by sequence number, within
    /// `[send_base, next_seq)`.
    outstanding: BTreeMap<u32, SendSlot>,
    /// Messages waiting for window space, in arrival order.
    pending: VecDeque<Message>,
    timers: TimerQueue,
    rtt: RttEstimator,
}

impl Sender {
    /// Creates a sender from a validated configuration.
    /// 从已验证的配置创建发送方。
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            send_base: 1,
            next_seq: 1,
            window_size: config.window_size,
            max_outstanding: config.max_outstanding,
            clock_tick: config.clock_tick,
            outstanding: BTreeMap::new(),
            pending: VecDeque::new(),
            timers: TimerQueue::new(),
            rtt: RttEstimator::new(config.initial_rtt),
        })
    }

    /// One-time setup: arms the recurring clock tick. Call before any other
    /// entry point.
    ///
    /// 一次性初始化：设置周期性时钟滴答。须在任何其他入口点之前调用。
    pub fn init<E: Environment>(&mut self, env: &mut E) {
        env.arm_timer(self.clock_tick);
    }

    /// The oldest unacknowledged sequence number.
    pub fn send_base(&self) -> u32 {
        self.send_base
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
        self.next_seq < self.send_base + self.window_size
    }

    fn assert_window_invariant(&self) {
        debug_assert!(
            self.send_base <= self.next_seq
                && self.next_seq <= self.send_base + self.window_size,
            "window invariant violated: send_base={} next_seq={} N={}",
            self.send_base,
            self.next_seq,
            self.window_size,
        );
    }

    /// Accepts an outbound application message: transmitted immediately if
    /// the window has room, otherwise queued in arrival order.
    ///
    /// 接受一条出向应用消息：窗口有空位则立即发送，否则按到达顺序排队。
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

    /// Transmits `message` at `next_seq` with its own independent timer.
    fn transmit_fresh<E: Environment>(&mut self, env: &mut E, message: Message) {
        let seq = self.next_seq;
        let packet = Packet::data(seq, 0, &message);
        env.transmit(packet);
        let now = env.now();
        self.outstanding.insert(
            seq,
            SendSlot {
                packet,
                sent_at: now,
                retransmitted: false,
                acked: false,
            },
        );
        self.timers.arm(seq, now + self.rtt.timeout_interval());
        self.next_seq += 1;
        debug!(seq, "sent");
    }

    /// Handles a packet arriving from the link (a per-packet acknowledgment).
    ///
    /// Corrupt packets and duplicates (slot missing or already acked) are
    /// ignored. A fresh acknowledgment cancels its timer, samples the RTT
    /// when the packet was never retransmitted, and — when it acknowledges
    /// `send_base` — slides the window over the contiguous acked prefix and
    /// releases buffered messages into the freed slots.
    ///
    /// 处理从链路到达的数据包（逐包确认）。
    ///
    /// 损坏的数据包和重复确认（槽位缺失或已确认）被忽略。新确认会取消其
    /// 定时器、在数据包从未重传时采样 RTT，并在确认 `send_base` 时将窗口
    /// 滑过连续已确认前缀、把缓冲消息放入腾出的槽位。
    pub fn on_packet_arrival<E: Environment>(&mut self, env: &mut E, packet: Packet) {
        if packet.is_corrupt() {
            trace!(%packet, "corrupt ack, ignoring");
            return;
        }
        let Some(slot) = self.outstanding.get_mut(&packet.ack) else {
            trace!(ack = packet.ack, "duplicate ack for retired slot, ignoring");
            return;
        };
        if slot.acked {
            trace!(ack = packet.ack, "duplicate ack, ignoring");
            return;
        }

        self.timers.cancel(packet.ack);
        slot.acked = true;
        if !slot.retransmitted {
            let sample = env.now() - slot.sent_at;
            self.rtt.update(sample);
        }
        debug!(ack = packet.ack, "ack accepted");

        if packet.ack == self.send_base {
            while let Some(slot) = self.outstanding.get(&self.send_base) {
                if !slot.acked {
                    break;
                }
                self.outstanding.remove(&self.send_base);
                self.send_base += 1;
                trace!(send_base = self.send_base, "advanced send window");
            }
            self.drain_pending(env);
        }
        self.assert_window_invariant();
    }

    /// Handles the shared clock tick: re-arms it, then retransmits every
    /// packet whose individual timer came due, restarting each fired timer
    /// at the current estimated interval. A cancelled timer surfacing here
    /// is skipped inside [`TimerQueue::pop_due`] and not restarted.
    ///
    /// 处理共享时钟滴答：先重新设置滴答，然后重传每个逐包定时器到期的
    /// 数据包，并以当前估算间隔重启每个已触发的定时器。已取消的定时器在
    /// [`TimerQueue::pop_due`] 内部被跳过，不会重启。
    pub fn on_timer_fired<E: Environment>(&mut self, env: &mut E) {
        env.arm_timer(self.clock_tick);
        let now = env.now();
        let interval = self.rtt.timeout_interval();
        for seq in self.timers.pop_due(now) {
            let Some(slot) = self.outstanding.get_mut(&seq) else {
                continue;
            };
            env.transmit(slot.packet);
            slot.retransmitted = true;
            self.timers.arm(seq, now + interval);
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
