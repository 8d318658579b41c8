//! 逐包定时器队列：按绝对触发时间排序的最小堆，以代数令牌实现惰性取消。
//! The per-packet timer queue: a min-heap ordered by absolute fire time,
//! with generation tokens for lazy cancellation.
//!
//! Cancellation never disturbs the heap. Each `arm` stamps the entry with a
//! fresh generation for its sequence number; `cancel` (or a later re-arm)
//! retires that generation, and stale entries are discarded when they
//! surface at pop time. A cancelled timer firing is therefore impossible by
//! construction, not merely handled.
//!
//! 取消操作从不扰动堆。每次 `arm` 都会为该序号的条目盖上一个新的代数；
//! `cancel`（或之后的重新设置）使该代数作废，过期条目在弹出时被丢弃。
//! 因此已取消定时器的触发在构造上就不可能发生，而不只是被处理掉。

use crate::env::SimTime;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

/// One armed (or stale) timer in the heap.
#[derive(Debug, Clone, Copy)]
struct Entry {
    fire_at: SimTime,
    seq: u32,
    generation: u64,
}

// BinaryHeap is a max-heap, so the ordering is inverted to pop the earliest
// deadline first. Ties break on sequence number for determinism.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .total_cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// A multi-timer schedule keyed by sequence number.
/// 以序号为键的多定时器调度。
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Entry>,
    /// The generation currently live per armed sequence number.
    /// 每个已设置序号当前有效的代数。
    live: BTreeMap<u32, u64>,
    next_generation: u64,
}

impl TimerQueue {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms (or re-arms) the timer for `seq` to fire at the absolute time
    /// `fire_at`. Any earlier arming of the same sequence number becomes
    /// stale.
    ///
    /// 为 `seq` 设置（或重新设置）在绝对时间 `fire_at` 触发的定时器。
    /// 同一序号更早的设置即告过期。
    pub fn arm(&mut self, seq: u32, fire_at: SimTime) {
        self.next_generation += 1;
        self.live.insert(seq, self.next_generation);
        self.heap.push(Entry {
            fire_at,
            seq,
            generation: self.next_generation,
        });
    }

    /// Logically cancels the timer for `seq`. Safe to call when none is
    /// armed.
    ///
    /// 逻辑上取消 `seq` 的定时器。未设置时调用也是安全的。
    pub fn cancel(&mut self, seq: u32) {
        self.live.remove(&seq);
    }

    /// Whether a live timer exists for `seq`.
    pub fn is_armed(&self, seq: u32) -> bool {
        self.live.contains_key(&seq)
    }

    /// Pops every timer due at or before `now`, in fire-time order, skipping
    /// stale entries. Fired timers are no longer armed; the caller restarts
    /// them as needed.
    ///
    /// 弹出所有在 `now` 或之前到期的定时器（按触发时间顺序），跳过过期条目。
    /// 已触发的定时器不再处于设置状态；由调用方按需重新设置。
    pub fn pop_due(&mut self, now: SimTime) -> Vec<u32> {
        let mut fired = Vec::new();
        while let Some(&entry) = self.heap.peek() {
            if entry.fire_at > now {
                break;
            }
            let _ = self.heap.pop();
            if self.live.get(&entry.seq) == Some(&entry.generation) {
                self.live.remove(&entry.seq);
                fired.push(entry.seq);
            }
        }
        fired
    }
}
