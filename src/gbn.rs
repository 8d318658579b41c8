//! 回退N协议：滑动窗口、累积确认、管辖整个窗口的单一定时器。
//! The go-back-N protocol: sliding window, cumulative acknowledgments, and a
//! single timer governing the whole window.

pub mod receiver;
pub mod sender;


pub use receiver::Receiver;
pub use sender::Sender;
