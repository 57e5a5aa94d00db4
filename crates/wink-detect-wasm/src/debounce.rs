//! 眨单眼去抖模块
//!
//! 把逐帧的原始眨眼信号转换为限频后的确认事件：
//! - 同一侧持续眨眼时，需要先累计 `required_frames` 个被抑制的帧才会再次确认，
//!   一直按住不会每帧都触发滚动
//! - 换到另一侧时立即确认，计数不跨侧继承
//! - 会话刚开始（尚无确认记录）时，第一次眨眼同样需要累计满计数；
//!   确认前换侧会让计数从零开始，计数只属于正在累计的那一侧

use serde::Serialize;

use crate::classifier::Side;

/// 单侧去抖状态机
#[derive(Clone, Debug, Serialize)]
pub struct WinkDebouncer {
    /// 确认前需要被抑制的连续帧数
    required_frames: u32,
    /// 当前累计的抑制帧数
    counter: u32,
    /// 最近一次确认的侧别
    last_confirmed: Option<Side>,
    /// 正在累计计数的侧别
    pending: Option<Side>,
}

impl WinkDebouncer {
    pub fn new(required_frames: u32) -> Self {
        Self {
            required_frames,
            counter: 0,
            last_confirmed: None,
            pending: None,
        }
    }

    /// 输入一帧的原始眨眼信号，返回该帧是否确认为一次有效眨眼
    pub fn observe(&mut self, side: Side) -> bool {
        if self.last_confirmed.is_some_and(|last| last != side) {
            return self.confirm(side);
        }

        if self.pending != Some(side) {
            self.counter = 0;
            self.pending = Some(side);
        }

        if self.counter < self.required_frames {
            self.counter += 1;
            return false;
        }

        self.confirm(side)
    }

    fn confirm(&mut self, side: Side) -> bool {
        self.counter = 0;
        self.last_confirmed = Some(side);
        self.pending = Some(side);
        true
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn last_confirmed(&self) -> Option<Side> {
        self.last_confirmed
    }

    pub fn pending(&self) -> Option<Side> {
        self.pending
    }

    pub fn required_frames(&self) -> u32 {
        self.required_frames
    }

    /// 回到会话初始状态
    pub fn reset(&mut self) {
        self.counter = 0;
        self.last_confirmed = None;
        self.pending = None;
    }
}
