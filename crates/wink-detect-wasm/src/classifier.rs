//! 眨单眼分类模块
//!
//! 比较左右两眼的 EAR：一只眼闭合且另一只眼睁开才算眨单眼 (wink)，
//! 双眼同时闭合是普通眨眼 (blink)，双眼睁开是中性状态，二者都不触发。

use serde::{Deserialize, Serialize};

/// 眼睛侧别，同时决定滚动方向
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// 主眼闭合 (`<= threshold`) 且副眼睁开 (`> threshold`) 时返回 true
#[inline]
pub fn is_winking_eye(primary_ear: f64, secondary_ear: f64, threshold: f64) -> bool {
    primary_ear <= threshold && secondary_ear > threshold
}

/// 同一帧两只眼睛的 EAR，`None` 表示该眼几何退化无法计算
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct EyeReadings {
    pub left: Option<f64>,
    pub right: Option<f64>,
}

/// 单帧的原始眨眼信号（未去抖）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WinkSignals {
    pub left: bool,
    pub right: bool,
}

impl WinkSignals {
    /// 按左、右顺序返回为 true 的侧别
    pub fn sides(&self) -> impl Iterator<Item = Side> {
        [(Side::Left, self.left), (Side::Right, self.right)]
            .into_iter()
            .filter_map(|(side, raised)| raised.then_some(side))
    }

    pub fn any(&self) -> bool {
        self.left || self.right
    }
}

/// 对左右两侧对称地调用 [`is_winking_eye`]
///
/// 任一只眼读数缺失时两侧都返回 false：无法确认另一只眼是睁开的。
pub fn classify(readings: EyeReadings, threshold: f64) -> WinkSignals {
    match (readings.left, readings.right) {
        (Some(left), Some(right)) => WinkSignals {
            left: is_winking_eye(left, right, threshold),
            right: is_winking_eye(right, left, threshold),
        },
        _ => WinkSignals::default(),
    }
}
