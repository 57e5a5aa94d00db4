//! EAR (Eye Aspect Ratio) 计算模块
//!
//! 基于标准6点眼部关键点计算 EAR，用于判断单只眼睛的睁闭状态。
//! EAR 只依赖同一帧的关键点，不保留跨帧状态；时间维度的记忆全部在
//! `debounce` 模块中。

use serde::{Deserialize, Serialize};

/// 眼角距离低于此值视为退化几何（两个眼角重合）
const MIN_HORIZONTAL: f64 = 1e-6;

/// EAR 保留的小数位数，同一会话内必须保持一致，避免阈值附近抖动
pub const EAR_DECIMALS: i32 = 2;

/// 二维关键点，输入中的 z 坐标被忽略
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        distance(self, other)
    }
}

/// 关键点模型输出的两种写法：`[x, y]` / `[x, y, z]` 数组或 `{x, y, z}` 对象
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Seq(Vec<f64>),
    Object {
        x: f64,
        y: f64,
        #[serde(default)]
        #[allow(dead_code)]
        z: f64,
    },
}

impl TryFrom<RawPoint> for Point {
    type Error = String;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        match raw {
            RawPoint::Seq(coords) if coords.len() >= 2 => Ok(Point::new(coords[0], coords[1])),
            RawPoint::Seq(coords) => Err(format!(
                "keypoint needs at least 2 coordinates, got {}",
                coords.len()
            )),
            RawPoint::Object { x, y, .. } => Ok(Point::new(x, y)),
        }
    }
}

/// 欧氏距离
#[inline]
pub fn distance(p1: &Point, p2: &Point) -> f64 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    (dx * dx + dy * dy).sqrt()
}

/// 单只眼睛的6点关键点
///
/// - `edge_l`, `edge_r`: 左右眼角（水平方向）
/// - `upper_l`, `upper_r`: 上眼睑两个采样点
/// - `lower_l`, `lower_r`: 下眼睑两个采样点，分别与上眼睑配对
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeLandmarks {
    pub edge_l: Point,
    pub edge_r: Point,
    pub upper_l: Point,
    pub upper_r: Point,
    pub lower_l: Point,
    pub lower_r: Point,
}

impl EyeLandmarks {
    /// 从12个浮点数构造 (6个点 × 2个坐标)，顺序为 p1..p6:
    /// edgeL, upperL, upperR, edgeR, lowerR, lowerL
    pub fn from_flat(coords: &[f64]) -> Option<Self> {
        if coords.len() < 12 {
            return None;
        }
        let at = |i: usize| Point::new(coords[i * 2], coords[i * 2 + 1]);
        Some(Self {
            edge_l: at(0),
            upper_l: at(1),
            upper_r: at(2),
            edge_r: at(3),
            lower_r: at(4),
            lower_l: at(5),
        })
    }
}

/// 标准6点 EAR
///
/// 公式: EAR = (|upperR-lowerR| + |upperL-lowerL|) / (2 * |edgeL-edgeR|)
///
/// 眼角重合或出现非有限值时返回 `None`，调用方应把该帧视为不可操作。
/// 结果按 [`EAR_DECIMALS`] 四舍五入。
pub fn eye_aspect_ratio(eye: &EyeLandmarks) -> Option<f64> {
    let horizontal = distance(&eye.edge_l, &eye.edge_r);
    if !horizontal.is_finite() || horizontal < MIN_HORIZONTAL {
        return None;
    }

    let vertical1 = distance(&eye.upper_r, &eye.lower_r);
    let vertical2 = distance(&eye.upper_l, &eye.lower_l);
    let ear = (vertical1 + vertical2) / (2.0 * horizontal);

    if ear.is_finite() {
        Some(round_ear(ear))
    } else {
        None
    }
}

fn round_ear(ear: f64) -> f64 {
    let scale = 10_f64.powi(EAR_DECIMALS);
    (ear * scale).round() / scale
}
