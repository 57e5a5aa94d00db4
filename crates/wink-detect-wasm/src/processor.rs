//! 帧处理模块
//!
//! 每帧对每张脸依次执行：关键点映射 → 左右眼 EAR → 眨单眼分类 → 去抖，
//! 收集本帧确认的眨眼事件。本模块只修改去抖状态，不产生任何副作用，
//! 滚动等实际动作由调用方按返回结果分发。

use serde::{Deserialize, Serialize};

use crate::classifier::{classify, EyeReadings, Side, WinkSignals};
use crate::debounce::WinkDebouncer;
use crate::ear::eye_aspect_ratio;
use crate::landmarks::{EyePair, LandmarkScheme};

pub const DEFAULT_EAR_THRESHOLD: f64 = 0.22;
pub const DEFAULT_CONSECUTIVE_FRAMES: u32 = 5;

/// 检测参数，阈值与模型和光照相关，需可调
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionConfig {
    pub ear_threshold: f64,
    pub consecutive_frames: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            ear_threshold: DEFAULT_EAR_THRESHOLD,
            consecutive_frames: DEFAULT_CONSECUTIVE_FRAMES,
        }
    }
}

/// 滚动方向：左眼向上，右眼向下
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

impl ScrollDirection {
    /// 像素偏移的符号
    pub fn sign(&self) -> f64 {
        match self {
            Self::Up => -1.0,
            Self::Down => 1.0,
        }
    }
}

/// 去抖后确认的一次眨单眼
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ConfirmedWink {
    pub side: Side,
}

impl ConfirmedWink {
    pub fn direction(&self) -> ScrollDirection {
        match self.side {
            Side::Left => ScrollDirection::Up,
            Side::Right => ScrollDirection::Down,
        }
    }
}

/// 单张脸在一帧内的诊断信息
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceReport {
    pub readings: EyeReadings,
    pub signals: WinkSignals,
    /// 关键点映射失败（缺点或结构不匹配）
    pub unmapped: bool,
}

/// 最近一帧的诊断信息
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub faces: Vec<FaceReport>,
    pub confirmed: Vec<ConfirmedWink>,
}

/// 帧处理器
///
/// 不可并发调用：去抖状态按帧顺序推进。
#[derive(Clone, Debug)]
pub struct FrameProcessor<S: LandmarkScheme> {
    scheme: S,
    config: DetectionConfig,
    debouncer: WinkDebouncer,
    last_report: FrameReport,
}

impl<S: LandmarkScheme> FrameProcessor<S> {
    pub fn new(scheme: S, config: DetectionConfig) -> Self {
        Self {
            scheme,
            debouncer: WinkDebouncer::new(config.consecutive_frames),
            config,
            last_report: FrameReport::default(),
        }
    }

    /// 处理一帧；没有检测到人脸时返回空结果且不修改去抖状态
    pub fn process_frame(&mut self, faces: &[S::Face]) -> Vec<ConfirmedWink> {
        let mapped: Vec<Option<EyePair>> =
            faces.iter().map(|face| self.scheme.eyes(face)).collect();
        self.process_eyes(mapped)
    }

    /// 处理已映射好的眼部关键点，`None` 表示该脸映射失败
    pub fn process_eyes(
        &mut self,
        faces: impl IntoIterator<Item = Option<EyePair>>,
    ) -> Vec<ConfirmedWink> {
        let mut report = FrameReport::default();

        for eyes in faces {
            let Some(eyes) = eyes else {
                report.faces.push(FaceReport {
                    unmapped: true,
                    ..FaceReport::default()
                });
                continue;
            };

            let readings = EyeReadings {
                left: eye_aspect_ratio(&eyes.left),
                right: eye_aspect_ratio(&eyes.right),
            };
            let signals = classify(readings, self.config.ear_threshold);

            for side in signals.sides() {
                if self.debouncer.observe(side) {
                    report.confirmed.push(ConfirmedWink { side });
                }
            }

            report.faces.push(FaceReport {
                readings,
                signals,
                unmapped: false,
            });
        }

        let confirmed = report.confirmed.clone();
        self.last_report = report;
        confirmed
    }

    pub fn last_report(&self) -> &FrameReport {
        &self.last_report
    }

    pub fn debouncer(&self) -> &WinkDebouncer {
        &self.debouncer
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// 调整阈值，不影响去抖状态
    pub fn set_threshold(&mut self, threshold: f64) {
        self.config.ear_threshold = threshold;
    }

    pub fn reset(&mut self) {
        self.debouncer.reset();
        self.last_report = FrameReport::default();
    }
}
