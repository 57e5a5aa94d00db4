//! 浏览器端入口
//!
//! `WinkDetector` 把帧处理器包装为 JS 类。每次动画帧回调中传入关键点模型的
//! 输出，返回本帧确认的眨眼侧别数组（`"left"` / `"right"`），滚动由 JS 侧执行。

use wasm_bindgen::prelude::*;

use crate::classifier::Side;
use crate::ear::{eye_aspect_ratio, EyeLandmarks};
use crate::landmarks::{EyePair, FaceKeypoints, LandmarkModel, LandmarkScheme};
use crate::processor::{ConfirmedWink, DetectionConfig, FrameProcessor, FrameReport};

/// 眨单眼检测器
#[wasm_bindgen]
pub struct WinkDetector {
    processor: FrameProcessor<LandmarkModel>,
}

#[wasm_bindgen]
impl WinkDetector {
    /// 创建检测器
    ///
    /// # 参数
    /// - `ear_threshold`: EAR 阈值，默认 0.22
    /// - `consecutive_frames`: 去抖帧数，默认 5
    /// - `model`: `"mediapipe-facemesh"`（默认）或 `"facemesh-contours"`，无法识别时使用默认
    #[wasm_bindgen(constructor)]
    pub fn new(
        ear_threshold: Option<f64>,
        consecutive_frames: Option<u32>,
        model: Option<String>,
    ) -> Self {
        let defaults = DetectionConfig::default();
        let config = DetectionConfig {
            ear_threshold: ear_threshold.unwrap_or(defaults.ear_threshold),
            consecutive_frames: consecutive_frames.unwrap_or(defaults.consecutive_frames),
        };
        let model = model
            .and_then(|name| name.parse::<LandmarkModel>().ok())
            .unwrap_or_default();
        Self::with_model(model, config)
    }

    /// 处理关键点模型的输出（人脸数组），无法解析时视为无人脸
    #[wasm_bindgen(js_name = "processFaces")]
    pub fn process_faces_js(&mut self, faces_js: JsValue) -> JsValue {
        let faces: Vec<FaceKeypoints> =
            serde_wasm_bindgen::from_value(faces_js).unwrap_or_default();
        let sides = self.process_faces(&faces);
        serde_wasm_bindgen::to_value(&sides).unwrap_or(JsValue::NULL)
    }

    /// 优化路径：直接传入两只眼睛各12个坐标（p1..p6 × x,y），避免序列化整张网格
    #[wasm_bindgen(js_name = "processEyes")]
    pub fn process_eyes_js(&mut self, left: &[f64], right: &[f64]) -> JsValue {
        let sides = self.process_eyes(left, right);
        serde_wasm_bindgen::to_value(&sides).unwrap_or(JsValue::NULL)
    }

    /// 最近一次确认的侧别，用于切换表情图标
    #[wasm_bindgen(js_name = "latestWinkSide")]
    pub fn latest_wink_side(&self) -> Option<String> {
        self.processor
            .debouncer()
            .last_confirmed()
            .map(|side| side.as_str().to_string())
    }

    /// 最近一帧的诊断信息
    #[wasm_bindgen(js_name = "lastReport")]
    pub fn last_report_js(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.processor.last_report()).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = "getThreshold")]
    pub fn get_threshold(&self) -> f64 {
        self.processor.config().ear_threshold
    }

    #[wasm_bindgen(js_name = "setThreshold")]
    pub fn set_threshold(&mut self, threshold: f64) {
        self.processor.set_threshold(threshold);
    }

    #[wasm_bindgen(js_name = "modelName")]
    pub fn model_name(&self) -> String {
        self.processor.scheme().name().to_string()
    }

    pub fn reset(&mut self) {
        self.processor.reset();
    }
}

impl WinkDetector {
    pub fn with_model(model: LandmarkModel, config: DetectionConfig) -> Self {
        Self {
            processor: FrameProcessor::new(model, config),
        }
    }

    /// 按所选模型映射关键点，映射失败的人脸记为 unmapped
    pub fn process_faces(&mut self, faces: &[FaceKeypoints]) -> Vec<Side> {
        sides(self.processor.process_frame(faces))
    }

    pub fn process_eyes(&mut self, left: &[f64], right: &[f64]) -> Vec<Side> {
        let pair = match (EyeLandmarks::from_flat(left), EyeLandmarks::from_flat(right)) {
            (Some(left), Some(right)) => Some(EyePair { left, right }),
            _ => None,
        };
        sides(self.processor.process_eyes([pair]))
    }

    pub fn last_report(&self) -> &FrameReport {
        self.processor.last_report()
    }
}

fn sides(confirmed: Vec<ConfirmedWink>) -> Vec<Side> {
    confirmed.into_iter().map(|wink| wink.side).collect()
}

/// 单只眼睛的6点 EAR，输入12个坐标；无法计算时返回 -1
#[wasm_bindgen(js_name = "eyeAspectRatio")]
pub fn eye_aspect_ratio_js(coords: &[f64]) -> f64 {
    EyeLandmarks::from_flat(coords)
        .and_then(|eye| eye_aspect_ratio(&eye))
        .unwrap_or(-1.0)
}
