//! 眨单眼滚动检测 WASM 库
//!
//! 把摄像头逐帧的人脸关键点转换为去抖后的方向性滚动指令，编译为
//! WebAssembly 在浏览器端运行，同时作为 rlib 供原生运行时复用。
//!
//! ## 模块
//! - `ear`: EAR (Eye Aspect Ratio) 眼部纵横比计算
//! - `classifier`: 眨单眼 / 眨眼 / 中性 判别
//! - `debounce`: 眨单眼去抖状态机
//! - `landmarks`: 各关键点模型的索引映射表
//! - `processor`: 逐帧处理流程
//! - `detector`: 浏览器端 JS 入口

pub mod classifier;
pub mod debounce;
pub mod detector;
pub mod ear;
pub mod landmarks;
pub mod processor;

// 重新导出核心类型，方便外部使用
pub use classifier::{classify, is_winking_eye, EyeReadings, Side, WinkSignals};
pub use debounce::WinkDebouncer;
pub use detector::WinkDetector;
pub use ear::{distance, eye_aspect_ratio, EyeLandmarks, Point, EAR_DECIMALS};
pub use landmarks::{
    ContourScheme, EyeContours, EyeIndices, EyePair, FaceKeypoints, LandmarkModel, LandmarkScheme,
    MeshScheme, SixPointScheme,
};
pub use processor::{
    ConfirmedWink, DetectionConfig, FaceReport, FrameProcessor, FrameReport, ScrollDirection,
};
