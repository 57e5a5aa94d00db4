/// 默认每次眨眼滚动的像素
pub const DEFAULT_SCROLL_STEP_PX: f64 = 120.0;

/// 默认帧率上限，与摄像头帧率一致
pub const DEFAULT_MAX_FPS: u32 = 30;

/// 帧率上限的最大允许值
pub const MAX_FPS_LIMIT: u32 = 240;

/// 默认回放录制文件
pub const DEFAULT_REPLAY_PATH: &str = "./recordings/session.jsonl";

/// 滚动位置的初始值（页面顶部）
pub const INITIAL_SCROLL_OFFSET: f64 = 0.0;

/// 日志文件名前缀
pub const LOG_FILE_PREFIX: &str = "wink-scroll";

/// 保留的滚动日志文件数量
pub const MAX_LOG_FILES: usize = 14;
