pub mod capture;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod replay;
pub mod session;

pub use wink_detect_wasm as detect;
