//! 浏览器侧小工具（控制台输出等）。

use wasm_bindgen::JsValue;

/// 向浏览器控制台输出一条警告。
pub fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}
