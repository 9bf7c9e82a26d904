//! 最佳成绩持久化：浏览器 localStorage 后端与测试用内存后端。

use std::cell::RefCell;
use std::rc::Rc;

use crate::utils;

/// localStorage 中保存最低掷骰次数的键。
pub const BEST_SCORE_KEY: &str = "lowestRollsCount";

/// 最佳成绩存储接口。引擎只依赖该接口，不直接接触浏览器环境。
pub trait ScoreStore {
    /// 读取已保存的最低掷骰次数；缺失或损坏时返回 None。
    fn load(&self) -> Option<u32>;
    /// 写入新的最低掷骰次数。
    fn save(&self, rolls: u32);
}

impl<S: ScoreStore> ScoreStore for Rc<S> {
    fn load(&self) -> Option<u32> {
        (**self).load()
    }

    fn save(&self, rolls: u32) {
        (**self).save(rolls)
    }
}

fn decode_best(raw: &str) -> Result<u32, serde_json::Error> {
    serde_json::from_str(raw)
}

fn encode_best(rolls: u32) -> Result<String, serde_json::Error> {
    serde_json::to_string(&rolls)
}

/// 浏览器 localStorage 后端，保存值为 JSON 编码的整数。
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageScores;

impl LocalStorageScores {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl ScoreStore for LocalStorageScores {
    fn load(&self) -> Option<u32> {
        let raw = Self::storage()?.get_item(BEST_SCORE_KEY).ok().flatten()?;
        match decode_best(&raw) {
            Ok(rolls) => Some(rolls),
            Err(err) => {
                // 损坏的记录当作没有历史成绩，照常开局。
                utils::console_warn(&format!("忽略无法解析的最佳成绩记录: {err}"));
                None
            }
        }
    }

    fn save(&self, rolls: u32) {
        let storage = match Self::storage() {
            Some(storage) => storage,
            None => {
                utils::console_warn("localStorage 不可用，最佳成绩未写入");
                return;
            }
        };
        match encode_best(rolls) {
            Ok(encoded) => {
                if storage.set_item(BEST_SCORE_KEY, &encoded).is_err() {
                    utils::console_warn("最佳成绩写入 localStorage 失败");
                }
            }
            Err(err) => utils::console_warn(&format!("最佳成绩编码失败: {err}")),
        }
    }
}

/// 内存后端，测试与原生环境使用。
#[derive(Debug, Default)]
pub struct MemoryScores {
    best: RefCell<Option<u32>>,
}

impl MemoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(rolls: u32) -> Self {
        Self {
            best: RefCell::new(Some(rolls)),
        }
    }
}

impl ScoreStore for MemoryScores {
    fn load(&self) -> Option<u32> {
        *self.best.borrow()
    }

    fn save(&self, rolls: u32) {
        *self.best.borrow_mut() = Some(rolls);
    }
}
