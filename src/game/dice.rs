//! 骰子点数随机源：统一采样入口，支持固定种子复现整局。

use once_cell::sync::Lazy;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};

use super::state::DIE_FACES;

/// 无状态导出函数共用的模块级随机源，惰性初始化一次。
static SHARED_ROLLER: Lazy<Mutex<DiceRoller>> =
    Lazy::new(|| Mutex::new(DiceRoller::from_entropy()));

/// 骰子点数随机源。
#[derive(Debug)]
pub struct DiceRoller {
    rng: SmallRng,
}

impl DiceRoller {
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// 固定种子构造，测试中据此获得确定性的骰面序列。
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// 均匀采样一个骰面点数。
    pub fn value(&mut self) -> u8 {
        self.rng.gen_range(1..=DIE_FACES)
    }
}

pub fn with_shared_roller<T>(action: impl FnOnce(&mut DiceRoller) -> T) -> T {
    let mut roller = SHARED_ROLLER
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    action(&mut roller)
}
