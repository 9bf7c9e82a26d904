//! 游戏核心逻辑模块（状态机、规则引擎、随机源、持久化）。

pub mod dice;
pub mod rules;
pub mod score;
pub mod state;

pub use dice::DiceRoller;
pub use rules::{RuleEngine, RuleError, RuleResolution, ToggleHoldAction};
pub use score::{LocalStorageScores, MemoryScores, ScoreStore, BEST_SCORE_KEY};
pub use state::{
    ClockPhase,
    Die,
    DieId,
    GameEvent,
    GameState,
    IntegrityError,
    WinRecord,
    DICE_COUNT,
    DIE_FACES,
};
