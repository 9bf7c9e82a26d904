use serde::{Deserialize, Serialize};

use super::{
    dice::{self, DiceRoller},
    score::{LocalStorageScores, ScoreStore},
    state::{Die, DieId, GameEvent, GameState, IntegrityError, WinRecord, DICE_COUNT},
};

/// 点击某颗骰子：切换它的冻结状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToggleHoldAction {
    pub die_id: DieId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    GameFinished,
    IntegrityViolation { error: IntegrityError },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub victory: Option<WinRecord>,
}

impl RuleResolution {
    pub fn new(state: GameState, mut events: Vec<GameEvent>) -> Self {
        let victory = state.outcome.clone();
        if let Some(ref record) = victory {
            let has_event = events
                .iter()
                .any(|event| matches!(event, GameEvent::GameWon { .. }));
            if !has_event {
                events.push(GameEvent::GameWon {
                    rolls: record.rolls,
                    elapsed_seconds: record.elapsed_seconds,
                    new_best: record.new_best,
                });
            }
        }

        Self {
            state,
            events,
            victory,
        }
    }
}

/// 规则引擎：持有随机源与最佳成绩存储，驱动所有状态迁移。
pub struct RuleEngine {
    roller: Option<DiceRoller>,
    scores: Box<dyn ScoreStore>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    /// 浏览器默认配置：模块级共享随机源 + localStorage 存储。
    pub fn new() -> Self {
        Self {
            roller: None,
            scores: Box::new(LocalStorageScores),
        }
    }

    /// 注入自定义随机源与存储，测试中据此获得确定性。
    pub fn with_parts(roller: DiceRoller, scores: Box<dyn ScoreStore>) -> Self {
        Self {
            roller: Some(roller),
            scores,
        }
    }

    fn ensure_integrity(state: &GameState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    fn next_value(&mut self) -> u8 {
        match self.roller.as_mut() {
            Some(roller) => roller.value(),
            None => dice::with_shared_roller(|roller| roller.value()),
        }
    }

    fn mint_die(&mut self, state: &mut GameState) -> Die {
        let value = self.next_value();
        state.mint_die(value)
    }

    /// 纯谓词：十颗骰子全部冻结且点数一致。
    pub fn check_win(state: &GameState) -> bool {
        state.tenzies()
    }

    /// 生成一局新游戏：十颗未冻结的骰子，计数归零，读取历史最佳成绩。
    pub fn initialize(&mut self) -> GameState {
        let mut state = GameState::default();
        for _ in 0..DICE_COUNT {
            let die = self.mint_die(&mut state);
            state.dice.push(die);
        }
        state.best_rolls = self.scores.load();
        state
    }

    /// 重掷所有未冻结的骰子。获胜后的重掷被拒绝，状态保持不变。
    pub fn roll(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        Self::ensure_integrity(state)?;

        let mut events = Vec::new();
        if state.start_clock() {
            let event = GameEvent::ClockStarted;
            state.record_event(event.clone());
            events.push(event);
        }

        let mut rerolled = Vec::new();
        for idx in 0..state.dice.len() {
            if state.dice[idx].held {
                continue;
            }
            let die = self.mint_die(state);
            rerolled.push(die.id);
            state.dice[idx] = die;
        }
        state.rolls += 1;

        let event = GameEvent::DiceRolled {
            roll_count: state.rolls,
            rerolled,
        };
        state.record_event(event.clone());
        events.push(event);

        self.settle_win(state, &mut events);
        Ok(events)
    }

    /// 切换冻结状态。未知骰子标识按无操作处理，获胜后依然可以点击。
    pub fn toggle_hold(
        &mut self,
        state: &mut GameState,
        action: ToggleHoldAction,
    ) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_integrity(state)?;

        let held = match state.die_mut(action.die_id) {
            Some(die) => {
                die.held = !die.held;
                die.held
            }
            None => return Ok(Vec::new()),
        };

        let mut events = Vec::new();
        if state.start_clock() {
            let event = GameEvent::ClockStarted;
            state.record_event(event.clone());
            events.push(event);
        }

        let event = GameEvent::DieHeld {
            die_id: action.die_id,
            held,
        };
        state.record_event(event.clone());
        events.push(event);

        self.settle_win(state, &mut events);
        Ok(events)
    }

    /// 开始新的一局；历史最佳成绩保留。
    pub fn new_game(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        *state = self.initialize();
        let event = GameEvent::NewGameStarted;
        state.record_event(event.clone());
        Ok(vec![event])
    }

    /// 秒级时钟推进，宿主每秒调用一次；计时器未运行时不做任何事。
    pub fn tick(&mut self, state: &mut GameState) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_integrity(state)?;
        if state.clock_running() {
            state.elapsed_seconds += 1;
        }
        Ok(Vec::new())
    }

    /// 每次变更后的获胜结算，只在进入获胜态的那一次生效。
    fn settle_win(&mut self, state: &mut GameState, events: &mut Vec<GameEvent>) {
        if state.is_finished() || !state.tenzies() {
            return;
        }

        state.stop_clock();

        // 与持久化的历史值比较，不使用状态里的镜像，避免写入陈旧数据。
        let previous = self.scores.load();
        let new_best = previous.map_or(true, |best| state.rolls < best);

        let record = state.declare_win(WinRecord {
            rolls: state.rolls,
            elapsed_seconds: state.elapsed_seconds,
            new_best,
        });
        events.push(GameEvent::GameWon {
            rolls: record.rolls,
            elapsed_seconds: record.elapsed_seconds,
            new_best: record.new_best,
        });

        if new_best {
            self.scores.save(state.rolls);
            state.best_rolls = Some(state.rolls);
            let event = GameEvent::BestScoreUpdated {
                rolls: state.rolls,
                previous,
            };
            state.record_event(event.clone());
            events.push(event);
        } else {
            state.best_rolls = previous;
        }
    }
}
