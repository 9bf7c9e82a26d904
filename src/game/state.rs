use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 一局游戏的骰子数量，固定为 10。
pub const DICE_COUNT: usize = 10;
/// 骰面数，点数取值范围 1..=DIE_FACES。
pub const DIE_FACES: u8 = 6;

/// 全局唯一的骰子标识。
pub type DieId = u32;

/// 单颗骰子。重掷会整颗替换，冻结的骰子原样保留。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Die {
    pub id: DieId,
    pub value: u8,
    #[serde(default)]
    pub held: bool,
}

impl Die {
    pub fn new(id: DieId, value: u8) -> Self {
        Self {
            id,
            value,
            held: false,
        }
    }
}

/// 局内计时器阶段：首次操作前未启动，获胜后不再走动。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClockPhase {
    Idle,
    Running,
    Stopped,
}

impl Default for ClockPhase {
    fn default() -> Self {
        ClockPhase::Idle
    }
}

/// 单局获胜的结算信息。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WinRecord {
    pub rolls: u32,
    pub elapsed_seconds: u32,
    pub new_best: bool,
}

/// 游戏事件流。秒级计时不入流，避免淹没其余事件。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    DiceRolled {
        roll_count: u32,
        rerolled: Vec<DieId>,
    },
    DieHeld {
        die_id: DieId,
        held: bool,
    },
    ClockStarted,
    GameWon {
        rolls: u32,
        elapsed_seconds: u32,
        new_best: bool,
    },
    BestScoreUpdated {
        rolls: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        previous: Option<u32>,
    },
    NewGameStarted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    WrongDiceCount { count: usize },
    DieValueOutOfRange { die_id: DieId, value: u8 },
    DuplicateDieId { die_id: DieId },
    WonFlagMismatch,
}

/// 游戏整体状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    #[serde(default)]
    pub dice: Vec<Die>,
    pub rolls: u32,
    pub elapsed_seconds: u32,
    #[serde(default)]
    pub won: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_rolls: Option<u32>,
    #[serde(default)]
    pub clock: ClockPhase,
    #[serde(default)]
    pub next_die_id: DieId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<WinRecord>,
}

impl GameState {
    pub fn new(dice: Vec<Die>) -> Self {
        let next_die_id = dice.iter().map(|die| die.id + 1).max().unwrap_or(0);
        Self {
            dice,
            rolls: 0,
            elapsed_seconds: 0,
            won: false,
            best_rolls: None,
            clock: ClockPhase::default(),
            next_die_id,
            event_log: Vec::new(),
            outcome: None,
        }
    }

    /// 铸造一颗新骰子，标识取自状态内单调递增的计数器。
    pub fn mint_die(&mut self, value: u8) -> Die {
        let id = self.next_die_id;
        self.next_die_id += 1;
        Die::new(id, value)
    }

    pub fn die(&self, die_id: DieId) -> Option<&Die> {
        self.dice.iter().find(|die| die.id == die_id)
    }

    pub fn die_mut(&mut self, die_id: DieId) -> Option<&mut Die> {
        self.dice.iter_mut().find(|die| die.id == die_id)
    }

    /// 获胜判定：十颗骰子全部冻结且点数一致。
    /// 点数一致但未全部冻结不算获胜。
    pub fn tenzies(&self) -> bool {
        if self.dice.len() != DICE_COUNT {
            return false;
        }
        let first_value = match self.dice.first() {
            Some(die) => die.value,
            None => return false,
        };
        self.dice
            .iter()
            .all(|die| die.held && die.value == first_value)
    }

    /// 首次掷骰或冻结时启动计时器；返回本次调用是否发生了启动。
    pub fn start_clock(&mut self) -> bool {
        if self.clock == ClockPhase::Idle {
            self.clock = ClockPhase::Running;
            true
        } else {
            false
        }
    }

    pub fn stop_clock(&mut self) {
        if self.clock == ClockPhase::Running {
            self.clock = ClockPhase::Stopped;
        }
    }

    pub fn clock_running(&self) -> bool {
        self.clock == ClockPhase::Running
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    pub fn is_finished(&self) -> bool {
        self.won
    }

    /// 宣告获胜。只有首次调用生效，重复调用不会改写结算。
    pub fn declare_win(&mut self, record: WinRecord) -> WinRecord {
        if self.outcome.is_none() {
            self.won = true;
            self.record_event(GameEvent::GameWon {
                rolls: record.rolls,
                elapsed_seconds: record.elapsed_seconds,
                new_best: record.new_best,
            });
            self.outcome = Some(record.clone());
        }
        record
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        if self.dice.len() != DICE_COUNT {
            return Err(IntegrityError::WrongDiceCount {
                count: self.dice.len(),
            });
        }

        let mut seen = HashSet::new();
        for die in &self.dice {
            if die.value == 0 || die.value > DIE_FACES {
                return Err(IntegrityError::DieValueOutOfRange {
                    die_id: die.id,
                    value: die.value,
                });
            }
            if !seen.insert(die.id) {
                return Err(IntegrityError::DuplicateDieId { die_id: die.id });
            }
        }

        // 获胜后允许继续点击骰子，won 与骰面可以不一致，但必须与结算一致。
        if self.won != self.outcome.is_some() {
            return Err(IntegrityError::WonFlagMismatch);
        }

        Ok(())
    }

    /// 构造一个进行中的示例状态，方便前端调试或初始化。
    pub fn sample() -> Self {
        let mut state = GameState::default();

        let first_roll = [3, 1, 4, 1, 5, 2, 6, 2, 4, 3];
        let mut rolled_ids = Vec::new();
        for value in first_roll {
            let die = state.mint_die(value);
            rolled_ids.push(die.id);
            state.dice.push(die);
        }
        state.rolls = 1;
        state.clock = ClockPhase::Running;
        state.record_event(GameEvent::ClockStarted);
        state.record_event(GameEvent::DiceRolled {
            roll_count: 1,
            rerolled: rolled_ids,
        });

        // 玩家押注 1 点，冻结两颗 1。
        for die_id in [1, 3] {
            if let Some(die) = state.die_mut(die_id) {
                die.held = true;
            }
            state.record_event(GameEvent::DieHeld { die_id, held: true });
        }

        let second_roll = [6, 2, 5, 5, 3, 1, 4, 6];
        let mut replacements = second_roll.iter().copied();
        let mut rerolled = Vec::new();
        for idx in 0..state.dice.len() {
            if state.dice[idx].held {
                continue;
            }
            if let Some(value) = replacements.next() {
                let die = state.mint_die(value);
                rerolled.push(die.id);
                state.dice[idx] = die;
            }
        }
        state.rolls = 2;
        state.record_event(GameEvent::DiceRolled {
            roll_count: 2,
            rerolled,
        });

        state.elapsed_seconds = 17;
        state.best_rolls = Some(14);
        state
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            dice: Vec::new(),
            rolls: 0,
            elapsed_seconds: 0,
            won: false,
            best_rolls: None,
            clock: ClockPhase::default(),
            next_die_id: 0,
            event_log: Vec::new(),
            outcome: None,
        }
    }
}
