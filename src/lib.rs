pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use game::{
    ClockPhase, Die, DieId, DiceRoller, GameEvent, GameState, IntegrityError, LocalStorageScores,
    MemoryScores, RuleEngine, RuleError, RuleResolution, ScoreStore, ToggleHoldAction, WinRecord,
    BEST_SCORE_KEY, DICE_COUNT, DIE_FACES,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn make_resolution(state: GameState, events: Vec<GameEvent>) -> RuleResolution {
    RuleResolution::new(state, events)
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn make_resolution_json(resolution: RuleResolution) -> Result<String, JsValue> {
    serde_json::to_string(&resolution).map_err(serde_to_js_error)
}

fn resolution_from_events(state: &GameState, events: Vec<GameEvent>) -> RuleResolution {
    RuleResolution::new(state.clone(), events)
}

fn execute_with_engine<F>(state: &mut GameState, action: F) -> Result<Vec<GameEvent>, JsValue>
where
    F: FnOnce(&mut RuleEngine, &mut GameState) -> Result<Vec<GameEvent>, RuleError>,
{
    let mut engine = RuleEngine::new();
    action(&mut engine, state).map_err(to_js_error)
}

/// 有状态的引擎封装，前端以 JSON 字符串交互。
#[wasm_bindgen]
pub struct GameEngine {
    state: GameState,
    rules: RuleEngine,
}

#[wasm_bindgen]
impl GameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(initial_state_json: Option<String>) -> Result<GameEngine, JsValue> {
        let mut rules = RuleEngine::new();
        let state = if let Some(json) = initial_state_json {
            serde_json::from_str(&json).map_err(serde_to_js_error)?
        } else {
            rules.initialize()
        };
        Ok(GameEngine { state, rules })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        self.state = state;
        Ok(())
    }

    /// 重掷所有未冻结的骰子。
    pub fn roll(&mut self) -> Result<String, JsValue> {
        let events = self.rules.roll(&mut self.state).map_err(to_js_error)?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    /// 点击某颗骰子，切换冻结状态。
    pub fn toggle_hold(&mut self, die_id: u32) -> Result<String, JsValue> {
        let events = self
            .rules
            .toggle_hold(&mut self.state, ToggleHoldAction { die_id })
            .map_err(to_js_error)?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    /// 开始新的一局；历史最佳成绩保留。
    pub fn new_game(&mut self) -> Result<String, JsValue> {
        let events = self.rules.new_game(&mut self.state).map_err(to_js_error)?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }

    /// 宿主每秒调用一次，推进局内计时。
    pub fn tick(&mut self) -> Result<String, JsValue> {
        let events = self.rules.tick(&mut self.state).map_err(to_js_error)?;
        make_resolution_json(resolution_from_events(&self.state, events))
    }
}

/// 创建一局全新的游戏状态（读取历史最佳成绩）。
#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state() -> Result<JsValue, JsValue> {
    let mut engine = RuleEngine::new();
    to_value(&engine.initialize()).map_err(JsValue::from)
}

/// 返回一个进行中的示例状态，方便前端调试。
#[wasm_bindgen(js_name = "sampleGameState")]
pub fn sample_game_state() -> Result<JsValue, JsValue> {
    to_value(&GameState::sample()).map_err(JsValue::from)
}

/// 将传入的游戏状态进行深拷贝后返回。
#[wasm_bindgen(js_name = "cloneGameState")]
pub fn clone_game_state(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    let cloned = state.clone();
    to_value(&cloned).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "rollDice")]
pub fn roll_dice(state: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let events = execute_with_engine(&mut state, |engine, state| engine.roll(state))?;
    to_value(&make_resolution(state, events)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "toggleHold")]
pub fn toggle_hold(state: JsValue, action: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let action: ToggleHoldAction = from_value(action).map_err(JsValue::from)?;
    let events =
        execute_with_engine(&mut state, |engine, state| engine.toggle_hold(state, action))?;
    to_value(&make_resolution(state, events)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "newGame")]
pub fn new_game(state: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let events = execute_with_engine(&mut state, |engine, state| engine.new_game(state))?;
    to_value(&make_resolution(state, events)).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "tickClock")]
pub fn tick_clock(state: JsValue) -> Result<JsValue, JsValue> {
    let mut state: GameState = from_value(state).map_err(JsValue::from)?;
    let events = execute_with_engine(&mut state, |engine, state| engine.tick(state))?;
    to_value(&make_resolution(state, events)).map_err(JsValue::from)
}

/// 纯谓词：是否满足全部冻结且点数一致的获胜条件。
#[wasm_bindgen(js_name = "checkTenzies")]
pub fn check_tenzies(state: JsValue) -> Result<bool, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    Ok(RuleEngine::check_win(&state))
}

#[wasm_bindgen(js_name = "validateState")]
pub fn validate_state(state: JsValue) -> Result<(), JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    state
        .integrity_check()
        .map_err(|error| to_js_error(RuleError::IntegrityViolation { error }))?;
    Ok(())
}

/// 读取持久化的最低掷骰次数；没有或无法解析时返回 undefined。
#[wasm_bindgen(js_name = "loadBestScore")]
pub fn load_best_score() -> Option<u32> {
    LocalStorageScores.load()
}

/// 延迟指定毫秒后重掷，供前端与摇骰动画同步。
#[wasm_bindgen(js_name = "rollDiceDelayed")]
pub fn roll_dice_delayed(state: JsValue, delay_ms: Option<u32>) -> Promise {
    let delay = delay_ms.unwrap_or(0);

    future_to_promise(async move {
        if delay > 0 {
            TimeoutFuture::new(delay).await;
        }
        let mut state: GameState = from_value(state).map_err(JsValue::from)?;
        let mut engine = RuleEngine::new();
        let events = engine.roll(&mut state).map_err(to_js_error)?;
        let json =
            serde_json::to_string(&make_resolution(state, events)).map_err(serde_to_js_error)?;
        Ok(JsValue::from_str(&json))
    })
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
