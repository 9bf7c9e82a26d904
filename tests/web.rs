//! 浏览器环境下的绑定层冒烟测试。

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

use wasm_tenzies::{GameEngine, GameState, RuleResolution, DICE_COUNT};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn engine_starts_a_fresh_game() {
    let engine = GameEngine::new(None).expect("engine should construct");
    let json = engine.state_json().expect("state should serialize");
    let state: GameState = serde_json::from_str(&json).expect("state json should parse");

    assert_eq!(state.dice.len(), DICE_COUNT);
    assert!(state.dice.iter().all(|die| !die.held));
    assert!(!state.won);
    assert_eq!(state.rolls, 0);
}

#[wasm_bindgen_test]
fn roll_increments_the_counter() {
    let mut engine = GameEngine::new(None).expect("engine should construct");
    let json = engine.roll().expect("roll should succeed");
    let resolution: RuleResolution =
        serde_json::from_str(&json).expect("resolution json should parse");

    assert_eq!(resolution.state.rolls, 1);
}

#[wasm_bindgen_test]
fn toggling_a_die_marks_it_held() {
    let mut engine = GameEngine::new(None).expect("engine should construct");
    let json = engine.state_json().expect("state should serialize");
    let state: GameState = serde_json::from_str(&json).expect("state json should parse");
    let die_id = state.dice[0].id;

    let json = engine.toggle_hold(die_id).expect("toggle should succeed");
    let resolution: RuleResolution =
        serde_json::from_str(&json).expect("resolution json should parse");
    let die = resolution
        .state
        .die(die_id)
        .copied()
        .expect("die should still exist");

    assert!(die.held);
}
