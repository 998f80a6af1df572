// Snapshot recording and history navigation

use finn::config::EngineConfig;
use finn::interpreter::Interpreter;
use finn::lexer::tokenize;
use finn::memory::Value;
use finn::snapshot::Timeline;
use pretty_assertions::assert_eq;

fn recorded(source: &str, limit: usize) -> Interpreter {
    let lexed = tokenize(source, "main.finn").expect("lexing failed");
    let config = EngineConfig::default().with_snapshots(limit);
    let mut interpreter = Interpreter::new(lexed.tokens, config);
    let _ = interpreter.run();
    interpreter
}

#[test]
fn test_one_snapshot_per_token_plus_final() {
    let interpreter = recorded("1 2 + print", 1 << 20);
    let manager = interpreter.snapshots().expect("recording is on");

    // four tokens, the end marker, then the post-run state
    assert_eq!(manager.len(), 6);
    assert!(!manager.is_truncated());

    let before_plus = manager.get(2).expect("snapshot 2");
    assert_eq!(before_plus.stack, vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(before_plus.location.column, 5);
    assert_eq!(before_plus.mode, "normal");

    let last = manager.get(manager.len() - 1).expect("final snapshot");
    assert!(last.token.is_none());
    assert!(last.stack.is_empty());
    assert_eq!(last.console_len, 1);
}

#[test]
fn test_skipped_tokens_are_recorded_with_their_mode() {
    let interpreter = recorded("false if 1 end", 1 << 20);
    let manager = interpreter.snapshots().expect("recording is on");
    let inside = manager.get(2).expect("snapshot of the skipped literal");
    assert!(inside.mode.starts_with("skipping branch"));
}

#[test]
fn test_snapshots_see_definitions_and_memory() {
    let interpreter = recorded("f :: proc end x 1 = x & drop", 1 << 20);
    let manager = interpreter.snapshots().expect("recording is on");
    let last = manager.get(manager.len() - 1).expect("final snapshot");
    assert_eq!(last.procedures, vec!["f".to_string()]);
    assert_eq!(last.variables, vec![("x".to_string(), Value::Int(1))]);
    assert_eq!(last.memory.blocks.len(), 1);
    assert_eq!(last.memory.blocks[0].names, vec!["x".to_string()]);
}

#[test]
fn test_budget_truncates_but_keeps_the_final_state() {
    let interpreter = recorded("1 2 3 4 5 6 7 8 print", 1);
    let manager = interpreter.snapshots().expect("recording is on");
    assert!(manager.is_truncated());
    assert_eq!(manager.len(), 1);
    let only = manager.get(0).expect("final snapshot");
    assert!(only.token.is_none());
    assert_eq!(only.stack.len(), 7);
}

#[test]
fn test_halt_is_the_last_snapshot() {
    let interpreter = recorded("1 print +", 1 << 20);
    let manager = interpreter.snapshots().expect("recording is on");
    let last = manager.get(manager.len() - 1).expect("final snapshot");
    assert!(last.token.is_none());
    // printed value and diagnostic
    assert_eq!(last.console_len, 2);
}

#[test]
fn test_timeline_walks_the_history() {
    let interpreter = recorded("1 2 +", 1 << 20);
    let manager = interpreter.snapshots().expect("recording is on");
    let mut timeline = Timeline::new(manager.len());

    let mut heights = Vec::new();
    loop {
        let snapshot = manager.get(timeline.position()).expect("in range");
        heights.push(snapshot.stack.len());
        if !timeline.step_forward(1) {
            break;
        }
    }
    assert_eq!(heights, vec![0, 1, 2, 1, 1]);

    timeline.to_start();
    assert_eq!(timeline.position(), 0);
}

#[test]
fn test_recording_off_by_default() {
    let lexed = tokenize("1", "main.finn").expect("lexing failed");
    let mut interpreter = Interpreter::new(lexed.tokens, EngineConfig::default());
    interpreter.run().expect("runs");
    assert!(interpreter.snapshots().is_none());
}
