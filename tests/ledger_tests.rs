use std::{
    fs,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use marksman::{
    error::HarnessError,
    grade::{HintMap, Ledger, QuestionScore},
    harness::default_hints,
    question::{GradingPolicy, Question, TestMeta, Thunk},
};
use uuid::Uuid;

fn temp_root() -> PathBuf {
    let root = std::env::temp_dir().join(format!("marksman-ledger-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

fn meta(path: &str) -> TestMeta {
    TestMeta {
        path:   path.to_string(),
        points: None,
    }
}

fn thunk_returning(result: bool) -> Thunk {
    Box::new(move |_score: &mut QuestionScore| Ok(result))
}

#[test]
fn unmet_prerequisites_skip_the_question_entirely() {
    let attempted = Arc::new(AtomicBool::new(false));
    let witness = Arc::clone(&attempted);

    let mut q1 = Question::new("q1", 3.0, GradingPolicy::PassAll);
    q1.add_test(meta("q1/t0"), thunk_returning(false));

    let mut q2 = Question::new("q2", 3.0, GradingPolicy::PassAll);
    q2.add_test(
        meta("q2/t0"),
        Box::new(move |_score: &mut QuestionScore| {
            witness.store(true, Ordering::SeqCst);
            Ok(true)
        }),
    );

    let mut ledger = Ledger::new(
        "prereq run",
        vec![("q1".to_string(), 3.0), ("q2".to_string(), 3.0)],
        false,
        false,
        false,
    );
    ledger.add_prereq("q2", "q1");
    ledger
        .grade(vec![q1, q2], &HintMap::new(), false)
        .expect("grade");

    assert!(!attempted.load(Ordering::SeqCst), "q2 must never be attempted");
    assert_eq!(ledger.points_for("q2"), 0.0);
    assert_eq!(ledger.total(), 0.0);
}

#[test]
fn satisfied_prerequisites_let_dependents_run() {
    let mut q1 = Question::new("q1", 3.0, GradingPolicy::PassAll);
    q1.add_test(meta("q1/t0"), thunk_returning(true));

    let mut q2 = Question::new("q2", 2.0, GradingPolicy::PassAll);
    q2.add_test(meta("q2/t0"), thunk_returning(true));

    let mut ledger = Ledger::new(
        "prereq run",
        vec![("q1".to_string(), 3.0), ("q2".to_string(), 2.0)],
        false,
        false,
        false,
    );
    ledger.add_prereq("q2", "q1");
    ledger
        .grade(vec![q1, q2], &HintMap::new(), false)
        .expect("grade");

    assert_eq!(ledger.total(), 5.0);
}

#[test]
fn evaluation_errors_zero_the_question_and_surface_hints() {
    let mut q1 = Question::new("q1", 3.0, GradingPolicy::PassAll);
    q1.add_test(
        meta("q1/t0"),
        Box::new(|_score: &mut QuestionScore| {
            Err(HarnessError::Eval {
                kind:    "IndexOutOfBounds".to_string(),
                message: "array index out of bounds".to_string(),
            })
        }),
    );

    let mut ledger = Ledger::new(
        "error run",
        vec![("q1".to_string(), 3.0)],
        false,
        false,
        false,
    );
    ledger
        .grade(vec![q1], &default_hints(), false)
        .expect("grade");

    assert_eq!(ledger.points_for("q1"), 0.0);
    let joined = ledger.messages_for("q1").join("\n");
    assert!(joined.contains("FAIL: Exception raised"));
    assert!(joined.contains("hardcoded indices"));
}

#[test]
fn deadline_overruns_become_a_terminated_message() {
    let mut q1 = Question::new("q1", 3.0, GradingPolicy::PassAll);
    q1.add_test(
        meta("q1/t0"),
        Box::new(|_score: &mut QuestionScore| {
            thread::sleep(Duration::from_millis(500));
            Ok(true)
        }),
    );

    let mut ledger = Ledger::new(
        "timeout run",
        vec![("q1".to_string(), 3.0)],
        false,
        false,
        false,
    );
    ledger.set_deadline(Duration::from_millis(20));
    ledger
        .grade(vec![q1], &HintMap::new(), false)
        .expect("grade");

    assert_eq!(ledger.points_for("q1"), 0.0);
    let joined = ledger.messages_for("q1").join("\n");
    assert!(joined.contains("terminated"), "got messages: {joined}");
}

#[test]
fn gradescope_artifact_sums_question_scores() {
    let mut ledger = Ledger::new(
        "artifact run",
        vec![("q1".to_string(), 5.0), ("q2".to_string(), 5.0)],
        false,
        false,
        false,
    );

    let mut partial = QuestionScore::new("q1", 5.0);
    partial.add_points(4.0);
    partial.deduct_points(1.0);
    ledger.apply_score(partial);

    let mut full = QuestionScore::new("q2", 5.0);
    full.assign_full_credit();
    ledger.apply_score(full);

    let root = temp_root();
    let path = root.join("gradescope_response.json");
    ledger.write_gradescope(&path).expect("write artifact");

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read artifact")).expect("json");
    assert_eq!(parsed["score"], 8.0);
    assert_eq!(parsed["max_score"], 10.0);
    assert_eq!(parsed["tests"].as_array().expect("tests").len(), 2);
    assert_eq!(parsed["tests"][0]["name"], "q1");
    assert_eq!(parsed["tests"][0]["score"], 3.0);
    assert_eq!(parsed["tests"][0]["max_score"], 5.0);
    assert!(parsed["tests"][0]["tags"].as_array().expect("tags").is_empty());

    let _ = fs::remove_dir_all(root);
}

#[test]
fn repeated_questions_count_their_budget_once() {
    // a dependency chain can list a prerequisite more than once
    let mut ledger = Ledger::new(
        "diamond run",
        vec![
            ("q1".to_string(), 3.0),
            ("q2".to_string(), 1.0),
            ("q1".to_string(), 3.0),
            ("q3".to_string(), 2.0),
        ],
        false,
        false,
        false,
    );
    assert_eq!(ledger.total_possible(), 6.0);

    for (name, max) in [("q1", 3.0), ("q2", 1.0), ("q3", 2.0)] {
        let mut score = QuestionScore::new(name, max);
        score.assign_full_credit();
        ledger.apply_score(score);
    }

    let root = temp_root();
    let path = root.join("gradescope_response.json");
    ledger.write_gradescope(&path).expect("write artifact");

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read artifact")).expect("json");
    assert_eq!(parsed["score"], 6.0);
    assert_eq!(parsed["max_score"], 6.0);
    assert_eq!(parsed["tests"].as_array().expect("tests").len(), 3);

    let _ = fs::remove_dir_all(root);
}

#[test]
fn edx_artifacts_carry_the_total_and_messages() {
    let mut ledger = Ledger::new(
        "edx run",
        vec![("q1".to_string(), 5.0)],
        false,
        false,
        false,
    );

    let mut score = QuestionScore::new("q1", 5.0);
    score.add_points(5.0);
    score.add_message("PASS: 1 < 2 is true");
    ledger.apply_score(score);

    let root = temp_root();
    let html_path = root.join("edx_response.html");
    let grade_path = root.join("edx_grade");
    ledger.write_edx(&html_path, &grade_path).expect("write edx");

    let html = fs::read_to_string(&html_path).expect("read html");
    assert!(html.contains("Question q1 (5/5)"));
    assert!(html.contains("PASS: 1 &lt; 2 is true"));
    assert_eq!(fs::read_to_string(&grade_path).expect("read grade"), "5");

    let _ = fs::remove_dir_all(root);
}
