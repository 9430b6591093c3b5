use marksman::{
    grade::QuestionScore,
    question::{GradingPolicy, Question, TestMeta, Thunk},
    record::Record,
};

fn meta(path: &str, points: Option<f64>) -> TestMeta {
    TestMeta {
        path: path.to_string(),
        points,
    }
}

fn fixed(result: bool) -> Thunk {
    Box::new(move |_score: &mut QuestionScore| Ok(result))
}

fn run(question: &Question) -> QuestionScore {
    let mut score = QuestionScore::new(question.name(), question.max_points());
    question.execute(&mut score).expect("execute");
    score
}

#[test]
fn pass_all_awards_full_credit_when_every_test_passes() {
    let mut question = Question::new("q1", 3.0, GradingPolicy::PassAll);
    for i in 0..4 {
        question.add_test(meta(&format!("t{i}"), None), fixed(true));
    }
    assert_eq!(run(&question).points(), 3.0);
}

#[test]
fn pass_all_zeroes_on_any_failure() {
    let mut question = Question::new("q1", 3.0, GradingPolicy::PassAll);
    question.add_test(meta("t0", None), fixed(true));
    question.add_test(meta("t1", None), fixed(false));
    question.add_test(meta("t2", None), fixed(true));

    let score = run(&question);
    assert_eq!(score.points(), 0.0);
    assert!(score.messages().iter().any(|m| m == "Tests failed."));
}

#[test]
fn extra_credit_lands_on_top_of_full_marks() {
    let mut question = Question::new(
        "q2",
        3.0,
        GradingPolicy::ExtraCreditPassAll { extra_points: 1.0 },
    );
    question.add_test(meta("t0", None), fixed(true));
    assert_eq!(run(&question).points(), 4.0);
}

#[test]
fn extra_credit_is_withheld_on_failure() {
    let mut question = Question::new(
        "q2",
        3.0,
        GradingPolicy::ExtraCreditPassAll { extra_points: 1.0 },
    );
    question.add_test(meta("t0", None), fixed(false));
    assert_eq!(run(&question).points(), 0.0);
}

#[test]
fn partial_credit_sums_passing_point_values() {
    let mut question = Question::new("q3", 5.0, GradingPolicy::HackedPartialCredit);
    question.add_test(meta("t0", Some(3.0)), fixed(true));
    question.add_test(meta("t1", Some(2.0)), fixed(false));
    assert_eq!(run(&question).points(), 3.0);
}

#[test]
fn partial_credit_forces_zero_when_sum_hits_max_with_a_failure() {
    // the historical consistency check: point-carrying tests reach the
    // budget while a plain test fails, so the total must be miscounted
    let mut question = Question::new("q3", 5.0, GradingPolicy::HackedPartialCredit);
    question.add_test(meta("t0", Some(3.0)), fixed(true));
    question.add_test(meta("t1", Some(2.0)), fixed(true));
    question.add_test(meta("t2", None), fixed(false));
    assert_eq!(run(&question).points(), 0.0);
}

#[test]
fn number_passed_counts_true_thunks_without_a_ceiling() {
    let mut question = Question::new("q4", 1.0, GradingPolicy::NumberPassed);
    question.add_test(meta("t0", None), fixed(true));
    question.add_test(meta("t1", None), fixed(false));
    question.add_test(meta("t2", None), fixed(true));
    assert_eq!(run(&question).points(), 2.0);
}

#[test]
fn policies_are_selected_from_the_class_field() {
    let mut config = Record::new("q1/CONFIG");
    config.record_one_line("class", "PassAllTestsQuestion");
    config.record_one_line("max_points", "3");
    let question = Question::from_config("q1", &config).expect("build");
    assert_eq!(question.max_points(), 3.0);

    let mut config = Record::new("q2/CONFIG");
    config.record_one_line("class", "ExtraCreditPassAllTestsQuestion");
    config.record_one_line("max_points", "3");
    config.record_one_line("extra_points", "2");
    assert!(Question::from_config("q2", &config).is_ok());

    let mut config = Record::new("q5/CONFIG");
    config.record_one_line("class", "SomethingElseEntirely");
    config.record_one_line("max_points", "3");
    assert!(Question::from_config("q5", &config).is_err());
}
