#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs,
    path::Path,
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};
use typed_builder::TypedBuilder;

use crate::{
    constants::{
        BONUS_ART, BONUS_TOTAL, EDX_GRADE_FILE, EDX_RESPONSE_FILE, GRADESCOPE_RESPONSE_FILE,
        GRADING_DEADLINE,
    },
    deadline::{self, Outcome},
    error::HarnessError,
    mute::MuteGuard,
    question::Question,
    util::html_escape,
};

/// Hints keyed by question id, then by evaluation-error kind. The `*` entry
/// holds hints that apply to any question.
pub type HintMap = HashMap<String, HashMap<String, String>>;

/// Finds a hint for a (question, error kind) pair, falling back to the
/// any-question entry.
fn lookup_hint<'a>(hints: &'a HintMap, question: &str, kind: &str) -> Option<&'a str> {
    hints
        .get(question)
        .and_then(|per_question| per_question.get(kind))
        .or_else(|| hints.get("*").and_then(|general| general.get(kind)))
        .map(String::as_str)
}

/// The accumulating score and message state for one question while it is
/// being graded. Test cases and grading policies mutate this; the ledger
/// folds it back in once the question finishes.
#[derive(Debug, Clone)]
pub struct QuestionScore {
    /// Question identifier.
    name:       String,
    /// The question's point budget.
    max_points: f64,
    /// Points accumulated so far.
    points:     f64,
    /// Feedback messages in the order they were produced.
    messages:   Vec<String>,
}

impl QuestionScore {
    /// Creates a clean score sheet for a question.
    pub fn new(name: impl Into<String>, max_points: f64) -> Self {
        QuestionScore {
            name: name.into(),
            max_points,
            points: 0.0,
            messages: Vec::new(),
        }
    }

    /// Question identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Points accumulated so far.
    pub fn points(&self) -> f64 {
        self.points
    }

    /// The question's point budget.
    pub fn max_points(&self) -> f64 {
        self.max_points
    }

    /// Messages recorded so far.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Resets the question to zero points.
    pub fn assign_zero_credit(&mut self) {
        self.points = 0.0;
    }

    /// Sets the question to its full point budget.
    pub fn assign_full_credit(&mut self) {
        self.points = self.max_points;
    }

    /// Adds points to the question.
    pub fn add_points(&mut self, amount: f64) {
        self.points += amount;
    }

    /// Deducts points from the question.
    pub fn deduct_points(&mut self, amount: f64) {
        self.points -= amount;
    }

    /// Zeroes the question and records an explanatory message.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.assign_zero_credit();
        self.add_message(message);
    }

    /// Records a feedback message, one stored entry per line, echoing each to
    /// the console. Harness feedback is never muted.
    pub fn add_message(&mut self, message: impl Into<String>) {
        for line in message.into().split('\n') {
            println!("*** {line}");
            self.messages.push(line.to_string());
        }
    }
}

/// One row of the provisional-grades table.
#[derive(Tabled)]
struct ScoreRow {
    /// Question identifier.
    #[tabled(rename = "Question")]
    question: String,
    /// `points/max` for that question.
    #[tabled(rename = "Score")]
    score:    String,
}

/// A data structure for project grades, along with formatting code to
/// display them.
///
/// Each question moves pending → attempted → completed, or straight to
/// skipped when a prerequisite never completed. Completion requires the
/// accumulated points to meet the question's budget; only completed
/// questions satisfy prerequisites of later ones.
pub struct Ledger {
    /// Name of the project being graded.
    project:    String,
    /// Question identifiers and budgets, in grading order.
    questions:  Vec<(String, f64)>,
    /// Points per question; absent means zero.
    points:     BTreeMap<String, f64>,
    /// Feedback messages per question.
    messages:   BTreeMap<String, Vec<String>>,
    /// Prerequisite question ids per question.
    prereqs:    HashMap<String, BTreeSet<String>>,
    /// Whether to write the Gradescope JSON artifact.
    gs_output:  bool,
    /// Whether to write the edX HTML/plaintext artifacts.
    edx_output: bool,
    /// Whether student output is muted while questions run.
    mute:       bool,
    /// Wall-clock budget per question.
    deadline:   Duration,
}

impl Ledger {
    /// Creates a ledger for the given questions in grading order.
    ///
    /// A dependency chain may list a question more than once; its budget
    /// counts once, at the position it first appears.
    pub fn new(
        project: impl Into<String>,
        questions_and_maxes: Vec<(String, f64)>,
        gs_output: bool,
        edx_output: bool,
        mute: bool,
    ) -> Self {
        let mut questions: Vec<(String, f64)> = Vec::new();
        for (name, max) in questions_and_maxes {
            if !questions.iter().any(|(seen, _)| *seen == name) {
                questions.push((name, max));
            }
        }
        Ledger {
            project: project.into(),
            questions,
            points: BTreeMap::new(),
            messages: BTreeMap::new(),
            prereqs: HashMap::new(),
            gs_output,
            edx_output,
            mute,
            deadline: GRADING_DEADLINE,
        }
    }

    /// Overrides the per-question wall-clock budget.
    pub fn set_deadline(&mut self, deadline: Duration) {
        self.deadline = deadline;
    }

    /// Declares that `question` must not run until `prereq` has completed.
    pub fn add_prereq(&mut self, question: &str, prereq: &str) {
        self.prereqs
            .entry(question.to_string())
            .or_default()
            .insert(prereq.to_string());
    }

    /// Points recorded for a question, defaulting to zero.
    pub fn points_for(&self, question: &str) -> f64 {
        self.points.get(question).copied().unwrap_or_default()
    }

    /// Messages recorded for a question.
    pub fn messages_for(&self, question: &str) -> &[String] {
        self.messages
            .get(question)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total points across all questions.
    pub fn total(&self) -> f64 {
        self.points.values().sum()
    }

    /// Total points possible.
    pub fn total_possible(&self) -> f64 {
        self.questions.iter().map(|(_, max)| max).sum()
    }

    /// Folds a finished question's score sheet into the ledger.
    pub fn apply_score(&mut self, score: QuestionScore) {
        let QuestionScore {
            name,
            points,
            messages,
            ..
        } = score;
        self.points.insert(name.clone(), points);
        self.messages.entry(name).or_default().extend(messages);
    }

    /// Grades every question in order, then renders the report and writes
    /// any requested artifacts.
    ///
    /// Questions run strictly sequentially; the only state shared between
    /// them is this ledger, mutated between runs, never concurrently.
    pub fn grade(&mut self, questions: Vec<Question>, hints: &HintMap, bonus_pic: bool) -> Result<()> {
        tracing::info!(project = %self.project, "starting grading run");

        let mut completed: BTreeSet<String> = BTreeSet::new();

        for question in questions {
            let name = question.name().to_string();
            let max = question.max_points();

            println!("\nQuestion {name}");
            println!("{}", "=".repeat(9 + name.len()));
            println!();

            if let Some(required) = self.prereqs.get(&name) {
                if let Some(missing) = required.difference(&completed).next() {
                    println!(
                        "*** NOTE: Make sure to complete Question {missing} before working on \
                         Question {name},\n*** because Question {name} builds upon your answer \
                         for Question {missing}."
                    );
                    continue;
                }
            }

            let guard = self.mute.then(MuteGuard::acquire);
            let outcome = deadline::run_with_deadline(self.deadline, move || {
                let mut score = QuestionScore::new(question.name(), question.max_points());
                let result = question.execute(&mut score);
                (score, result)
            })?;
            drop(guard);

            match outcome {
                Outcome::Finished((score, Ok(()))) => self.apply_score(score),
                Outcome::Finished((mut score, Err(err))) => {
                    score.assign_zero_credit();
                    score.add_message(format!("FAIL: Exception raised: {err}"));
                    if let Some(kind) = err.eval_kind() {
                        if let Some(hint) = lookup_hint(hints, &name, kind) {
                            score.add_message(hint);
                        }
                    }
                    self.apply_score(score);
                }
                Outcome::TimedOut => {
                    let mut score = QuestionScore::new(&name, max);
                    score.fail(format!("FAIL: {}", HarnessError::Timeout(self.deadline)));
                    self.apply_score(score);
                }
                Outcome::Crashed => {
                    let mut score = QuestionScore::new(&name, max);
                    score.fail("FAIL: Terminated: the grading worker panicked.");
                    self.apply_score(score);
                }
            }

            if self.points_for(&name) >= max {
                completed.insert(name.clone());
            }

            println!("\n### Question {name}: {}/{max} ###\n", self.points_for(&name));
        }

        tracing::info!(total = self.total(), possible = self.total_possible(), "grading finished");
        self.print_report();

        if bonus_pic && self.total() == BONUS_TOTAL {
            println!("{BONUS_ART}");
        }

        println!(
            "\nYour grades are NOT yet registered. To register your grades, make sure\nto follow \
             your instructor's guidelines to receive credit on your project.\n"
        );

        if self.edx_output {
            self.write_edx(Path::new(EDX_RESPONSE_FILE), Path::new(EDX_GRADE_FILE))?;
        }
        if self.gs_output {
            self.write_gradescope(Path::new(GRADESCOPE_RESPONSE_FILE))?;
        }

        Ok(())
    }

    /// Renders the provisional-grades table.
    fn print_report(&self) {
        let rows: Vec<ScoreRow> = self
            .questions
            .iter()
            .map(|(name, max)| ScoreRow {
                question: name.clone(),
                score:    format!("{}/{max}", self.points_for(name)),
            })
            .collect();

        eprintln!(
            "{}",
            Table::new(&rows)
                .with(Panel::header("Provisional Grades"))
                .with(Panel::footer(format!(
                    "Total: {}/{}",
                    self.total(),
                    self.total_possible()
                )))
                .with(Modify::new(Rows::new(1..)).with(Width::wrap(40).keep_words(true)))
                .with(
                    Modify::new(Rows::first())
                        .with(Alignment::center())
                        .with(Alignment::center_vertical()),
                )
                .with(
                    Modify::new(Rows::last())
                        .with(Alignment::center())
                        .with(Alignment::center_vertical()),
                )
                .with(Style::modern())
        );
    }

    /// Writes the Gradescope JSON summary to `path`.
    pub fn write_gradescope(&self, path: &Path) -> Result<()> {
        let total = self.total();
        let possible = self.total_possible();

        let tests: Vec<GradescopeTestCase> = self
            .questions
            .iter()
            .map(|(name, max)| {
                let points = self.points_for(name);
                // two-character ids like `q1` read better without the prefix
                let short = match name.strip_prefix('q') {
                    Some(rest) if name.len() == 2 => rest,
                    _ => name.as_str(),
                };
                GradescopeTestCase::builder()
                    .name(name.clone())
                    .score(points)
                    .max_score(*max)
                    .output(format!(
                        "  Question {short} ({points}/{max}){}",
                        if points < *max { " X" } else { "" }
                    ))
                    .build()
            })
            .collect();

        let submission = GradescopeSubmission::builder()
            .score(total)
            .max_score(possible)
            .output(format!("Total score ({total} / {possible})"))
            .tests(tests)
            .build();

        fs::write(path, serde_json::to_string(&submission)?)
            .with_context(|| format!("could not write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote Gradescope artifact");
        Ok(())
    }

    /// Writes the edX HTML report and plaintext total.
    pub fn write_edx(&self, html_path: &Path, grade_path: &Path) -> Result<()> {
        let mut html = String::new();
        html.push_str("<html>\n<head><title>Autograder Results</title></head>\n<body>\n");
        html.push_str(&format!("<h1>{}</h1>\n", html_escape(&self.project)));

        for (name, max) in &self.questions {
            let points = self.points_for(name);
            let status = if points >= *max { "passed" } else { "failed" };
            html.push_str(&format!(
                "<div class=\"test {status}\">\n<h3>Question {} ({points}/{max})</h3>\n<pre>\n",
                html_escape(name)
            ));
            for message in self.messages_for(name) {
                html.push_str(&html_escape(message));
                html.push('\n');
            }
            html.push_str("</pre>\n</div>\n");
        }

        html.push_str(&format!(
            "<h2>Total: {}/{}</h2>\n</body>\n</html>\n",
            self.total(),
            self.total_possible()
        ));

        fs::write(html_path, html)
            .with_context(|| format!("could not write {}", html_path.display()))?;
        fs::write(grade_path, self.total().to_string())
            .with_context(|| format!("could not write {}", grade_path.display()))?;
        tracing::info!(path = %html_path.display(), "wrote edX artifacts");
        Ok(())
    }
}

/// The Gradescope JSON summary for a whole run.
#[derive(Serialize, Deserialize, TypedBuilder, Clone, Debug)]
#[builder(field_defaults(setter(into)))]
pub struct GradescopeSubmission {
    /// Aggregate score across all questions.
    pub score:     f64,
    /// Aggregate score possible.
    pub max_score: f64,
    /// Human-readable summary line.
    pub output:    String,
    /// Per-question breakdown.
    pub tests:     Vec<GradescopeTestCase>,
}

/// One question's entry in the Gradescope breakdown.
#[derive(Serialize, Deserialize, TypedBuilder, Clone, Debug)]
#[builder(field_defaults(setter(into)))]
pub struct GradescopeTestCase {
    /// Question identifier.
    pub name:      String,
    /// Points earned.
    pub score:     f64,
    /// Points possible.
    pub max_score: f64,
    /// Human-readable summary line.
    pub output:    String,
    /// Tags, always present even when empty.
    #[builder(default)]
    pub tags:      Vec<String>,
}
