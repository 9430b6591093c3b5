#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fs, path::Path};

use colored::Colorize;
use rhai::Scope;
use similar::{Algorithm, ChangeTag, utils::diff_unicode_words};

use crate::{error::HarnessError, eval::Evaluator, grade::QuestionScore, record::Record};

/// One executable check comparing a computed result to a stored expected
/// value.
///
/// Evaluation failures propagate out of [`TestCase::execute`] untouched; the
/// per-question boundary in the ledger is responsible for catching them.
pub trait TestCase: Send + Sync {
    /// The parsed test record this case was built from.
    fn record(&self) -> &Record;

    /// Source file identifier of the test.
    fn path(&self) -> &str {
        self.record().path()
    }

    /// Runs the check, appending pass/fail messages to `score`. Returns
    /// whether it passed; points are left to the question's grading policy.
    fn execute(
        &self,
        score: &mut QuestionScore,
        evaluator: &Evaluator,
        solution: &Record,
    ) -> Result<bool, HarnessError>;

    /// Re-runs the check's computation and persists its stringified result as
    /// a fresh solution record. Used only when regenerating reference
    /// answers.
    fn write_solution(&self, evaluator: &Evaluator, path: &Path) -> Result<(), HarnessError>;
}

/// A test case that evaluates an expression against the student's code and
/// compares the stringified result to the solution's `result` field.
pub struct EvalTest {
    /// The full parsed test record.
    record:   Record,
    /// Setup statements run before the test expression, if any.
    preamble: String,
    /// The expression whose stringified value is graded.
    test:     String,
    /// Message shown when the test passes.
    success:  String,
    /// Message shown when the test fails.
    failure:  String,
}

impl EvalTest {
    /// Builds an evaluation test from its parsed record.
    pub fn new(record: Record) -> Self {
        let preamble = record.get_or_empty("preamble").to_string();
        let test = record.get_or_empty("test").to_string();
        let success = record.get_or_empty("success").to_string();
        let failure = record.get_or_empty("failure").to_string();
        EvalTest {
            record,
            preamble,
            test,
            success,
            failure,
        }
    }

    /// Runs the preamble against a fresh scope, then evaluates the test
    /// expression. Preamble failures surface as evaluation errors, not
    /// silent skips.
    fn eval_code(&self, evaluator: &Evaluator) -> Result<String, HarnessError> {
        let mut scope = Scope::new();
        if !self.preamble.is_empty() {
            evaluator.run_snippet(&mut scope, &self.preamble)?;
        }
        evaluator.evaluate(&mut scope, &self.test)
    }
}

impl TestCase for EvalTest {
    fn record(&self) -> &Record {
        &self.record
    }

    fn execute(
        &self,
        score: &mut QuestionScore,
        evaluator: &Evaluator,
        solution: &Record,
    ) -> Result<bool, HarnessError> {
        let result = self.eval_code(evaluator)?;
        let expected = solution.get_or_empty("result");

        if result == expected {
            score.add_message(format!("PASS: {}", self.success));
            score.add_message(format!("\t correct result: \"{expected}\""));
            Ok(true)
        } else {
            score.add_message(format!("FAIL: {}", self.failure));
            score.add_message(format!("\t student result: \"{result}\""));
            score.add_message(format!("\t correct result: \"{expected}\""));
            eprintln!("{}", render_diff(expected, &result));
            Ok(false)
        }
    }

    fn write_solution(&self, evaluator: &Evaluator, path: &Path) -> Result<(), HarnessError> {
        let value = self.eval_code(evaluator)?;
        let body = format!(
            "# This is the solution file for {}.\n# The result of evaluating the test must equal \
             the below when cast to a string.\nresult: \"{value}\"\n",
            self.record.path()
        );
        fs::write(path, body)?;
        Ok(())
    }
}

/// Renders a word-level diff of expected vs. actual output, deletions in red
/// and insertions in green. Console-only; stored messages stay plain.
fn render_diff(expected: &str, actual: &str) -> String {
    let diff = diff_unicode_words(Algorithm::Patience, expected, actual);

    let mut expected_out = String::new();
    let mut actual_out = String::new();
    for (change, value) in diff {
        match change {
            ChangeTag::Equal => {
                expected_out.push_str(value);
                actual_out.push_str(value);
            }
            ChangeTag::Insert => {
                actual_out.push_str(format!("{}", value.green()).as_str());
            }
            ChangeTag::Delete => {
                expected_out.push_str(format!("{}", value.red()).as_str());
            }
        }
    }

    format!("Expected:\n{expected_out}\nActual:\n{actual_out}")
}
