#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::{Result, bail};

use crate::{error::HarnessError, grade::QuestionScore, record::Record};

/// A grading callback: runs one test case against the current question's
/// score, returning whether it passed. Evaluation failures propagate.
pub type Thunk = Box<dyn Fn(&mut QuestionScore) -> Result<bool, HarnessError> + Send + Sync>;

/// Per-test metadata the grading policies consult.
#[derive(Debug, Clone)]
pub struct TestMeta {
    /// Source file identifier of the test.
    pub path:   String,
    /// Point value declared by the test record, if any.
    pub points: Option<f64>,
}

/// How a question converts test outcomes into points.
///
/// A closed set selected from the CONFIG `class` field at construction time;
/// the accepted names mirror the historical test-class names.
#[derive(Debug, Clone, PartialEq)]
pub enum GradingPolicy {
    /// Zero credit unless every test passes; then full credit.
    PassAll,
    /// Like [`GradingPolicy::PassAll`] plus a fixed bonus on a clean sweep.
    ExtraCreditPassAll {
        /// Bonus awarded only when all tests pass.
        extra_points: f64,
    },
    /// Sum of `points` across passing point-carrying tests, with the
    /// historical consistency check: a sum that reaches max while any test
    /// failed is forced to zero.
    HackedPartialCredit,
    /// Points equal the count of passing tests. No ceiling.
    NumberPassed,
}

impl GradingPolicy {
    /// Selects a policy from a question CONFIG record's `class` field.
    pub fn from_config(config: &Record) -> Result<Self> {
        let class = config.require("class")?;
        match class {
            "PassAllTestsQuestion" => Ok(GradingPolicy::PassAll),
            "ExtraCreditPassAllTestsQuestion" => {
                let extra_points = config.require("extra_points")?.parse()?;
                Ok(GradingPolicy::ExtraCreditPassAll { extra_points })
            }
            "HackedPartialCreditQuestion" => Ok(GradingPolicy::HackedPartialCredit),
            "NumberPassedQuestion" => Ok(GradingPolicy::NumberPassed),
            other => bail!(
                "unknown grading policy class `{other}` in {}",
                config.path()
            ),
        }
    }
}

/// A gradable unit bundling one grading policy and its test cases.
pub struct Question {
    /// Question identifier, usually the subdirectory name.
    name:       String,
    /// Maximum points awardable by the policy (the bonus sits on top).
    max_points: f64,
    /// How test outcomes become points.
    policy:     GradingPolicy,
    /// Test cases in declaration order, each with its grading callback.
    tests:      Vec<(TestMeta, Thunk)>,
}

impl Question {
    /// Creates an empty question.
    pub fn new(name: impl Into<String>, max_points: f64, policy: GradingPolicy) -> Self {
        Question {
            name: name.into(),
            max_points,
            policy,
            tests: Vec::new(),
        }
    }

    /// Builds a question from its CONFIG record.
    pub fn from_config(name: &str, config: &Record) -> Result<Self> {
        let policy = GradingPolicy::from_config(config)?;
        let max_points = config.require("max_points")?.parse()?;
        Ok(Question::new(name, max_points, policy))
    }

    /// Question identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum points the policy can award.
    pub fn max_points(&self) -> f64 {
        self.max_points
    }

    /// Appends a test case. Only valid before execution.
    pub fn add_test(&mut self, meta: TestMeta, thunk: Thunk) {
        self.tests.push((meta, thunk));
    }

    /// Runs every test case sequentially in declaration order and applies
    /// the grading policy to `score`.
    ///
    /// Sequential on purpose: later tests may depend on side effects of
    /// earlier ones, and failure messages must appear in deterministic
    /// order.
    pub fn execute(&self, score: &mut QuestionScore) -> Result<(), HarnessError> {
        score.assign_zero_credit();

        match &self.policy {
            GradingPolicy::PassAll => {
                if self.run_all(score)? {
                    score.assign_full_credit();
                } else {
                    score.fail("Tests failed.");
                }
            }
            GradingPolicy::ExtraCreditPassAll { extra_points } => {
                if self.run_all(score)? {
                    score.assign_full_credit();
                    score.add_points(*extra_points);
                } else {
                    score.fail("Tests failed.");
                }
            }
            GradingPolicy::HackedPartialCredit => {
                let mut points = 0.0;
                let mut passed = true;
                for (meta, thunk) in &self.tests {
                    let result = thunk(score)?;
                    match meta.points {
                        Some(value) => {
                            if result {
                                points += value;
                            }
                        }
                        None => passed = passed && result,
                    }
                }
                // historical consistency check: a point total that reaches
                // max while something failed means the per-test points are
                // miscounted, so award nothing
                if points.trunc() == self.max_points.trunc() && !passed {
                    score.assign_zero_credit();
                } else {
                    score.add_points(points.trunc());
                }
            }
            GradingPolicy::NumberPassed => {
                let mut count = 0.0;
                for (_, thunk) in &self.tests {
                    if thunk(score)? {
                        count += 1.0;
                    }
                }
                score.add_points(count);
            }
        }

        Ok(())
    }

    /// Runs every thunk, returning whether all of them passed. All tests run
    /// even after a failure so every message is recorded.
    fn run_all(&self, score: &mut QuestionScore) -> Result<bool, HarnessError> {
        let mut all_passed = true;
        for (_, thunk) in &self.tests {
            if !thunk(score)? {
                all_passed = false;
            }
        }
        Ok(all_passed)
    }
}
