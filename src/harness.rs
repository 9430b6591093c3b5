#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result, bail};
use itertools::Itertools;
use typed_builder::TypedBuilder;

use crate::{
    constants::{BONUS_PIC, PROJECT_NAME},
    display::{Display, NullGraphics},
    eval::Evaluator,
    grade::{HintMap, Ledger, QuestionScore},
    parser,
    question::{Question, TestMeta, Thunk},
    record::Record,
    testcase::{EvalTest, TestCase},
    util::find_files,
};

/// The orchestrator for one grading run: discovers question directories,
/// binds student code into the evaluation namespace, builds the
/// question/test-case graph, and drives the ledger.
#[derive(TypedBuilder)]
pub struct Harness {
    /// Root test directory containing question subdirectories.
    test_root:         PathBuf,
    /// Student script files to bind, relative to `code_root`.
    #[builder(default)]
    student_code:      Vec<PathBuf>,
    /// Root directory containing the student code.
    #[builder(default)]
    code_root:         PathBuf,
    /// Optional helper script registered alongside the student modules.
    #[builder(default)]
    helpers:           Option<PathBuf>,
    /// Grade only this question (and its prerequisite chain).
    #[builder(default)]
    question_to_grade: Option<String>,
    /// Whether to write the Gradescope JSON artifact.
    #[builder(default)]
    gs_output:         bool,
    /// Whether to write the edX artifacts.
    #[builder(default)]
    edx_output:        bool,
    /// Whether to mute student output while tests execute.
    #[builder(default)]
    mute:              bool,
    /// Whether to print each test case before running it.
    #[builder(default)]
    print_tests:       bool,
    /// Whether to suppress drawing output from test scripts.
    #[builder(default)]
    no_graphics:       bool,
}

impl Harness {
    /// Grades every discovered question and returns the total points earned.
    pub fn evaluate(&self) -> Result<f64> {
        let evaluator = Arc::new(self.build_evaluator()?);
        let order = self.question_order()?;

        if self.question_to_grade.is_some() && order.len() > 1 {
            println!(
                "Note: due to dependencies, the following tests will be run: {}",
                order.iter().join(" ")
            );
        }

        let mut questions: Vec<Question> = Vec::new();
        let mut questions_and_maxes: Vec<(String, f64)> = Vec::new();
        let mut depends: Vec<(String, String)> = Vec::new();

        for name in &order {
            let subdir = self.test_root.join(name);
            if !subdir.is_dir() || name.starts_with('.') {
                continue;
            }

            let config = parser::parse_file(&subdir.join("CONFIG"))?;
            let mut question = Question::from_config(name, &config)?;

            for prereq in config.get_or_empty("depends").split_whitespace() {
                depends.push((name.clone(), prereq.to_string()));
            }

            for test_file in find_files("test", &subdir)? {
                let mut test_record = parser::parse_file(&test_file)?;
                if test_record.is_disabled() {
                    continue;
                }

                test_record.set(
                    "test_out_file",
                    test_file.with_extension("test_output").display().to_string(),
                );

                let solution = parser::parse_file(&test_file.with_extension("solution"))?;
                let meta = TestMeta {
                    path:   test_record.path().to_string(),
                    points: test_record.get("points").and_then(|p| p.parse().ok()),
                };
                let case = build_test_case(test_record)?;

                let evaluator = Arc::clone(&evaluator);
                let print_tests = self.print_tests;
                let thunk: Thunk = Box::new(move |score: &mut QuestionScore| {
                    if print_tests {
                        print_test(case.record(), &solution);
                    }
                    case.execute(score, &evaluator, &solution)
                });
                question.add_test(meta, thunk);
            }

            questions_and_maxes.push((name.clone(), question.max_points()));
            questions.push(question);
        }

        let mut ledger = Ledger::new(
            PROJECT_NAME,
            questions_and_maxes,
            self.gs_output,
            self.edx_output,
            self.mute,
        );
        // a single-question run already front-loads the prerequisite chain,
        // so gating would only re-skip questions the user asked for
        if self.question_to_grade.is_none() {
            for (question, prereq) in depends {
                ledger.add_prereq(&question, &prereq);
            }
        }

        ledger.grade(questions, &default_hints(), BONUS_PIC)?;
        Ok(ledger.total())
    }

    /// Regenerates every `.solution` file by evaluating the current student
    /// code. Used only by instructors against reference submissions.
    pub fn generate_solutions(&self) -> Result<()> {
        let evaluator = self.build_evaluator()?;

        for name in self.question_order()? {
            let subdir = self.test_root.join(&name);
            if !subdir.is_dir() || name.starts_with('.') {
                continue;
            }

            for test_file in find_files("test", &subdir)? {
                let test_record = parser::parse_file(&test_file)?;
                if test_record.is_disabled() {
                    continue;
                }
                let solution_file = test_file.with_extension("solution");
                let case = build_test_case(test_record)?;
                case.write_solution(&evaluator, &solution_file)?;
                println!("Solution written to {}", solution_file.display());
            }
        }
        Ok(())
    }

    /// Runs one test/solution pair, relative to the test root, against a
    /// stub score sheet. The question's grading policy never runs.
    pub fn run_single_test(&self, name: &str) -> Result<()> {
        let evaluator = self.build_evaluator()?;
        let base = self.test_root.join(name);

        let mut test_record = parser::parse_file(&base.with_extension("test"))?;
        let solution = parser::parse_file(&base.with_extension("solution"))?;
        test_record.set(
            "test_out_file",
            base.with_extension("test_output").display().to_string(),
        );

        let case = build_test_case(test_record)?;
        if self.print_tests {
            print_test(case.record(), &solution);
        }

        let mut score = QuestionScore::new(name, 0.0);
        case.execute(&mut score, &evaluator, &solution)?;
        Ok(())
    }

    /// Determines the questions to grade, in order: a requested question's
    /// transitive prerequisite chain, an explicit `order` in the root
    /// CONFIG, or the sorted directory listing.
    pub fn question_order(&self) -> Result<Vec<String>> {
        let root_config = parser::parse_file(&self.test_root.join("CONFIG"))?;

        if let Some(question) = &self.question_to_grade {
            return self.depends_chain(question);
        }

        if let Some(order) = root_config.get("order") {
            return Ok(order.split_whitespace().map(str::to_string).collect());
        }

        let mut subdirs: Vec<String> = fs::read_dir(&self.test_root)
            .with_context(|| format!("could not list {}", self.test_root.display()))?
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.'))
            .collect();
        subdirs.sort();
        Ok(subdirs)
    }

    /// Expands a question into itself plus its transitive prerequisites,
    /// dependencies first. Depth-first; duplicates across siblings are kept,
    /// matching the historical expansion.
    fn depends_chain(&self, question: &str) -> Result<Vec<String>> {
        let mut all = vec![question.to_string()];
        let config = parser::parse_file(&self.test_root.join(question).join("CONFIG"))?;

        if let Some(depends) = config.get("depends") {
            for dependency in depends.split_whitespace() {
                let mut chain = self.depends_chain(dependency)?;
                chain.extend(all);
                all = chain;
            }
        }
        Ok(all)
    }

    /// Binds every student module, the optional helper script, and the
    /// display surface into a fresh evaluator.
    fn build_evaluator(&self) -> Result<Evaluator> {
        let display: Arc<dyn Display> = Arc::new(NullGraphics::new(self.no_graphics));
        let mut evaluator = Evaluator::new().with_display(display);

        for code_path in &self.student_code {
            let path = self.code_root.join(code_path);
            let name = module_name(&path)?;
            evaluator.load_module(&name, &path)?;
            tracing::debug!(module = %name, "registered student module");
        }

        if let Some(helpers) = &self.helpers {
            let path = self.code_root.join(helpers);
            let name = module_name(&path)?;
            evaluator.load_module(&name, &path)?;
            tracing::debug!(module = %name, "registered helper module");
        }

        Ok(evaluator)
    }
}

/// Derives the registration name for a script from its file stem.
fn module_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .with_context(|| format!("invalid module path {}", path.display()))
}

/// Constructs the test case named by a record's `class` field. A closed
/// mapping table; unknown classes are fatal to discovery.
pub fn build_test_case(record: Record) -> Result<Box<dyn TestCase>> {
    let class = record.require("class")?.to_string();
    match class.as_str() {
        "EvalTest" => Ok(Box::new(EvalTest::new(record))),
        other => bail!("unknown test class `{other}` in {}", record.path()),
    }
}

/// Prints a test case and its solution, line by line.
fn print_test(test: &Record, solution: &Record) {
    println!("Test case:");
    for line in test.raw_lines() {
        println!("   | {line}");
    }
    println!("Solution:");
    for line in solution.raw_lines() {
        println!("   | {line}");
    }
}

/// The built-in hint map consulted when a question dies with an evaluation
/// error. Keyed by question id, then error kind.
pub fn default_hints() -> HintMap {
    let mut hints = HintMap::new();

    hints.entry("q1".to_string()).or_default().insert(
        "IndexOutOfBounds".to_string(),
        "We noticed that your project threw an index error on q1.\nWhile many things may cause \
         this, it may have been from\nassuming a certain number of elements in a list. Try \
         making\nyour code more general (no hardcoded indices) and submit again!"
            .to_string(),
    );

    hints.entry("q3".to_string()).or_default().insert(
        "FunctionNotFound".to_string(),
        "We noticed that your project called an undefined function on q3.\nCheck that every \
         function the tests rely on is defined with the\nexact name and arity the assignment \
         asks for, then submit again!"
            .to_string(),
    );

    hints
}
