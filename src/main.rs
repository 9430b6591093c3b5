#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # marksman
//!
//! Command-line entry point for the autograder: run public tests on student
//! code, grade a single question or test, or regenerate solution files.

use std::{
    io::BufRead,
    path::PathBuf,
};

use anyhow::Result;
use bpaf::*;
use marksman::{
    constants::{STUDENT_CODE_DEFAULT, TEST_ROOT_DEFAULT},
    harness::Harness,
};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Everything the CLI accepts for one invocation.
#[derive(Debug, Clone)]
struct Opts {
    /// Root test directory containing question subdirectories.
    test_root:          PathBuf,
    /// Comma-separated list of student script files.
    student_code:       String,
    /// Root directory containing the student code.
    code_root:          PathBuf,
    /// Optional helper script bound into the evaluation namespace.
    test_helpers:       Option<PathBuf>,
    /// Write solutions generated from the current code to `.solution` files.
    generate_solutions: bool,
    /// Generate edX output files.
    edx_output:         bool,
    /// Generate Gradescope output files.
    gs_output:          bool,
    /// Mute output from executing tests.
    mute:               bool,
    /// Print each test case before running it.
    print_tests:        bool,
    /// Suppress drawing output from test scripts.
    no_graphics:        bool,
    /// Run one particular test, relative to the test root.
    run_test:           Option<String>,
    /// Grade one particular question (plus its prerequisite chain).
    grade_question:     Option<String>,
}

/// Parses the command line.
fn options() -> OptionParser<Opts> {
    let test_root = long("test-directory")
        .help("Root test directory containing question subdirectories")
        .argument::<PathBuf>("DIR")
        .fallback(PathBuf::from(TEST_ROOT_DEFAULT));

    let student_code = long("student-code")
        .help("Comma separated list of student script files")
        .argument::<String>("FILES")
        .fallback(STUDENT_CODE_DEFAULT.to_string());

    let code_root = long("code-directory")
        .help("Root directory containing the student and helper code")
        .argument::<PathBuf>("DIR")
        .fallback(PathBuf::new());

    let test_helpers = long("test-helpers")
        .help("Helper script bound into the evaluation namespace")
        .argument::<PathBuf>("FILE")
        .optional();

    let generate_solutions = long("generate-solutions")
        .help("Write solutions generated to .solution files")
        .switch();

    let edx_output = long("edx-output")
        .help("Generate edX output files")
        .switch();

    let gs_output = long("gradescope-output")
        .help("Generate GradeScope output files")
        .switch();

    let mute = long("mute")
        .help("Mute output from executing tests")
        .switch();

    let print_tests = long("print-tests")
        .short('p')
        .help("Print each test case before running them")
        .switch();

    let no_graphics = long("no-graphics")
        .help("Suppress drawing output from test scripts")
        .switch();

    let run_test = long("test")
        .short('t')
        .help("Run one particular test. Relative to test root.")
        .argument::<String>("TEST")
        .optional();

    let grade_question = long("question")
        .short('q')
        .help("Grade one particular question.")
        .argument::<String>("QUESTION")
        .optional();

    construct!(Opts {
        test_root,
        student_code,
        code_root,
        test_helpers,
        generate_solutions,
        edx_output,
        gs_output,
        mute,
        print_tests,
        no_graphics,
        run_test,
        grade_question,
    })
    .to_options()
    .descr("Run public tests on student code")
}

/// Asks for an interactive yes/no confirmation before overwriting solution
/// files; a "no" exits immediately with status 0.
fn confirm_generate() -> Result<()> {
    println!("WARNING: this action will overwrite any solution files.");
    println!("Are you sure you want to proceed? (yes/no)");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        match line?.trim() {
            "yes" => return Ok(()),
            "no" => std::process::exit(0),
            _ => println!("Please answer either \"yes\" or \"no\""),
        }
    }
    std::process::exit(0);
}

fn main() -> Result<()> {
    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let opts = options().run();

    if opts.generate_solutions {
        confirm_generate()?;
    }

    let student_code: Vec<PathBuf> = opts
        .student_code
        .split(',')
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect();

    let harness = Harness::builder()
        .test_root(opts.test_root)
        .student_code(student_code)
        .code_root(opts.code_root)
        .helpers(opts.test_helpers)
        .question_to_grade(opts.grade_question)
        .gs_output(opts.gs_output)
        .edx_output(opts.edx_output)
        .mute(opts.mute)
        .print_tests(opts.print_tests)
        .no_graphics(opts.no_graphics)
        .build();

    if let Some(test) = opts.run_test {
        harness.run_single_test(&test)?;
    } else if opts.generate_solutions {
        harness.generate_solutions()?;
    } else {
        harness.evaluate()?;
    }

    Ok(())
}
