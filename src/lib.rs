//! # marksman
//!
//! A batch autograder for introductory scripting coursework. Student
//! submissions are Rhai scripts; each question directory holds declarative
//! `.test`/`.solution` file pairs that are parsed, evaluated against the
//! student's code, and scored under a per-question grading policy.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Runs graded calls on abandonable worker threads under a wall-clock budget
pub mod deadline;
/// The narrow draw/pause/finish surface test scripts may call
pub mod display;
/// The error taxonomy for a grading run
pub mod error;
/// The embedded expression engine student code is bound into
pub mod eval;
/// The grade ledger: points, messages, prerequisites, reports, artifacts
pub mod grade;
/// For discovering question directories and driving a grading run
pub mod harness;
/// Process-wide output muting with single-level guard semantics
pub mod mute;
/// For parsing the declarative test-file format
pub mod parser;
/// Questions and their grading-policy variants
pub mod question;
/// The parsed key/value record a test file becomes
pub mod record;
/// Test cases: one executable check against a stored expected value
pub mod testcase;
/// Utility functions for convenience
pub mod util;
