#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::time::Duration;

/// Name of the project being graded, shown in reports and artifacts.
pub const PROJECT_NAME: &str = "Project 0: Tutorial";

/// Default comma-separated list of student script files to bind into the
/// evaluation namespace.
pub const STUDENT_CODE_DEFAULT: &str =
    "addition.rhai,buy_lots_of_fruit.rhai,shop_smart.rhai,shop_around_town.rhai";

/// Default root directory containing question subdirectories.
pub const TEST_ROOT_DEFAULT: &str = "test_cases";

/// Wall-clock budget for grading a single question.
pub const GRADING_DEADLINE: Duration = Duration::from_secs(1800);

/// File the Gradescope JSON summary is written to.
pub const GRADESCOPE_RESPONSE_FILE: &str = "gradescope_response.json";

/// File the edX HTML report is written to.
pub const EDX_RESPONSE_FILE: &str = "edx_response.html";

/// File the plaintext edX total is written to.
pub const EDX_GRADE_FILE: &str = "edx_grade";

/// Whether the celebratory picture is shown on a perfect total.
pub const BONUS_PIC: bool = false;

/// Exact total score that unlocks the celebratory picture.
pub const BONUS_TOTAL: f64 = 25.0;

/// The celebratory picture itself.
pub const BONUS_ART: &str = r"
                     ALL HAIL GRANDPAC.
              LONG LIVE THE GHOSTBUSTING KING.

                  ---      ----      ---
                  |  \    /  + \    /  |
                  | + \--/      \--/ + |
                  |   +     +          |
                  | +     +        +   |
                @@@@@@@@@@@@@@@@@@@@@@@@@@
              @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@
            @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@
            @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@
            \   @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@
             \ /  @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@
              V   \   @@@@@@@@@@@@@@@@@@@@@@@@@@@@
                   \ /  @@@@@@@@@@@@@@@@@@@@@@@@@@
                    V     @@@@@@@@@@@@@@@@@@@@@@@@
                            @@@@@@@@@@@@@@@@@@@@@@
                    /\      @@@@@@@@@@@@@@@@@@@@@@
                   /  \  @@@@@@@@@@@@@@@@@@@@@@@@@
              /\  /    @@@@@@@@@@@@@@@@@@@@@@@@@@@
             /  \ @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@
            /    @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@
            @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@
            @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@@
              @@@@@@@@@@@@@@@@@@@@@@@@@@@@@@
                @@@@@@@@@@@@@@@@@@@@@@@@@@
                    @@@@@@@@@@@@@@@@@@
";
