pub mod attempt;
pub mod detail;
pub mod loaders;
pub mod question;
pub mod submission;

pub use attempt::{Answer, AnswerId, Attempt, AttemptId, AttemptStatus, UserId};
pub use detail::{AnswerDetail, AttemptDetail, AttemptSummary, QuestionView, SubmissionReport};
pub use loaders::{load_all_submission_files, load_submission_file, load_test_catalog};
pub use question::{Question, QuestionId, QuestionType};
pub use submission::{SubmissionFile, SubmittedAnswer, TestSubmission};
pub use test::{QuestionLookup, Test, TestId, MAX_RAW_SCORE, STANDARD_QUESTION_COUNT};
