mod question;
mod session;

pub use question::{Question, QuestionBank};
pub use session::{AnsweredRecord, Feedback, Phase, QuizSession};
