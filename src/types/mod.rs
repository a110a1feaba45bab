//! Public types for the Muninn API.

mod outcome;
mod prediction;
mod record;
mod status;
mod task;
mod text;

pub use outcome::TrainOutcome;
pub use prediction::{CorrectionOutcome, CorrectionResult, SubcategoryPrediction};
pub use record::{
    Category, CategoryId, DescriptionFeedback, FeedbackId, Subcategory, SubcategoryFeedback,
    SubcategoryId, Transaction, TransactionInput,
};
pub use status::{TaskActions, TaskStatus};
pub use task::TaskKind;
pub use text::TextInput;
