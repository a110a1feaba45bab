//! Muninn - per-user incremental transaction classifiers
//!
//! Muninn keeps, for every user, small online models that learn from that
//! user's own finance data:
//!
//! - a **subcategory** classifier mapping a transaction description (plus an
//!   optional category hint) to one of the user's subcategories, and
//! - a **description** corrector rewriting raw descriptions the way the user
//!   corrected them before.
//!
//! Models are trained from an upstream REST API, refined one correction at a
//! time, and persisted per `(user, task)`.
//!
//! # Example
//!
//! ```rust,no_run
//! use muninn::{Muninn, TaskClassifier};
//!
//! #[tokio::main]
//! async fn main() -> muninn::Result<()> {
//!     let engine = Muninn::builder()
//!         .api_url("http://localhost:8000/api")
//!         .model_dir("/var/lib/muninn/models")
//!         .build()?;
//!
//!     let classifier = engine.subcategory("42")?;
//!     let outcome = classifier.train("user-token").await?;
//!     println!("{}", outcome.message);
//!
//!     let prediction = classifier.predict("Walmart groceries", "Food")?;
//!     println!("{:?}", prediction.subcategory_id);
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod learner;
pub mod source;
pub mod status;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use classifier::{
    DescriptionClassifier, DescriptionModel, SubcategoryClassifier, SubcategoryModel,
    TaskClassifier,
};
pub use config::{Config, TrainingConfig};
pub use engine::{Engine, Muninn, MuninnBuilder};
pub use error::{MuninnError, Result};
pub use learner::{MultinomialNb, OnlineLearner};
pub use source::{DataSource, HttpDataSource, Resource};
pub use status::StatusAggregator;
pub use store::{FileModelStore, MemoryModelStore, ModelKey, ModelSlot, ModelStore};

// Re-export all types
pub use types::{
    Category, CategoryId, CorrectionOutcome, CorrectionResult, DescriptionFeedback, FeedbackId,
    Subcategory, SubcategoryFeedback, SubcategoryId, SubcategoryPrediction, TaskActions, TaskKind,
    TaskStatus, TextInput, TrainOutcome, Transaction, TransactionInput,
};
