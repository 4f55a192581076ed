pub mod command;
pub mod config;
pub mod record;
pub mod schema;

pub use command::{RetrainReason, RetrainRequest};
pub use config::{ReferenceLocation, Settings, TrainingConfig, DEFAULT_REFERENCE_URL};
pub use record::{
    FeedbackRecord, Label, LabelError, LabelledText, Prediction, Verdict, VerifiedRecord,
};
pub use schema::messages;
