pub mod document;
pub mod status;

pub use document::{load_document, save_document, AssessmentDocument, AssessmentSummary, FrameworkKind};
pub use status::AssessmentStatus;
