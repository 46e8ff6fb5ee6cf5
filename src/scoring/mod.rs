pub mod engine;
pub mod fuk;
pub mod result;
pub mod tree;
pub mod validation;

pub use engine::{process_assessment_responses, weighted_average};
pub use fuk::{fuk_color_class, fuk_label, score_to_fuk, try_score_to_fuk, FUK_LEVELS};
pub use result::{AggregatedResult, ScoredAspect, ScoredFactor, ScoredKka, ScoredParameter};
pub use tree::{Aspect, AssessmentTree, Factor, Kka, Parameter, Response};
pub use validation::{validate_assessment, validate_result};
