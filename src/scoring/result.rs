use serde::{Deserialize, Serialize};

/// A factor with its response applied
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScoredFactor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    pub weight: f64,
    pub max_score: f64,
    /// Raw response value, 0 when no response was given
    #[serde(rename = "factor_score")]
    pub score: f64,
    #[serde(rename = "factor_fuk")]
    pub fuk: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScoredParameter {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    pub weight: f64,
    #[serde(rename = "parameter_score")]
    pub score: f64,
    #[serde(rename = "parameter_fuk")]
    pub fuk: f64,
    #[serde(rename = "weightedScore")]
    pub weighted_score: f64,
    pub factors: Vec<ScoredFactor>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScoredAspect {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    pub weight: f64,
    #[serde(rename = "aspect_score")]
    pub score: f64,
    #[serde(rename = "aspect_fuk")]
    pub fuk: f64,
    #[serde(rename = "weightedScore")]
    pub weighted_score: f64,
    pub parameters: Vec<ScoredParameter>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScoredKka {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub name: String,
    pub weight: f64,
    #[serde(rename = "kka_score")]
    pub score: f64,
    #[serde(rename = "kka_fuk")]
    pub fuk: f64,
    #[serde(rename = "weightedScore")]
    pub weighted_score: f64,
    pub aspects: Vec<ScoredAspect>,
}

/// Fully annotated tree plus the overall rollup
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AggregatedResult {
    pub kkas: Vec<ScoredKka>,
    pub overall_score: f64,
    pub overall_fuk: f64,
    pub total_factors: usize,
    pub completed_factors: usize,
}

impl AggregatedResult {
    /// Share of factors with a positive response, 0 for an empty tree
    pub fn completion_ratio(&self) -> f64 {
        if self.total_factors == 0 {
            0.0
        } else {
            self.completed_factors as f64 / self.total_factors as f64
        }
    }
}

/// An intermediate node that its parent rolls up.
pub trait WeightedNode {
    fn weight(&self) -> f64;
    fn fuk(&self) -> f64;
    fn weighted_score(&self) -> f64;
}

macro_rules! impl_weighted_node {
    ($($ty:ty),*) => {
        $(impl WeightedNode for $ty {
            fn weight(&self) -> f64 {
                self.weight
            }

            fn fuk(&self) -> f64 {
                self.fuk
            }

            fn weighted_score(&self) -> f64 {
                self.weighted_score
            }
        })*
    };
}

impl_weighted_node!(ScoredParameter, ScoredAspect, ScoredKka);
