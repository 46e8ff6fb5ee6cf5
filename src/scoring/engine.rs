use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::fuk::score_to_fuk;
use super::result::{
    AggregatedResult, ScoredAspect, ScoredFactor, ScoredKka, ScoredParameter, WeightedNode,
};
use super::tree::{resolve_weight, Aspect, AssessmentTree, Factor, Kka, Parameter, Response};
use super::validation::{validate_assessment, validate_result};
use crate::error::{Result, ScoreError};

/// `Σ(weight·value) / Σweight`, or 0 when the list is empty or the weights
/// sum to exactly zero.
pub fn weighted_average(pairs: &[(f64, f64)]) -> f64 {
    let total_weight: f64 = pairs.iter().map(|(w, _)| w).sum();
    if pairs.is_empty() || total_weight == 0.0 {
        return 0.0;
    }
    let weighted_sum: f64 = pairs.iter().map(|(w, v)| w * v).sum();
    weighted_sum / total_weight
}

/// Arithmetic mean, 0 for an empty iterator.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Roll children up into `(score, fuk)` for their parent.
///
/// Score is weighted by each child's own weight; FUK is a straight mean.
fn roll_up<T: WeightedNode>(children: &[T]) -> (f64, f64) {
    let pairs: Vec<(f64, f64)> = children
        .iter()
        .map(|c| (c.weight(), c.weighted_score()))
        .collect();
    let score = weighted_average(&pairs);
    let fuk = mean(children.iter().map(|c| c.fuk()));
    (score, fuk)
}

#[derive(Default)]
struct FactorCounts {
    total: usize,
    completed: usize,
}

/// Score a full assessment tree against a flat list of responses.
///
/// Factors without a response score 0. When several responses name the same
/// factor the last one wins. Responses for factors not in the tree are
/// ignored. The input tree is not modified; the result owns copies of every
/// identifier.
pub fn process_assessment_responses(
    responses: &[Response],
    dictionary: &AssessmentTree,
) -> Result<AggregatedResult> {
    validate_assessment(dictionary, responses).map_err(ScoreError::InvalidInput)?;

    let lookup: HashMap<&str, f64> = responses
        .iter()
        .map(|r| (r.factor_id.as_str(), r.score))
        .collect();

    let known: HashSet<&str> = dictionary.factors().map(|f| f.id.as_str()).collect();
    let unknown = lookup.keys().filter(|id| !known.contains(*id)).count();
    if unknown > 0 {
        warn!("Ignoring {} response(s) for factors not in the dictionary", unknown);
    }

    let mut counts = FactorCounts::default();
    let kkas: Vec<ScoredKka> = dictionary
        .kkas
        .iter()
        .map(|kka| score_kka(kka, &lookup, &mut counts))
        .collect();

    let (overall_score, overall_fuk) = roll_up(&kkas);
    debug!(
        overall_score,
        overall_fuk,
        total_factors = counts.total,
        completed_factors = counts.completed,
        "Assessment aggregated"
    );

    let result = AggregatedResult {
        kkas,
        overall_score,
        overall_fuk,
        total_factors: counts.total,
        completed_factors: counts.completed,
    };
    validate_result(&result).map_err(ScoreError::InvalidInput)?;
    Ok(result)
}

fn score_kka(kka: &Kka, lookup: &HashMap<&str, f64>, counts: &mut FactorCounts) -> ScoredKka {
    let aspects: Vec<ScoredAspect> = kka
        .aspects
        .iter()
        .map(|a| score_aspect(a, lookup, counts))
        .collect();
    let weight = resolve_weight(kka.weight);
    let (score, fuk) = roll_up(&aspects);

    ScoredKka {
        id: kka.id.clone(),
        code: kka.code.clone(),
        name: kka.name.clone(),
        weight,
        score,
        fuk,
        weighted_score: weight * fuk,
        aspects,
    }
}

fn score_aspect(aspect: &Aspect, lookup: &HashMap<&str, f64>, counts: &mut FactorCounts) -> ScoredAspect {
    let parameters: Vec<ScoredParameter> = aspect
        .parameters
        .iter()
        .map(|p| score_parameter(p, lookup, counts))
        .collect();
    let weight = resolve_weight(aspect.weight);
    let (score, fuk) = roll_up(&parameters);

    ScoredAspect {
        id: aspect.id.clone(),
        code: aspect.code.clone(),
        name: aspect.name.clone(),
        weight,
        score,
        fuk,
        weighted_score: weight * fuk,
        parameters,
    }
}

/// Parameter score is the plain mean of raw factor scores; factor weight
/// plays no part. FUK is taken from that mean.
fn score_parameter(
    parameter: &Parameter,
    lookup: &HashMap<&str, f64>,
    counts: &mut FactorCounts,
) -> ScoredParameter {
    let factors: Vec<ScoredFactor> = parameter
        .factors
        .iter()
        .map(|f| score_factor(f, lookup, counts))
        .collect();
    let weight = resolve_weight(parameter.weight);

    let (score, fuk) = if factors.is_empty() {
        (0.0, 0.0)
    } else {
        let score = mean(factors.iter().map(|f| f.score));
        (score, score_to_fuk(score))
    };

    ScoredParameter {
        id: parameter.id.clone(),
        code: parameter.code.clone(),
        name: parameter.name.clone(),
        weight,
        score,
        fuk,
        weighted_score: weight * fuk,
        factors,
    }
}

fn score_factor(factor: &Factor, lookup: &HashMap<&str, f64>, counts: &mut FactorCounts) -> ScoredFactor {
    let score = lookup.get(factor.id.as_str()).copied().unwrap_or(0.0);

    counts.total += 1;
    if score > 0.0 {
        counts.completed += 1;
    }

    ScoredFactor {
        id: factor.id.clone(),
        code: factor.code.clone(),
        name: factor.name.clone(),
        weight: resolve_weight(factor.weight),
        max_score: factor.max_score,
        score,
        fuk: score_to_fuk(score),
    }
}
