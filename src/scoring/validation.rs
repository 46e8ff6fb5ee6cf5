use super::result::AggregatedResult;
use super::tree::{AssessmentTree, Response};

/// Validate an assessment tree and its responses before scoring.
/// Returns all validation errors at once (not just the first).
pub fn validate_assessment(tree: &AssessmentTree, responses: &[Response]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (ki, kka) in tree.kkas.iter().enumerate() {
        let kka_path = format!("kkas[{}]", ki);
        check_id(&kka_path, &kka.id, &mut errors);
        check_weight(&kka_path, kka.weight, &mut errors);

        for (ai, aspect) in kka.aspects.iter().enumerate() {
            let aspect_path = format!("{}.aspects[{}]", kka_path, ai);
            check_id(&aspect_path, &aspect.id, &mut errors);
            check_weight(&aspect_path, aspect.weight, &mut errors);

            for (pi, parameter) in aspect.parameters.iter().enumerate() {
                let parameter_path = format!("{}.parameters[{}]", aspect_path, pi);
                check_id(&parameter_path, &parameter.id, &mut errors);
                check_weight(&parameter_path, parameter.weight, &mut errors);

                for (fi, factor) in parameter.factors.iter().enumerate() {
                    let factor_path = format!("{}.factors[{}]", parameter_path, fi);
                    check_id(&factor_path, &factor.id, &mut errors);
                    check_weight(&factor_path, factor.weight, &mut errors);

                    if !factor.max_score.is_finite() {
                        errors.push(format!("{}.max_score: must be a finite number", factor_path));
                    } else if factor.max_score < 0.0 {
                        errors.push(format!(
                            "{}.max_score: must be non-negative (got {})",
                            factor_path, factor.max_score
                        ));
                    }
                }
            }
        }
    }

    for (ri, response) in responses.iter().enumerate() {
        if response.factor_id.trim().is_empty() {
            errors.push(format!("responses[{}].factor_id: must not be empty", ri));
        }
        if !response.score.is_finite() {
            errors.push(format!(
                "responses[{}].score: must be a finite number (factor '{}')",
                ri, response.factor_id
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check every computed value of a rollup.
///
/// Finite inputs can still overflow once summed or multiplied by large
/// weights; such a result is rejected rather than returned with NaN or
/// infinity in it.
pub fn validate_result(result: &AggregatedResult) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (ki, kka) in result.kkas.iter().enumerate() {
        let kka_path = format!("kkas[{}]", ki);
        check_computed(&kka_path, kka.score, kka.fuk, kka.weighted_score, &mut errors);

        for (ai, aspect) in kka.aspects.iter().enumerate() {
            let aspect_path = format!("{}.aspects[{}]", kka_path, ai);
            check_computed(&aspect_path, aspect.score, aspect.fuk, aspect.weighted_score, &mut errors);

            for (pi, parameter) in aspect.parameters.iter().enumerate() {
                let parameter_path = format!("{}.parameters[{}]", aspect_path, pi);
                check_computed(
                    &parameter_path,
                    parameter.score,
                    parameter.fuk,
                    parameter.weighted_score,
                    &mut errors,
                );
            }
        }
    }

    if !result.overall_score.is_finite() {
        errors.push(format!("overall_score: rollup overflowed ({})", result.overall_score));
    }
    if !result.overall_fuk.is_finite() {
        errors.push(format!("overall_fuk: rollup overflowed ({})", result.overall_fuk));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_computed(path: &str, score: f64, fuk: f64, weighted_score: f64, errors: &mut Vec<String>) {
    for (field, value) in [("score", score), ("fuk", fuk), ("weightedScore", weighted_score)] {
        if !value.is_finite() {
            errors.push(format!("{}.{}: rollup overflowed ({})", path, field, value));
        }
    }
}

fn check_id(path: &str, id: &str, errors: &mut Vec<String>) {
    if id.trim().is_empty() {
        errors.push(format!("{}.id: must not be empty", path));
    }
}

fn check_weight(path: &str, weight: Option<f64>, errors: &mut Vec<String>) {
    if let Some(w) = weight {
        if !w.is_finite() {
            errors.push(format!("{}.weight: must be a finite number", path));
        }
    }
}
