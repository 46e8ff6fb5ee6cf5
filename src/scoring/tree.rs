use serde::{Deserialize, Deserializer, Serialize};

/// Structural assessment dictionary: KKA > Aspect > Parameter > Factor.
///
/// Carries no scores. Missing child collections deserialize as empty, so a
/// malformed node is scored as a node without children.
///
/// The relative-importance multiplier is called `weight`. Older documents
/// used `score` for the same field; it is accepted as an alias on input.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct AssessmentTree {
    #[serde(default)]
    pub kkas: Vec<Kka>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Kka {
    #[serde(deserialize_with = "de_node_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "score", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
    #[serde(default)]
    pub aspects: Vec<Aspect>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Aspect {
    #[serde(deserialize_with = "de_node_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "score", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Parameter {
    #[serde(deserialize_with = "de_node_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "score", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
    #[serde(default)]
    pub factors: Vec<Factor>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Factor {
    #[serde(deserialize_with = "de_node_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "score", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Upper bound for the raw response (default: 1)
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
}

fn default_max_score() -> f64 {
    1.0
}

/// A single raw response for one factor.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Response {
    #[serde(deserialize_with = "de_node_id")]
    pub factor_id: String,
    pub score: f64,
}

impl Response {
    pub fn new(factor_id: impl Into<String>, score: f64) -> Self {
        Self {
            factor_id: factor_id.into(),
            score,
        }
    }
}

/// Resolve an optional weight: absent or zero counts as 1.
pub fn resolve_weight(weight: Option<f64>) -> f64 {
    match weight {
        Some(w) if w != 0.0 => w,
        _ => 1.0,
    }
}

impl AssessmentTree {
    /// Total number of factor leaves in the tree
    pub fn factor_count(&self) -> usize {
        self.factors().count()
    }

    /// Iterate over every factor, depth first
    pub fn factors(&self) -> impl Iterator<Item = &Factor> {
        self.kkas
            .iter()
            .flat_map(|k| k.aspects.iter())
            .flat_map(|a| a.parameters.iter())
            .flat_map(|p| p.factors.iter())
    }

    /// Order children at every level by their `sort` key.
    ///
    /// Stable: nodes with equal keys keep their order, and nodes without a
    /// key go after the keyed ones.
    pub fn sort_children(&mut self) {
        sort_by_key(&mut self.kkas, |k| k.sort);
        for kka in &mut self.kkas {
            sort_by_key(&mut kka.aspects, |a| a.sort);
            for aspect in &mut kka.aspects {
                sort_by_key(&mut aspect.parameters, |p| p.sort);
                for parameter in &mut aspect.parameters {
                    sort_by_key(&mut parameter.factors, |f| f.sort);
                }
            }
        }
    }
}

fn sort_by_key<T>(nodes: &mut [T], key: impl Fn(&T) -> Option<i64>) {
    nodes.sort_by(|a, b| match (key(a), key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Node ids come out of the database as integers but are often passed
/// around as strings. Accept both.
fn de_node_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Int(i64),
        Str(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Int(n) => n.to_string(),
        RawId::Str(s) => s,
    })
}
