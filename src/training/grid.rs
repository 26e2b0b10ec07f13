//! Hyperparameter grids

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{CuveeError, Result};

/// One candidate hyperparameter value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    /// Value as a float; integers widen
    pub fn as_f64(&self) -> f64 {
        match self {
            ParamValue::Int(v) => *v as f64,
            ParamValue::Float(v) => *v,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Candidate values per parameter name.
///
/// A sorted map keeps grid iteration deterministic, which fixes the
/// combination order of the cartesian product.
pub type ParamGrid = BTreeMap<String, Vec<ParamValue>>;

/// One chosen combination of a grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet(BTreeMap<String, ParamValue>);

impl ParamSet {
    /// Look up a raw value
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    /// Integer-valued parameter, if present
    pub fn usize_value(&self, name: &str) -> Result<Option<usize>> {
        match self.0.get(name) {
            None => Ok(None),
            Some(ParamValue::Int(v)) if *v >= 0 => Ok(Some(*v as usize)),
            Some(ParamValue::Int(v)) => Err(CuveeError::InvalidParameter {
                name: name.to_string(),
                value: v.to_string(),
                reason: "must be non-negative".to_string(),
            }),
            Some(ParamValue::Float(v)) => Err(CuveeError::InvalidParameter {
                name: name.to_string(),
                value: v.to_string(),
                reason: "expected an integer".to_string(),
            }),
        }
    }

    /// Float-valued parameter, if present; integers widen
    pub fn f64_value(&self, name: &str) -> Result<Option<f64>> {
        Ok(self.0.get(name).map(ParamValue::as_f64))
    }

    /// Iterate entries in sorted-name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "defaults");
        }
        let mut first = true;
        for (name, value) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
            first = false;
        }
        Ok(())
    }
}

/// Cartesian product of a grid in sorted-key order.
///
/// An empty grid yields one empty combination, meaning family defaults. A
/// parameter with an empty value list yields no combinations at all.
pub fn combinations(grid: &ParamGrid) -> Vec<ParamSet> {
    let mut combos = vec![ParamSet::default()];
    for (name, values) in grid {
        let mut next = Vec::with_capacity(combos.len() * values.len().max(1));
        for combo in &combos {
            for value in values {
                let mut extended = combo.clone();
                extended.0.insert(name.clone(), *value);
                next.push(extended);
            }
        }
        combos = next;
    }
    combos
}
