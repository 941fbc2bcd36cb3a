//! Tabular datasets: feature schema, rows, concatenation and merge planning.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::error::{DomainError, DomainResult};

/// One record of a dataset, keyed by column name.
pub type Row = Map<String, Value>;

/// Column name → type descriptor.
///
/// Equality is exact and ignores column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Features(pub BTreeMap<String, Value>);

impl Features {
    pub fn insert(&mut self, name: impl Into<String>, dtype: Value) {
        self.0.insert(name.into(), dtype);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column-level differences of `other` relative to `self`.
    pub fn diff(&self, other: &Features) -> SchemaDiff {
        let mut diff = SchemaDiff::default();
        for (name, dtype) in &self.0 {
            match other.0.get(name) {
                None => diff.missing.push(name.clone()),
                Some(o) if o != dtype => diff.changed.push(name.clone()),
                Some(_) => {}
            }
        }
        for name in other.0.keys() {
            if !self.0.contains_key(name) {
                diff.extra.push(name.clone());
            }
        }
        diff
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, dtype)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}': {}", name, dtype)?;
        }
        write!(f, "}}")
    }
}

/// Columns that differ between two schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff {
    /// Present in the base schema only
    pub missing: Vec<String>,
    /// Present in the other schema only
    pub extra: Vec<String>,
    /// Present in both with different types
    pub changed: Vec<String>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty() && self.changed.is_empty()
    }
}

impl fmt::Display for SchemaDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing columns {:?}", self.missing));
        }
        if !self.extra.is_empty() {
            parts.push(format!("extra columns {:?}", self.extra));
        }
        if !self.changed.is_empty() {
            parts.push(format!("type changes in {:?}", self.changed));
        }
        if parts.is_empty() {
            write!(f, "no differences")
        } else {
            write!(f, "{}", parts.join("; "))
        }
    }
}

/// A fully loaded dataset split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub features: Features,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(features: Features, rows: Vec<Row>) -> Self {
        Self { features, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fail unless `other` has exactly this dataset's features.
    pub fn ensure_same_schema(&self, other: &Dataset) -> DomainResult<()> {
        if self.features == other.features {
            Ok(())
        } else {
            Err(DomainError::SchemaMismatch(
                self.features.diff(&other.features).to_string(),
            ))
        }
    }

    /// Concatenate datasets in order; all must share the first one's schema.
    pub fn concatenate(datasets: &[Dataset]) -> DomainResult<Dataset> {
        let (first, rest) = datasets
            .split_first()
            .ok_or(DomainError::NothingToConcatenate)?;
        for other in rest {
            first.ensure_same_schema(other)?;
        }
        let rows = datasets
            .iter()
            .flat_map(|d| d.rows.iter().cloned())
            .collect();
        Ok(Dataset::new(first.features.clone(), rows))
    }

    /// Rows as JSON Lines, one object per line.
    pub fn to_json_lines(&self) -> serde_json::Result<String> {
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&serde_json::to_string(row)?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Summary shown before a merge is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    pub source: String,
    pub target: String,
    pub output: String,
    pub source_rows: usize,
    pub target_rows: usize,
}

impl MergePlan {
    pub fn total_rows(&self) -> usize {
        self.target_rows + self.source_rows
    }

    /// Pushing back into the target overwrites it.
    pub fn updates_target(&self) -> bool {
        self.output == self.target
    }

    pub fn commit_message(&self) -> String {
        format!("Merge {} into {}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn features(cols: &[(&str, &str)]) -> Features {
        let mut f = Features::default();
        for (name, dtype) in cols {
            f.insert(*name, json!({"dtype": dtype, "_type": "Value"}));
        }
        f
    }

    fn rows(ids: &[i64]) -> Vec<Row> {
        ids.iter()
            .map(|i| {
                let mut r = Row::new();
                r.insert("id".into(), json!(i));
                r
            })
            .collect()
    }

    #[test]
    fn given_two_datasets_when_concatenating_then_preserves_order() {
        let schema = features(&[("id", "int64")]);
        let target = Dataset::new(schema.clone(), rows(&[1, 2]));
        let source = Dataset::new(schema, rows(&[3]));

        let merged = Dataset::concatenate(&[target, source]).unwrap();

        let ids: Vec<_> = merged.rows.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn given_different_schemas_when_concatenating_then_errors() {
        let a = Dataset::new(features(&[("id", "int64")]), rows(&[1]));
        let b = Dataset::new(features(&[("id", "string")]), rows(&[2]));
        let err = Dataset::concatenate(&[a, b]).unwrap_err();
        assert!(matches!(err, DomainError::SchemaMismatch(ref m) if m.contains("type changes")));
    }

    #[test]
    fn given_no_datasets_when_concatenating_then_errors() {
        assert_eq!(
            Dataset::concatenate(&[]).unwrap_err(),
            DomainError::NothingToConcatenate
        );
    }

    #[test]
    fn given_schemas_when_diffing_then_reports_each_kind() {
        let a = features(&[("id", "int64"), ("action", "float32"), ("ts", "float32")]);
        let b = features(&[("id", "int64"), ("action", "float64"), ("task", "string")]);
        let diff = a.diff(&b);
        assert_eq!(diff.missing, vec!["ts"]);
        assert_eq!(diff.extra, vec!["task"]);
        assert_eq!(diff.changed, vec!["action"]);
        assert!(a.diff(&a).is_empty());
    }

    #[test]
    fn given_plan_when_output_differs_then_target_untouched() {
        let plan = MergePlan {
            source: "me/src".into(),
            target: "me/dst".into(),
            output: "me/merged".into(),
            source_rows: 4,
            target_rows: 6,
        };
        assert_eq!(plan.total_rows(), 10);
        assert!(!plan.updates_target());
        assert_eq!(plan.commit_message(), "Merge me/src into me/dst");
    }
}
