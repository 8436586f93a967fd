use std::collections::HashMap;
use serde::{Serialize, Deserialize};

/// Label key/value pairs attached to an instance, e.g. `version=v1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(HashMap<String, String>);

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a label, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True if every pair in `self` is present with an equal value in `other`.
    /// An empty set is a subset of everything.
    pub fn is_subset_of(&self, other: &Labels) -> bool {
        self.0
            .iter()
            .all(|(k, v)| other.0.get(k).is_some_and(|ov| ov == v))
    }
}

impl From<HashMap<String, String>> for Labels {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Labels {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A disjunction of label selectors.
///
/// An instance matches when its labels satisfy at least one entry in full.
/// An empty collection matches every instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelsCollection(Vec<Labels>);

impl LabelsCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if some selector in the collection is a subset of `labels`.
    pub fn has_subset_of(&self, labels: &Labels) -> bool {
        self.0.is_empty() || self.0.iter().any(|selector| selector.is_subset_of(labels))
    }
}

impl From<Vec<Labels>> for LabelsCollection {
    fn from(selectors: Vec<Labels>) -> Self {
        Self(selectors)
    }
}

impl FromIterator<Labels> for LabelsCollection {
    fn from_iter<I: IntoIterator<Item = Labels>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
