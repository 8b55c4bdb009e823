use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ClassifierError, Result};
use crate::LabelId;

/// The closed set of labels a spam model may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Spam,
    Ham,
    Unsure,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spam => "spam",
            Label::Ham => "ham",
            Label::Unsure => "unsure",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel(pub String);

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown label {:?}", self.0)
    }
}

impl std::error::Error for UnknownLabel {}

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        [Label::Spam, Label::Ham, Label::Unsure]
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// Label id to label mapping. Ids are dense, `0..len`, matching the model's label rows.
#[derive(Debug, Clone)]
pub struct LabelIndex<L> {
    entries: BTreeMap<LabelId, (String, L)>,
}

impl<L> LabelIndex<L>
where
    L: FromStr,
    L::Err: fmt::Display,
{
    /// Parse every name into `L`, failing on the first one outside the label set.
    pub fn new(names: BTreeMap<LabelId, String>) -> Result<Self> {
        if names.is_empty() {
            return Err(ClassifierError::load("label index is empty"));
        }
        let mut entries = BTreeMap::new();
        for (expected, (id, name)) in names.into_iter().enumerate() {
            if id as usize != expected {
                return Err(ClassifierError::load(format!("label ids are not dense: expected {expected}, found {id}")));
            }
            let label = name
                .parse::<L>()
                .map_err(|e| ClassifierError::load(format!("label {id}: {e}")))?;
            entries.insert(id, (name, label));
        }
        Ok(Self { entries })
    }
}

impl<L> LabelIndex<L> {
    pub fn get(&self, id: LabelId) -> Option<&L> {
        self.entries.get(&id).map(|(_, l)| l)
    }

    pub fn name(&self, id: LabelId) -> Option<&str> {
        self.entries.get(&id).map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Names in export form.
    pub fn names(&self) -> BTreeMap<LabelId, String> {
        self.entries.iter().map(|(&id, (n, _))| (id, n.clone())).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LabelId, &str, &L)> {
        self.entries.iter().map(|(&id, (n, l))| (id, n.as_str(), l))
    }
}
