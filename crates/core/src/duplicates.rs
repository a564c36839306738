//! Duplicate-key detection over the raw submission.
//!
//! A regular JSON parse keeps only the last value for a repeated key, so
//! `{"Barbara": "Nick", "Barbara": "Sophie"}` would quietly become
//! `{"Barbara": "Sophie"}`. The visitor here streams the top-level object
//! and keeps every pair in document order so double assignments stay
//! visible.

use std::collections::HashSet;
use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

use crate::employee::EmployeeName;
use crate::error::HierarchyError;

/// One submitted `employee -> supervisor` edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisionPair {
    pub employee: EmployeeName,
    pub supervisor: EmployeeName,
}

impl SupervisionPair {
    pub fn new(employee: EmployeeName, supervisor: EmployeeName) -> Self {
        SupervisionPair {
            employee,
            supervisor,
        }
    }
}

/// Every key/value pair of a JSON object, duplicates included.
struct RawPairs(Vec<(String, String)>);

struct RawPairsVisitor;

impl<'de> Visitor<'de> for RawPairsVisitor {
    type Value = RawPairs;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping employee names to supervisor names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawPairs, A::Error> {
        let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((employee, supervisor)) = map.next_entry::<String, String>()? {
            pairs.push((employee, supervisor));
        }
        Ok(RawPairs(pairs))
    }
}

impl<'de> Deserialize<'de> for RawPairs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawPairsVisitor)
    }
}

/// Parse the submission into pairs, preserving order and duplicates.
///
/// This is the syntactic validity check: anything other than a single JSON
/// object whose values are all strings is `MalformedInput`. Names are
/// trimmed; a blank one is `BlankName`.
pub fn parse_pairs(raw: &str) -> Result<Vec<SupervisionPair>, HierarchyError> {
    let RawPairs(raw_pairs) = serde_json::from_str(raw)
        .map_err(|e| HierarchyError::MalformedInput(e.to_string()))?;

    raw_pairs
        .into_iter()
        .map(|(employee, supervisor)| {
            Ok(SupervisionPair::new(
                EmployeeName::new(&employee)?,
                EmployeeName::new(&supervisor)?,
            ))
        })
        .collect()
}

/// Employees that appear as a key more than once.
///
/// Ordered by the position of each name's second occurrence; a name
/// repeated three or more times is still listed once.
pub fn duplicate_employees(pairs: &[SupervisionPair]) -> Vec<EmployeeName> {
    let mut seen = HashSet::with_capacity(pairs.len());
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for pair in pairs {
        if !seen.insert(&pair.employee) && reported.insert(&pair.employee) {
            duplicates.push(pair.employee.clone());
        }
    }
    duplicates
}

/// [`duplicate_employees`] straight from raw JSON text. An empty list means
/// no employee has more than one supervisor.
pub fn find_duplicate_keys(raw: &str) -> Result<Vec<String>, HierarchyError> {
    let pairs = parse_pairs(raw)?;
    Ok(duplicate_employees(&pairs)
        .into_iter()
        .map(EmployeeName::into_string)
        .collect())
}
