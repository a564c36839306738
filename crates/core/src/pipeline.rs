//! The structuring pipeline: raw JSON text to a numbered hierarchy.
//!
//! Byte input goes through [`decode_submission`] first; text that is not
//! UTF-8 is malformed like any other undecodable document.
//!
//! Stages run in a fixed order and the first failure wins:
//!
//! 1. blank body -> [`HierarchyError::EmptyInput`]
//! 2. syntactic check -> [`HierarchyError::MalformedInput`] / [`HierarchyError::BlankName`]
//! 3. duplicate keys -> [`HierarchyError::DuplicateSupervisorAssignment`]
//! 4. no pairs -> [`HierarchyError::EmptyInput`]
//! 5. organize -> [`HierarchyError::CyclicSupervision`]
//! 6. root count -> [`HierarchyError::MultipleRoots`]
//! 7. build the tree and number it

use serde::Serialize;
use tracing::debug;

use crate::duplicates::{duplicate_employees, parse_pairs};
use crate::error::HierarchyError;
use crate::hierarchy::TopDownHierarchy;
use crate::mptt::{do_mptt_traversal, NestedSet};
use crate::organize::organize_hierarchy;

/// A validated hierarchy together with its nested-set numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredHierarchy {
    pub hierarchy: TopDownHierarchy,
    pub nested_set: NestedSet,
}

/// Decode a raw submission as UTF-8 text.
///
/// Invalid encodings are [`HierarchyError::MalformedInput`], reported the
/// same way as a document that fails to parse.
pub fn decode_submission(raw: &[u8]) -> Result<&str, HierarchyError> {
    std::str::from_utf8(raw).map_err(|e| HierarchyError::MalformedInput(e.to_string()))
}

/// Run every validation stage and return the single-rooted hierarchy.
pub fn validate_hierarchy(raw: &str) -> Result<TopDownHierarchy, HierarchyError> {
    if raw.trim().is_empty() {
        return Err(HierarchyError::EmptyInput);
    }

    let pairs = parse_pairs(raw)?;
    debug!(pairs = pairs.len(), "parsed submission");

    let duplicates = duplicate_employees(&pairs);
    if !duplicates.is_empty() {
        return Err(HierarchyError::DuplicateSupervisorAssignment {
            employees: duplicates.into_iter().map(|n| n.into_string()).collect(),
        });
    }

    if pairs.is_empty() {
        return Err(HierarchyError::EmptyInput);
    }

    let hierarchy = organize_hierarchy(&pairs)?;
    if hierarchy.roots().len() > 1 {
        return Err(HierarchyError::MultipleRoots {
            roots: hierarchy.root_names(),
        });
    }
    Ok(hierarchy)
}

/// Validate `raw`, then build and number its tree.
pub fn structure_hierarchy(raw: &str) -> Result<StructuredHierarchy, HierarchyError> {
    let hierarchy = validate_hierarchy(raw)?;
    let nested_set = do_mptt_traversal(&hierarchy);
    debug!(employees = nested_set.len(), "numbered hierarchy");
    Ok(StructuredHierarchy {
        hierarchy,
        nested_set,
    })
}
