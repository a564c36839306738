//! orgchart-core: employee hierarchy structuring.
//!
//! Turns a flat `employee -> supervisor` JSON object into a validated,
//! single-rooted organization tree and numbers it with nested-set bounds
//! (modified preorder tree traversal), so that ancestor and descendant
//! lookups become `lft`/`rgt` range comparisons.
//!
//! # Public API
//!
//! - [`structure_hierarchy()`] -- run the whole pipeline over raw JSON text
//! - [`validate_hierarchy()`] -- run every check, stop before numbering
//! - [`decode_submission()`] -- raw bytes to text, invalid UTF-8 is malformed
//! - [`parse_pairs()`], [`find_duplicate_keys()`] -- duplicate-key detection
//! - [`organize_hierarchy()`] -- flat pairs to nested top-down mapping
//! - [`construct_hierarchy_tree()`] -- nested mapping to an [`EmployeeTree`]
//! - [`number_tree()`], [`do_mptt_traversal()`] -- nested-set numbering
//! - [`HierarchyError`] -- everything that can reject a submission
//!
//! Every function here is synchronous and touches only its own locals;
//! calls on separate threads never interfere.

pub mod duplicates;
pub mod employee;
pub mod error;
pub mod hierarchy;
pub mod mptt;
pub mod organize;
pub mod pipeline;
pub mod tree;

// ── Convenience re-exports: key types ────────────────────────────────

pub use employee::{Employee, EmployeeId, EmployeeName, EmployeeTree, NodeId};
pub use error::HierarchyError;
pub use hierarchy::{HierarchyNode, TopDownHierarchy};
pub use mptt::{NestedSet, NestedSetEntry};
pub use pipeline::StructuredHierarchy;

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use duplicates::{duplicate_employees, find_duplicate_keys, parse_pairs, SupervisionPair};
pub use mptt::{do_mptt_traversal, number_tree};
pub use organize::organize_hierarchy;
pub use pipeline::{decode_submission, structure_hierarchy, validate_hierarchy};
pub use tree::construct_hierarchy_tree;
