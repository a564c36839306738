//! Nested-set numbering (modified preorder tree traversal).
//!
//! A single counter ticks once when a node is entered and once when it is
//! left. The entry tick is the node's `lft`, the exit tick its `rgt`, so a
//! subtree of `k` descendants spans `rgt - lft == 2k + 1` and every
//! descendant's interval sits strictly inside its ancestors'.
//!
//! The walk uses an explicit stack so arbitrarily deep organizations
//! never touch the call-stack limit.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::employee::{EmployeeId, EmployeeName, EmployeeTree, NodeId};
use crate::hierarchy::TopDownHierarchy;
use crate::tree::construct_hierarchy_tree;

/// Numbered employee, shaped for the persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedSetEntry {
    pub name: EmployeeName,
    pub id: EmployeeId,
    pub supervisor_id: Option<EmployeeId>,
    pub lft: u64,
    pub rgt: u64,
}

impl NestedSetEntry {
    /// Number of employees below this one. Bounds with `rgt <= lft` count
    /// as a leaf.
    pub fn descendant_count(&self) -> u64 {
        self.rgt.saturating_sub(self.lft).saturating_sub(1) / 2
    }

    /// Whether `other` lies strictly inside this entry's interval.
    pub fn contains(&self, other: &NestedSetEntry) -> bool {
        self.lft < other.lft && other.rgt < self.rgt
    }
}

/// Numbering result in preorder, serialized as `{name: entry}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NestedSet {
    entries: Vec<NestedSetEntry>,
}

impl NestedSet {
    pub fn get(&self, name: &str) -> Option<&NestedSetEntry> {
        self.entries.iter().find(|e| e.name.as_str() == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in preorder (ascending `lft`).
    pub fn iter(&self) -> std::slice::Iter<'_, NestedSetEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<NestedSetEntry> {
        self.entries
    }
}

impl Serialize for NestedSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(entry.name.as_str(), entry)?;
        }
        map.end()
    }
}

enum Visit {
    Enter(NodeId),
    Exit(NodeId),
}

/// Number every node of `tree` in place and return the entries in preorder.
///
/// Each node gets a freshly minted [`EmployeeId`]; its `supervisor_id` is
/// the id its supervisor received on entry, which always happens first.
pub fn number_tree(tree: &mut EmployeeTree) -> NestedSet {
    let mut preorder = Vec::with_capacity(tree.len());
    let mut stack = vec![Visit::Enter(tree.root())];
    let mut counter: u64 = 0;

    while let Some(visit) = stack.pop() {
        counter += 1;
        match visit {
            Visit::Enter(id) => {
                let supervisor_id = tree[id].supervisor().and_then(|s| tree[s].employee_id());
                let node = tree.node_mut(id);
                node.lft = counter;
                node.rgt = counter;
                node.employee_id = Some(EmployeeId::generate());
                node.supervisor_id = supervisor_id;
                preorder.push(id);

                stack.push(Visit::Exit(id));
                // Reversed so the first subordinate is popped first.
                stack.extend(tree[id].subordinates().iter().rev().map(|&s| Visit::Enter(s)));
            }
            Visit::Exit(id) => {
                tree.node_mut(id).rgt = counter;
            }
        }
    }

    let entries = preorder
        .into_iter()
        .filter_map(|id| {
            let node = &tree[id];
            Some(NestedSetEntry {
                name: node.name().clone(),
                id: node.employee_id()?,
                supervisor_id: node.supervisor_id(),
                lft: node.lft(),
                rgt: node.rgt(),
            })
        })
        .collect();
    NestedSet { entries }
}

/// Build the tree for `hierarchy` and number it. Empty in, empty out.
pub fn do_mptt_traversal(hierarchy: &TopDownHierarchy) -> NestedSet {
    match construct_hierarchy_tree(hierarchy) {
        Some(mut tree) => number_tree(&mut tree),
        None => NestedSet::default(),
    }
}
