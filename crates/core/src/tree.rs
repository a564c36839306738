//! Nested hierarchy to an explicit [`EmployeeTree`].

use std::collections::VecDeque;

use crate::employee::{EmployeeTree, NodeId};
use crate::hierarchy::{HierarchyNode, TopDownHierarchy};

/// Expand the hierarchy breadth-first into an [`EmployeeTree`].
///
/// Expects exactly one root; only the first root is expanded if there are
/// more. Subordinates are appended in the hierarchy's order. Returns `None`
/// for an empty hierarchy.
pub fn construct_hierarchy_tree(hierarchy: &TopDownHierarchy) -> Option<EmployeeTree> {
    let root = hierarchy.roots().first()?;
    let mut tree = EmployeeTree::new(root.name().clone());

    let mut queue: VecDeque<(NodeId, &HierarchyNode)> = VecDeque::new();
    queue.push_back((tree.root(), root));

    while let Some((supervisor, node)) = queue.pop_front() {
        for subordinate in node.subordinates() {
            let id = tree.add_subordinate(supervisor, subordinate.name().clone());
            queue.push_back((id, subordinate));
        }
    }
    Some(tree)
}
