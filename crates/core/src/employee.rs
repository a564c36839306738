//! Employee value types and the in-memory organization tree.
//!
//! [`EmployeeName`] and [`EmployeeId`] validate on construction, so a value
//! of either type is always well formed. [`EmployeeTree`] is an arena: each
//! [`Employee`] owns its subordinates through [`NodeId`] indices and points
//! back at its supervisor without owning it.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::HierarchyError;

/// A trimmed, non-empty employee name. Acts as the natural key of an
/// employee within one structuring run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EmployeeName(String);

impl EmployeeName {
    /// Trim `raw` and reject it if nothing is left.
    pub fn new(raw: &str) -> Result<Self, HierarchyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(HierarchyError::BlankName);
        }
        Ok(EmployeeName(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EmployeeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EmployeeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EmployeeName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for EmployeeName {
    type Err = HierarchyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmployeeName::new(s)
    }
}

impl TryFrom<String> for EmployeeName {
    type Error = HierarchyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        EmployeeName::new(&value)
    }
}

impl TryFrom<&str> for EmployeeName {
    type Error = HierarchyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        EmployeeName::new(value)
    }
}

impl<'de> Deserialize<'de> for EmployeeName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        EmployeeName::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// Surrogate identifier of a numbered employee: a random 128-bit value
/// rendered as 32 lowercase hexadecimal characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmployeeId(Uuid);

impl EmployeeId {
    /// Mint a fresh random identifier.
    pub fn generate() -> Self {
        EmployeeId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.simple(), f)
    }
}

/// Only the simple lowercase form round-trips: hyphenated, braced or
/// uppercase spellings of a valid UUID are rejected.
impl FromStr for EmployeeId {
    type Err = HierarchyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(s).map_err(|_| HierarchyError::InvalidEmployeeId(s.to_owned()))?;
        if uuid.simple().to_string() != s {
            return Err(HierarchyError::InvalidEmployeeId(s.to_owned()));
        }
        Ok(EmployeeId(uuid))
    }
}

impl Serialize for EmployeeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EmployeeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Index of an [`Employee`] inside the [`EmployeeTree`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One employee in the organization tree.
///
/// `lft`, `rgt`, `employee_id` and `supervisor_id` stay at their defaults
/// (zero / `None`) until the tree is numbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    name: EmployeeName,
    supervisor: Option<NodeId>,
    subordinates: Vec<NodeId>,
    pub(crate) lft: u64,
    pub(crate) rgt: u64,
    pub(crate) employee_id: Option<EmployeeId>,
    pub(crate) supervisor_id: Option<EmployeeId>,
}

impl Employee {
    fn new(name: EmployeeName, supervisor: Option<NodeId>) -> Self {
        Employee {
            name,
            supervisor,
            subordinates: Vec::new(),
            lft: 0,
            rgt: 0,
            employee_id: None,
            supervisor_id: None,
        }
    }

    pub fn name(&self) -> &EmployeeName {
        &self.name
    }

    /// The supervising node, `None` for the root.
    pub fn supervisor(&self) -> Option<NodeId> {
        self.supervisor
    }

    /// Direct subordinates in the order they were discovered.
    pub fn subordinates(&self) -> &[NodeId] {
        &self.subordinates
    }

    pub fn lft(&self) -> u64 {
        self.lft
    }

    pub fn rgt(&self) -> u64 {
        self.rgt
    }

    pub fn employee_id(&self) -> Option<EmployeeId> {
        self.employee_id
    }

    pub fn supervisor_id(&self) -> Option<EmployeeId> {
        self.supervisor_id
    }

    pub fn is_root(&self) -> bool {
        self.supervisor.is_none()
    }
}

/// A single-rooted organization tree.
///
/// Nodes are only ever appended, so a [`NodeId`] handed out by a tree stays
/// valid for that tree's lifetime. Using it with another tree is a logic
/// error and may panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeTree {
    nodes: Vec<Employee>,
}

impl EmployeeTree {
    /// Start a tree holding only its root.
    pub fn new(root: EmployeeName) -> Self {
        EmployeeTree {
            nodes: vec![Employee::new(root, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append `name` as the last subordinate of `supervisor`.
    pub fn add_subordinate(&mut self, supervisor: NodeId, name: EmployeeName) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Employee::new(name, Some(supervisor)));
        self.nodes[supervisor.0].subordinates.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Employee> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Employee {
        &mut self.nodes[id.0]
    }

    /// Locate an employee by name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|e| e.name.as_str() == name)
            .map(NodeId)
    }

    /// Number of employees, root included. Never zero.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in creation (breadth-first) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Employee)> {
        self.nodes.iter().enumerate().map(|(i, e)| (NodeId(i), e))
    }

    /// Count every node below `id`, walking with an explicit stack.
    pub fn descendant_count(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut pending: Vec<NodeId> = self[id].subordinates.clone();
        while let Some(next) = pending.pop() {
            count += 1;
            pending.extend_from_slice(&self[next].subordinates);
        }
        count
    }
}

impl Index<NodeId> for EmployeeTree {
    type Output = Employee;

    fn index(&self, id: NodeId) -> &Employee {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> EmployeeName {
        EmployeeName::new(s).unwrap()
    }

    #[test]
    fn name_is_trimmed() {
        assert_eq!(name("  Sophie \t").as_str(), "Sophie");
    }

    #[test]
    fn blank_name_rejected() {
        assert_eq!(EmployeeName::new(""), Err(HierarchyError::BlankName));
        assert_eq!(EmployeeName::new("   \n"), Err(HierarchyError::BlankName));
        assert!(serde_json::from_str::<EmployeeName>("\" \"").is_err());
    }

    #[test]
    fn generated_id_is_32_lowercase_hex() {
        let id = EmployeeId::generate().to_string();
        assert_eq!(id.len(), 32);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn generated_ids_differ() {
        assert_ne!(EmployeeId::generate(), EmployeeId::generate());
    }

    #[test]
    fn id_parses_only_simple_lowercase_form() {
        let id = EmployeeId::generate();
        let text = id.to_string();
        assert_eq!(text.parse::<EmployeeId>().unwrap(), id);

        let hyphenated = id.as_uuid().hyphenated().to_string();
        assert!(hyphenated.parse::<EmployeeId>().is_err());
        assert!(text.to_uppercase().parse::<EmployeeId>().is_err());
        assert!("".parse::<EmployeeId>().is_err());
        assert!("not-a-uuid".parse::<EmployeeId>().is_err());
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = EmployeeId::generate();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
        let back: EmployeeId = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn tree_links_both_directions() {
        let mut tree = EmployeeTree::new(name("Jonas"));
        let sophie = tree.add_subordinate(tree.root(), name("Sophie"));
        let nick = tree.add_subordinate(sophie, name("Nick"));

        assert!(tree[tree.root()].is_root());
        assert_eq!(tree[sophie].supervisor(), Some(tree.root()));
        assert_eq!(tree[tree.root()].subordinates(), &[sophie]);
        assert_eq!(tree[nick].supervisor(), Some(sophie));
        assert_eq!(tree.find("Nick"), Some(nick));
        assert_eq!(tree.find("Pete"), None);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn unnumbered_nodes_have_defaults() {
        let tree = EmployeeTree::new(name("Tender"));
        let root = &tree[tree.root()];
        assert_eq!((root.lft(), root.rgt()), (0, 0));
        assert!(root.employee_id().is_none());
        assert!(root.supervisor_id().is_none());
    }

    #[test]
    fn descendant_count_covers_whole_subtree() {
        let mut tree = EmployeeTree::new(name("Jonas"));
        let sophie = tree.add_subordinate(tree.root(), name("Sophie"));
        let nick = tree.add_subordinate(sophie, name("Nick"));
        let pete = tree.add_subordinate(nick, name("Pete"));
        tree.add_subordinate(nick, name("Barbara"));

        assert_eq!(tree.descendant_count(tree.root()), 4);
        assert_eq!(tree.descendant_count(nick), 2);
        assert_eq!(tree.descendant_count(pete), 0);
    }
}
