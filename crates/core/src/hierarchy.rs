//! Nested top-down mapping: `{root: {subordinate: {...}}}`.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::employee::EmployeeName;

/// One employee and, recursively, everyone reporting to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    name: EmployeeName,
    subordinates: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn new(name: EmployeeName, subordinates: Vec<HierarchyNode>) -> Self {
        HierarchyNode { name, subordinates }
    }

    pub fn leaf(name: EmployeeName) -> Self {
        HierarchyNode::new(name, Vec::new())
    }

    pub fn name(&self) -> &EmployeeName {
        &self.name
    }

    pub fn subordinates(&self) -> &[HierarchyNode] {
        &self.subordinates
    }

    /// Direct subordinate called `name`.
    pub fn subordinate(&self, name: &str) -> Option<&HierarchyNode> {
        self.subordinates.iter().find(|s| s.name.as_str() == name)
    }
}

/// The organized hierarchy: zero or more top-level supervisors, each the
/// root of its own subtree. A structurally valid organization has exactly
/// one root.
///
/// Serializes as a JSON object in root/subordinate order:
///
/// ```text
/// {"Jonas": {"Sophie": {"Nick": {"Pete": {}, "Barbara": {}}}}}
/// ```
///
/// and deserializes from the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopDownHierarchy {
    roots: Vec<HierarchyNode>,
}

impl TopDownHierarchy {
    pub fn new(roots: Vec<HierarchyNode>) -> Self {
        TopDownHierarchy { roots }
    }

    pub fn roots(&self) -> &[HierarchyNode] {
        &self.roots
    }

    pub fn root(&self, name: &str) -> Option<&HierarchyNode> {
        self.roots.iter().find(|r| r.name.as_str() == name)
    }

    pub fn root_names(&self) -> Vec<String> {
        self.roots.iter().map(|r| r.name.to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of employees across all roots.
    pub fn employee_count(&self) -> usize {
        let mut count = 0;
        let mut pending: Vec<&HierarchyNode> = self.roots.iter().collect();
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.subordinates.iter());
        }
        count
    }
}

struct SubordinateMap<'a>(&'a [HierarchyNode]);

impl Serialize for SubordinateMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for node in self.0 {
            map.serialize_entry(node.name.as_str(), &SubordinateMap(&node.subordinates))?;
        }
        map.end()
    }
}

impl Serialize for TopDownHierarchy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SubordinateMap(&self.roots).serialize(serializer)
    }
}

impl Serialize for HierarchyNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SubordinateMap(std::slice::from_ref(self)).serialize(serializer)
    }
}

/// Owned counterpart of [`SubordinateMap`] used when reading the mapping back.
struct SubordinateList(Vec<HierarchyNode>);

struct SubordinateListVisitor;

impl<'de> Visitor<'de> for SubordinateListVisitor {
    type Value = SubordinateList;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object mapping employee names to their subordinates")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<SubordinateList, A::Error> {
        let mut nodes = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(name) = map.next_key::<EmployeeName>()? {
            let SubordinateList(subordinates) = map.next_value()?;
            nodes.push(HierarchyNode::new(name, subordinates));
        }
        Ok(SubordinateList(nodes))
    }
}

impl<'de> Deserialize<'de> for SubordinateList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SubordinateListVisitor)
    }
}

impl<'de> Deserialize<'de> for TopDownHierarchy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let SubordinateList(roots) = SubordinateList::deserialize(deserializer)?;
        Ok(TopDownHierarchy::new(roots))
    }
}

/// Reads `{name: {...}}` with exactly one top-level key.
impl<'de> Deserialize<'de> for HierarchyNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let SubordinateList(mut nodes) = SubordinateList::deserialize(deserializer)?;
        match (nodes.pop(), nodes.is_empty()) {
            (Some(node), true) => Ok(node),
            (None, _) => Err(de::Error::invalid_length(0, &"exactly one employee")),
            (Some(_), false) => Err(de::Error::invalid_length(nodes.len() + 1, &"exactly one employee")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(s: &str) -> HierarchyNode {
        HierarchyNode::leaf(EmployeeName::new(s).unwrap())
    }

    fn node(s: &str, subs: Vec<HierarchyNode>) -> HierarchyNode {
        HierarchyNode::new(EmployeeName::new(s).unwrap(), subs)
    }

    #[test]
    fn empty_serializes_as_empty_object() {
        let json = serde_json::to_string(&TopDownHierarchy::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn serializes_nested_in_order() {
        let h = TopDownHierarchy::new(vec![node(
            "Nick",
            vec![leaf("Pete"), leaf("Barbara")],
        )]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, r#"{"Nick":{"Pete":{},"Barbara":{}}}"#);
    }

    #[test]
    fn single_node_serializes_with_its_name() {
        let json = serde_json::to_string(&node("Peter", vec![leaf("Ham")])).unwrap();
        assert_eq!(json, r#"{"Peter":{"Ham":{}}}"#);
    }

    #[test]
    fn counts_every_employee() {
        let h = TopDownHierarchy::new(vec![
            node("Jonas", vec![node("Sophie", vec![leaf("Nick")])]),
            node("Reenah", vec![leaf("Jane")]),
        ]);
        assert_eq!(h.employee_count(), 5);
        assert_eq!(h.root_names(), vec!["Jonas", "Reenah"]);
        assert!(h.root("Reenah").unwrap().subordinate("Jane").is_some());
    }

    #[test]
    fn reads_back_what_it_writes() {
        let h = TopDownHierarchy::new(vec![node(
            "Jonas",
            vec![node("Sophie", vec![node("Nick", vec![leaf("Pete"), leaf("Barbara")])])],
        )]);
        let json = serde_json::to_string(&h).unwrap();
        let back: TopDownHierarchy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);

        let empty: TopDownHierarchy = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn node_needs_exactly_one_key() {
        let peter: HierarchyNode = serde_json::from_str(r#"{"Peter": {"Ham": {}}}"#).unwrap();
        assert_eq!(peter, node("Peter", vec![leaf("Ham")]));

        assert!(serde_json::from_str::<HierarchyNode>("{}").is_err());
        assert!(serde_json::from_str::<HierarchyNode>(r#"{"A": {}, "B": {}}"#).is_err());
    }

    #[test]
    fn rejects_blank_names_and_non_objects() {
        assert!(serde_json::from_str::<TopDownHierarchy>(r#"{"  ": {}}"#).is_err());
        assert!(serde_json::from_str::<TopDownHierarchy>(r#"{"Pete": "Nick"}"#).is_err());
    }
}
