use orgchart_core::NestedSetEntry;
use serde::{Deserialize, Serialize};

/// One persisted employee: the adjacency link (`supervisor_id`) plus the
/// nested-set bounds (`lft`, `rgt`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Primary key, 32 lowercase hex characters.
    pub employee_id: String,
    /// Unique across the table.
    pub name: String,
    /// References another row's `employee_id`; `None` for the root.
    pub supervisor_id: Option<String>,
    pub lft: u64,
    pub rgt: u64,
}

impl EmployeeRecord {
    /// Whether `other` is somewhere below this employee.
    pub fn is_ancestor_of(&self, other: &EmployeeRecord) -> bool {
        self.lft < other.lft && other.rgt < self.rgt
    }
}

impl From<&NestedSetEntry> for EmployeeRecord {
    fn from(entry: &NestedSetEntry) -> Self {
        EmployeeRecord {
            employee_id: entry.id.to_string(),
            name: entry.name.to_string(),
            supervisor_id: entry.supervisor_id.map(|id| id.to_string()),
            lft: entry.lft,
            rgt: entry.rgt,
        }
    }
}

impl From<NestedSetEntry> for EmployeeRecord {
    fn from(entry: NestedSetEntry) -> Self {
        EmployeeRecord {
            employee_id: entry.id.to_string(),
            name: entry.name.into_string(),
            supervisor_id: entry.supervisor_id.map(|id| id.to_string()),
            lft: entry.lft,
            rgt: entry.rgt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgchart_core::structure_hierarchy;

    #[test]
    fn records_carry_nested_set_fields() {
        let set = structure_hierarchy(r#"{"Ham": "Peter"}"#)
            .unwrap()
            .nested_set;
        let peter = EmployeeRecord::from(set.get("Peter").unwrap());
        let ham = EmployeeRecord::from(set.get("Ham").unwrap().clone());

        assert_eq!(ham.name, "Ham");
        assert_eq!((ham.lft, ham.rgt), (2, 3));
        assert_eq!(ham.employee_id.len(), 32);
        assert_eq!(ham.supervisor_id.as_deref(), Some(peter.employee_id.as_str()));
        assert_eq!(peter.supervisor_id, None);
        assert!(peter.is_ancestor_of(&ham));
        assert!(!ham.is_ancestor_of(&peter));
    }
}
