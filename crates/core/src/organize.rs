//! Flat `employee -> supervisor` pairs to a nested top-down hierarchy.
//!
//! Every name gets one registry slot on first reference, so attaching a
//! subordinate to someone who was themselves placed earlier is always
//! visible through the chain, whatever order the pairs arrive in.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::duplicates::SupervisionPair;
use crate::employee::EmployeeName;
use crate::error::HierarchyError;
use crate::hierarchy::{HierarchyNode, TopDownHierarchy};

#[derive(Default)]
struct Registry<'a> {
    slots: HashMap<&'a EmployeeName, usize>,
    names: Vec<&'a EmployeeName>,
    supervisor: Vec<Option<usize>>,
    subordinates: Vec<Vec<usize>>,
}

impl<'a> Registry<'a> {
    fn slot(&mut self, name: &'a EmployeeName) -> usize {
        if let Some(&slot) = self.slots.get(name) {
            return slot;
        }
        let slot = self.names.len();
        self.slots.insert(name, slot);
        self.names.push(name);
        self.supervisor.push(None);
        self.subordinates.push(Vec::new());
        slot
    }

    fn assign(&mut self, employee: usize, supervisor: usize) {
        // Last assignment wins if a caller skipped duplicate detection.
        if let Some(previous) = self.supervisor[employee].replace(supervisor) {
            self.subordinates[previous].retain(|&s| s != employee);
        }
        self.subordinates[supervisor].push(employee);
    }
}

/// Organize submitted pairs into a nested top-down hierarchy.
///
/// Roots are the names that never appear as an employee, in order of first
/// reference; subordinates keep submission order. Multiple roots are
/// returned as-is. Names that cannot reach any root sit on a supervision
/// cycle and fail with [`HierarchyError::CyclicSupervision`].
pub fn organize_hierarchy(pairs: &[SupervisionPair]) -> Result<TopDownHierarchy, HierarchyError> {
    let mut registry = Registry::default();
    for pair in pairs {
        let supervisor = registry.slot(&pair.supervisor);
        let employee = registry.slot(&pair.employee);
        registry.assign(employee, supervisor);
    }

    let roots: Vec<usize> = (0..registry.names.len())
        .filter(|&slot| registry.supervisor[slot].is_none())
        .collect();

    // Breadth-first from the roots; parents always precede their subordinates.
    let mut order = Vec::with_capacity(registry.names.len());
    let mut reached = vec![false; registry.names.len()];
    let mut queue: VecDeque<usize> = roots.iter().copied().collect();
    while let Some(slot) = queue.pop_front() {
        reached[slot] = true;
        order.push(slot);
        queue.extend(registry.subordinates[slot].iter().copied());
    }

    if order.len() < registry.names.len() {
        let employees: Vec<String> = (0..registry.names.len())
            .filter(|&slot| !reached[slot])
            .map(|slot| registry.names[slot].to_string())
            .collect();
        debug!(count = employees.len(), "supervision cycle detected");
        return Err(HierarchyError::CyclicSupervision { employees });
    }

    // Assemble bottom-up so no recursion is needed for deep chains.
    let mut built: Vec<Option<HierarchyNode>> = vec![None; registry.names.len()];
    for &slot in order.iter().rev() {
        let subordinates = registry.subordinates[slot]
            .iter()
            .filter_map(|&s| built[s].take())
            .collect();
        built[slot] = Some(HierarchyNode::new(registry.names[slot].clone(), subordinates));
    }

    let hierarchy = TopDownHierarchy::new(
        roots
            .into_iter()
            .filter_map(|slot| built[slot].take())
            .collect(),
    );
    debug!(
        roots = hierarchy.roots().len(),
        employees = registry.names.len(),
        "organized hierarchy"
    );
    Ok(hierarchy)
}
