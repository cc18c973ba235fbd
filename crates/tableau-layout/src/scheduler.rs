// crates/tableau-layout/src/scheduler.rs
use std::collections::{HashMap, HashSet, VecDeque};
use tableau_core::NodeId;

/// Update order for one parent's children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateOrder {
    /// Every child exactly once, in the order it must be updated.
    pub order: Vec<NodeId>,
    /// Children caught in a dependency cycle, in list order. They lead
    /// `order` as well.
    pub unsorted: Vec<NodeId>,
}

impl UpdateOrder {
    pub fn has_cycle(&self) -> bool {
        !self.unsorted.is_empty()
    }
}

/// Orders siblings so that every child updates after the siblings it is
/// constrained to.
///
/// `dependencies` maps a child to the nodes its constraints name. Entries
/// that are not siblings, and a child naming itself, are ignored. Kahn's
/// algorithm emits the children nothing depends on first, so the update
/// order is the emitted order reversed. The queue is seeded back to front,
/// which keeps unrelated siblings in list order.
pub fn update_order(children: &[NodeId], dependencies: &HashMap<NodeId, Vec<NodeId>>) -> UpdateOrder {
    let siblings: HashSet<NodeId> = children.iter().copied().collect();
    let mut in_degree: HashMap<NodeId, usize> = children.iter().map(|&id| (id, 0)).collect();
    let mut edges: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

    for &child in children {
        let Some(targets) = dependencies.get(&child) else {
            continue;
        };
        let mut seen = HashSet::new();
        for &target in targets {
            if target == child || !siblings.contains(&target) || !seen.insert(target) {
                continue;
            }
            edges.entry(child).or_default().push(target);
            *in_degree.entry(target).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<NodeId> = children
        .iter()
        .rev()
        .copied()
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();
    let mut emitted = Vec::with_capacity(children.len());

    while let Some(node) = queue.pop_front() {
        emitted.push(node);
        for target in edges.get(&node).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(target) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*target);
                }
            }
        }
    }

    let placed: HashSet<NodeId> = emitted.iter().copied().collect();
    let mut seen = HashSet::new();
    let unsorted: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|id| !placed.contains(id) && seen.insert(*id))
        .collect();

    let mut order = unsorted.clone();
    order.extend(emitted.into_iter().rev());
    UpdateOrder { order, unsorted }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<NodeId> {
        (0..n).map(|_| NodeId::next()).collect()
    }

    fn position(order: &[NodeId], id: NodeId) -> usize {
        order.iter().position(|&x| x == id).unwrap()
    }

    #[test]
    fn test_chain_updates_dependencies_first_for_any_list_order() {
        let n = ids(3);
        let (a, b, c) = (n[0], n[1], n[2]);
        let deps = HashMap::from([(a, vec![b]), (b, vec![c])]);

        for children in [vec![a, b, c], vec![c, b, a], vec![b, a, c], vec![c, a, b]] {
            let result = update_order(&children, &deps);
            assert_eq!(result.order, vec![c, b, a]);
            assert!(!result.has_cycle());
        }
    }

    #[test]
    fn test_unrelated_siblings_keep_list_order() {
        let n = ids(4);
        let result = update_order(&n, &HashMap::new());
        assert_eq!(result.order, n);

        let deps = HashMap::from([(n[0], vec![n[3]])]);
        let result = update_order(&n, &deps);
        assert!(position(&result.order, n[3]) < position(&result.order, n[0]));
        assert!(position(&result.order, n[1]) < position(&result.order, n[2]));
        assert_eq!(result.order.len(), 4);
    }

    #[test]
    fn test_cycle_falls_back_to_list_order_first() {
        let n = ids(3);
        let (a, b, c) = (n[0], n[1], n[2]);
        let deps = HashMap::from([(a, vec![b]), (b, vec![a]), (c, vec![a])]);

        let result = update_order(&[a, b, c], &deps);
        assert_eq!(result.unsorted, vec![a, b]);
        assert_eq!(result.order, vec![a, b, c]);
    }

    #[test]
    fn test_self_and_non_sibling_references_are_ignored() {
        let n = ids(3);
        let (a, b, outsider) = (n[0], n[1], n[2]);
        let deps = HashMap::from([(a, vec![a, outsider]), (b, vec![b])]);

        let result = update_order(&[a, b], &deps);
        assert_eq!(result.order, vec![a, b]);
        assert!(result.unsorted.is_empty());
    }

    #[test]
    fn test_repeated_dependency_counts_once() {
        let n = ids(2);
        let (a, b) = (n[0], n[1]);
        let deps = HashMap::from([(a, vec![b, b])]);
        assert_eq!(update_order(&[a, b], &deps).order, vec![b, a]);
    }
}
