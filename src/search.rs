//! Uniform-cost search over an implicit graph. Successors are generated on demand by a closure,
//! which keeps the search independent of how the graph is stored.
use fxhash::FxBuildHasher;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use num_traits::Zero;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

use log::trace;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use std::hash::Hash;

/// Parent index stored for the start node.
const NO_PARENT: usize = usize::MAX;

struct SmallestCostHolder<K> {
    cost: K,
    index: usize,
}

impl<K: PartialEq> Eq for SmallestCostHolder<K> {}

impl<K: PartialEq> PartialEq for SmallestCostHolder<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cost.eq(&other.cost) && self.index == other.index
    }
}

impl<K: Ord> PartialOrd for SmallestCostHolder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for SmallestCostHolder<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so that the max-heap pops the cheapest entry. Equal costs fall back on
        // discovery order, earliest first.
        match other.cost.cmp(&self.cost) {
            Ordering::Equal => other.index.cmp(&self.index),
            s => s,
        }
    }
}

/// Every node reached by [dijkstra] together with its best known cost and the node it was
/// reached from. Nodes keep the order in which they were first discovered.
#[derive(Clone, Debug)]
pub struct SearchTree<N: Eq + Hash, C> {
    parents: FxIndexMap<N, (usize, C)>,
    goal: Option<usize>,
}

impl<N, C> SearchTree<N, C>
where
    N: Eq + Hash + Clone,
    C: Copy,
{
    /// Number of nodes that received a tentative cost.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn cost(&self, node: &N) -> Option<C> {
        self.parents.get(node).map(|&(_, c)| c)
    }

    pub fn parent(&self, node: &N) -> Option<&N> {
        self.parents
            .get(node)
            .and_then(|&(p, _)| self.parents.get_index(p))
            .map(|(n, _)| n)
    }

    /// The node that satisfied the success predicate, if the search got there.
    pub fn goal(&self) -> Option<&N> {
        self.goal
            .and_then(|ix| self.parents.get_index(ix))
            .map(|(n, _)| n)
    }

    pub fn goal_cost(&self) -> Option<C> {
        self.goal
            .and_then(|ix| self.parents.get_index(ix))
            .map(|(_, &(_, c))| c)
    }

    /// The nodes from the start to the goal, both inclusive.
    pub fn path(&self) -> Option<Vec<N>> {
        self.goal.map(|ix| self.reverse_path(ix))
    }

    /// Iterates over `(node, parent, cost)` in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&N, Option<&N>, C)> + '_ {
        self.parents.iter().map(move |(node, &(p, c))| {
            (node, self.parents.get_index(p).map(|(n, _)| n), c)
        })
    }

    fn reverse_path(&self, end: usize) -> Vec<N> {
        let mut cursor = end;
        let mut path: Vec<N> = std::iter::from_fn(|| {
            self.parents.get_index(cursor).map(|(node, &(parent, _))| {
                cursor = parent;
                node.clone()
            })
        })
        .collect();
        path.reverse();
        path
    }
}

/// Single-source shortest paths with a lazily pruned binary heap. Improved entries are pushed
/// again instead of being updated in place; outdated entries are skipped when popped. The
/// search stops as soon as a node satisfying `success` is popped, at which point its cost is
/// final as long as all edge costs are non-negative.
pub fn dijkstra<N, C, FN, IN, FS>(start: &N, mut successors: FN, mut success: FS) -> SearchTree<N, C>
where
    N: Eq + Hash + Clone,
    C: Zero + Ord + Copy,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = (N, C)>,
    FS: FnMut(&N) -> bool,
{
    let mut to_see = BinaryHeap::new();
    to_see.push(SmallestCostHolder {
        cost: Zero::zero(),
        index: 0,
    });
    let mut parents: FxIndexMap<N, (usize, C)> = FxIndexMap::default();
    parents.insert(start.clone(), (NO_PARENT, Zero::zero()));
    let mut goal = None;
    let mut stale = 0usize;
    while let Some(SmallestCostHolder { cost, index }) = to_see.pop() {
        let successors = {
            let Some((node, &(_, c))) = parents.get_index(index) else {
                continue;
            };
            // We may have inserted a node several times into the binary heap if we found
            // a better way to access it. Ensure that we are currently dealing with the
            // best path and discard the others.
            if cost > c {
                stale += 1;
                continue;
            }
            if success(node) {
                goal = Some(index);
                break;
            }
            successors(node)
        };
        for (successor, move_cost) in successors {
            let new_cost = cost + move_cost;
            let n; // index for successor
            match parents.entry(successor) {
                Vacant(e) => {
                    n = e.index();
                    e.insert((index, new_cost));
                }
                Occupied(mut e) => {
                    if e.get().1 > new_cost {
                        n = e.index();
                        e.insert((index, new_cost));
                    } else {
                        continue;
                    }
                }
            }

            to_see.push(SmallestCostHolder {
                cost: new_cost,
                index: n,
            });
        }
    }
    trace!(
        "Search reached {} nodes, skipped {} stale frontier entries",
        parents.len(),
        stale
    );
    SearchTree { parents, goal }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small weighted digraph where the cheapest route is not the one with the fewest edges.
    fn weighted_successors(node: &char) -> Vec<(char, u32)> {
        match node {
            'a' => vec![('b', 7), ('c', 2)],
            'c' => vec![('d', 2), ('b', 4)],
            'd' => vec![('b', 1)],
            'b' => vec![('e', 1)],
            _ => vec![],
        }
    }

    #[test]
    fn cheapest_route_with_weights() {
        let tree = dijkstra(&'a', weighted_successors, |n| *n == 'e');
        assert_eq!(tree.goal(), Some(&'e'));
        assert_eq!(tree.goal_cost(), Some(6));
        assert_eq!(tree.path().unwrap(), vec!['a', 'c', 'd', 'b', 'e']);
        assert_eq!(tree.parent(&'b'), Some(&'d'));
        assert_eq!(tree.parent(&'a'), None);
    }

    #[test]
    fn start_is_goal() {
        let tree = dijkstra(&'a', weighted_successors, |n| *n == 'a');
        assert_eq!(tree.goal_cost(), Some(0));
        assert_eq!(tree.path().unwrap(), vec!['a']);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn missing_goal_explores_everything() {
        let tree = dijkstra(&'a', weighted_successors, |n| *n == 'z');
        assert!(tree.goal().is_none());
        assert!(tree.path().is_none());
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.cost(&'e'), Some(6));
        assert_eq!(tree.cost(&'z'), None);
    }

    #[test]
    fn iteration_keeps_discovery_order() {
        let tree = dijkstra(&'a', weighted_successors, |_| false);
        let nodes = tree.iter().map(|(n, _, _)| *n).collect::<Vec<char>>();
        assert_eq!(nodes, vec!['a', 'b', 'c', 'd', 'e']);
        let (_, parent, cost) = tree.iter().nth(1).unwrap();
        assert_eq!(parent, Some(&'d'));
        assert_eq!(cost, 5);
    }
}
