//! Height-balanced ordered set
//!
//! An AVL tree with owned boxed children. Every node caches the height of
//! its subtree; after each insert or remove the path back to the root is
//! rebalanced so sibling heights never differ by more than one.

use std::cmp::Ordering;

type Link<T> = Option<Box<Node<T>>>;

#[derive(Debug)]
struct Node<T> {
    value: T,
    height: i32,
    left: Link<T>,
    right: Link<T>,
}

impl<T> Node<T> {
    fn leaf(value: T) -> Box<Self> {
        Box::new(Node {
            value,
            height: 1,
            left: None,
            right: None,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    /// Left height minus right height
    fn balance(&self) -> i32 {
        height(&self.left) - height(&self.right)
    }
}

fn height<T>(link: &Link<T>) -> i32 {
    link.as_ref().map_or(0, |node| node.height)
}

fn rotate_right<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    match node.left.take() {
        Some(mut pivot) => {
            node.left = pivot.right.take();
            node.update_height();
            pivot.right = Some(node);
            pivot.update_height();
            pivot
        }
        None => node,
    }
}

fn rotate_left<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    match node.right.take() {
        Some(mut pivot) => {
            node.right = pivot.left.take();
            node.update_height();
            pivot.left = Some(node);
            pivot.update_height();
            pivot
        }
        None => node,
    }
}

/// Restore the height invariant at `node`, whose children are balanced
///
/// The taller child decides the rotation: a single rotation when it leans
/// the same way as `node` (or not at all), a double rotation otherwise.
/// After an insert the taller child is the one that received the value;
/// after a remove it is the sibling of the side that shrank.
fn rebalance<T>(mut node: Box<Node<T>>) -> Box<Node<T>> {
    node.update_height();
    match node.balance() {
        2 => {
            if node.left.as_ref().is_some_and(|left| left.balance() < 0) {
                node.left = node.left.take().map(rotate_left);
            }
            rotate_right(node)
        }
        -2 => {
            if node.right.as_ref().is_some_and(|right| right.balance() > 0) {
                node.right = node.right.take().map(rotate_right);
            }
            rotate_left(node)
        }
        _ => node,
    }
}

fn insert_node<T: Ord>(link: Link<T>, value: T, inserted: &mut bool) -> Box<Node<T>> {
    let mut node = match link {
        Some(node) => node,
        None => {
            *inserted = true;
            return Node::leaf(value);
        }
    };
    match value.cmp(&node.value) {
        Ordering::Less => node.left = Some(insert_node(node.left.take(), value, inserted)),
        Ordering::Greater => node.right = Some(insert_node(node.right.take(), value, inserted)),
        Ordering::Equal => return node,
    }
    rebalance(node)
}

/// Detach the largest value of a subtree
fn take_max<T>(mut node: Box<Node<T>>) -> (Link<T>, T) {
    match node.right.take() {
        Some(right) => {
            let (rest, max) = take_max(right);
            node.right = rest;
            (Some(rebalance(node)), max)
        }
        None => {
            let Node { value, left, .. } = *node;
            (left, value)
        }
    }
}

fn remove_node<T: Ord>(link: Link<T>, value: &T, removed: &mut bool) -> Link<T> {
    let mut node = link?;
    match value.cmp(&node.value) {
        Ordering::Less => node.left = remove_node(node.left.take(), value, removed),
        Ordering::Greater => node.right = remove_node(node.right.take(), value, removed),
        Ordering::Equal => {
            *removed = true;
            match (node.left.take(), node.right.take()) {
                (None, None) => return None,
                (Some(child), None) | (None, Some(child)) => return Some(child),
                (Some(left), Some(right)) => {
                    // Replace with the in-order predecessor
                    let (rest, predecessor) = take_max(left);
                    node.value = predecessor;
                    node.left = rest;
                    node.right = Some(right);
                }
            }
        }
    }
    Some(rebalance(node))
}

/// Ordered set without duplicates, keyed by `Ord`
#[derive(Debug)]
pub struct AvlSet<T> {
    root: Link<T>,
    len: usize,
}

impl<T> Default for AvlSet<T> {
    fn default() -> Self {
        AvlSet { root: None, len: 0 }
    }
}

impl<T: Ord> AvlSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, value: &T) -> bool {
        let mut link = &self.root;
        while let Some(node) = link {
            link = match value.cmp(&node.value) {
                Ordering::Less => &node.left,
                Ordering::Greater => &node.right,
                Ordering::Equal => return true,
            };
        }
        false
    }

    /// Returns `false` if an equal value was already present
    pub fn insert(&mut self, value: T) -> bool {
        let mut inserted = false;
        self.root = Some(insert_node(self.root.take(), value, &mut inserted));
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Returns `false` if no equal value was present
    pub fn remove(&mut self, value: &T) -> bool {
        let mut removed = false;
        self.root = remove_node(self.root.take(), value, &mut removed);
        if removed {
            self.len -= 1;
        }
        removed
    }

    /// In-order traversal
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(&self.root);
        iter
    }
}

impl<T: Ord> FromIterator<T> for AvlSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = AvlSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    fn push_left(&mut self, mut link: &'a Link<T>) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.stack.pop()?;
        self.push_left(&node.right);
        Some(&node.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Verify cached heights and the balance invariant, returning the height
    fn check_node<T>(link: &Link<T>) -> i32 {
        match link {
            None => 0,
            Some(node) => {
                let left = check_node(&node.left);
                let right = check_node(&node.right);
                assert!((left - right).abs() <= 1, "unbalanced node");
                assert_eq!(node.height, 1 + left.max(right), "stale height");
                node.height
            }
        }
    }

    fn check<T: Ord + std::fmt::Debug>(set: &AvlSet<T>) {
        check_node(&set.root);
        let values: Vec<&T> = set.iter().collect();
        assert_eq!(values.len(), set.len());
        assert!(values.windows(2).all(|w| w[0] < w[1]), "not strictly increasing");
    }

    #[test]
    fn test_insert_ascending_stays_balanced() {
        let mut set = AvlSet::new();
        for i in 0..1000 {
            assert!(set.insert(i));
        }
        check(&set);
        assert!(height(&set.root) <= 14);
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut set = AvlSet::new();
        assert!(set.insert(5));
        assert!(!set.insert(5));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_contains() {
        let set: AvlSet<i32> = [8, 3, 10, 1, 6].into_iter().collect();
        assert!(set.contains(&6));
        assert!(!set.contains(&7));
        assert!(!AvlSet::<i32>::new().contains(&0));
    }

    #[test]
    fn test_remove_leaf_inner_and_root() {
        let mut set: AvlSet<i32> = (1..=7).collect();
        assert!(set.remove(&1));
        assert!(set.remove(&6));
        assert!(set.remove(&4));
        assert!(!set.remove(&4));
        check(&set);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![2, 3, 5, 7]);
    }

    #[test]
    fn test_remove_everything() {
        let mut set: AvlSet<i32> = (0..100).collect();
        for i in (0..100).rev().step_by(3).chain((0..100).step_by(3)) {
            set.remove(&i);
            check(&set);
        }
        for i in 0..100 {
            set.remove(&i);
        }
        assert!(set.is_empty());
        assert!(set.root.is_none());
    }

    #[test]
    fn test_iter_in_order() {
        let set: AvlSet<&str> = ["pear", "apple", "fig", "apple"].into_iter().collect();
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec!["apple", "fig", "pear"]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u8),
        Remove(u8),
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![any::<u8>().prop_map(Op::Insert), any::<u8>().prop_map(Op::Remove)]
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_after_any_sequence(ops in prop::collection::vec(arb_op(), 0..200)) {
            let mut set = AvlSet::new();
            let mut model = std::collections::BTreeSet::new();
            for op in ops {
                match op {
                    Op::Insert(v) => prop_assert_eq!(set.insert(v), model.insert(v)),
                    Op::Remove(v) => prop_assert_eq!(set.remove(&v), model.remove(&v)),
                }
            }
            check(&set);
            prop_assert!(set.iter().eq(model.iter()));
        }
    }
}
