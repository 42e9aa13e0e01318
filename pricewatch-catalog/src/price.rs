//! Price index: a plain binary search tree keyed by numeric price.
//!
//! The tree is never rebalanced, so sorted insertion order degrades it to a
//! linked list of depth n. Every walk is iterative for that reason, including
//! drop.

use crate::record::SharedRecord;
use std::fmt;

type Link = Option<Box<Node>>;

struct Node {
    record: SharedRecord,
    left: Link,
    right: Link,
}

impl Node {
    fn price(&self) -> f64 {
        self.record.price_value()
    }
}

/// Unbalanced BST ordered by `price_value`; equal prices go right
#[derive(Default)]
pub struct PriceIndex {
    root: Link,
    len: usize,
}

impl PriceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = SharedRecord>,
    {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index
    }

    pub fn insert(&mut self, record: SharedRecord) {
        let price = record.price_value();
        let mut slot = &mut self.root;

        while let Some(node) = slot {
            slot = if price < node.price() {
                &mut node.left
            } else {
                &mut node.right
            };
        }

        *slot = Some(Box::new(Node {
            record,
            left: None,
            right: None,
        }));
        self.len += 1;
    }

    /// All records priced within `[min, max]`, ascending by price.
    ///
    /// Subtrees that cannot hold a match are skipped: the left side only when
    /// the node is above `min`, the right side only when the node is at most
    /// `max` (ties live on the right).
    pub fn range_query(&self, min: f64, max: f64) -> Vec<SharedRecord> {
        let mut out = Vec::new();
        if min > max {
            return out;
        }

        let mut stack: Vec<&Node> = Vec::new();
        let mut cursor = self.root.as_deref();

        loop {
            while let Some(node) = cursor {
                stack.push(node);
                cursor = if node.price() > min {
                    node.left.as_deref()
                } else {
                    None
                };
            }

            let Some(node) = stack.pop() else {
                break;
            };

            let price = node.price();
            if price >= min && price <= max {
                out.push(node.record.clone());
            }

            cursor = if price <= max {
                node.right.as_deref()
            } else {
                None
            };
        }

        out
    }

    /// Full in-order traversal
    pub fn sorted_by_price(&self) -> Vec<SharedRecord> {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Longest root-to-leaf path; 0 when empty
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&Node, usize)> = Vec::new();
        stack.extend(self.root.as_deref().map(|n| (n, 1)));

        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.left.as_deref().map(|n| (n, level + 1)));
            stack.extend(node.right.as_deref().map(|n| (n, level + 1)));
        }

        deepest
    }
}

impl Drop for PriceIndex {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl fmt::Debug for PriceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceIndex")
            .field("len", &self.len)
            .field("depth", &self.depth())
            .finish()
    }
}

/// Ascending-price iterator over a [`PriceIndex`]
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn push_left(&mut self, mut cursor: Option<&'a Node>) {
        while let Some(node) = cursor {
            self.stack.push(node);
            cursor = node.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a SharedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(&node.record)
    }
}
