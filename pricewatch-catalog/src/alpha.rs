//! Alphabetical index: an AVL tree keyed by normalized title.
//!
//! Keys are unique. Inserting a record whose normalized title already exists
//! leaves the tree untouched; the first record stored under a key wins.
//! Substring search walks the whole tree since there is no substring index,
//! so it costs O(n) regardless of balance.

use crate::record::SharedRecord;
use pricewatch_shared::normalize;
use std::cmp::{max, Ordering};

type Link = Option<Box<Node>>;

#[derive(Debug, Clone)]
struct Node {
    record: SharedRecord,
    left: Link,
    right: Link,
    height: usize,
}

impl Node {
    fn leaf(record: SharedRecord) -> Box<Self> {
        Box::new(Self {
            record,
            left: None,
            right: None,
            height: 1,
        })
    }

    fn key(&self) -> &str {
        self.record.normalized_title()
    }

    fn update_height(&mut self) {
        self.height = 1 + max(height(&self.left), height(&self.right));
    }

    fn balance(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

fn height(link: &Link) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

fn rotate_right(mut y: Box<Node>) -> Box<Node> {
    let Some(mut x) = y.left.take() else {
        return y;
    };
    y.left = x.right.take();
    y.update_height();
    x.right = Some(y);
    x.update_height();
    x
}

fn rotate_left(mut x: Box<Node>) -> Box<Node> {
    let Some(mut y) = x.right.take() else {
        return x;
    };
    x.right = y.left.take();
    x.update_height();
    y.left = Some(x);
    y.update_height();
    y
}

/// Restore the AVL property at `node` after `key` was inserted below it
fn rebalance(mut node: Box<Node>, key: &str) -> Box<Node> {
    node.update_height();
    let balance = node.balance();

    if balance > 1 {
        let left_key_cmp = node.left.as_ref().map(|l| key.cmp(l.key()));
        if left_key_cmp == Some(Ordering::Greater) {
            // left-right
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }

    if balance < -1 {
        let right_key_cmp = node.right.as_ref().map(|r| key.cmp(r.key()));
        if right_key_cmp == Some(Ordering::Less) {
            // right-left
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

/// Returns the new subtree root and whether the record was stored
fn insert_into(link: Link, record: SharedRecord) -> (Box<Node>, bool) {
    let Some(mut node) = link else {
        return (Node::leaf(record), true);
    };

    let inserted = match record.normalized_title().cmp(node.key()) {
        Ordering::Less => {
            let (child, inserted) = insert_into(node.left.take(), record.clone());
            node.left = Some(child);
            inserted
        }
        Ordering::Greater => {
            let (child, inserted) = insert_into(node.right.take(), record.clone());
            node.right = Some(child);
            inserted
        }
        Ordering::Equal => return (node, false),
    };

    if !inserted {
        return (node, false);
    }

    (rebalance(node, record.normalized_title()), true)
}

/// AVL tree over normalized titles
#[derive(Debug, Clone, Default)]
pub struct AlphaIndex {
    root: Link,
    len: usize,
}

impl AlphaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build by inserting every record in order
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

    /// Insert a record; returns `false` when its normalized title is
    /// already present and the record was dropped.
    pub fn insert(&mut self, record: SharedRecord) -> bool {
        let (root, inserted) = insert_into(self.root.take(), record);
        self.root = Some(root);
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Exact match on the normalized form of `title`
    pub fn lookup_exact(&self, title: &str) -> Option<SharedRecord> {
        let key = normalize(title);
        let mut cursor = self.root.as_deref();

        while let Some(node) = cursor {
            cursor = match key.as_str().cmp(node.key()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node.record.clone()),
            };
        }

        None
    }

    /// Every record whose normalized title contains the normalized `term`,
    /// in ascending title order. An empty term matches everything.
    pub fn search_contains(&self, term: &str) -> Vec<SharedRecord> {
        let needle = normalize(term);
        self.inorder()
            .filter(|record| record.normalized_title().contains(needle.as_str()))
            .cloned()
            .collect()
    }

    /// Ascending traversal by normalized title
    pub fn inorder(&self) -> Inorder<'_> {
        Inorder::new(self.root.as_deref())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree; 0 when empty
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Check stored heights and the AVL balance condition at every node
    pub fn is_balanced(&self) -> bool {
        fn check(link: &Link) -> Option<usize> {
            let Some(node) = link else {
                return Some(0);
            };
            let left = check(&node.left)?;
            let right = check(&node.right)?;
            let actual = 1 + max(left, right);
            (left.abs_diff(right) <= 1 && node.height == actual).then_some(actual)
        }
        check(&self.root).is_some()
    }
}

/// In-order iterator over an [`AlphaIndex`]
pub struct Inorder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Inorder<'a> {
    fn new(root: Option<&'a Node>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left(root);
        iter
    }

    fn push_left(&mut self, mut cursor: Option<&'a Node>) {
        while let Some(node) = cursor {
            self.stack.push(node);
            cursor = node.left.as_deref();
        }
    }
}

impl<'a> Iterator for Inorder<'a> {
    type Item = &'a SharedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(&node.record)
    }
}
