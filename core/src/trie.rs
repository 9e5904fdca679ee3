/// Prefix trie over `%chardef` keys.
use std::collections::HashMap;

use crate::table::ChardefMap;

/// A prefix tree mapping key sequences to candidate lists.
///
/// Used for prefix questions the flat `%chardef` map cannot answer cheaply:
/// whether a composition can still grow, and which longer keys share it as
/// a prefix.
///
/// # Example
/// ```
/// use libcin_core::trie::TrieNode;
///
/// let mut trie = TrieNode::new();
/// trie.insert("LN", vec!["來".to_string()]);
/// trie.insert("LNX", vec!["襄".to_string()]);
///
/// let node = trie.find("LN").unwrap();
/// assert_eq!(node.data(), Some(&["來".to_string()][..]));
/// assert!(!node.is_leaf());
/// assert!(trie.find("LNX").unwrap().is_leaf());
/// ```
#[derive(Debug, Default)]
pub struct TrieNode {
    children: HashMap<char, Box<TrieNode>>,
    /// Candidates when a key ends at this node.
    data: Option<Vec<String>>,
}

impl TrieNode {
    /// Create a new empty trie root.
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            data: None,
        }
    }

    /// Build a trie holding every `%chardef` entry.
    pub fn from_chardef(chardef: &ChardefMap) -> Self {
        let mut root = Self::new();
        for (key, candidates) in chardef.iter() {
            root.insert(key, candidates.to_vec());
        }
        root
    }

    /// Insert (or replace) the candidates stored under `key`.
    pub fn insert(&mut self, key: &str, candidates: Vec<String>) {
        let mut node = self;
        for ch in key.chars() {
            node = node
                .children
                .entry(ch)
                .or_insert_with(|| Box::new(TrieNode::new()));
        }
        node.data = Some(candidates);
    }

    /// Node reached by walking `key`, if any key has it as a prefix.
    pub fn find(&self, key: &str) -> Option<&TrieNode> {
        let mut node = self;
        for ch in key.chars() {
            node = node.children.get(&ch)?;
        }
        Some(node)
    }

    /// Check whether `key` is stored exactly (not only as a prefix).
    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).map(|n| n.data.is_some()).unwrap_or(false)
    }

    /// No longer key continues from here.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn data(&self) -> Option<&[String]> {
        self.data.as_deref()
    }

    /// Every key stored strictly below this node, as `(suffix, candidates)`
    /// sorted by suffix.
    pub fn descendants(&self) -> Vec<(String, &[String])> {
        let mut out = Vec::new();
        let mut stack: Vec<(String, &TrieNode)> = vec![(String::new(), self)];
        while let Some((prefix, node)) = stack.pop() {
            if !prefix.is_empty() {
                if let Some(data) = node.data.as_deref() {
                    out.push((prefix.clone(), data));
                }
            }
            for (ch, child) in &node.children {
                let mut key = prefix.clone();
                key.push(*ch);
                stack.push((key, child.as_ref()));
            }
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
