//! Segment prefix tree
//!
//! Candidates that survive the directory walk are inserted here, then
//! the query is walked against the tree one segment at a time to
//! decide, per position, between an exact literal child and a lone
//! wildcard branch.

use std::collections::BTreeMap;

/// One node of the segment tree. `terminal` marks that a candidate's
/// final segment ends here.
#[derive(Debug, Default)]
pub(crate) struct SegmentTree {
    children: BTreeMap<String, SegmentTree>,
    terminal: bool,
}

impl SegmentTree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, segments: &[String]) {
        let mut node = self;
        for seg in segments {
            node = node.children.entry(seg.clone()).or_default();
        }
        node.terminal = true;
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// The exact-literal child for a query segment, if present.
    pub(crate) fn literal_child(&self, segment: &str) -> Option<&SegmentTree> {
        self.children.get(segment)
    }

    /// The single remaining (wildcard) branch at this node, or an
    /// error listing the competing siblings when there is more than
    /// one. `None` means the node has no children at all.
    pub(crate) fn sole_child(&self) -> Result<Option<(&str, &SegmentTree)>, Vec<String>> {
        match self.children.len() {
            0 => Ok(None),
            1 => {
                let (seg, child) = self.children.iter().next().expect("len checked");
                Ok(Some((seg.as_str(), child)))
            }
            _ => Err(self.children.keys().cloned().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn insert_and_walk() {
        let mut tree = SegmentTree::new();
        tree.insert(&segs(&["shop", "{id}"]));
        tree.insert(&segs(&["shop", "cart"]));

        let shop = tree.literal_child("shop").unwrap();
        assert!(!shop.is_terminal());
        assert!(shop.literal_child("cart").unwrap().is_terminal());
        // Two children: not a sole branch.
        assert!(shop.sole_child().is_err());
    }

    #[test]
    fn sole_child_reports_siblings() {
        let mut tree = SegmentTree::new();
        tree.insert(&segs(&["{a}"]));
        tree.insert(&segs(&["{b}"]));

        let siblings = tree.sole_child().unwrap_err();
        assert_eq!(siblings, vec!["{a}".to_string(), "{b}".to_string()]);
    }

    #[test]
    fn terminal_with_index_child() {
        // `shop.<ext>` and `shop/index.<ext>` both present.
        let mut tree = SegmentTree::new();
        tree.insert(&segs(&["shop"]));
        tree.insert(&segs(&["shop", "index"]));

        let shop = tree.literal_child("shop").unwrap();
        assert!(shop.is_terminal());
        assert!(shop.literal_child("index").unwrap().is_terminal());
    }
}
