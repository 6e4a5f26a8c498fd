//! Upstream and downstream traversal of a [StackView].

use super::StackView;
use std::collections::HashSet;

impl StackView {
    /// Returns the ancestors of `branch_name`, ordered from the root of the stack down to
    /// `branch_name`'s parent. `branch_name` itself is excluded.
    ///
    /// The view must have been resolved for `branch_name` (or one of its descendants), so the
    /// parent chain is known to be acyclic. The walk still stops at the first revisit.
    pub fn upstream_of(&self, branch_name: &str) -> Vec<String> {
        let mut upstream = Vec::new();
        let mut visited = HashSet::from([branch_name]);

        let mut current = branch_name;
        while let Some(parent) = self.get(current).and_then(|n| n.parent.as_deref()) {
            if !visited.insert(parent) {
                break;
            }
            upstream.push(parent.to_string());
            current = parent;
        }

        upstream.reverse();
        upstream
    }

    /// Returns the descendants of `branch_name` in depth-first pre-order: every branch appears
    /// after its parent, and siblings keep their insertion order. `branch_name` itself is
    /// excluded.
    pub fn downstream_of(&self, branch_name: &str) -> Vec<String> {
        let mut downstream = Vec::new();
        let mut visited = HashSet::from([branch_name]);

        let mut stack = self.linked_children(branch_name);
        stack.reverse();

        while let Some(branch) = stack.pop() {
            if !visited.insert(branch) {
                continue;
            }
            downstream.push(branch.to_string());
            stack.extend(self.linked_children(branch).into_iter().rev());
        }

        downstream
    }
}

#[cfg(test)]
mod test {
    use crate::{store::MemoryStore, tree::StackTree};

    /// ```text
    /// main
    /// ├─ a
    /// │  ├─ b
    /// │  │  └─ d
    /// │  └─ c
    /// └─ e
    /// ```
    fn fixture() -> MemoryStore {
        MemoryStore::with_tree(&[
            ("main", None),
            ("a", Some("main")),
            ("b", Some("a")),
            ("c", Some("a")),
            ("d", Some("b")),
            ("e", Some("main")),
        ])
    }

    #[test]
    fn upstream_is_root_first_and_excludes_branch() {
        let mut store = fixture();
        let tree = StackTree::new(&mut store);

        assert_eq!(tree.upstream_of("d").unwrap(), vec!["main", "a", "b"]);
        assert_eq!(tree.upstream_of("a").unwrap(), vec!["main"]);
        assert!(tree.upstream_of("main").unwrap().is_empty());
    }

    #[test]
    fn upstream_of_untracked_is_empty() {
        let mut store = fixture();
        let tree = StackTree::new(&mut store);

        assert!(tree.upstream_of("untracked").unwrap().is_empty());
    }

    #[test]
    fn upstream_stops_at_missing_parent() {
        let mut store = MemoryStore::with_tree(&[("b", Some("gone")), ("c", Some("b"))]);
        let tree = StackTree::new(&mut store);

        assert_eq!(tree.upstream_of("c").unwrap(), vec!["gone", "b"]);
    }

    #[test]
    fn downstream_is_pre_order() {
        let mut store = fixture();
        let tree = StackTree::new(&mut store);

        assert_eq!(
            tree.downstream_of("main").unwrap(),
            vec!["a", "b", "d", "c", "e"]
        );
        assert_eq!(tree.downstream_of("a").unwrap(), vec!["b", "d", "c"]);
        assert!(tree.downstream_of("d").unwrap().is_empty());
    }

    #[test]
    fn downstream_lists_each_descendant_once_after_its_parent() {
        let mut store = fixture();
        let tree = StackTree::new(&mut store);
        let view = tree.resolve("main").unwrap();

        let downstream = view.downstream_of("main");
        let position = |b: &str| downstream.iter().position(|d| d == b).unwrap();

        assert_eq!(downstream.len(), view.nodes.len() - 1);
        for branch in &downstream {
            let parent = view.get(branch).unwrap().parent.as_deref().unwrap();
            if parent != "main" {
                assert!(position(parent) < position(branch));
            }
        }
    }

    #[test]
    fn deep_stack_does_not_recurse() {
        let names = (0..10_000).map(|i| format!("b{}", i)).collect::<Vec<_>>();
        let mut edges = vec![(names[0].as_str(), None)];
        edges.extend(names.windows(2).map(|w| (w[1].as_str(), Some(w[0].as_str()))));
        let mut store = MemoryStore::with_tree(&edges);
        let tree = StackTree::new(&mut store);

        let view = tree.resolve("b9999").unwrap();
        assert_eq!(view.root, "b0");
        assert_eq!(view.downstream_of("b0").len(), 9_999);
        assert_eq!(view.upstream_of("b9999").len(), 9_999);
    }
}
