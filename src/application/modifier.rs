//! Hides menu-only nodes outside breadcrumb renders.

use crate::domain::navigation::{NavigationNode, NavigationTree};

/// Marks every node carrying the `hidden` attribute as not visible, unless
/// the nodes are rendered as breadcrumbs.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityModifier;

impl VisibilityModifier {
    pub fn modify(&self, mut nodes: Vec<NavigationNode>, breadcrumb: bool) -> Vec<NavigationNode> {
        if !breadcrumb {
            hide(&mut nodes);
        }
        nodes
    }

    pub fn apply(&self, tree: &mut NavigationTree, breadcrumb: bool) {
        if !breadcrumb {
            hide(tree.nodes_mut());
        }
    }
}

fn hide(nodes: &mut [NavigationNode]) {
    for node in nodes.iter_mut().filter(|node| node.hidden) {
        node.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<NavigationNode> {
        vec![
            NavigationNode::new("blog-archive", "Archive", "/en/blog/").with_hidden(true),
            NavigationNode::new("blog-tags", "Tags", "/en/blog/"),
            NavigationNode::new("tag-1", "rust", "/en/blog/tag/rust/").with_parent("blog-tags"),
        ]
    }

    #[test]
    fn hidden_nodes_become_invisible_in_menus() {
        let modified = VisibilityModifier.modify(nodes(), false);
        let visible: Vec<bool> = modified.iter().map(|node| node.visible).collect();
        assert_eq!(visible, vec![false, true, true]);
    }

    #[test]
    fn breadcrumbs_are_left_untouched() {
        assert_eq!(VisibilityModifier.modify(nodes(), true), nodes());
    }

    #[test]
    fn applying_twice_changes_nothing_more() {
        let once = VisibilityModifier.modify(nodes(), false);
        let twice = VisibilityModifier.modify(once.clone(), false);
        assert_eq!(once, twice);

        let mut reversed = nodes();
        reversed.reverse();
        let mut modified = VisibilityModifier.modify(reversed, false);
        modified.reverse();
        assert_eq!(modified, once);
    }

    #[test]
    fn visibility_is_never_restored() {
        let mut already_hidden = nodes();
        already_hidden[1].visible = false;
        let modified = VisibilityModifier.modify(already_hidden, false);
        assert!(!modified[1].visible);
    }

    #[test]
    fn tree_application_matches_list_application() {
        let mut tree = NavigationTree::from_nodes(nodes()).expect("tree");
        VisibilityModifier.apply(&mut tree, false);
        assert_eq!(tree.nodes(), VisibilityModifier.modify(nodes(), false).as_slice());
    }
}
