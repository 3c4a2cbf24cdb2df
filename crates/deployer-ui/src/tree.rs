//! Collapsible decision tree

use crate::error::UiError;

/// One node; branches start expanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    label: String,
    expanded: bool,
    children: Vec<TreeNode>,
}

impl TreeNode {
    /// Node without children
    #[must_use]
    pub fn leaf(label: impl Into<String>) -> Self {
        Self::branch(label, Vec::new())
    }

    /// Node with children
    #[must_use]
    pub fn branch(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            expanded: true,
            children,
        }
    }

    /// Label text
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether children are shown
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Child nodes
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    fn render_into(&self, depth: usize, out: &mut String) {
        let marker = match (self.children.is_empty(), self.expanded) {
            (true, _) => "-",
            (false, true) => "v",
            (false, false) => ">",
        };
        out.push_str(&"  ".repeat(depth));
        out.push_str(marker);
        out.push(' ');
        out.push_str(&self.label);
        out.push('\n');
        if self.expanded {
            for child in &self.children {
                child.render_into(depth + 1, out);
            }
        }
    }
}

/// Forest of decision nodes addressed by index paths
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionTree {
    roots: Vec<TreeNode>,
}

impl DecisionTree {
    /// Tree with the given top-level nodes
    #[must_use]
    pub fn new(roots: Vec<TreeNode>) -> Self {
        Self { roots }
    }

    /// Top-level nodes
    #[must_use]
    pub fn roots(&self) -> &[TreeNode] {
        &self.roots
    }

    /// Node at `path`, e.g. `[0, 2]` is the third child of the first root
    #[must_use]
    pub fn node(&self, path: &[usize]) -> Option<&TreeNode> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.roots.get(*first)?, |node, &i| node.children.get(i))
    }

    /// Show or hide the subtree under `path`; returns whether it is now expanded
    ///
    /// # Errors
    /// - `UiError::NoSuchNode` if the path leads nowhere
    pub fn toggle(&mut self, path: &[usize]) -> Result<bool, UiError> {
        let missing = || UiError::NoSuchNode(path.to_vec());
        let (first, rest) = path.split_first().ok_or_else(missing)?;
        let mut node = self.roots.get_mut(*first).ok_or_else(missing)?;
        for &i in rest {
            node = node.children.get_mut(i).ok_or_else(missing)?;
        }
        node.expanded = !node.expanded;
        Ok(node.expanded)
    }

    /// Indented text, hiding children of collapsed nodes
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            root.render_into(0, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DecisionTree {
        DecisionTree::new(vec![TreeNode::branch(
            "Deploy a network",
            vec![
                TreeNode::branch(
                    "Simple",
                    vec![TreeNode::leaf("Pick a region"), TreeNode::leaf("Pick a VM size")],
                ),
                TreeNode::leaf("Expert"),
            ],
        )])
    }

    #[test]
    fn renders_expanded_by_default() {
        assert_eq!(
            sample().render(),
            "v Deploy a network\n  v Simple\n    - Pick a region\n    - Pick a VM size\n  - Expert\n"
        );
    }

    #[test]
    fn toggle_hides_subtree() {
        let mut tree = sample();
        assert_eq!(tree.toggle(&[0, 0]), Ok(false));
        assert_eq!(tree.render(), "v Deploy a network\n  > Simple\n  - Expert\n");
        assert_eq!(tree.toggle(&[0, 0]), Ok(true));
        assert_eq!(tree.node(&[0, 0, 1]).map(TreeNode::label), Some("Pick a VM size"));
    }

    #[test]
    fn bad_paths() {
        let mut tree = sample();
        assert_eq!(tree.toggle(&[]), Err(UiError::NoSuchNode(vec![])));
        assert_eq!(tree.toggle(&[0, 5]), Err(UiError::NoSuchNode(vec![0, 5])));
        assert!(tree.node(&[1]).is_none());
    }
}
