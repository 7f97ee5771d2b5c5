//! Group/leaf hierarchy built from each test's ancestor titles
//!
//! Trees borrow the tests they are built from and are rebuilt for every
//! render; nothing here is cached.

use crate::config::Visibility;
use crate::{SuiteStatus, TestRecord, TestStatus};

/// A node in a suite's test tree
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode<'a> {
    Group(Group<'a>),
    Leaf(&'a TestRecord),
}

/// A named group of tests (a `describe` block)
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a> {
    pub name: &'a str,
    /// Children in first-insertion order
    pub children: Vec<TreeNode<'a>>,
    /// Aggregated from the children once the tree is complete
    pub status: SuiteStatus,
}

impl<'a> TreeNode<'a> {
    /// Aggregate status for groups, collapsed outcome for leaves
    pub fn status(&self) -> SuiteStatus {
        match self {
            TreeNode::Group(group) => group.status,
            TreeNode::Leaf(test) => test.status.outcome(),
        }
    }

    /// Number of leaves in this subtree
    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Group(group) => group.leaf_count(),
            TreeNode::Leaf(_) => 1,
        }
    }

    pub fn has_failure(&self) -> bool {
        match self {
            TreeNode::Group(group) => group.has_failure(),
            TreeNode::Leaf(test) => test.status == TestStatus::Failed,
        }
    }

    /// True if at least one leaf in this subtree passes the filter
    pub fn has_visible(&self, visibility: &Visibility) -> bool {
        match self {
            TreeNode::Group(group) => group.has_visible(visibility),
            TreeNode::Leaf(test) => visibility.allows(test.status),
        }
    }

    fn group_name(&self) -> Option<&'a str> {
        match self {
            TreeNode::Group(group) => Some(group.name),
            TreeNode::Leaf(_) => None,
        }
    }
}

impl<'a> Group<'a> {
    pub fn leaf_count(&self) -> usize {
        self.children.iter().map(TreeNode::leaf_count).sum()
    }

    pub fn has_failure(&self) -> bool {
        self.children.iter().any(TreeNode::has_failure)
    }

    pub fn has_visible(&self, visibility: &Visibility) -> bool {
        self.children.iter().any(|c| c.has_visible(visibility))
    }
}

/// Build the group/leaf forest for one suite's tests.
///
/// Groups are matched by name among the current level's children only, so
/// the same name at different depths yields distinct groups. Leaves are
/// never merged, even with identical titles.
pub fn build_tree<'a, I>(tests: I) -> Vec<TreeNode<'a>>
where
    I: IntoIterator<Item = &'a TestRecord>,
{
    let mut roots: Vec<TreeNode<'a>> = Vec::new();

    for test in tests {
        let mut level = &mut roots;
        for ancestor in &test.ancestor_titles {
            level = child_group(level, ancestor);
        }
        level.push(TreeNode::Leaf(test));
    }

    resolve_status(&mut roots);
    roots
}

/// Children of the group called `name` at this level, created on first use
fn child_group<'t, 'a>(level: &'t mut Vec<TreeNode<'a>>, name: &'a str) -> &'t mut Vec<TreeNode<'a>> {
    let index = match level.iter().position(|n| n.group_name() == Some(name)) {
        Some(index) => index,
        None => {
            level.push(TreeNode::Group(Group {
                name,
                children: Vec::new(),
                status: SuiteStatus::Passed,
            }));
            level.len() - 1
        }
    };
    match &mut level[index] {
        TreeNode::Group(group) => &mut group.children,
        TreeNode::Leaf(_) => unreachable!("index always points at a group"),
    }
}

/// Compute group statuses bottom-up
fn resolve_status(nodes: &mut [TreeNode<'_>]) {
    for node in nodes {
        if let TreeNode::Group(group) = node {
            resolve_status(&mut group.children);
            group.status = SuiteStatus::aggregate(group.children.iter().map(TreeNode::status));
        }
    }
}

/// Total leaves across a forest
pub fn count_leaves(nodes: &[TreeNode<'_>]) -> usize {
    nodes.iter().map(TreeNode::leaf_count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(title: &str, status: TestStatus, path: &[&str]) -> TestRecord {
        TestRecord::new(title, status).within(path)
    }

    fn group<'n, 'a>(node: &'n TreeNode<'a>) -> &'n Group<'a> {
        match node {
            TreeNode::Group(g) => g,
            TreeNode::Leaf(test) => panic!("expected group, got leaf {}", test.title),
        }
    }

    #[test]
    fn test_empty_path_goes_to_root() {
        let tests = vec![t("top", TestStatus::Passed, &[])];
        let tree = build_tree(&tests);
        assert_eq!(tree.len(), 1);
        assert!(matches!(tree[0], TreeNode::Leaf(l) if l.title == "top"));
    }

    #[test]
    fn test_shared_path_appends_to_existing_group() {
        let tests = vec![
            t("a", TestStatus::Passed, &["Auth", "login"]),
            t("b", TestStatus::Passed, &["Other"]),
            t("c", TestStatus::Passed, &["Auth", "login"]),
        ];
        let tree = build_tree(&tests);
        assert_eq!(tree.len(), 2);
        let auth = group(&tree[0]);
        assert_eq!(auth.name, "Auth");
        assert_eq!(auth.children.len(), 1);
        let login = group(&auth.children[0]);
        let titles: Vec<_> = login
            .children
            .iter()
            .map(|c| match c {
                TreeNode::Leaf(l) => l.title.as_str(),
                TreeNode::Group(_) => "",
            })
            .collect();
        assert_eq!(titles, vec!["a", "c"]);
        assert_eq!(group(&tree[1]).name, "Other");
    }

    #[test]
    fn test_same_name_at_different_depths_is_distinct() {
        let tests = vec![
            t("x", TestStatus::Passed, &["utils"]),
            t("y", TestStatus::Passed, &["api", "utils"]),
        ];
        let tree = build_tree(&tests);
        assert_eq!(tree.len(), 2);
        let api = group(&tree[1]);
        assert_eq!(group(&api.children[0]).name, "utils");
        assert_eq!(group(&tree[0]).leaf_count(), 1);
    }

    #[test]
    fn test_identical_leaf_titles_not_merged() {
        let tests = vec![
            t("same", TestStatus::Passed, &["G"]),
            t("same", TestStatus::Failed, &["G"]),
        ];
        let tree = build_tree(&tests);
        assert_eq!(count_leaves(&tree), 2);
        assert_eq!(group(&tree[0]).children.len(), 2);
    }

    #[test]
    fn test_status_aggregation() {
        let tests = vec![
            t("p", TestStatus::Passed, &["Mixed"]),
            t("deep", TestStatus::Failed, &["Mixed", "inner"]),
            t("s", TestStatus::Skipped, &["Idle"]),
            t("todo", TestStatus::Todo, &["Idle"]),
            t("p2", TestStatus::Passed, &["Fine"]),
            t("s2", TestStatus::Pending, &["Fine"]),
        ];
        let tree = build_tree(&tests);
        assert_eq!(tree[0].status(), SuiteStatus::Failed);
        assert!(tree[0].has_failure());
        assert_eq!(tree[1].status(), SuiteStatus::Pending);
        assert_eq!(tree[2].status(), SuiteStatus::Passed);
        assert!(!tree[2].has_failure());
    }

    #[test]
    fn test_visibility_predicate() {
        let tests = vec![
            t("p", TestStatus::Passed, &["OnlyPassed"]),
            t("f", TestStatus::Failed, &["HasFailure", "nested"]),
        ];
        let tree = build_tree(&tests);
        let hide_passed = Visibility {
            show_passed: false,
            ..Visibility::default()
        };
        assert!(!tree[0].has_visible(&hide_passed));
        assert!(tree[1].has_visible(&hide_passed));
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn arbitrary_status() -> impl Strategy<Value = TestStatus> {
        prop::sample::select(vec![
            TestStatus::Passed,
            TestStatus::Failed,
            TestStatus::Pending,
            TestStatus::Skipped,
            TestStatus::Todo,
            TestStatus::Disabled,
        ])
    }

    /// Tests with short paths drawn from a small name pool, so paths collide
    fn arbitrary_tests() -> impl Strategy<Value = Vec<TestRecord>> {
        let path = prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..4);
        prop::collection::vec((path, arbitrary_status()), 0..40).prop_map(|entries| {
            entries
                .into_iter()
                .enumerate()
                .map(|(i, (path, status))| TestRecord::new(format!("t{}", i), status).within(&path))
                .collect()
        })
    }

    fn any_leaf_failed(node: &TreeNode<'_>) -> bool {
        match node {
            TreeNode::Leaf(test) => test.status == TestStatus::Failed,
            TreeNode::Group(group) => group.children.iter().any(any_leaf_failed),
        }
    }

    fn check_groups(node: &TreeNode<'_>) -> Result<(), TestCaseError> {
        if let TreeNode::Group(group) = node {
            prop_assert!(!group.children.is_empty());
            prop_assert_eq!(group.status == SuiteStatus::Failed, any_leaf_failed(node));
            for child in &group.children {
                check_groups(child)?;
            }
        }
        Ok(())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn tree_preserves_leaf_count(tests in arbitrary_tests()) {
            let tree = build_tree(&tests);
            prop_assert_eq!(count_leaves(&tree), tests.len());
        }

        #[test]
        fn group_fails_iff_a_descendant_fails(tests in arbitrary_tests()) {
            let tree = build_tree(&tests);
            for node in &tree {
                check_groups(node)?;
            }
        }

        #[test]
        fn failure_is_independent_of_insertion_order(tests in arbitrary_tests()) {
            let mut reversed = tests.clone();
            reversed.reverse();
            let forward = build_tree(&tests);
            let backward = build_tree(&reversed);
            let failed = |nodes: &[TreeNode<'_>]| {
                let mut names: Vec<(String, bool)> = nodes
                    .iter()
                    .filter_map(|n| match n {
                        TreeNode::Group(g) => Some((g.name.to_string(), g.status == SuiteStatus::Failed)),
                        TreeNode::Leaf(_) => None,
                    })
                    .collect();
                names.sort();
                names
            };
            prop_assert_eq!(failed(&forward), failed(&backward));
        }
    }
}
