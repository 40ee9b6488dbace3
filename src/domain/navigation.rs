//! Navigation nodes and the flat, parent-linked trees menus are built from.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The kinds of blog menu a site can register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKind {
    Tags,
    Archive,
    Categories,
    Authors,
}

impl MenuKind {
    pub const ALL: [MenuKind; 4] = [
        MenuKind::Archive,
        MenuKind::Categories,
        MenuKind::Tags,
        MenuKind::Authors,
    ];

    /// Short configuration key (`tags`, `archive`, ...).
    pub fn key(self) -> &'static str {
        match self {
            MenuKind::Tags => "tags",
            MenuKind::Archive => "archive",
            MenuKind::Categories => "categories",
            MenuKind::Authors => "authors",
        }
    }

    /// Identifier of the root node every builder emits first.
    pub fn root_id(self) -> &'static str {
        match self {
            MenuKind::Tags => "blog-tags",
            MenuKind::Archive => "blog-archive",
            MenuKind::Categories => "blog-categories",
            MenuKind::Authors => "blog-authors",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MenuKind::Tags => "Blog Tags Menu",
            MenuKind::Archive => "Blog Archive Menu",
            MenuKind::Categories => "Blog Categories Menu",
            MenuKind::Authors => "Blog Authors Menu",
        }
    }

    /// Label of the root node.
    pub fn root_label(self) -> &'static str {
        match self {
            MenuKind::Tags => "Tags",
            MenuKind::Archive => "Archive",
            MenuKind::Categories => "Categories",
            MenuKind::Authors => "Authors",
        }
    }

    /// Class-style name used by older configuration (`BlogTagsMenu`).
    pub fn class_name(self) -> &'static str {
        match self {
            MenuKind::Tags => "BlogTagsMenu",
            MenuKind::Archive => "BlogArchiveMenu",
            MenuKind::Categories => "BlogCategoriesMenu",
            MenuKind::Authors => "BlogAuthorsMenu",
        }
    }
}

impl fmt::Display for MenuKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub label: String,
    pub link: String,
    /// Hidden nodes stay out of menus but still appear in breadcrumbs.
    pub hidden: bool,
    pub visible: bool,
}

impl NavigationNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            label: label.into(),
            link: link.into(),
            hidden: false,
            visible: true,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("navigation node `{id}` appears more than once")]
    DuplicateId { id: String },
    #[error("navigation node `{id}` references parent `{parent}` which is not defined before it")]
    UnknownParent { id: String, parent: String },
}

/// Nodes in traversal order; every parent precedes its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationTree {
    nodes: Vec<NavigationNode>,
    index: HashMap<String, usize>,
}

impl NavigationTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(
        nodes: impl IntoIterator<Item = NavigationNode>,
    ) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        for node in nodes {
            tree.push(node)?;
        }
        Ok(tree)
    }

    pub fn push(&mut self, node: NavigationNode) -> Result<(), TreeError> {
        if self.index.contains_key(&node.id) {
            return Err(TreeError::DuplicateId { id: node.id });
        }
        if let Some(parent) = node.parent_id.as_ref()
            && !self.index.contains_key(parent)
        {
            return Err(TreeError::UnknownParent {
                id: node.id.clone(),
                parent: parent.clone(),
            });
        }

        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn nodes(&self) -> &[NavigationNode] {
        &self.nodes
    }

    /// Mutable access for modifiers; ids and parents must not be changed through it.
    pub fn nodes_mut(&mut self) -> &mut [NavigationNode] {
        &mut self.nodes
    }

    pub fn into_nodes(self) -> Vec<NavigationNode> {
        self.nodes
    }

    pub fn get(&self, id: &str) -> Option<&NavigationNode> {
        self.index.get(id).map(|&position| &self.nodes[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = &NavigationNode> {
        self.nodes.iter().filter(|node| node.parent_id.is_none())
    }

    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a NavigationNode> + 'a {
        self.nodes
            .iter()
            .filter(move |node| node.parent_id.as_deref() == Some(id))
    }

    /// `(id, parent_id)` pairs in traversal order.
    pub fn edges(&self) -> Vec<(&str, Option<&str>)> {
        self.nodes
            .iter()
            .map(|node| (node.id.as_str(), node.parent_id.as_deref()))
            .collect()
    }

    /// Nested view of the tree for serialisation.
    pub fn to_nested(&self) -> Vec<NavItem> {
        let mut children: HashMap<&str, Vec<&NavigationNode>> = HashMap::new();
        for node in &self.nodes {
            if let Some(parent) = node.parent_id.as_deref() {
                children.entry(parent).or_default().push(node);
            }
        }

        self.roots()
            .map(|node| build_nav_item(node, &children))
            .collect()
    }
}

/// Navigation node with its children inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub id: String,
    pub label: String,
    pub link: String,
    pub hidden: bool,
    pub visible: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

fn build_nav_item(node: &NavigationNode, children: &HashMap<&str, Vec<&NavigationNode>>) -> NavItem {
    let nested = children
        .get(node.id.as_str())
        .map(|kids| {
            kids.iter()
                .map(|child| build_nav_item(child, children))
                .collect()
        })
        .unwrap_or_default();

    NavItem {
        id: node.id.clone(),
        label: node.label.clone(),
        link: node.link.clone(),
        hidden: node.hidden,
        visible: node.visible,
        children: nested,
    }
}
