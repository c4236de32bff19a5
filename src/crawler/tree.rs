use std::ops::Index;

use serde::Serialize;

use super::page::Page;

/// Index of a node inside its [`CrawlTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// A fetched, valid page placed in the traversal tree
#[derive(Debug, Clone)]
pub struct CrawlNode {
    id: NodeId,
    page: Page,
    depth: usize,
    /// Back-reference for display only, the tree owns every node
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl CrawlNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn url(&self) -> &str {
        self.page.url()
    }

    /// The seed sits at depth 1
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in the order their links appeared
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena holding every node of one run, rooted at the seed
#[derive(Debug, Clone)]
pub struct CrawlTree {
    nodes: Vec<CrawlNode>,
    interrupted: bool,
}

impl CrawlTree {
    pub(crate) fn new(seed: Page) -> Self {
        Self {
            nodes: vec![CrawlNode {
                id: NodeId::ROOT,
                page: seed,
                depth: 1,
                parent: None,
                children: Vec::new(),
            }],
            interrupted: false,
        }
    }

    /// Attaches `page` under `parent` one level deeper and returns the new id
    pub(crate) fn add_child(&mut self, parent: NodeId, page: Page) -> NodeId {
        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes.push(CrawlNode {
            id,
            page,
            depth,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    /// True when the run was cancelled before exploring everything
    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn root(&self) -> &CrawlNode {
        &self.nodes[0]
    }

    pub fn get(&self, id: NodeId) -> Option<&CrawlNode> {
        self.nodes.get(id.0)
    }

    pub fn parent_of(&self, node: &CrawlNode) -> Option<&CrawlNode> {
        node.parent.and_then(|id| self.get(id))
    }

    pub fn children_of(&self, node: &CrawlNode) -> Vec<&CrawlNode> {
        node.children.iter().filter_map(|id| self.get(*id)).collect()
    }

    /// Looks a direct child up by its URL
    pub fn child(&self, node: &CrawlNode, url: &str) -> Option<&CrawlNode> {
        self.children_of(node).into_iter().find(|child| child.url() == url)
    }

    pub fn find(&self, url: &str) -> Option<&CrawlNode> {
        self.nodes.iter().find(|node| node.url() == url)
    }

    /// All nodes in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &CrawlNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(CrawlNode::depth).max().unwrap_or(0)
    }

    /// One line per node, indented two spaces per level: `url title`
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            out.push_str(&"  ".repeat(node.depth - 1));
            out.push_str(&format!("{} {}\n", node.url(), node.page.title()));
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn report(&self) -> TreeReport {
        self.report_node(self.root())
    }

    fn report_node(&self, node: &CrawlNode) -> TreeReport {
        TreeReport {
            url: node.url().to_string(),
            title: node.page.title(),
            depth: node.depth,
            files: node.page.files(),
            children: self
                .children_of(node)
                .into_iter()
                .map(|child| self.report_node(child))
                .collect(),
        }
    }
}

impl Index<NodeId> for CrawlTree {
    type Output = CrawlNode;

    fn index(&self, id: NodeId) -> &CrawlNode {
        &self.nodes[id.0]
    }
}

/// Owned, serializable snapshot of a subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeReport {
    pub url: String,
    pub title: String,
    pub depth: usize,
    pub files: Vec<String>,
    pub children: Vec<TreeReport>,
}
