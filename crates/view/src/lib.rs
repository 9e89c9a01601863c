//! view — pure rendering of [`ViewState`] into a host-agnostic display tree.
//!
//! Nothing here performs I/O. Hosts decide how a [`DisplayNode`] reaches a
//! screen; [`render_to_text`] and [`render_to_json`] cover terminals and
//! anything that wants structured output.

use serde::{Deserialize, Serialize};
use shared::domain::ViewState;

pub const LOADING_TITLE: &str = "Astronomy Picture of the Day";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Container,
    ScrollContainer,
    Title,
    ActivityIndicator,
    Image,
    Body,
    ErrorPanel,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::ScrollContainer => "scroll_container",
            Self::Title => "title",
            Self::ActivityIndicator => "activity_indicator",
            Self::Image => "image",
            Self::Body => "body",
            Self::ErrorPanel => "error_panel",
        }
    }
}

/// A single node in the display tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNode {
    pub kind: NodeKind,

    /// Text content for labels, bodies and panels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Media locator for image nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn leaf(kind: NodeKind) -> Self {
        Self {
            kind,
            text: None,
            source: None,
            children: Vec::new(),
        }
    }

    pub fn text(kind: NodeKind, content: &str) -> Self {
        Self {
            text: Some(content.to_string()),
            ..Self::leaf(kind)
        }
    }

    pub fn image(source: &str) -> Self {
        Self {
            source: Some(source.to_string()),
            ..Self::leaf(NodeKind::Image)
        }
    }

    pub fn container(kind: NodeKind, children: Vec<DisplayNode>) -> Self {
        Self {
            children,
            ..Self::leaf(kind)
        }
    }

    /// Depth-first search for the first node of `kind`, including `self`.
    pub fn find(&self, kind: NodeKind) -> Option<&DisplayNode> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(kind))
    }
}

/// Builds the display tree for a view state.
pub fn render(state: &ViewState) -> DisplayNode {
    match state {
        ViewState::Loading => DisplayNode::container(
            NodeKind::Container,
            vec![
                DisplayNode::text(NodeKind::Title, LOADING_TITLE),
                DisplayNode::leaf(NodeKind::ActivityIndicator),
            ],
        ),
        ViewState::Error { message } => DisplayNode::text(NodeKind::ErrorPanel, message),
        ViewState::Loaded {
            media_url,
            title,
            explanation,
        } => DisplayNode::container(
            NodeKind::ScrollContainer,
            vec![
                DisplayNode::image(media_url),
                DisplayNode::text(NodeKind::Title, title),
                DisplayNode::text(NodeKind::Body, explanation),
            ],
        ),
    }
}

/// Render a tree as indented text, one node per line, two spaces per level.
pub fn render_to_text(node: &DisplayNode) -> String {
    let mut buf = String::with_capacity(256);
    write_node(node, 0, &mut buf);
    buf
}

pub fn render_to_json(node: &DisplayNode) -> serde_json::Result<String> {
    serde_json::to_string_pretty(node)
}

fn write_node(node: &DisplayNode, depth: usize, buf: &mut String) {
    for _ in 0..depth {
        buf.push_str("  ");
    }
    buf.push_str(node.kind.as_str());
    if let Some(source) = &node.source {
        buf.push_str(" src=");
        buf.push_str(source);
    }
    if let Some(text) = &node.text {
        buf.push_str(": ");
        // Keep one node per line even when the service text is multi-line.
        buf.push_str(&text.replace('\n', " "));
    }
    buf.push('\n');
    for child in &node.children {
        write_node(child, depth + 1, buf);
    }
}
