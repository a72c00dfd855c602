//! Node model: the typed content elements of an email template.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Globally unique, never reused node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// The closed set of element kinds this build understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Header,
    Text,
    Image,
    Button,
    Divider,
    Spacer,
    Section,
    Columns,
    /// Slot of a `Columns` layout; never placed directly.
    Column,
}

impl NodeKind {
    pub const ALL: [NodeKind; 9] = [
        NodeKind::Header,
        NodeKind::Text,
        NodeKind::Image,
        NodeKind::Button,
        NodeKind::Divider,
        NodeKind::Spacer,
        NodeKind::Section,
        NodeKind::Columns,
        NodeKind::Column,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Header => "header",
            NodeKind::Text => "text",
            NodeKind::Image => "image",
            NodeKind::Button => "button",
            NodeKind::Divider => "divider",
            NodeKind::Spacer => "spacer",
            NodeKind::Section => "section",
            NodeKind::Columns => "columns",
            NodeKind::Column => "column",
        }
    }

    /// Kinds that own an ordered, resizable child list and accept drops.
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Section | NodeKind::Column)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnsupportedKind(s.to_string()))
    }
}

/// Inline style declarations, property name to value.
///
/// Sorted key order keeps serialized output stable.
pub type Style = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageContent {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonContent {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: String,
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Header(String),
    Text(String),
    Image(ImageContent),
    Button(ButtonContent),
    Divider,
    Spacer,
    Section(Vec<Node>),
    /// Fixed-arity list of `Column` nodes.
    Columns(Vec<Node>),
    Column(Vec<Node>),
    /// A kind unknown to this build, kept verbatim from a loaded template.
    Unsupported {
        kind: String,
        content: Value,
        children: Vec<Node>,
    },
}

/// One element of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NodeRecord", into = "NodeRecord")]
pub struct Node {
    id: NodeId,
    content: Content,
    style: Style,
}

impl Node {
    pub fn new(id: NodeId, content: Content, style: Style) -> Self {
        Self { id, content, style }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Known kind of this node, `None` for unsupported kinds.
    pub fn kind(&self) -> Option<NodeKind> {
        match &self.content {
            Content::Header(_) => Some(NodeKind::Header),
            Content::Text(_) => Some(NodeKind::Text),
            Content::Image(_) => Some(NodeKind::Image),
            Content::Button(_) => Some(NodeKind::Button),
            Content::Divider => Some(NodeKind::Divider),
            Content::Spacer => Some(NodeKind::Spacer),
            Content::Section(_) => Some(NodeKind::Section),
            Content::Columns(_) => Some(NodeKind::Columns),
            Content::Column(_) => Some(NodeKind::Column),
            Content::Unsupported { .. } => None,
        }
    }

    pub fn kind_name(&self) -> &str {
        match &self.content {
            Content::Unsupported { kind, .. } => kind,
            _ => self.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    /// Whether this node owns a resizable child list and accepts drops.
    pub fn accepts_children(&self) -> bool {
        self.kind().is_some_and(|k| k.is_container())
    }

    pub fn is_column(&self) -> bool {
        matches!(self.content, Content::Column(_))
    }

    /// All direct children, including the fixed slots of a columns layout.
    pub fn children(&self) -> &[Node] {
        match &self.content {
            Content::Section(children) | Content::Column(children) | Content::Columns(children) => {
                children
            }
            Content::Unsupported { children, .. } => children,
            _ => &[],
        }
    }

    /// Mutable view of all direct children. A slice, so arity cannot change.
    pub(crate) fn children_slice_mut(&mut self) -> &mut [Node] {
        match &mut self.content {
            Content::Section(children) | Content::Column(children) | Content::Columns(children) => {
                children
            }
            Content::Unsupported { children, .. } => children,
            _ => &mut [],
        }
    }

    /// Resizable child list of a drop-accepting container.
    pub(crate) fn container_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.content {
            Content::Section(children) | Content::Column(children) => Some(children),
            _ => None,
        }
    }

    /// True if `id` is this node or one of its descendants.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.id == *id || self.children().iter().any(|child| child.contains(id))
    }

    /// Ids of this node and its subtree in document order.
    pub fn subtree_ids(&self) -> Vec<NodeId> {
        let mut ids = vec![self.id];
        for child in self.children() {
            ids.extend(child.subtree_ids());
        }
        ids
    }

    /// Deep copy of the subtree with fresh ids throughout.
    pub fn fresh_copy(&self) -> Node {
        let mut copy = self.clone();
        copy.reassign_ids();
        copy
    }

    fn reassign_ids(&mut self) {
        self.id = NodeId::new();
        for child in self.children_slice_mut() {
            child.reassign_ids();
        }
    }

    /// Shallow-merge a properties-panel edit into this node.
    pub fn apply_patch(&mut self, patch: &NodePatch) {
        let edit = &patch.content;
        match &mut self.content {
            Content::Header(text) | Content::Text(text) => {
                if let Some(value) = &edit.text {
                    *text = value.clone();
                }
            }
            Content::Image(image) => {
                if let Some(src) = &edit.src {
                    image.src = src.clone();
                }
                if let Some(alt) = &edit.alt {
                    image.alt = alt.clone();
                }
            }
            Content::Button(button) => {
                if let Some(text) = &edit.text {
                    button.text = text.clone();
                }
                if let Some(url) = &edit.url {
                    button.url = url.clone();
                }
            }
            _ => {}
        }
        for (key, value) in &patch.style {
            if value.is_empty() {
                self.style.remove(key);
            } else {
                self.style.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Content fields a properties panel may change. Fields that do not apply
/// to the target kind are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentPatch {
    pub text: Option<String>,
    pub src: Option<String>,
    pub alt: Option<String>,
    pub url: Option<String>,
}

/// Edit issued by the properties panel. An empty style value removes the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePatch {
    pub content: ContentPatch,
    pub style: BTreeMap<String, String>,
}

impl NodePatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: ContentPatch {
                text: Some(text.into()),
                ..ContentPatch::default()
            },
            ..Self::default()
        }
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content == ContentPatch::default() && self.style.is_empty()
    }
}

/// Persisted shape of a node: `{id, kind, content, style, children?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeRecord {
    id: NodeId,
    kind: String,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    style: Style,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<Node>>,
}

impl TryFrom<NodeRecord> for Node {
    type Error = DomainError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        let NodeRecord {
            id,
            kind,
            content,
            style,
            children,
        } = record;
        let children = children.unwrap_or_default();

        let content = match kind.parse::<NodeKind>() {
            Ok(NodeKind::Section) => Content::Section(children),
            Ok(NodeKind::Columns) => Content::Columns(children),
            Ok(NodeKind::Column) => Content::Column(children),
            Ok(leaf) => {
                if !children.is_empty() {
                    return Err(DomainError::InvalidContent {
                        kind,
                        message: "leaf elements cannot have children".to_string(),
                    });
                }
                match leaf {
                    NodeKind::Header => Content::Header(scalar_text(&kind, content)?),
                    NodeKind::Text => Content::Text(scalar_text(&kind, content)?),
                    NodeKind::Image => Content::Image(payload(&kind, content)?),
                    NodeKind::Button => Content::Button(payload(&kind, content)?),
                    NodeKind::Divider => Content::Divider,
                    _ => Content::Spacer,
                }
            }
            Err(_) => Content::Unsupported {
                kind,
                content,
                children,
            },
        };

        Ok(Node { id, content, style })
    }
}

fn scalar_text(kind: &str, value: Value) -> Result<String, DomainError> {
    match value {
        Value::String(text) => Ok(text),
        Value::Null => Ok(String::new()),
        other => Err(DomainError::InvalidContent {
            kind: kind.to_string(),
            message: format!("expected text, got {}", other),
        }),
    }
}

fn payload<T: DeserializeOwned + Default>(kind: &str, value: Value) -> Result<T, DomainError> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| DomainError::InvalidContent {
        kind: kind.to_string(),
        message: e.to_string(),
    })
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        let kind = node.kind_name().to_string();
        let (content, children) = match node.content {
            Content::Header(text) | Content::Text(text) => (Value::String(text), None),
            Content::Image(image) => (json!({ "src": image.src, "alt": image.alt }), None),
            Content::Button(button) => (json!({ "text": button.text, "url": button.url }), None),
            Content::Divider | Content::Spacer => (Value::Null, None),
            Content::Section(children) | Content::Columns(children) | Content::Column(children) => {
                (Value::Null, Some(children))
            }
            Content::Unsupported {
                content, children, ..
            } => (content, (!children.is_empty()).then_some(children)),
        };
        NodeRecord {
            id: node.id,
            kind,
            content,
            style: node.style,
            children,
        }
    }
}
