//! Palette entries and the default node factory.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::{ButtonContent, Content, ImageContent, Node, NodeId, NodeKind, Style};

pub const MIN_COLUMNS: usize = 2;
pub const MAX_COLUMNS: usize = 3;

const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x200?text=Image";

/// An entry the user can drag from the element palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteItem {
    Header,
    Text,
    Image,
    Button,
    Divider,
    Spacer,
    Section,
    Columns(usize),
}

impl PaletteItem {
    pub const ALL: [PaletteItem; 9] = [
        PaletteItem::Header,
        PaletteItem::Text,
        PaletteItem::Image,
        PaletteItem::Button,
        PaletteItem::Divider,
        PaletteItem::Spacer,
        PaletteItem::Section,
        PaletteItem::Columns(2),
        PaletteItem::Columns(3),
    ];

    pub fn kind(&self) -> NodeKind {
        match self {
            PaletteItem::Header => NodeKind::Header,
            PaletteItem::Text => NodeKind::Text,
            PaletteItem::Image => NodeKind::Image,
            PaletteItem::Button => NodeKind::Button,
            PaletteItem::Divider => NodeKind::Divider,
            PaletteItem::Spacer => NodeKind::Spacer,
            PaletteItem::Section => NodeKind::Section,
            PaletteItem::Columns(_) => NodeKind::Columns,
        }
    }

    /// Create a fresh node with the default payload for this entry.
    pub fn instantiate(&self) -> DomainResult<Node> {
        match self {
            PaletteItem::Columns(slots) => create_columns(*slots),
            other => create_node(other.kind()),
        }
    }
}

impl fmt::Display for PaletteItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaletteItem::Columns(slots) => write!(f, "columns-{}", slots),
            other => f.write_str(other.kind().as_str()),
        }
    }
}

impl FromStr for PaletteItem {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if let Some(slots) = name.strip_prefix("columns-") {
            return match slots.parse::<usize>() {
                Ok(n) if (MIN_COLUMNS..=MAX_COLUMNS).contains(&n) => Ok(PaletteItem::Columns(n)),
                _ => Err(DomainError::UnsupportedKind(s.to_string())),
            };
        }
        match name.parse::<NodeKind>() {
            Ok(NodeKind::Header) => Ok(PaletteItem::Header),
            Ok(NodeKind::Text) => Ok(PaletteItem::Text),
            Ok(NodeKind::Image) => Ok(PaletteItem::Image),
            Ok(NodeKind::Button) => Ok(PaletteItem::Button),
            Ok(NodeKind::Divider) => Ok(PaletteItem::Divider),
            Ok(NodeKind::Spacer) => Ok(PaletteItem::Spacer),
            Ok(NodeKind::Section) => Ok(PaletteItem::Section),
            Ok(NodeKind::Columns) => Ok(PaletteItem::Columns(MIN_COLUMNS)),
            Ok(NodeKind::Column) | Err(_) => Err(DomainError::UnsupportedKind(s.to_string())),
        }
    }
}

fn style(pairs: &[(&str, &str)]) -> Style {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Create a fresh node of `kind` with default content and style.
///
/// `Columns` gets two slots; `Column` cannot be created on its own.
pub fn create_node(kind: NodeKind) -> DomainResult<Node> {
    let (content, style) = match kind {
        NodeKind::Header => (
            Content::Header("Heading".to_string()),
            style(&[
                ("font-size", "24px"),
                ("font-weight", "bold"),
                ("margin", "0"),
                ("padding", "8px 0"),
                ("text-align", "center"),
            ]),
        ),
        NodeKind::Text => (
            Content::Text("Start typing your content here.".to_string()),
            style(&[
                ("font-size", "16px"),
                ("line-height", "1.5"),
                ("margin", "0"),
                ("padding", "8px 0"),
            ]),
        ),
        NodeKind::Image => (
            Content::Image(ImageContent {
                src: PLACEHOLDER_IMAGE.to_string(),
                alt: "Image".to_string(),
            }),
            style(&[("display", "block"), ("height", "auto"), ("width", "100%")]),
        ),
        NodeKind::Button => (
            Content::Button(ButtonContent {
                text: "Click me".to_string(),
                url: "https://example.com".to_string(),
            }),
            style(&[
                ("background-color", "#2563eb"),
                ("border-radius", "4px"),
                ("color", "#ffffff"),
                ("display", "inline-block"),
                ("padding", "12px 24px"),
                ("text-decoration", "none"),
            ]),
        ),
        NodeKind::Divider => (
            Content::Divider,
            style(&[
                ("border", "none"),
                ("border-top", "1px solid #dddddd"),
                ("margin", "16px 0"),
            ]),
        ),
        NodeKind::Spacer => (Content::Spacer, style(&[("height", "24px")])),
        NodeKind::Section => (Content::Section(Vec::new()), style(&[("padding", "16px")])),
        NodeKind::Columns => return create_columns(MIN_COLUMNS),
        NodeKind::Column => return Err(DomainError::UnsupportedKind(kind.to_string())),
    };
    Ok(Node::new(NodeId::new(), content, style))
}

/// Create a columns layout with `slots` empty columns of equal width.
pub fn create_columns(slots: usize) -> DomainResult<Node> {
    if !(MIN_COLUMNS..=MAX_COLUMNS).contains(&slots) {
        return Err(DomainError::InvalidColumnCount(slots));
    }
    let width = match slots {
        2 => "50%",
        _ => "33.33%",
    };
    let columns = (0..slots)
        .map(|_| {
            Node::new(
                NodeId::new(),
                Content::Column(Vec::new()),
                style(&[("vertical-align", "top"), ("width", width)]),
            )
        })
        .collect();
    Ok(Node::new(
        NodeId::new(),
        Content::Columns(columns),
        style(&[("width", "100%")]),
    ))
}
