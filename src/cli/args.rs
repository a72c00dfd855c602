//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::NodeId;

/// Block-based email template builder: edit element trees and export email HTML
#[derive(Parser, Debug)]
#[command(name = "mailcanvas")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Additional config file, layered over the global config
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Template directory (default: from config)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub templates_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty template
    New {
        /// Template id (letters, digits, '-' and '_')
        id: String,
        /// Overwrite an existing template
        #[arg(short, long)]
        force: bool,
    },

    /// List stored templates
    List,

    /// Show the element outline of a template
    Show {
        id: String,
        /// Print the stored JSON instead of the outline
        #[arg(long)]
        json: bool,
    },

    /// Export a template as email HTML
    Render {
        id: String,
        /// Write to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Check a stored template against the tree rules
    Validate { id: String },

    /// List the palette entries accepted by `add`
    Palette,

    /// Add a palette element
    Add {
        id: String,
        /// Palette entry, e.g. header, text, columns-3
        element: String,
        /// Container to insert into (default: root)
        #[arg(short, long)]
        parent: Option<NodeId>,
        /// Position among the parent's children (default: append)
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Move an element to a new parent and position
    Move {
        id: String,
        node: NodeId,
        /// Destination container (default: root)
        #[arg(short, long)]
        parent: Option<NodeId>,
        /// Position among the destination's children after removal
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },

    /// Remove an element and its subtree
    Remove { id: String, node: NodeId },

    /// Duplicate an element next to itself
    Duplicate { id: String, node: NodeId },

    /// Edit element content and style
    Set {
        id: String,
        node: NodeId,
        /// Header, text or button label
        #[arg(long)]
        text: Option<String>,
        /// Image source URL
        #[arg(long)]
        src: Option<String>,
        /// Image alt text
        #[arg(long)]
        alt: Option<String>,
        /// Button link URL
        #[arg(long)]
        url: Option<String>,
        /// Style property as key=value; an empty value removes the key
        #[arg(short, long = "style", value_name = "KEY=VALUE")]
        styles: Vec<String>,
    },

    /// Show effective configuration
    Config,

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
