//! Command dispatch and handlers
//!
//! Every editing command is one session: load the template from the store,
//! run the edit through an `EditorService`, save when something changed.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::EditorService;
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{
    ContentPatch, DomainError, NodeId, NodePatch, PaletteItem, Template, TreeDisplay,
};
use crate::infrastructure::{InfraError, ServiceContainer};

/// Execute the CLI command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let container = create_container(cli)?;

    match &cli.command {
        Some(Commands::New { id, force }) => cmd_new(&container, id, *force),
        Some(Commands::List) => cmd_list(&container),
        Some(Commands::Show { id, json }) => cmd_show(&container, id, *json),
        Some(Commands::Render { id, output }) => cmd_render(&container, id, output.as_deref()),
        Some(Commands::Validate { id }) => cmd_validate(&container, id),
        Some(Commands::Palette) => cmd_palette(),
        Some(Commands::Add {
            id,
            element,
            parent,
            index,
        }) => cmd_add(&container, id, element, parent.as_ref(), *index),
        Some(Commands::Move {
            id,
            node,
            parent,
            index,
        }) => cmd_move(&container, id, node, parent.as_ref(), *index),
        Some(Commands::Remove { id, node }) => cmd_remove(&container, id, node),
        Some(Commands::Duplicate { id, node }) => cmd_duplicate(&container, id, node),
        Some(Commands::Set {
            id,
            node,
            text,
            src,
            alt,
            url,
            styles,
        }) => {
            let patch = build_patch(text, src, alt, url, styles)?;
            cmd_set(&container, id, node, &patch)
        }
        Some(Commands::Config) => cmd_config(&container),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "mailcanvas", &mut io::stdout());
            Ok(())
        }
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()
                .map_err(|e| InfraError::io("print help", e))?;
            Ok(())
        }
    }
}

fn create_container(cli: &Cli) -> CliResult<ServiceContainer> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.templates_dir {
        settings.templates_dir = dir.clone();
    }
    debug!("templates_dir: {}", settings.templates_dir.display());
    Ok(ServiceContainer::new(settings))
}

// ============================================================
// Template commands
// ============================================================

#[instrument(level = "debug", skip(container))]
fn cmd_new(container: &ServiceContainer, id: &str, force: bool) -> CliResult<()> {
    if container.store.exists(id) && !force {
        return Err(InfraError::TemplateExists(id.to_string()).into());
    }
    container.store.save(id, &Template::new())?;
    output::success(&format!("Created template {}", id));
    Ok(())
}

fn cmd_list(container: &ServiceContainer) -> CliResult<()> {
    let ids = container.store.list()?;
    if ids.is_empty() {
        output::info(&format!(
            "No templates in {}",
            container.settings.templates_dir.display()
        ));
        return Ok(());
    }
    output::header(&format!("Templates ({}):", ids.len()));
    for id in ids {
        output::detail(&id);
    }
    Ok(())
}

fn cmd_show(container: &ServiceContainer, id: &str, json: bool) -> CliResult<()> {
    let template = container.store.load(id)?;
    if json {
        output::info(&template.to_json_pretty()?);
    } else {
        output::info(&template.to_tree_string());
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_render(container: &ServiceContainer, id: &str, target: Option<&Path>) -> CliResult<()> {
    let mut editor = container.editor();
    editor.load_template(container.store.load(id)?);
    let html = editor.export_html(&container.renderer);
    match target {
        Some(path) => {
            container
                .fs
                .ensure_parent(path)
                .and_then(|_| container.fs.write(path, &html))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Wrote", &path.display());
        }
        None => output::info(&html),
    }
    Ok(())
}

fn cmd_validate(container: &ServiceContainer, id: &str) -> CliResult<()> {
    let template = container.store.load(id)?;
    template.validate()?;
    let unsupported: Vec<_> = template
        .iter()
        .filter(|visit| visit.node.kind().is_none())
        .map(|visit| format!("{} [{}]", visit.node.kind_name(), visit.node.id()))
        .collect();
    for label in &unsupported {
        output::warning(&format!("unsupported element kept as placeholder: {}", label));
    }
    output::success(&format!(
        "{} is valid ({} nodes, {} unsupported)",
        id,
        template.node_count(),
        unsupported.len()
    ));
    Ok(())
}

fn cmd_palette() -> CliResult<()> {
    output::header("Palette:");
    for item in PaletteItem::ALL {
        output::detail(&item);
    }
    Ok(())
}

// ============================================================
// Editing commands
// ============================================================

/// Run one edit against a stored template. The edit returns a message when
/// it changed the document and `None` for a no-op, which is not saved.
fn edit_template<F>(container: &ServiceContainer, id: &str, edit: F) -> CliResult<()>
where
    F: FnOnce(&mut EditorService) -> CliResult<Option<String>>,
{
    let mut editor = container.editor();
    editor.load_template(container.store.load(id)?);
    match edit(&mut editor)? {
        Some(message) => {
            container.store.save(id, editor.template())?;
            output::success(&message);
        }
        None => output::warning(&format!("{} unchanged", id)),
    }
    Ok(())
}

fn cmd_add(
    container: &ServiceContainer,
    id: &str,
    element: &str,
    parent: Option<&NodeId>,
    index: Option<usize>,
) -> CliResult<()> {
    edit_template(container, id, |editor| {
        let index = index.unwrap_or(usize::MAX);
        let node = editor.add_element_named(element, parent, index)?;
        Ok(Some(format!("Added {} {}", element, node)))
    })
}

fn cmd_move(
    container: &ServiceContainer,
    id: &str,
    node: &NodeId,
    parent: Option<&NodeId>,
    index: usize,
) -> CliResult<()> {
    edit_template(container, id, |editor| {
        let moved = editor.move_element(node, parent, index)?;
        Ok(moved.then(|| format!("Moved {}", node)))
    })
}

fn cmd_remove(container: &ServiceContainer, id: &str, node: &NodeId) -> CliResult<()> {
    edit_template(container, id, |editor| {
        if !editor.template().contains(node) {
            return Err(DomainError::NotFound(*node).into());
        }
        Ok(editor
            .delete_element(node)
            .then(|| format!("Removed {}", node)))
    })
}

fn cmd_duplicate(container: &ServiceContainer, id: &str, node: &NodeId) -> CliResult<()> {
    edit_template(container, id, |editor| match editor.duplicate_element(node)? {
        Some(copy) => Ok(Some(format!("Duplicated {} as {}", node, copy))),
        None => Err(DomainError::NotFound(*node).into()),
    })
}

fn cmd_set(
    container: &ServiceContainer,
    id: &str,
    node: &NodeId,
    patch: &NodePatch,
) -> CliResult<()> {
    if patch.is_empty() {
        return Err(CliError::Usage(
            "nothing to set: pass --text, --src, --alt, --url or --style".to_string(),
        ));
    }
    edit_template(container, id, |editor| {
        if !editor.template().contains(node) {
            return Err(DomainError::NotFound(*node).into());
        }
        Ok(editor
            .update_element(node, patch)
            .then(|| format!("Updated {}", node)))
    })
}

fn build_patch(
    text: &Option<String>,
    src: &Option<String>,
    alt: &Option<String>,
    url: &Option<String>,
    styles: &[String],
) -> CliResult<NodePatch> {
    let style = styles
        .iter()
        .map(|entry| parse_style(entry))
        .collect::<CliResult<_>>()?;
    Ok(NodePatch {
        content: ContentPatch {
            text: text.clone(),
            src: src.clone(),
            alt: alt.clone(),
            url: url.clone(),
        },
        style,
    })
}

/// `key=value`; the value may be empty.
fn parse_style(entry: &str) -> CliResult<(String, String)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(CliError::InvalidArgs(format!(
            "style must be KEY=VALUE, got '{}'",
            entry
        ))),
    }
}

// ============================================================
// Config
// ============================================================

fn cmd_config(container: &ServiceContainer) -> CliResult<()> {
    output::header("Config file:");
    match global_config_path() {
        Some(path) if path.exists() => output::detail(&path.display()),
        Some(path) => output::detail(&format!("{} (not present)", path.display())),
        None => output::detail(&"(no config directory)"),
    }
    output::header("Effective settings:");
    output::info(&container.settings.to_toml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("color=red", ("color", "red"))]
    #[case("padding = 4px 8px", ("padding", "4px 8px"))]
    #[case("color=", ("color", ""))]
    fn test_parse_style(#[case] entry: &str, #[case] expected: (&str, &str)) {
        let (key, value) = parse_style(entry).unwrap();
        assert_eq!((key.as_str(), value.as_str()), expected);
    }

    #[rstest]
    #[case("color")]
    #[case("=red")]
    fn test_parse_style_rejects_missing_key(#[case] entry: &str) {
        assert!(matches!(parse_style(entry), Err(CliError::InvalidArgs(_))));
    }

    #[test]
    fn test_build_patch_collects_styles() {
        let patch = build_patch(
            &Some("Hi".into()),
            &None,
            &None,
            &None,
            &["color=red".to_string(), "margin=".to_string()],
        )
        .unwrap();
        assert_eq!(patch.content.text.as_deref(), Some("Hi"));
        assert_eq!(patch.style.get("color").map(String::as_str), Some("red"));
        assert_eq!(patch.style.get("margin").map(String::as_str), Some(""));
    }
}
