//! Tests for the pure tree operations.
//!
//! Every operation borrows its input tree: the original must be untouched
//! after the call, and no-ops hand back the very same tree (`Cow::Borrowed`).

use std::borrow::Cow;

use rstest::rstest;
use serde_json::json;

use mailcanvas::domain::mutator::{duplicate, insert, move_node, remove, update};
use mailcanvas::domain::{
    create_columns, create_node, Content, DomainError, Node, NodeId, NodeKind, NodePatch,
    Template,
};

fn node(kind: NodeKind) -> Node {
    create_node(kind).unwrap()
}

/// Append `node` to `parent` and return the grown tree and the node id.
fn push(tree: &Template, node: Node, parent: Option<&NodeId>) -> (Template, NodeId) {
    let id = *node.id();
    (insert(tree, node, parent, usize::MAX).unwrap(), id)
}

fn root_ids(tree: &Template) -> Vec<NodeId> {
    tree.children().iter().map(|n| *n.id()).collect()
}

fn column_ids(tree: &Template, columns: &NodeId) -> Vec<NodeId> {
    tree.find(columns)
        .unwrap()
        .children()
        .iter()
        .map(|c| *c.id())
        .collect()
}

// ============================================================
// insert()
// ============================================================

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(2, 2)]
#[case(99, 2)]
fn given_two_root_nodes_when_insert_at_index_then_position_is_clamped(
    #[case] index: usize,
    #[case] expected: usize,
) {
    // Arrange
    let (tree, _) = push(&Template::new(), node(NodeKind::Header), None);
    let (tree, _) = push(&tree, node(NodeKind::Text), None);
    let divider = node(NodeKind::Divider);
    let id = *divider.id();

    // Act
    let next = insert(&tree, divider, None, index).unwrap();

    // Assert
    assert_eq!(next.locate(&id).unwrap().index, expected);
    assert_eq!(tree.node_count(), 2, "input tree must be untouched");
}

#[test]
fn given_section_when_insert_into_it_then_child_is_nested() {
    let (tree, section) = push(&Template::new(), node(NodeKind::Section), None);
    let text = node(NodeKind::Text);
    let text_id = *text.id();

    let next = insert(&tree, text, Some(&section), 0).unwrap();

    let location = next.locate(&text_id).unwrap();
    assert_eq!(location.parent, Some(section));
    assert_eq!(location.index, 0);
    assert!(next.is_descendant(&section, &text_id));
}

#[test]
fn given_column_slot_when_insert_into_it_then_column_accepts_child() {
    let (tree, columns) = push(&Template::new(), create_columns(2).unwrap(), None);
    let second = column_ids(&tree, &columns)[1];

    let (next, button) = push(&tree, node(NodeKind::Button), Some(&second));

    assert_eq!(next.locate(&button).unwrap().parent, Some(second));
}

#[rstest]
#[case(NodeKind::Text)]
#[case(NodeKind::Header)]
#[case(NodeKind::Image)]
#[case(NodeKind::Button)]
#[case(NodeKind::Divider)]
#[case(NodeKind::Spacer)]
fn given_leaf_parent_when_insert_then_parent_not_found(#[case] kind: NodeKind) {
    let (tree, leaf) = push(&Template::new(), node(kind), None);

    let result = insert(&tree, node(NodeKind::Text), Some(&leaf), 0);

    assert_eq!(result.unwrap_err(), DomainError::ParentNotFound(leaf));
}

#[test]
fn given_columns_layout_when_insert_directly_into_it_then_rejected() {
    let (tree, columns) = push(&Template::new(), create_columns(3).unwrap(), None);

    let result = insert(&tree, node(NodeKind::Text), Some(&columns), 0);

    assert_eq!(result.unwrap_err(), DomainError::ParentNotFound(columns));
    assert_eq!(column_ids(&tree, &columns).len(), 3);
}

#[test]
fn given_unknown_parent_when_insert_then_parent_not_found() {
    let missing = NodeId::new();

    let result = insert(&Template::new(), node(NodeKind::Text), Some(&missing), 0);

    assert_eq!(result.unwrap_err(), DomainError::ParentNotFound(missing));
}

#[test]
fn given_node_already_in_tree_when_insert_again_then_duplicate_id() {
    let header = node(NodeKind::Header);
    let id = *header.id();
    let tree = insert(&Template::new(), header.clone(), None, 0).unwrap();

    let result = insert(&tree, header, None, 1);

    assert_eq!(result.unwrap_err(), DomainError::DuplicateId(id));
}

// ============================================================
// move_node()
// ============================================================

#[test]
fn given_header_then_text_when_move_text_to_index_zero_then_order_is_text_header() {
    // Arrange
    let (tree, header) = push(&Template::new(), node(NodeKind::Header), None);
    let (tree, text) = push(&tree, node(NodeKind::Text), None);

    // Act
    let next = move_node(&tree, &text, None, 0).unwrap();

    // Assert
    assert!(matches!(next, Cow::Owned(_)));
    assert_eq!(root_ids(&next), vec![text, header]);
    assert_eq!(root_ids(&tree), vec![header, text]);
}

#[test]
fn given_node_at_its_position_when_move_there_then_same_tree_is_returned() {
    let (tree, header) = push(&Template::new(), node(NodeKind::Header), None);
    let (tree, _) = push(&tree, node(NodeKind::Text), None);

    let next = move_node(&tree, &header, None, 0).unwrap();

    assert!(matches!(next, Cow::Borrowed(t) if std::ptr::eq(t, &tree)));
}

#[test]
fn given_index_past_end_when_move_within_parent_then_node_goes_last() {
    let (tree, a) = push(&Template::new(), node(NodeKind::Header), None);
    let (tree, b) = push(&tree, node(NodeKind::Text), None);
    let (tree, c) = push(&tree, node(NodeKind::Divider), None);

    let next = move_node(&tree, &a, None, 42).unwrap();

    assert_eq!(root_ids(&next), vec![b, c, a]);
}

#[test]
fn given_root_node_when_move_into_column_then_it_leaves_the_root() {
    let (tree, columns) = push(&Template::new(), create_columns(2).unwrap(), None);
    let (tree, button) = push(&tree, node(NodeKind::Button), None);
    let first = column_ids(&tree, &columns)[0];

    let next = move_node(&tree, &button, Some(&first), 0).unwrap();

    assert_eq!(root_ids(&next), vec![columns]);
    assert_eq!(next.locate(&button).unwrap().parent, Some(first));
    assert_eq!(next.node_count(), tree.node_count());
}

#[test]
fn given_section_when_move_into_own_descendant_then_cycle() {
    let (tree, outer) = push(&Template::new(), node(NodeKind::Section), None);
    let (tree, inner) = push(&tree, node(NodeKind::Section), Some(&outer));

    let result = move_node(&tree, &outer, Some(&inner), 0);

    assert_eq!(
        result.unwrap_err(),
        DomainError::Cycle {
            node: outer,
            parent: inner
        }
    );
}

#[test]
fn given_section_when_move_into_itself_then_cycle() {
    let (tree, section) = push(&Template::new(), node(NodeKind::Section), None);

    let result = move_node(&tree, &section, Some(&section), 0);

    assert!(matches!(result, Err(DomainError::Cycle { .. })));
}

#[test]
fn given_column_when_move_then_column_placement_error() {
    let (tree, columns) = push(&Template::new(), create_columns(2).unwrap(), None);
    let first = column_ids(&tree, &columns)[0];

    let result = move_node(&tree, &first, None, 0);

    assert_eq!(result.unwrap_err(), DomainError::ColumnPlacement(first));
}

#[test]
fn given_unknown_node_when_move_then_not_found() {
    let missing = NodeId::new();

    let tree = Template::new();
    let result = move_node(&tree, &missing, None, 0);

    assert_eq!(result.unwrap_err(), DomainError::NotFound(missing));
}

#[test]
fn given_leaf_destination_when_move_then_parent_not_found() {
    let (tree, text) = push(&Template::new(), node(NodeKind::Text), None);
    let (tree, image) = push(&tree, node(NodeKind::Image), None);

    let result = move_node(&tree, &text, Some(&image), 0);

    assert_eq!(result.unwrap_err(), DomainError::ParentNotFound(image));
}

// ============================================================
// remove()
// ============================================================

#[test]
fn given_section_with_children_when_remove_then_subtree_is_gone() {
    let (tree, section) = push(&Template::new(), node(NodeKind::Section), None);
    let (tree, text) = push(&tree, node(NodeKind::Text), Some(&section));
    let (tree, keep) = push(&tree, node(NodeKind::Divider), None);

    let next = remove(&tree, &section);

    assert!(!next.contains(&section));
    assert!(!next.contains(&text));
    assert_eq!(root_ids(&next), vec![keep]);
}

#[test]
fn given_absent_id_when_remove_then_same_tree_is_returned() {
    let (tree, _) = push(&Template::new(), node(NodeKind::Text), None);

    let next = remove(&tree, &NodeId::new());

    assert!(matches!(next, Cow::Borrowed(t) if std::ptr::eq(t, &tree)));
}

#[test]
fn given_removed_node_when_remove_again_then_tree_is_unchanged() {
    let (tree, text) = push(&Template::new(), node(NodeKind::Text), None);

    let once = remove(&tree, &text).into_owned();
    let twice = remove(&once, &text);

    assert!(matches!(twice, Cow::Borrowed(_)));
    assert_eq!(*twice, once);
}

#[test]
fn given_column_when_remove_then_layout_keeps_its_arity() {
    let (tree, columns) = push(&Template::new(), create_columns(3).unwrap(), None);
    let middle = column_ids(&tree, &columns)[1];

    let next = remove(&tree, &middle);

    assert!(matches!(next, Cow::Borrowed(_)));
    assert_eq!(column_ids(&next, &columns).len(), 3);
}

// ============================================================
// duplicate()
// ============================================================

#[test]
fn given_section_with_text_when_duplicate_then_copy_has_fresh_ids_and_same_payload() {
    // Arrange
    let (tree, section) = push(&Template::new(), node(NodeKind::Section), None);
    let (tree, text) = push(&tree, node(NodeKind::Text), Some(&section));

    // Act
    let duplicated = duplicate(&tree, &section).unwrap().unwrap();
    let next = duplicated.tree;

    // Assert
    assert_eq!(root_ids(&next), vec![section, duplicated.id]);
    let original = next.find(&section).unwrap();
    let copy = next.find(&duplicated.id).unwrap();
    assert_ne!(copy.id(), original.id());
    assert_eq!(copy.style(), original.style());
    assert_eq!(copy.children().len(), 1);
    let copied_text = &copy.children()[0];
    assert_ne!(copied_text.id(), &text);
    assert_eq!(copied_text.content(), next.find(&text).unwrap().content());
    assert_eq!(copied_text.style(), next.find(&text).unwrap().style());
}

#[test]
fn given_columns_when_duplicate_then_every_column_gets_a_fresh_id() {
    let (tree, columns) = push(&Template::new(), create_columns(2).unwrap(), None);

    let duplicated = duplicate(&tree, &columns).unwrap().unwrap();

    let originals = column_ids(&duplicated.tree, &columns);
    let copies = column_ids(&duplicated.tree, &duplicated.id);
    assert_eq!(copies.len(), 2);
    assert!(copies.iter().all(|id| !originals.contains(id)));
    assert!(duplicated.tree.validate().is_ok());
}

#[test]
fn given_absent_id_when_duplicate_then_none() {
    assert!(duplicate(&Template::new(), &NodeId::new()).unwrap().is_none());
}

#[test]
fn given_child_of_unsupported_element_when_duplicate_then_none_and_tree_untouched() {
    // Arrange: an unknown container kind keeps its children verbatim
    let child = "3e4f5a6b-7c8d-4e9f-a0b1-c2d3e4f5a6b7";
    let tree = Template::from_value(json!({
        "version": 1,
        "children": [{
            "id": "7d3f8c1e-2b4a-4c5d-9e6f-0a1b2c3d4e5f",
            "kind": "carousel",
            "content": {"slides": 1},
            "style": {},
            "children": [{"id": child, "kind": "text", "content": "Slide", "style": {}}]
        }]
    }))
    .unwrap();
    let child: NodeId = child.parse().unwrap();

    // Act
    let result = duplicate(&tree, &child).unwrap();

    // Assert
    assert!(result.is_none());
    assert_eq!(tree.node_ids().len(), 2);
}

// ============================================================
// update()
// ============================================================

#[test]
fn given_text_node_when_update_then_patch_is_merged() {
    let (tree, text) = push(&Template::new(), node(NodeKind::Text), None);
    let patch = NodePatch::text("Hello")
        .with_style("color", "red")
        .with_style("margin", "");

    let next = update(&tree, &text, &patch);

    let updated = next.find(&text).unwrap();
    assert_eq!(updated.content(), &Content::Text("Hello".into()));
    assert_eq!(updated.style().get("color").map(String::as_str), Some("red"));
    assert!(!updated.style().contains_key("margin"));
    assert_eq!(
        updated.style().get("font-size").map(String::as_str),
        Some("16px"),
        "unrelated keys are kept"
    );
    assert_eq!(
        tree.find(&text).unwrap().content(),
        &Content::Text("Start typing your content here.".into())
    );
}

#[rstest]
#[case::empty_patch(NodeKind::Text, NodePatch::default())]
#[case::text_on_section(NodeKind::Section, NodePatch::text("ignored"))]
#[case::same_value(NodeKind::Text, NodePatch::text("Start typing your content here."))]
#[case::clear_missing_style(NodeKind::Divider, NodePatch::default().with_style("padding", ""))]
fn given_patch_without_effect_when_update_then_same_tree_is_returned(
    #[case] kind: NodeKind,
    #[case] patch: NodePatch,
) {
    let (tree, id) = push(&Template::new(), node(kind), None);

    let next = update(&tree, &id, &patch);

    assert!(matches!(next, Cow::Borrowed(_)));
}

#[test]
fn given_absent_id_when_update_then_same_tree_is_returned() {
    let tree = Template::new();

    let next = update(&tree, &NodeId::new(), &NodePatch::text("x"));

    assert!(matches!(next, Cow::Borrowed(_)));
}
