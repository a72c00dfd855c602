//! Tests for the drag engine state machine and drop-slot resolution.
//!
//! Layout used for hover geometry: every hovered element occupies
//! `y = 100..140`, so the midpoint is `y = 120`.

use rstest::rstest;

use mailcanvas::application::{
    CancelReason, DragEngine, DragSource, DragState, DropAction, DropSlot, HoverTarget, Point,
    Rect,
};
use mailcanvas::domain::mutator::insert;
use mailcanvas::domain::{create_columns, create_node, NodeId, NodeKind, PaletteItem, Template};

const UPPER: Point = Point { x: 10.0, y: 105.0 };
const LOWER: Point = Point { x: 10.0, y: 135.0 };
const MIDDLE: Point = Point { x: 10.0, y: 120.0 };

fn bounds() -> Rect {
    Rect::new(0.0, 100.0, 600.0, 40.0)
}

/// Root: header, text, section (empty).
fn fixture() -> (Template, NodeId, NodeId, NodeId) {
    let mut tree = Template::new();
    let mut ids = Vec::new();
    for kind in [NodeKind::Header, NodeKind::Text, NodeKind::Section] {
        let node = create_node(kind).unwrap();
        ids.push(*node.id());
        tree = insert(&tree, node, None, usize::MAX).unwrap();
    }
    (tree, ids[0], ids[1], ids[2])
}

fn dragging_node(tree: &Template, id: &NodeId) -> DragEngine {
    let mut engine = DragEngine::new();
    engine
        .begin(tree, DragSource::node(tree, id).unwrap())
        .unwrap();
    engine
}

// ============================================================
// State transitions
// ============================================================

#[test]
fn given_idle_engine_when_begin_then_dragging() {
    let (tree, _, _, _) = fixture();
    let mut engine = DragEngine::new();
    assert_eq!(engine.state(), &DragState::Idle);

    engine
        .begin(&tree, DragSource::Palette(PaletteItem::Button))
        .unwrap();

    assert!(engine.is_active());
    assert_eq!(
        engine.state(),
        &DragState::Dragging {
            source: DragSource::Palette(PaletteItem::Button)
        }
    );
}

#[test]
fn given_active_drag_when_begin_again_then_rejected() {
    let (tree, _, _, _) = fixture();
    let mut engine = DragEngine::new();
    engine
        .begin(&tree, DragSource::Palette(PaletteItem::Text))
        .unwrap();

    assert!(engine
        .begin(&tree, DragSource::Palette(PaletteItem::Image))
        .is_err());
}

#[test]
fn given_hover_over_target_when_leave_then_back_to_dragging() {
    let (tree, header, _, _) = fixture();
    let mut engine = DragEngine::new();
    engine
        .begin(&tree, DragSource::Palette(PaletteItem::Text))
        .unwrap();

    engine.hover(&tree, HoverTarget::Node(header), UPPER, bounds());
    assert!(matches!(engine.state(), DragState::Hovering { .. }));

    engine.leave();
    assert!(matches!(engine.state(), DragState::Dragging { .. }));
    assert!(engine.candidate().is_none());
}

#[test]
fn given_drag_without_candidate_when_release_then_cancelled_no_target() {
    let (tree, _, _, _) = fixture();
    let mut engine = DragEngine::new();
    engine
        .begin(&tree, DragSource::Palette(PaletteItem::Text))
        .unwrap();

    let action = engine.release(&tree);

    assert_eq!(action, DropAction::Cancelled(CancelReason::NoTarget));
    assert!(matches!(
        engine.state(),
        DragState::Cancelled {
            reason: CancelReason::NoTarget,
            ..
        }
    ));
}

#[test]
fn given_active_drag_when_cancel_then_aborted_and_inactive() {
    let (tree, header, _, _) = fixture();
    let mut engine = dragging_node(&tree, &header);

    assert!(engine.cancel());

    assert!(!engine.is_active());
    assert!(!engine.cancel(), "second cancel has nothing to abort");
}

#[test]
fn given_column_when_drag_begins_then_rejected() {
    let tree = insert(&Template::new(), create_columns(2).unwrap(), None, 0).unwrap();
    let column = *tree.children()[0].children()[0].id();

    assert!(DragSource::node(&tree, &column).is_err());
}

// ============================================================
// Slot resolution
// ============================================================

#[rstest]
#[case(UPPER, 1)]
#[case(MIDDLE, 2)]
#[case(LOWER, 2)]
fn given_palette_drag_when_hover_text_then_slot_follows_pointer_half(
    #[case] pointer: Point,
    #[case] slot: usize,
) {
    let (tree, _, text, _) = fixture();
    let mut engine = DragEngine::new();
    engine
        .begin(&tree, DragSource::Palette(PaletteItem::Divider))
        .unwrap();

    let candidate = engine.hover(&tree, HoverTarget::Node(text), pointer, bounds());

    assert_eq!(candidate, Some(DropSlot { parent: None, slot }));
}

#[test]
fn given_palette_drag_when_hover_canvas_then_appends_to_root() {
    let (tree, _, _, _) = fixture();
    let mut engine = DragEngine::new();
    engine
        .begin(&tree, DragSource::Palette(PaletteItem::Spacer))
        .unwrap();

    let candidate = engine.hover(&tree, HoverTarget::Canvas, LOWER, bounds());

    assert_eq!(candidate, Some(DropSlot { parent: None, slot: 3 }));
}

#[test]
fn given_palette_drag_when_hover_section_interior_then_appends_to_section() {
    let (tree, _, _, section) = fixture();
    let mut engine = DragEngine::new();
    engine
        .begin(&tree, DragSource::Palette(PaletteItem::Image))
        .unwrap();

    let candidate = engine.hover(&tree, HoverTarget::Container(section), UPPER, bounds());

    assert_eq!(
        candidate,
        Some(DropSlot {
            parent: Some(section),
            slot: 0
        })
    );
}

#[test]
fn given_palette_drag_when_hover_leaf_interior_then_no_candidate() {
    let (tree, header, _, _) = fixture();
    let mut engine = DragEngine::new();
    engine
        .begin(&tree, DragSource::Palette(PaletteItem::Text))
        .unwrap();

    let candidate = engine.hover(&tree, HoverTarget::Container(header), UPPER, bounds());

    assert_eq!(candidate, None);
    assert!(matches!(engine.state(), DragState::Dragging { .. }));
}

#[test]
fn given_section_drag_when_hover_own_interior_then_no_candidate() {
    let (tree, _, _, section) = fixture();
    let mut engine = dragging_node(&tree, &section);

    let candidate = engine.hover(&tree, HoverTarget::Container(section), UPPER, bounds());

    assert_eq!(candidate, None);
}

#[test]
fn given_columns_drag_when_hover_own_column_then_no_candidate() {
    let tree = insert(&Template::new(), create_columns(2).unwrap(), None, 0).unwrap();
    let columns = *tree.children()[0].id();
    let column = *tree.children()[0].children()[1].id();
    let mut engine = dragging_node(&tree, &columns);

    let candidate = engine.hover(&tree, HoverTarget::Container(column), UPPER, bounds());

    assert_eq!(candidate, None);
}

// ============================================================
// release()
// ============================================================

#[test]
fn given_palette_drop_when_release_then_insert_at_slot() {
    let (tree, header, _, _) = fixture();
    let mut engine = DragEngine::new();
    engine
        .begin(&tree, DragSource::Palette(PaletteItem::Columns(3)))
        .unwrap();
    engine.hover(&tree, HoverTarget::Node(header), LOWER, bounds());

    let action = engine.release(&tree);

    assert_eq!(
        action,
        DropAction::Insert {
            item: PaletteItem::Columns(3),
            parent: None,
            index: 1
        }
    );
    assert!(matches!(engine.state(), DragState::Dropped { .. }));
}

#[test]
fn given_header_drag_when_drop_below_section_then_move_index_accounts_for_removal() {
    // Arrange: header at 0, dropped after the section at 2 (slot 3)
    let (tree, header, _, section) = fixture();
    let mut engine = dragging_node(&tree, &header);
    engine.hover(&tree, HoverTarget::Node(section), LOWER, bounds());

    // Act
    let action = engine.release(&tree);

    // Assert: after removing the header the list has two entries; it goes last
    assert_eq!(
        action,
        DropAction::Move {
            id: header,
            parent: None,
            index: 2
        }
    );
}

#[test]
fn given_text_drag_when_drop_above_header_then_move_to_front() {
    let (tree, header, text, _) = fixture();
    let mut engine = dragging_node(&tree, &text);
    engine.hover(&tree, HoverTarget::Node(header), UPPER, bounds());

    assert_eq!(
        engine.release(&tree),
        DropAction::Move {
            id: text,
            parent: None,
            index: 0
        }
    );
}

#[test]
fn given_tree_changed_after_begin_when_release_then_source_is_relocated() {
    // Arrange: text starts at index 1; a divider is then inserted at the front
    let (tree, header, text, _) = fixture();
    let mut engine = dragging_node(&tree, &text);
    let changed = insert(&tree, create_node(NodeKind::Divider).unwrap(), None, 0).unwrap();
    engine.hover(&changed, HoverTarget::Node(header), UPPER, bounds());

    // Act
    let action = engine.release(&changed);

    // Assert: slot 1 is before the header; text (now at 2) moves there
    assert_eq!(
        action,
        DropAction::Move {
            id: text,
            parent: None,
            index: 1
        }
    );
}

#[rstest]
#[case(UPPER)]
#[case(LOWER)]
fn given_node_drag_when_drop_on_itself_then_unchanged(#[case] pointer: Point) {
    let (tree, _, text, _) = fixture();
    let mut engine = dragging_node(&tree, &text);
    engine.hover(&tree, HoverTarget::Node(text), pointer, bounds());

    assert_eq!(engine.release(&tree), DropAction::Unchanged { id: text });
}

#[test]
fn given_node_drag_when_drop_on_adjacent_edge_then_unchanged() {
    // lower half of the header is the gap right above the text
    let (tree, header, text, _) = fixture();
    let mut engine = dragging_node(&tree, &text);
    engine.hover(&tree, HoverTarget::Node(header), LOWER, bounds());

    assert_eq!(engine.release(&tree), DropAction::Unchanged { id: text });
}

#[test]
fn given_node_drag_when_drop_into_section_then_move_into_container() {
    let (tree, _, text, section) = fixture();
    let mut engine = dragging_node(&tree, &text);
    engine.hover(&tree, HoverTarget::Container(section), UPPER, bounds());

    assert_eq!(
        engine.release(&tree),
        DropAction::Move {
            id: text,
            parent: Some(section),
            index: 0
        }
    );
}
