use super::{LocalPage, PageController, PageDocument, PageError};
use crate::drag_session::{DragConfig, DragSession, DropTarget, Pointer};
use crate::drop_resolver::{DropPlacement, DropResolver};
use crate::move_command::{MoveCommand, MoveRequest};
use crate::position::{PositionAlgebra, PositionScheme, DEFAULT_NORMALIZATION_GAP};
use crate::relationship::is_style_relationship_valid;
use crate::section::{Parent, Section, SectionId};
use crate::style::StyleCatalog;
use crate::test_support::{self, PAGE_ID};
use crate::tree::SectionTree;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::rc::Rc;

const IDS: [SectionId; 11] = [10, 20, 21, 22, 23, 30, 31, 32, 33, 40, 41];

fn page() -> LocalPage {
    LocalPage::new(test_support::tree())
}

fn command(
    tree: &SectionTree,
    dragged: SectionId,
    parent: Parent,
    position: i64,
    needs_normalization: bool,
) -> MoveCommand {
    MoveCommand::new(
        tree.page_id(),
        dragged,
        tree.find_parent(dragged).unwrap(),
        DropPlacement {
            parent,
            position,
            needs_normalization,
        },
        tree.collect_descendant_ids(dragged).unwrap(),
    )
}

fn child_ids(tree: &SectionTree, parent: Parent) -> Vec<SectionId> {
    tree.children_of(parent)
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect()
}

fn positions(tree: &SectionTree, parent: Parent) -> Vec<i64> {
    tree.children_of(parent)
        .unwrap()
        .iter()
        .map(|s| s.position)
        .collect()
}

#[test]
fn test_commit_moves_subtree_under_new_parent() {
    let mut page = page();
    let before = page.snapshot();

    page.commit_move(&command(&before, 20, Parent::Section(40), 15, false))
        .unwrap();

    let after = page.snapshot();
    assert_eq!(after.find_parent(20), Some(Parent::Section(40)));
    assert_eq!(after.find_parent(23), Some(Parent::Section(22)));
    assert_eq!(child_ids(&after, Parent::Section(40)), vec![41, 20]);
    assert_eq!(child_ids(&after, Parent::Page), vec![10, 30, 40]);
    assert_eq!(after.len(), before.len());
}

#[test]
fn test_commit_publishes_new_snapshot() {
    let mut page = page();
    let before = page.snapshot();

    page.commit_move(&command(&before, 10, Parent::Page, 45, false))
        .unwrap();

    let after = page.snapshot();
    assert!(!Rc::ptr_eq(&before, &after));
    assert_eq!(child_ids(&before, Parent::Page), vec![10, 20, 30, 40]);
    assert_eq!(child_ids(&after, Parent::Page), vec![20, 30, 40, 10]);
}

#[test]
fn test_commit_records_attach_request() {
    let mut page = page();
    let tree = page.snapshot();

    page.commit_move(&command(&tree, 23, Parent::Page, 10, false))
        .unwrap();
    let tree = page.snapshot();
    page.commit_move(&command(&tree, 10, Parent::Section(20), 25, false))
        .unwrap();

    assert_eq!(
        page.requests(),
        &[
            MoveRequest::AttachToPage {
                page_id: PAGE_ID,
                section_id: 23,
                position: 10,
                detach_from: Parent::Section(22),
            },
            MoveRequest::AttachToSection {
                parent_section_id: 20,
                section_id: 10,
                position: 25,
                detach_from: Parent::Page,
            },
        ]
    );
}

#[test]
fn test_flagged_commit_renumbers_target_group() {
    let mut page = page();
    let tree = page.snapshot();

    // 10@5, 20@15, 30@25, 40@35: squeeze 41 right after 20.
    page.commit_move(&command(&tree, 41, Parent::Page, 16, true))
        .unwrap();

    let after = page.snapshot();
    assert_eq!(child_ids(&after, Parent::Page), vec![10, 20, 41, 30, 40]);
    assert_eq!(positions(&after, Parent::Page), vec![0, 10, 20, 30, 40]);
}

#[test]
fn test_colliding_position_renumbers_group() {
    let mut page = page();
    let tree = page.snapshot();

    // 20 already sits at 15; the newcomer lands just before it.
    page.commit_move(&command(&tree, 41, Parent::Page, 15, false))
        .unwrap();

    let after = page.snapshot();
    assert_eq!(child_ids(&after, Parent::Page), vec![10, 41, 20, 30, 40]);
    assert_eq!(positions(&after, Parent::Page), vec![0, 10, 20, 30, 40]);
}

#[test]
fn test_commit_rejects_cycle() {
    let mut page = page();
    let tree = page.snapshot();

    let result = page.commit_move(&command(&tree, 20, Parent::Section(23), 5, false));

    assert!(matches!(
        result,
        Err(PageError::Cycle {
            section_id: 20,
            parent_id: 23
        })
    ));
    assert!(Rc::ptr_eq(&tree, &page.snapshot()), "nothing was published");
    assert!(page.requests().is_empty());
}

#[test]
fn test_commit_rejects_leaf_parent() {
    let mut page = page();
    let tree = page.snapshot();

    let result = page.commit_move(&command(&tree, 21, Parent::Section(10), 5, false));

    assert!(matches!(result, Err(PageError::LeafParent(10))));
}

#[test]
fn test_commit_rejects_stale_command() {
    let mut page = page();
    let tree = page.snapshot();
    let stale = command(&tree, 41, Parent::Page, 45, false);

    page.remove_section(40).unwrap();

    assert!(matches!(
        page.commit_move(&stale),
        Err(PageError::UnknownSection(41))
    ));
}

#[test]
fn test_remove_section_reports_impact() {
    let mut page = page();

    let impact = page.remove_section(20).unwrap();

    assert_eq!(impact.section_id, 20);
    assert_eq!(impact.descendant_count, 3);
    assert_eq!(impact.total(), 4);
    let after = page.snapshot();
    assert_eq!(after.len(), 7);
    for id in [20, 21, 22, 23] {
        assert!(!after.contains(id));
    }
}

#[test]
fn test_remove_unknown_section() {
    let mut page = page();
    assert!(matches!(
        page.remove_section(999),
        Err(PageError::UnknownSection(999))
    ));
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.json");
    let mut page = page();
    let tree = page.snapshot();
    page.commit_move(&command(&tree, 10, Parent::Section(20), 25, false))
        .unwrap();

    page.save(&path).unwrap();
    let reloaded = LocalPage::load(&path).unwrap();

    assert_eq!(reloaded.document(), page.document());
    assert_eq!(reloaded.snapshot().find_parent(10), Some(Parent::Section(20)));
}

#[test]
fn test_load_fills_omitted_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.json");
    std::fs::write(
        &path,
        r#"{
            "page_id": 7,
            "sections": [
                {"id": 2, "name": "Second", "style_id": 1, "position": 20},
                {"id": 1, "name": "First", "style_id": 1, "position": 10,
                 "can_have_children": true,
                 "children": [{"id": 3, "name": "Nested", "style_id": 1, "position": 5}]}
            ]
        }"#,
    )
    .unwrap();

    let page = LocalPage::load(&path).unwrap();
    let tree = page.snapshot();

    assert_eq!(tree.page_id(), 7);
    assert_eq!(child_ids(&tree, Parent::Page), vec![1, 2]);
    assert_eq!(tree.find_by_id(3).map(|s| s.style_name.as_str()), Some(""));
    assert!(!tree.find_by_id(2).unwrap().can_have_children);
}

#[test]
fn test_load_rejects_duplicate_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.json");
    let document = PageDocument {
        page_id: 1,
        sections: vec![
            Section::new(1, "a", 1, true, 5).with_children(vec![Section::new(2, "b", 1, false, 5)]),
            Section::new(2, "c", 1, false, 15),
        ],
    };
    std::fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();

    assert!(matches!(LocalPage::load(&path), Err(PageError::Tree(_))));
}

#[test]
fn test_load_reports_missing_and_malformed_files() {
    let dir = tempfile::tempdir().unwrap();

    assert!(matches!(
        LocalPage::load(&dir.path().join("missing.json")),
        Err(PageError::Io(_))
    ));

    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(LocalPage::load(&path), Err(PageError::Json(_))));
}

/// Runs one full gesture through a session and commits whatever it emits.
fn drag(
    page: &mut LocalPage,
    catalog: &Rc<StyleCatalog>,
    dragged: SectionId,
    target: SectionId,
    fraction: f64,
) -> Option<MoveCommand> {
    drag_with(PositionAlgebra::default(), page, catalog, dragged, target, fraction)
}

fn drag_with(
    algebra: PositionAlgebra,
    page: &mut LocalPage,
    catalog: &Rc<StyleCatalog>,
    dragged: SectionId,
    target: SectionId,
    fraction: f64,
) -> Option<MoveCommand> {
    let config = DragConfig {
        resolver: DropResolver::new(0.25, algebra),
        drag_threshold: 1.0,
    };
    let mut session = DragSession::new(page.snapshot(), Rc::clone(catalog), config);
    session.pointer_down(dragged, Pointer::new(0.0, 0.0));
    session
        .pointer_move(
            Pointer::new(5.0, fraction),
            Some(DropTarget {
                section_id: target,
                top: 0.0,
                height: 1.0,
            }),
        )
        .unwrap();
    let command = session.pointer_up()?;
    page.commit_move(&command).unwrap();
    Some(command)
}

#[test]
fn test_drag_then_commit_end_to_end() {
    let catalog = Rc::new(test_support::catalog());
    let mut page = page();

    assert!(drag(&mut page, &catalog, 10, 22, 0.5).is_some());
    assert!(
        drag(&mut page, &catalog, 20, 10, 0.5).is_none(),
        "10 now lives inside 20"
    );
    assert!(drag(&mut page, &catalog, 41, 30, 1.0).is_some());

    let tree = page.snapshot();
    assert_eq!(child_ids(&tree, Parent::Section(22)), vec![23, 10]);
    assert_eq!(child_ids(&tree, Parent::Page), vec![20, 30, 41, 40]);
}

#[test]
fn test_provisional_seeds_commit_negative_positions() {
    let catalog = Rc::new(test_support::catalog());
    let algebra = PositionAlgebra::new(PositionScheme::Provisional, DEFAULT_NORMALIZATION_GAP);
    let mut page = page();

    let seeded = drag_with(algebra, &mut page, &catalog, 10, 33, 0.5).unwrap();
    assert_eq!(seeded.new_position(), -1);
    let front = drag_with(algebra, &mut page, &catalog, 21, 10, 0.0).unwrap();
    assert_eq!(front.new_position(), -11);

    let tree = page.snapshot();
    assert_eq!(child_ids(&tree, Parent::Section(33)), vec![21, 10]);
    let keys: Vec<i64> = tree
        .children_of(Parent::Section(33))
        .unwrap()
        .iter()
        .map(|s| s.position)
        .collect();
    assert_eq!(keys, vec![-11, -1]);
}

/// Replays random gestures and checks the tree stays whole, acyclic and well ordered.
fn check_random_drags(
    algebra: PositionAlgebra,
    steps: Vec<(usize, usize, f64)>,
) -> Result<(), TestCaseError> {
    let catalog = Rc::new(test_support::catalog());
    let mut page = page();

    for (dragged, target, fraction) in steps {
        let before = page.snapshot();
        let Some(command) = drag_with(algebra, &mut page, &catalog, IDS[dragged], IDS[target], fraction) else {
            continue;
        };
        let after = page.snapshot();

        // Leaves never become parents.
        if let Some(parent_id) = command.new_parent_id() {
            prop_assert!(before.find_by_id(parent_id).unwrap().can_have_children);
        }
        // The whole subtree travels, in the same shape.
        for id in command.descendant_ids() {
            prop_assert!(after.is_descendant_of(command.dragged_section_id(), *id));
            prop_assert_eq!(before.find_parent(*id), after.find_parent(*id));
        }
        prop_assert_eq!(after.find_parent(command.dragged_section_id()), Some(command.new_parent()));
    }

    let tree = page.snapshot();

    // Every section survives, exactly once, reachable from the page.
    let seen: BTreeSet<SectionId> = tree.flatten().map(|s| s.id).collect();
    prop_assert_eq!(seen, IDS.iter().copied().collect::<BTreeSet<_>>());
    prop_assert_eq!(tree.len(), IDS.len());

    for section in tree.flatten() {
        // Sibling positions strictly increase in render order.
        let keys: Vec<i64> = section.children.iter().map(|s| s.position).collect();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]), "{:?}", keys);

        // Leaves stay leaves and every edge honours the style rules.
        if !section.can_have_children {
            prop_assert!(section.children.is_empty());
        }
        let parent_style = match tree.find_parent(section.id) {
            Some(Parent::Section(id)) => tree.find_by_id(id).and_then(|p| catalog.get(p.style_id)),
            _ => None,
        };
        let style = catalog.get(section.style_id).unwrap();
        prop_assert!(is_style_relationship_valid(style, parent_style));
        prop_assert!(!tree.is_descendant_of(section.id, section.id));
    }

    let roots: Vec<i64> = tree.roots().iter().map(|s| s.position).collect();
    prop_assert!(roots.windows(2).all(|w| w[0] < w[1]), "{:?}", roots);
    Ok(())
}

proptest! {
    #[test]
    fn prop_random_drags_preserve_tree_invariants(
        steps in prop::collection::vec((0..IDS.len(), 0..IDS.len(), 0.0f64..=1.0), 1..40)
    ) {
        check_random_drags(PositionAlgebra::default(), steps)?;
    }

    #[test]
    fn prop_random_drags_with_provisional_seeds_keep_positions_unique(
        steps in prop::collection::vec((0..IDS.len(), 0..IDS.len(), 0.0f64..=1.0), 1..40)
    ) {
        let algebra = PositionAlgebra::new(PositionScheme::Provisional, DEFAULT_NORMALIZATION_GAP);
        check_random_drags(algebra, steps)?;
    }
}
