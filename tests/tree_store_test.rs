//! Tests for TreeArena edit operations and their no-op guarantees

use rstest::{fixture, rstest};

use mindmap::domain::{
    Command, Direction, Node, NodeId, Outcome, SequentialIds, TreeArena, UuidSource,
};
use mindmap::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

fn added(outcome: Outcome) -> NodeId {
    match outcome {
        Outcome::Added(id) => id,
        other => panic!("expected Added, got {:?}", other),
    }
}

fn titles(tree: &TreeArena, parent: NodeId) -> Vec<String> {
    tree.children_of(parent)
        .into_iter()
        .filter_map(|id| tree.find(id).map(|data| data.title.clone()))
        .collect()
}

/// Root with children A, B, C; A has child A1.
struct Fixture {
    tree: TreeArena,
    root: NodeId,
    a: NodeId,
    a1: NodeId,
    b: NodeId,
    c: NodeId,
}

#[fixture]
fn abc() -> Fixture {
    let mut tree = TreeArena::with_ids("Root", Box::new(SequentialIds::new()));
    let root = tree.root_id();
    let a = added(tree.add_child(root, "A"));
    let a1 = added(tree.add_child(a, "A1"));
    let b = added(tree.add_child(root, "B"));
    let c = added(tree.add_child(root, "C"));
    Fixture {
        tree,
        root,
        a,
        a1,
        b,
        c,
    }
}

fn unknown_id() -> NodeId {
    "ffffffff-ffff-4fff-bfff-ffffffffffff".parse().unwrap()
}

// ============================================================
// Scenario
// ============================================================

#[test]
fn given_root_when_building_and_deleting_then_follows_scenario() {
    let mut tree = TreeArena::new("R");
    let r = tree.root_id();

    let a = added(tree.add_child(r, "A"));
    assert_eq!(tree.children_of(r), vec![a]);
    assert_eq!(tree.find(a).unwrap().level, 1);

    let b = added(tree.add_child(a, "B"));
    assert_eq!(tree.children_of(a), vec![b]);
    assert_eq!(tree.find(b).unwrap().level, 2);

    let c = added(tree.add_child(r, "C"));
    assert_eq!(tree.move_sibling(a, Direction::Down), Outcome::Updated);
    assert_eq!(tree.children_of(r), vec![c, a]);

    assert_eq!(tree.delete(a), Outcome::Removed(vec![a, b]));
    assert_eq!(tree.children_of(r), vec![c]);
    assert!(!tree.contains(b));
}

// ============================================================
// No-op on unknown id
// ============================================================

#[rstest]
#[case::add(Command::AddChild { target: unknown_id(), title: "x".into() })]
#[case::delete(Command::Delete { target: unknown_id() })]
#[case::rename(Command::Rename { target: unknown_id(), title: "x".into() })]
#[case::level_up(Command::ChangeLevel { target: unknown_id(), delta: 1 })]
#[case::level_down(Command::ChangeLevel { target: unknown_id(), delta: -100 })]
#[case::move_up(Command::MoveSibling { target: unknown_id(), direction: Direction::Up })]
#[case::move_down(Command::MoveSibling { target: unknown_id(), direction: Direction::Down })]
fn given_unknown_id_when_applying_then_tree_unchanged(abc: Fixture, #[case] command: Command) {
    let mut tree = abc.tree;
    let before = tree.snapshot();

    assert_eq!(tree.apply(&command), Outcome::Unchanged);
    assert_eq!(tree.snapshot(), before);
}

#[rstest]
fn given_deleted_id_when_editing_again_then_tree_unchanged(abc: Fixture) {
    let mut tree = abc.tree;
    tree.delete(abc.b);
    let before = tree.snapshot();

    assert_eq!(tree.rename(abc.b, "ghost"), Outcome::Unchanged);
    assert_eq!(tree.add_child(abc.b, "ghost"), Outcome::Unchanged);
    assert_eq!(tree.delete(abc.b), Outcome::Unchanged);
    assert_eq!(tree.snapshot(), before);
}

// ============================================================
// AddChild
// ============================================================

#[rstest]
fn given_parent_with_children_when_adding_then_appends_last(abc: Fixture) {
    let mut tree = abc.tree;
    let d = added(tree.add_child(abc.root, "D"));

    assert_eq!(titles(&tree, abc.root), vec!["A", "B", "C", "D"]);
    assert_eq!(tree.parent_of(d), Some(abc.root));
    assert!(tree.children_of(d).is_empty());
}

#[rstest]
fn given_parent_with_changed_level_when_adding_then_child_follows_parent_level(abc: Fixture) {
    let mut tree = abc.tree;
    tree.change_level(abc.b, 4);

    let child = added(tree.add_child(abc.b, "deep"));

    assert_eq!(tree.find(child).unwrap().level, 6);
}

#[test]
fn given_many_adds_and_deletes_when_collecting_ids_then_all_distinct() {
    let mut tree = TreeArena::with_ids("Root", Box::new(UuidSource));
    let root = tree.root_id();
    let mut parents = vec![root];
    for i in 0..50 {
        let parent = parents[i % parents.len()];
        let id = added(tree.add_child(parent, &format!("n{i}")));
        parents.push(id);
        if i % 7 == 6 {
            let doomed = parents.remove(parents.len() / 2);
            tree.delete(doomed);
            parents.retain(|id| tree.contains(*id));
        }
    }

    let ids = tree.ids();
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(ids.len(), unique.len());
    assert_eq!(ids.len(), tree.node_count());
}

// ============================================================
// DeleteNode
// ============================================================

#[rstest]
fn given_node_with_descendants_when_deleting_then_subtree_gone(abc: Fixture) {
    let mut tree = abc.tree;

    let outcome = tree.delete(abc.a);

    assert_eq!(outcome, Outcome::Removed(vec![abc.a, abc.a1]));
    assert!(!tree.contains(abc.a1));
    assert!(tree.snapshot().find(abc.a1).is_none());
    assert_eq!(titles(&tree, abc.root), vec!["B", "C"]);
}

#[rstest]
fn given_root_when_deleting_then_rejected_and_tree_unchanged(abc: Fixture) {
    let mut tree = abc.tree;
    let before = tree.snapshot();

    assert_eq!(tree.delete(abc.root), Outcome::Unchanged);
    assert_eq!(tree.snapshot(), before);
}

// ============================================================
// ChangeLevel
// ============================================================

#[rstest]
#[case(1, 2)]
#[case(3, 4)]
#[case(-1, 0)]
#[case(-100, 0)]
fn given_level_one_node_when_changing_level_then_clamps_at_zero(
    abc: Fixture,
    #[case] delta: i32,
    #[case] expected: u32,
) {
    let mut tree = abc.tree;
    tree.change_level(abc.b, delta);
    assert_eq!(tree.find(abc.b).unwrap().level, expected);
}

#[rstest]
fn given_level_change_when_inspecting_structure_then_node_not_moved(abc: Fixture) {
    let mut tree = abc.tree;
    tree.change_level(abc.b, 5);

    assert_eq!(tree.parent_of(abc.b), Some(abc.root));
    assert_eq!(titles(&tree, abc.root), vec!["A", "B", "C"]);
}

#[rstest]
fn given_root_at_level_zero_when_decrementing_then_unchanged(abc: Fixture) {
    let mut tree = abc.tree;
    assert_eq!(tree.change_level(abc.root, -1), Outcome::Unchanged);
    assert_eq!(tree.find(abc.root).unwrap().level, 0);
}

// ============================================================
// MoveSibling
// ============================================================

#[rstest]
fn given_first_child_when_moving_up_then_no_op(abc: Fixture) {
    let mut tree = abc.tree;
    assert_eq!(tree.move_sibling(abc.a, Direction::Up), Outcome::Unchanged);
    assert_eq!(titles(&tree, abc.root), vec!["A", "B", "C"]);
}

#[rstest]
fn given_last_child_when_moving_down_then_no_op(abc: Fixture) {
    let mut tree = abc.tree;
    assert_eq!(tree.move_sibling(abc.c, Direction::Down), Outcome::Unchanged);
    assert_eq!(titles(&tree, abc.root), vec!["A", "B", "C"]);
}

#[rstest]
fn given_middle_child_when_moving_then_swaps_with_neighbour(abc: Fixture) {
    let mut tree = abc.tree;

    assert_eq!(tree.move_sibling(abc.b, Direction::Up), Outcome::Updated);
    assert_eq!(titles(&tree, abc.root), vec!["B", "A", "C"]);

    assert_eq!(tree.move_sibling(abc.b, Direction::Down), Outcome::Updated);
    assert_eq!(titles(&tree, abc.root), vec!["A", "B", "C"]);
}

#[rstest]
fn given_moved_node_when_inspecting_then_subtree_travels_with_it(abc: Fixture) {
    let mut tree = abc.tree;
    tree.move_sibling(abc.a, Direction::Down);

    assert_eq!(tree.children_of(abc.a), vec![abc.a1]);
    assert_eq!(tree.ids(), vec![abc.root, abc.b, abc.a, abc.a1, abc.c]);
}

#[rstest]
fn given_only_child_or_root_when_moving_then_no_op(abc: Fixture) {
    let mut tree = abc.tree;
    assert_eq!(tree.move_sibling(abc.a1, Direction::Up), Outcome::Unchanged);
    assert_eq!(tree.move_sibling(abc.a1, Direction::Down), Outcome::Unchanged);
    assert_eq!(tree.move_sibling(abc.root, Direction::Down), Outcome::Unchanged);
}

// ============================================================
// RenameNode
// ============================================================

#[rstest]
fn given_node_when_renaming_then_only_title_changes(abc: Fixture) {
    let mut tree = abc.tree;

    assert_eq!(tree.rename(abc.a, "Alpha"), Outcome::Updated);

    let data = tree.find(abc.a).unwrap();
    assert_eq!(data.title, "Alpha");
    assert_eq!(data.level, 1);
    assert_eq!(tree.children_of(abc.a), vec![abc.a1]);
}

#[rstest]
fn given_any_title_when_renaming_then_stored_verbatim(abc: Fixture) {
    let mut tree = abc.tree;
    tree.rename(abc.c, "");
    assert_eq!(tree.find(abc.c).unwrap().title, "");
    tree.rename(abc.c, "  \"quoted\" ünïcode\n");
    assert_eq!(tree.find(abc.c).unwrap().title, "  \"quoted\" ünïcode\n");
}

// ============================================================
// Serialize / Deserialize
// ============================================================

#[rstest]
fn given_tree_when_serializing_then_round_trips_exactly(abc: Fixture) {
    let mut tree = abc.tree;
    tree.change_level(abc.c, 7);
    tree.rename(abc.a1, "line\nbreak");

    let json = tree.to_json().unwrap();
    let restored = TreeArena::from_json(&json, Box::new(UuidSource)).unwrap();

    assert_eq!(restored.snapshot(), tree.snapshot());
    assert_eq!(restored.root_id(), abc.root);
}

#[rstest]
fn given_tree_when_serializing_then_pretty_prints_all_fields(abc: Fixture) {
    let json = abc.tree.to_json().unwrap();

    assert!(json.contains('\n'), "expected pretty-printed output");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["title"], "Root");
    assert_eq!(value["level"], 0);
    assert_eq!(value["id"], abc.root.to_string());
    assert_eq!(value["children"][0]["title"], "A");
    assert_eq!(value["children"][0]["children"][0]["level"], 2);
    assert_eq!(value["children"].as_array().unwrap().len(), 3);
}

#[test]
fn given_deep_chain_when_serializing_then_round_trips() {
    let mut tree = TreeArena::with_ids("Root", Box::new(SequentialIds::new()));
    let mut parent = tree.root_id();
    for i in 0..250 {
        parent = added(tree.add_child(parent, &format!("n{i}")));
    }
    assert_eq!(tree.depth(), 251);

    let json = tree.to_json().unwrap();
    let restored = TreeArena::from_json(&json, Box::new(UuidSource)).unwrap();

    assert_eq!(restored.node_count(), 251);
    assert_eq!(restored.find(parent).unwrap().level, 250);
    assert_eq!(restored.snapshot(), tree.snapshot());
}

#[test]
fn given_trailing_garbage_when_loading_then_fails() {
    let json = TreeArena::new("Root").to_json().unwrap() + " {}";
    assert!(TreeArena::from_json(&json, Box::new(UuidSource)).is_err());
}

#[test]
fn given_snapshot_with_duplicate_ids_when_loading_then_fails() {
    let id: NodeId = "00000000-0000-0000-0000-000000000007".parse().unwrap();
    let mut root = Node::leaf(id, "Root", 0);
    root.children.push(Node::leaf(id, "clone", 1));

    let result = TreeArena::from_snapshot(&root, Box::new(UuidSource));

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("duplicate node id"));
}

#[test]
fn given_loaded_tree_when_adding_then_new_ids_avoid_existing_ones() {
    let mut source = TreeArena::with_ids("Root", Box::new(SequentialIds::new()));
    let root = source.root_id();
    source.add_child(root, "A");
    let json = source.to_json().unwrap();

    let mut tree = TreeArena::from_json(&json, Box::new(SequentialIds::new())).unwrap();
    let fresh = added(tree.add_child(root, "B"));

    assert_eq!(tree.node_count(), 3);
    assert!(!source.contains(fresh));
}

#[test]
fn given_document_without_children_key_when_loading_then_defaults_to_leaf() {
    let json = r#"{ "id": "00000000-0000-0000-0000-000000000001", "title": "Solo", "level": 3 }"#;

    let tree = TreeArena::from_json(json, Box::new(UuidSource)).unwrap();

    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.find(tree.root_id()).unwrap().level, 3);
}

#[rstest]
#[case::not_json("not json")]
#[case::negative_level(r#"{ "id": "00000000-0000-0000-0000-000000000001", "title": "R", "level": -1, "children": [] }"#)]
#[case::bad_id(r#"{ "id": "root", "title": "R", "level": 0, "children": [] }"#)]
fn given_malformed_document_when_loading_then_fails(#[case] json: &str) {
    assert!(TreeArena::from_json(json, Box::new(UuidSource)).is_err());
}
