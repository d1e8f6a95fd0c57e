//! Tree builder scenarios against the real rules engine

use rstest::{fixture, rstest};

use varitree::domain::{
    CursorState, DomainError, MoveToken, RulesEngine, TreeBuilder, VariationTree, STARTING_FEN,
};
use varitree::infrastructure::ShakmatyRules;

fn tokens(moves: &str) -> Vec<MoveToken> {
    moves.split_whitespace().map(MoveToken::from).collect()
}

#[fixture]
fn rules() -> ShakmatyRules {
    ShakmatyRules::default()
}

#[rstest]
fn given_three_moves_when_building_then_chain_of_four_with_cursor_at_end(rules: ShakmatyRules) {
    // Arrange
    let builder = TreeBuilder::new(&rules);

    // Act
    let (tree, cursor) = builder
        .build_from_moves(&tokens("e4 e5 Nf3"), rules.starting_position())
        .unwrap();

    // Assert
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.depth(), 4);
    assert_eq!(tree.main_line().last(), Some(&cursor));
    assert_eq!(tree.cursor_state(cursor), CursorState::AtLeaf);
    assert_eq!(
        tree.position(cursor).map(|p| p.as_str()),
        Some("rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2")
    );
}

#[rstest]
fn given_built_line_when_branching_after_black_reply_then_s2_has_two_children(rules: ShakmatyRules) {
    // Arrange
    let builder = TreeBuilder::new(&rules);
    let (mut tree, s3) = builder
        .build_from_moves(&tokens("e4 e5 Nf3"), rules.starting_position())
        .unwrap();
    let s2 = tree.step_back(s3);

    // Act: White to move at S2, so the alternative is a White move
    let bc4 = builder.play(&mut tree, s2, &MoveToken::from("Bc4")).unwrap();

    // Assert
    assert_eq!(tree.children(s2).len(), 2);
    assert_eq!(tree.children(s2), &[s3, bc4]);
    assert_eq!(tree.parent(bc4), Some(s2));
    assert_eq!(tree.len(), 5);
    // forward keeps to the main line
    assert_eq!(tree.step_forward(s2), s3);
    assert!(!tree.is_main_line(bc4));
}

#[rstest]
fn given_existing_first_move_when_reinserting_at_root_then_reused(rules: ShakmatyRules) {
    // Arrange
    let builder = TreeBuilder::new(&rules);
    let (mut tree, _) = builder
        .build_from_moves(&tokens("e4 e5 Nf3"), rules.starting_position())
        .unwrap();
    let root = tree.root();
    let s1 = tree.children(root)[0];

    // Act
    let again = builder.play(&mut tree, root, &MoveToken::from("e4")).unwrap();

    // Assert
    assert_eq!(again, s1);
    assert_eq!(tree.children(root).len(), 1);
    assert_eq!(tree.len(), 4);
}

#[rstest]
fn given_illegal_token_in_sequence_when_inserting_then_tree_untouched_and_index_reported(
    rules: ShakmatyRules,
) {
    // Arrange
    let builder = TreeBuilder::new(&rules);
    let mut tree = VariationTree::new(rules.starting_position());
    let root = tree.root();

    // Act
    let result = builder.insert_move_sequence(&mut tree, root, &tokens("d4 d5 c4 Qxh7"));

    // Assert
    match result {
        Err(DomainError::IllegalMove { index, token, .. }) => {
            assert_eq!(index, 3);
            assert_eq!(token, MoveToken::from("Qxh7"));
        }
        other => panic!("expected illegal move, got {other:?}"),
    }
    assert_eq!(tree.len(), 1);
}

#[rstest]
fn given_transposition_when_inserting_then_separate_nodes_per_path(rules: ShakmatyRules) {
    // Arrange
    let builder = TreeBuilder::new(&rules);
    let mut tree = VariationTree::new(rules.starting_position());
    let root = tree.root();

    // Act
    let a = builder
        .insert_move_sequence(&mut tree, root, &tokens("e4 e5 d4"))
        .unwrap();
    let b = builder
        .insert_move_sequence(&mut tree, root, &tokens("d4 e5 e4"))
        .unwrap();

    // Assert
    assert_ne!(a, b);
    assert_eq!(tree.position(a), tree.position(b));
    assert_eq!(tree.len(), 7);
}

#[rstest]
fn given_empty_sequence_when_building_then_root_only(rules: ShakmatyRules) {
    let builder = TreeBuilder::new(&rules);
    let (tree, cursor) = builder
        .build_from_moves(&[], rules.starting_position())
        .unwrap();
    assert_eq!(cursor, tree.root());
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.position(cursor).map(|p| p.as_str()), Some(STARTING_FEN));
}

#[rstest]
fn given_custom_start_when_building_then_moves_apply_from_it(rules: ShakmatyRules) {
    // Arrange
    let start = rules.validate("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
    let builder = TreeBuilder::new(&rules);

    // Act
    let (tree, cursor) = builder.build_from_moves(&tokens("e4 Kd7"), start).unwrap();

    // Assert
    assert_eq!(tree.len(), 3);
    let mv = tree.get(cursor).and_then(|n| n.mv.as_ref()).unwrap();
    assert_eq!(mv.san, "Kd7");
    assert_eq!(mv.piece, 'k');
}
