//! Analysis session driven through scripts and the service container

use std::sync::Arc;

use varitree::application::{
    parse_script, AnalysisSession, ApplicationError, ImportPolicy, ScriptCommand,
};
use varitree::config::Settings;
use varitree::domain::{CursorState, DomainError, MoveToken, RulesEngine, STARTING_FEN};
use varitree::infrastructure::{ServiceContainer, ShakmatyRules};
use varitree::render::{format_line, TreeNodeConvert};
use varitree::util::testing;

fn run(script: &str, policy: ImportPolicy) -> Result<AnalysisSession, ApplicationError> {
    testing::init_test_setup();
    let container = ServiceContainer::new(Settings::default());
    let mut session = container.session(None)?;
    for (_, cmd) in parse_script(script)? {
        session.execute(&cmd, policy)?;
    }
    Ok(session)
}

fn current_line(session: &AnalysisSession) -> String {
    let tree = session.tree();
    format_line(tree, &tree.line_to(session.cursor()))
}

#[test]
fn given_script_with_branch_when_run_then_cursor_ends_in_side_line() {
    // Arrange
    let script = "\
# Ruy Lopez against the Two Knights
line 1. e4 e5 2. Nf3 Nc6 3. Bb5
back
move Bc4
move Nf6
";

    // Act
    let session = run(script, ImportPolicy::Abort).unwrap();

    // Assert
    assert_eq!(current_line(&session), "1. e4 e5 2. Nf3 Nc6 3. Bc4 Nf6");
    assert_eq!(session.tree().len(), 8);
    assert_eq!(session.cursor_state(), CursorState::AtLeaf);
    assert!(!session.tree().is_main_line(session.cursor()));
}

#[test]
fn given_navigation_commands_when_run_then_forward_follows_main_line() {
    let script = "\
line e4 e5 Nf3
start
line d4
start
forward
forward
";
    let session = run(script, ImportPolicy::Abort).unwrap();
    assert_eq!(current_line(&session), "1. e4 e5");
}

#[test]
fn given_jump_path_when_run_then_cursor_on_that_variation() {
    let script = "\
line e4 e5
start
line e4 c5
jump 0.0
";
    let session = run(script, ImportPolicy::Abort).unwrap();
    assert_eq!(current_line(&session), "1. e4 e5");
    assert_eq!(session.tree().path_of(session.cursor()), Some(vec![0, 0]));
}

#[test]
fn given_illegal_move_under_abort_when_run_then_fails() {
    let result = run("line e4 e5\nmove Ke3\n", ImportPolicy::Abort);
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::IllegalMove { .. }))
    ));
}

#[test]
fn given_illegal_move_under_skip_when_run_then_ignored() {
    let session = run("line e4 e5\nmove Ke3\nmove Nf3\n", ImportPolicy::Skip).unwrap();
    assert_eq!(current_line(&session), "1. e4 e5 2. Nf3");
}

#[test]
fn given_reset_with_fen_when_run_then_tree_starts_there() {
    let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
    let script = format!("line e4 e5\nreset {fen}\nmove e4\n");

    let session = run(&script, ImportPolicy::Abort).unwrap();

    assert_eq!(session.tree().len(), 2);
    let root = session.tree().root();
    assert_eq!(session.tree().position(root).map(|p| p.as_str()), Some(fen));
}

#[test]
fn given_reset_startpos_when_run_then_back_to_initial_position() {
    let session = run("line d4 d5\nreset startpos\n", ImportPolicy::Abort).unwrap();
    assert_eq!(session.tree().len(), 1);
    assert_eq!(session.position().map(|p| p.as_str()), Some(STARTING_FEN));
}

#[test]
fn given_comment_and_eval_when_run_then_attached_to_cursor_node() {
    let session = run("line e4 c5\ncomment Sicilian\neval +0.3\n", ImportPolicy::Abort).unwrap();

    let ann = session.annotation(session.cursor()).unwrap();
    assert_eq!(ann.comment.as_deref(), Some("Sicilian"));
    assert_eq!(ann.evaluation.as_deref(), Some("+0.3"));

    let rendered = session.to_tree_string().to_string();
    assert!(rendered.contains("{Sicilian}"));
    assert!(rendered.contains("(+0.3)"));
}

#[test]
fn given_show_command_when_executed_then_session_unchanged() {
    let mut session = run("line e4\n", ImportPolicy::Abort).unwrap();
    let before = session.cursor();
    session
        .execute(&ScriptCommand::Show, ImportPolicy::Abort)
        .unwrap();
    assert_eq!(session.cursor(), before);
}

#[test]
fn given_strict_rules_when_playing_coordinates_then_rejected() {
    let rules = Arc::new(ShakmatyRules::strict());
    let start = rules.starting_position();
    let mut session = AnalysisSession::new(rules, start);

    assert!(session.play(&MoveToken::from("e2-e4")).is_err());
    assert!(session.play(&MoveToken::from("e4")).is_ok());
}

#[test]
fn given_board_drag_token_when_playing_then_accepted_in_strict_mode() {
    let rules = Arc::new(ShakmatyRules::strict());
    let start = rules.starting_position();
    let mut session = AnalysisSession::new(rules, start);

    let node = session
        .play(&MoveToken::coordinates("g1", "f3", None))
        .unwrap();

    let mv = session.tree().get(node).and_then(|n| n.mv.as_ref()).unwrap();
    assert_eq!(mv.san, "Nf3");
}
