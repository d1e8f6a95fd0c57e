//! Text rendering of variation trees
//!
//! Runs of single continuations are folded into one label, so a tree only
//! nests where a line actually branches. At a branch the main line comes first.
//!
//! ```text
//! start
//! └── 1. e4 e5 2. Nf3
//!     ├── 2... Nc6 3. Bb5
//!     └── 2... d6
//! ```

use itertools::Itertools;
use termtree::Tree;

use crate::application::AnalysisSession;
use crate::domain::{NodeId, Side, VariationTree};

/// Rendering knobs, see `DisplayConfig`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub show_fen: bool,
    /// Node to bracket as the cursor
    pub cursor: Option<NodeId>,
}

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for VariationTree {
    fn to_tree_string(&self) -> Tree<String> {
        render_tree(self, RenderOptions::default(), |_| None)
    }
}

impl TreeNodeConvert for AnalysisSession {
    fn to_tree_string(&self) -> Tree<String> {
        let options = RenderOptions {
            show_fen: false,
            cursor: Some(self.cursor()),
        };
        render_session(self, options)
    }
}

/// Render a session with its annotations.
pub fn render_session(session: &AnalysisSession, options: RenderOptions) -> Tree<String> {
    render_tree(session.tree(), options, |idx| {
        let ann = session.annotation(idx)?;
        let parts: Vec<String> = ann
            .evaluation
            .iter()
            .map(|e| format!("({e})"))
            .chain(ann.comment.iter().map(|c| format!("{{{c}}}")))
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    })
}

/// Render `tree` as a termtree, `note` supplies optional text shown after a move.
pub fn render_tree<F>(tree: &VariationTree, options: RenderOptions, note: F) -> Tree<String>
where
    F: Fn(NodeId) -> Option<String>,
{
    let root = tree.root();
    let mut root_label = mark("start".to_string(), options.cursor == Some(root));
    if let Some(text) = note(root) {
        root_label = format!("{root_label} {text}");
    }
    if options.show_fen {
        if let Some(pos) = tree.position(root) {
            root_label = format!("{root_label}  [{pos}]");
        }
    }

    let mut out = Tree::new(root_label);
    let mut stack: Vec<(NodeId, Vec<usize>)> = Vec::new();
    for &child in tree.children(root).iter().rev() {
        stack.push((child, Vec::new()));
    }

    // Each entry is a segment start plus the leaf path of its parent segment in `out`.
    while let Some((start, parent_path)) = stack.pop() {
        let segment = collect_segment(tree, start);
        let label = segment_label(tree, &segment, &options, &note);

        let Some(parent) = subtree_at(&mut out, &parent_path) else {
            continue;
        };
        parent.push(Tree::new(label));
        let mut own_path = parent_path;
        own_path.push(parent.leaves.len() - 1);

        if let Some(&last) = segment.last() {
            for &child in tree.children(last).iter().rev() {
                stack.push((child, own_path.clone()));
            }
        }
    }
    out
}

fn subtree_at<'a>(tree: &'a mut Tree<String>, path: &[usize]) -> Option<&'a mut Tree<String>> {
    path.iter()
        .try_fold(tree, |node, &i| node.leaves.get_mut(i))
}

/// Follow single continuations from `start` until a leaf or a branch point.
fn collect_segment(tree: &VariationTree, start: NodeId) -> Vec<NodeId> {
    let mut segment = vec![start];
    let mut current = start;
    while let [only] = tree.children(current) {
        segment.push(*only);
        current = *only;
    }
    segment
}

fn segment_label<F>(tree: &VariationTree, segment: &[NodeId], options: &RenderOptions, note: &F) -> String
where
    F: Fn(NodeId) -> Option<String>,
{
    segment
        .iter()
        .enumerate()
        .filter_map(|(i, &idx)| {
            let mut text = move_text(tree, idx, i == 0)?;
            text = mark(text, options.cursor == Some(idx));
            if let Some(extra) = note(idx) {
                text = format!("{text} {extra}");
            }
            if options.show_fen {
                if let Some(pos) = tree.position(idx) {
                    text = format!("{text}  [{pos}]");
                }
            }
            Some(text)
        })
        .join(" ")
}

fn mark(text: String, is_cursor: bool) -> String {
    if is_cursor {
        format!("[{text}]")
    } else {
        text
    }
}

/// SAN of the move into `idx` with its move number.
///
/// White moves always carry a number; Black moves only when `force_number` is set
/// (first move of a line), written as `n...`.
pub fn move_text(tree: &VariationTree, idx: NodeId, force_number: bool) -> Option<String> {
    let node = tree.get(idx)?;
    let mv = node.mv.as_ref()?;
    let before = tree.position(node.parent?)?;
    let number = before.fullmove_number().unwrap_or(1);
    Some(match before.side_to_move() {
        Some(Side::Black) if force_number => format!("{number}... {mv}"),
        Some(Side::Black) => mv.to_string(),
        _ => format!("{number}. {mv}"),
    })
}

/// Numbered move text of `line`, a root-to-node sequence as from `line_to`.
pub fn format_line(tree: &VariationTree, line: &[NodeId]) -> String {
    line.iter()
        .filter(|&&idx| tree.parent(idx).is_some())
        .enumerate()
        .filter_map(|(i, &idx)| move_text(tree, idx, i == 0))
        .join(" ")
}
