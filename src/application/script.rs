//! Line-oriented session scripts
//!
//! ```text
//! # comment
//! line e4 e5 Nf3
//! back
//! move Nc3
//! jump 0.0
//! comment main line
//! reset startpos
//! ```

use tracing::{instrument, warn};

use crate::application::session::{AnalysisSession, ImportPolicy};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{split_movetext, MoveToken};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Move(MoveToken),
    Line(Vec<MoveToken>),
    Back,
    Forward,
    Start,
    End,
    /// Child indices from the root; empty means the root
    Jump(Vec<usize>),
    /// None resets to the standard starting position
    Reset(Option<String>),
    Comment(String),
    Eval(String),
    Show,
}

impl ScriptCommand {
    /// Parse one script line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((line, ""));

        let require = |what: &str| argument(word, rest, what);

        let cmd = match word {
            "move" => ScriptCommand::Move(MoveToken::from(require("a move")?)),
            "line" => ScriptCommand::Line(split_movetext(require("moves")?)),
            "back" => ScriptCommand::Back,
            "forward" => ScriptCommand::Forward,
            "start" => ScriptCommand::Start,
            "end" => ScriptCommand::End,
            "jump" => ScriptCommand::Jump(parse_path(require("a path")?)?),
            "reset" => match require("a FEN or 'startpos'")? {
                "startpos" => ScriptCommand::Reset(None),
                fen => ScriptCommand::Reset(Some(fen.to_string())),
            },
            "comment" => ScriptCommand::Comment(require("text")?.to_string()),
            "eval" => ScriptCommand::Eval(require("text")?.to_string()),
            "show" => ScriptCommand::Show,
            other => return Err(format!("unknown command '{other}'")),
        };
        Ok(Some(cmd))
    }
}

fn argument<'a>(word: &str, rest: &'a str, what: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("'{word}' needs {what}"))
    } else {
        Ok(rest)
    }
}

/// `root` or dot-separated child indices such as `0.1.0`.
fn parse_path(text: &str) -> Result<Vec<usize>, String> {
    if text == "root" {
        return Ok(Vec::new());
    }
    text.split('.')
        .map(|part| {
            part.parse::<usize>()
                .map_err(|_| format!("invalid path '{text}'"))
        })
        .collect()
}

/// Parse a whole script, keeping 1-based line numbers.
pub fn parse_script(text: &str) -> ApplicationResult<Vec<(usize, ScriptCommand)>> {
    let mut commands = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let parsed = ScriptCommand::parse(line).map_err(|message| ApplicationError::Script {
            line: i + 1,
            message,
        })?;
        if let Some(cmd) = parsed {
            commands.push((i + 1, cmd));
        }
    }
    Ok(commands)
}

impl AnalysisSession {
    /// Apply one script command. `Show` has no effect on the session.
    ///
    /// Under [`ImportPolicy::Skip`] an illegal `move` is logged and ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn execute(&mut self, cmd: &ScriptCommand, policy: ImportPolicy) -> ApplicationResult<()> {
        match cmd {
            ScriptCommand::Move(token) => match self.play(token) {
                Err(ApplicationError::Domain(e)) if policy == ImportPolicy::Skip => {
                    warn!(%token, error = %e, "skipping move");
                }
                other => {
                    other?;
                }
            },
            ScriptCommand::Line(tokens) => {
                self.import_line(tokens, policy)?;
            }
            ScriptCommand::Back => {
                self.back();
            }
            ScriptCommand::Forward => {
                self.forward();
            }
            ScriptCommand::Start => {
                self.to_start();
            }
            ScriptCommand::End => {
                self.to_end();
            }
            ScriptCommand::Jump(path) => {
                self.jump_path(path)?;
            }
            ScriptCommand::Reset(Some(fen)) => {
                self.reset(fen)?;
            }
            ScriptCommand::Reset(None) => {
                self.reset_to_start();
            }
            ScriptCommand::Comment(text) => self.annotate(self.cursor(), text)?,
            ScriptCommand::Eval(text) => self.set_evaluation(self.cursor(), text)?,
            ScriptCommand::Show => {}
        }
        Ok(())
    }
}
