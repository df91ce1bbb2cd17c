//! Scripted Bot
//!
//! Replays a fixed list of JSON-encoded actions, wrapping around at the end.
//! Lines that do not parse as an action are reported as malformed decisions.

use arena_events::{Action, Observation};

use super::{Bot, BotError};

#[derive(Debug, Clone)]
pub struct ScriptedBot {
    name: String,
    script: Vec<String>,
    cursor: usize,
}

impl ScriptedBot {
    pub const DEFAULT_NAME: &'static str = "ScriptedBot";

    pub fn new(name: impl Into<String>, script: Vec<String>) -> Self {
        Self {
            name: name.into(),
            script,
            cursor: 0,
        }
    }

    /// Script that repeats a single action forever
    pub fn repeating(name: impl Into<String>, action: &Action) -> Self {
        let line = serde_json::to_string(action).unwrap_or_default();
        Self::new(name, vec![line])
    }
}

impl Bot for ScriptedBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn act(&mut self, _observation: &Observation) -> Result<Action, BotError> {
        if self.script.is_empty() {
            return Err(BotError::Failed("empty script".to_string()));
        }
        let line = &self.script[self.cursor % self.script.len()];
        self.cursor = self.cursor.wrapping_add(1);
        Action::from_json(line).map_err(|e| BotError::Malformed(format!("{}: {}", line, e)))
    }
}
