//! Dialog history: which dialog lines have already been shown.
//!
//! Persisted form: one Hash key per shown line, no delimiters:
//!
//!   <mode><dialog name><line number><actor key>     e.g. `#ChetAgentStreetDialog14reyes`
//!
//! mode: `?` once, `#` show once, `&` once ever, `$` show once ever,
//! `^` temp once. Temp-once lines only last for the session and are
//! never written.
//!
//! Dialog names may contain digits, so the name/line boundary is found
//! by growing the name until it matches a registered dialog definition.
//! A registered name that is a proper prefix of another registered name
//! makes the boundary ambiguous; the shorter name wins.

use crate::resolver::Resolver;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogConditionMode {
    Once,
    ShowOnce,
    OnceEver,
    ShowOnceEver,
    TempOnce,
}

impl DialogConditionMode {
    pub fn prefix(self) -> char {
        match self {
            Self::Once         => '?',
            Self::ShowOnce     => '#',
            Self::OnceEver     => '&',
            Self::ShowOnceEver => '$',
            Self::TempOnce     => '^',
        }
    }

    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            '?' => Some(Self::Once),
            '#' => Some(Self::ShowOnce),
            '&' => Some(Self::OnceEver),
            '$' => Some(Self::ShowOnceEver),
            '^' => Some(Self::TempOnce),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogConditionState {
    pub mode:      DialogConditionMode,
    pub dialog:    String,
    pub line:      i64,
    pub actor_key: String,
}

/// Encode a state as a dialog-section key. Temp-once states yield `None`.
pub fn encode(state: &DialogConditionState) -> Option<String> {
    if state.mode == DialogConditionMode::TempOnce {
        return None;
    }
    Some(format!(
        "{}{}{}{}",
        state.mode.prefix(),
        state.dialog,
        state.line,
        state.actor_key
    ))
}

/// Value stored under an encoded key: 2 for show-once, 1 otherwise.
pub fn flag_for(mode: DialogConditionMode) -> i64 {
    if mode == DialogConditionMode::ShowOnce { 2 } else { 1 }
}

/// Decode a dialog-section key, probing `resolver` for dialog names.
/// Returns `None` (with a warning) for an unknown mode or a key whose
/// name never matches a registered definition.
pub fn decode(key: &str, resolver: &dyn Resolver) -> Option<DialogConditionState> {
    let mut chars = key.chars();
    let first = chars.next()?;
    let Some(mode) = DialogConditionMode::from_prefix(first) else {
        log::warn!("load: dialog key '{key}' has unknown mode '{first}'");
        return None;
    };
    let body = chars.as_str();

    // The name is at least the leading non-digit run.
    let mut end = body.find(|c: char| c.is_ascii_digit()).unwrap_or(body.len());
    while !resolver.has_dialog(&body[..end]) {
        match body[end..].chars().next() {
            Some(c) => end += c.len_utf8(),
            None => {
                log::warn!("load: dialog key '{key}' matches no dialog definition");
                return None;
            }
        }
    }
    let dialog = &body[..end];
    let rest = &body[end..];

    let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let line = rest[..digits].parse::<i64>().unwrap_or(0);

    Some(DialogConditionState {
        mode,
        dialog:    dialog.to_string(),
        line,
        actor_key: rest[digits..].to_string(),
    })
}

/// Live dialog-history state plus the registered dialog definitions.
#[derive(Debug, Default)]
pub struct DialogManager {
    definitions: BTreeSet<String>,
    states:      Vec<DialogConditionState>,
}

impl DialogManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_definition(&mut self, name: impl Into<String>) {
        self.definitions.insert(name.into());
    }

    pub fn has_definition(&self, name: &str) -> bool {
        self.definitions.contains(name)
    }

    /// Record that a line was shown. Duplicates are ignored.
    pub fn mark(&mut self, state: DialogConditionState) {
        if !self.states.contains(&state) {
            self.states.push(state);
        }
    }

    pub fn states(&self) -> &[DialogConditionState] {
        &self.states
    }

    pub fn replace_states(&mut self, states: Vec<DialogConditionState>) {
        self.states = states;
    }

    /// Drop session-scoped history (temp-once lines).
    pub fn clear_temporary(&mut self) {
        self.states.retain(|s| s.mode != DialogConditionMode::TempOnce);
    }
}
