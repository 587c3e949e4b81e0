//! Native formatting command state.
//!
//! Commands are pure execute/query pairs: executing toggles or applies the
//! primitive, queries report state/value/enablement. Anything the registry
//! does not know is reported unsupported by the host-side mapping layer and
//! never reaches this code.

use std::collections::HashMap;

use crate::protocol::NativeCommand;

#[derive(Debug, Clone)]
pub struct LinkTarget {
    pub href: String,
    pub text: String,
}

#[derive(Default)]
pub struct CommandRegistry {
    active: HashMap<NativeCommand, bool>,
    link: Option<LinkTarget>,
}

const JUSTIFY_GROUP: &[NativeCommand] = &[
    NativeCommand::JustifyLeft,
    NativeCommand::JustifyCenter,
    NativeCommand::JustifyRight,
];

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inline wrapper tag for character formatting commands.
    pub fn wrap_tag(command: NativeCommand) -> Option<&'static str> {
        match command {
            NativeCommand::Bold => Some("b"),
            NativeCommand::Italic => Some("i"),
            NativeCommand::Underline => Some("u"),
            NativeCommand::Strikethrough => Some("strike"),
            _ => None,
        }
    }

    pub fn toggle(&mut self, command: NativeCommand) -> bool {
        let state = !self.state(command);
        self.set_active(command, state);
        state
    }

    pub fn set_active(&mut self, command: NativeCommand, on: bool) {
        if on && JUSTIFY_GROUP.contains(&command) {
            for &other in JUSTIFY_GROUP {
                self.active.insert(other, false);
            }
        }
        self.active.insert(command, on);
    }

    pub fn state(&self, command: NativeCommand) -> bool {
        match command {
            NativeCommand::CreateLink | NativeCommand::Unlink => self.link.is_some(),
            _ => self.active.get(&command).copied().unwrap_or(false),
        }
    }

    pub fn value(&self, command: NativeCommand) -> String {
        match command {
            NativeCommand::CreateLink | NativeCommand::Unlink => self
                .link
                .as_ref()
                .map(|link| link.href.clone())
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    pub fn enabled(&self, command: NativeCommand) -> bool {
        match command {
            NativeCommand::Unlink => self.link.is_some(),
            _ => true,
        }
    }

    pub fn set_link(&mut self, href: String, text: String) {
        self.link = Some(LinkTarget { href, text });
    }

    pub fn clear_link(&mut self) -> bool {
        self.link.take().is_some()
    }

    pub fn link(&self) -> Option<&LinkTarget> {
        self.link.as_ref()
    }

    pub fn reset_formatting(&mut self) {
        self.active.clear();
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.link = None;
    }
}
