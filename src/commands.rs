//! Legacy command identifiers mapped onto native primitives.
//!
//! Formatting actions arrive as legacy identifier strings. Known identifiers
//! translate to [`NativeCommand`]s and cross the bridge; anything else is
//! reported unsupported with a neutral result (false or empty, never an
//! error) so callers can drive UI enablement from the queries alone.

use std::sync::Arc;

use tracing::error;

use crate::bridge::Bridge;
use crate::protocol::{NativeCommand, ScriptRequest};

/// Map a legacy command identifier onto its native primitive.
pub fn native_command(identifier: &str) -> Option<NativeCommand> {
    match identifier.to_ascii_lowercase().as_str() {
        "bold" => Some(NativeCommand::Bold),
        "italic" => Some(NativeCommand::Italic),
        "underline" => Some(NativeCommand::Underline),
        "strikethrough" => Some(NativeCommand::Strikethrough),
        "insertunorderedlist" => Some(NativeCommand::UnorderedList),
        "insertorderedlist" => Some(NativeCommand::OrderedList),
        "createlink" => Some(NativeCommand::CreateLink),
        "unlink" => Some(NativeCommand::Unlink),
        "removeformat" => Some(NativeCommand::RemoveFormat),
        "justifyleft" => Some(NativeCommand::JustifyLeft),
        "justifycenter" => Some(NativeCommand::JustifyCenter),
        "justifyright" => Some(NativeCommand::JustifyRight),
        "indent" => Some(NativeCommand::Indent),
        "outdent" => Some(NativeCommand::Outdent),
        _ => None,
    }
}

/// Execute/query surface for formatting commands.
pub struct CommandSet {
    bridge: Arc<Bridge>,
}

impl CommandSet {
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self { bridge }
    }

    pub fn is_supported(&self, identifier: &str) -> bool {
        native_command(identifier).is_some()
    }

    /// Apply a command. Unsupported identifiers and transport failures both
    /// come back as `false`.
    pub fn execute(&self, identifier: &str, value: Option<&str>) -> bool {
        let Some(command) = native_command(identifier) else {
            return false;
        };
        match self.bridge.call_bool(&ScriptRequest::ExecCommand {
            command,
            value: value.map(str::to_string),
        }) {
            Ok(applied) => applied,
            Err(err) => {
                error!(target = "bridge", command = identifier, error = %err, "command execution failed");
                false
            }
        }
    }

    pub fn query_state(&self, identifier: &str) -> bool {
        let Some(command) = native_command(identifier) else {
            return false;
        };
        self.bridge
            .call_bool(&ScriptRequest::QueryState { command })
            .unwrap_or(false)
    }

    pub fn query_value(&self, identifier: &str) -> String {
        let Some(command) = native_command(identifier) else {
            return String::new();
        };
        self.bridge
            .call_string(&ScriptRequest::QueryValue { command })
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    pub fn query_enabled(&self, identifier: &str) -> bool {
        let Some(command) = native_command(identifier) else {
            return false;
        };
        self.bridge
            .call_bool(&ScriptRequest::QueryEnabled { command })
            .unwrap_or(false)
    }
}
