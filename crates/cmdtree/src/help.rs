//! Help rendering.
//!
//! The static form documents one command:
//!
//! ```text
//! A collection of commands
//!
//! Usage:
//!
//!     app cmd <command> [<argument>...]
//!
//! The commands are:
//!
//!     cat              print stdin
//!     echo             print its arguments
//!
//! Use "app help cmd <command>" for more information about a command.
//! ```
//!
//! The interactive form (`app help cmd cat`) walks the tree along its
//! arguments and renders the command it lands on.

use std::fmt::Write as _;
use std::io::Write;

use log::{debug, trace};

use crate::error::{DispatchError, UsageError, UsageErrorKind};
use crate::io::Output;
use crate::tree::{CommandTree, NodeId, NodeKind};

/// Width of the name column in command and topic listings.
pub const NAME_COLUMN_WIDTH: usize = 16;

/// Configuration for help rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpConfig {
    /// Minimum width of the name column in listings.
    pub name_width: usize,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            name_width: NAME_COLUMN_WIDTH,
        }
    }
}

impl CommandTree {
    /// Renders the help text of `id`.
    pub fn render_help(&self, id: NodeId) -> String {
        trace!("rendering help for {:?}", self.long_name(id));
        let command = self.command(id);
        let kind = self.kind(id);
        let mut out = String::new();

        // Writing into a String cannot fail.
        let _ = write!(out, "{}\n\n", to_title(command.get_short()));
        if kind != NodeKind::Topic {
            let _ = write!(out, "Usage:\n\n    {}\n\n", self.long_usage(id));
        }

        let long = command.get_long().trim();
        if !long.is_empty() {
            let _ = write!(out, "{long}\n\n");
        }

        if !self.has_children(id) {
            return out;
        }

        let (topics, commands): (Vec<NodeId>, Vec<NodeId>) = self
            .children(id)
            .into_iter()
            .partition(|&child| self.kind(child) == NodeKind::Topic);
        let help_path = self.help_path(id);

        out.push_str("The commands are:\n\n");
        self.write_listing(&mut out, &commands);
        let _ = write!(
            out,
            "\nUse \"{help_path} <command>\" for more information about a command.\n\n"
        );

        if topics.is_empty() {
            return out;
        }
        out.push_str("Additional help topics:\n\n");
        self.write_listing(&mut out, &topics);
        let _ = write!(
            out,
            "\nUse \"{help_path} <topic>\" for more information about that topic.\n\n"
        );
        out
    }

    fn write_listing(&self, out: &mut String, ids: &[NodeId]) {
        let width = self.help_config.name_width;
        for &child in ids {
            let _ = writeln!(
                out,
                "    {:<width$} {}",
                self.name(child),
                self.command(child).get_short()
            );
        }
    }

    /// The one-line usage of a runnable command, `usage: <long usage>`.
    ///
    /// Dispatchers and topics have no usage line.
    pub fn usage_line(&self, id: NodeId) -> Option<String> {
        self.command(id)
            .is_runnable()
            .then(|| format!("usage: {}", self.long_usage(id)))
    }

    /// Interactive help: follows `args` down from `id` and writes the help of
    /// the command reached to its standard output.
    ///
    /// Fails with an unknown help topic error, echoing every unmatched
    /// token, when a token names no child.
    pub fn help(&self, id: NodeId, args: &[String]) -> Result<(), DispatchError> {
        let Some((first, rest)) = args.split_first() else {
            return self.write_help(id, self.stdout(id));
        };

        match self.child(id, first) {
            Some(child) => self.help(child, rest),
            None => {
                let help_path = self.help_path(id);
                let message = format!(
                    "{help_path} {}: unknown help topic. Run \"{help_path}\"",
                    args.join(" ")
                );
                let kind = UsageErrorKind::UnknownHelpTopic;
                debug!("{kind}: {message}");
                Err(UsageError::new(id, kind, message).into())
            }
        }
    }

    /// Writes the help text of `id` to `out`.
    pub(crate) fn write_help(&self, id: NodeId, out: Output) -> Result<(), DispatchError> {
        self.emit(id, out, &self.render_help(id))
    }

    /// Writes the usage line of `id`, if it has one, to `out`.
    pub(crate) fn write_usage(&self, id: NodeId, out: Output) -> Result<(), DispatchError> {
        match self.usage_line(id) {
            Some(line) => self.emit(id, out, &format!("{line}\n")),
            None => Ok(()),
        }
    }

    fn emit(&self, id: NodeId, mut out: Output, text: &str) -> Result<(), DispatchError> {
        out.write_all(text.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|err| DispatchError::action(id, self.long_name(id), err))
    }
}

/// Collapses whitespace runs and upper-cases the first character.
fn to_title(s: &str) -> String {
    let joined = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
