//! Argument dispatch.
//!
//! [`CommandTree::execute`] resolves an argument vector against the tree,
//! one command at a time:
//!
//! ```text
//! args
//!   → flag phase     (fresh parser; -h/--help renders help and stops)
//!   → runnable?      run the action with the positional arguments
//!   → dispatcher?    no args: help; "help ...": interactive help;
//!                    otherwise look up the first arg and recurse
//!   → topic?         unknown command
//! ```
//!
//! Flag values live in the [`Context`] of the invocation, never on the
//! tree, so several invocations may run over the same tree at once.

use clap::ArgMatches;
use log::debug;

use crate::error::{DispatchError, UsageError, UsageErrorKind};
use crate::flags::{self, FlagOutcome, ParsedFlags};
use crate::io::{Input, Output};
use crate::tree::{CommandTree, NodeId, NodeKind};

/// What an action sees of its invocation.
#[derive(Debug)]
pub struct Context<'a> {
    tree: &'a CommandTree,
    node: NodeId,
    flags: ArgMatches,
}

impl<'a> Context<'a> {
    /// The tree being executed.
    pub fn tree(&self) -> &'a CommandTree {
        self.tree
    }

    /// The command being run.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn name(&self) -> String {
        self.tree.name(self.node)
    }

    /// The command's full path, e.g. `app cmd cat`.
    pub fn long_name(&self) -> String {
        self.tree.long_name(self.node)
    }

    /// The flags parsed for this invocation.
    pub fn flags(&self) -> &ArgMatches {
        &self.flags
    }

    pub fn stdin(&self) -> Input {
        self.tree.stdin(self.node)
    }

    pub fn stdout(&self) -> Output {
        self.tree.stdout(self.node)
    }

    pub fn stderr(&self) -> Output {
        self.tree.stderr(self.node)
    }

    /// Builds a usage error for this command, for actions that reject
    /// their arguments:
    ///
    /// ```rust,ignore
    /// if args.is_empty() {
    ///     return Err(ctx.usage_error("expecting arguments").into());
    /// }
    /// ```
    pub fn usage_error(&self, msg: impl AsRef<str>) -> UsageError {
        self.tree
            .usage_error(self.node, UsageErrorKind::Invalid, msg.as_ref())
    }
}

impl CommandTree {
    /// Executes `id` with the arguments that follow its name.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to another tree.
    pub fn execute<I, S>(&self, id: NodeId, args: I) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        self.execute_node(id, &args)
    }

    fn execute_node(&self, id: NodeId, args: &[String]) -> Result<(), DispatchError> {
        debug!("executing {:?} with {:?}", self.long_name(id), args);
        let command = self.command(id);

        let ParsedFlags {
            matches,
            positionals,
        } = match flags::parse(&command.name(), command.flags.as_ref(), args) {
            Ok(FlagOutcome::Parsed(parsed)) => parsed,
            Ok(FlagOutcome::Help) => return self.help_requested(id),
            Err(msg) => return Err(self.usage_error(id, UsageErrorKind::FlagParse, &msg).into()),
        };

        match (command.action.as_ref(), self.kind(id)) {
            (Some(action), _) => {
                let ctx = Context {
                    tree: self,
                    node: id,
                    flags: matches,
                };
                action(&ctx, &positionals)
                    .map_err(|err| DispatchError::classify(id, self.long_name(id), err))
            }
            (None, NodeKind::Topic) => {
                Err(self.usage_error(id, UsageErrorKind::UnknownCommand, "unknown command").into())
            }
            (None, _) => self.dispatch(id, &positionals),
        }
    }

    /// Resolves the first positional argument of a dispatcher.
    fn dispatch(&self, id: NodeId, args: &[String]) -> Result<(), DispatchError> {
        let Some((first, rest)) = args.split_first() else {
            return self.write_help(id, self.stderr(id));
        };

        if first.to_lowercase() == "help" {
            return self.help(id, rest);
        }

        match self.child(id, first) {
            Some(child) => self.execute_node(child, rest),
            None => {
                let kind = UsageErrorKind::UnknownCommand;
                let message = format!("{} {}: unknown command", self.long_name(id), first);
                debug!("{kind}: {message}");
                Err(UsageError::new(id, kind, message).into())
            }
        }
    }

    /// Answers `-h`/`--help`: dispatchers list their commands on stderr,
    /// topics print their text on stdout, runnables print their usage line
    /// on stderr.
    fn help_requested(&self, id: NodeId) -> Result<(), DispatchError> {
        if self.has_children(id) {
            return self.write_help(id, self.stderr(id));
        }
        match self.kind(id) {
            NodeKind::Topic => self.write_help(id, self.stdout(id)),
            _ => self.write_usage(id, self.stderr(id)),
        }
    }

    /// A usage error attributed to `id`: `"<long name>: <msg>"`.
    pub(crate) fn usage_error(&self, id: NodeId, kind: UsageErrorKind, msg: &str) -> UsageError {
        let message = format!("{}: {}", self.long_name(id), msg);
        debug!("{kind}: {message}");
        UsageError::new(id, kind, message)
    }
}
