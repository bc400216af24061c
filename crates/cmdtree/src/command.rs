//! The declarative command value.
//!
//! A [`Command`] only describes a command: its usage line, documentation,
//! optional action, optional flags and optional stream overrides. It becomes
//! part of a tree through [`CommandTree::insert`](crate::CommandTree::insert)
//! and [`CommandTree::add`](crate::CommandTree::add).
//!
//! ```rust
//! use cmdtree::Command;
//! use clap::{Arg, ArgAction};
//! use std::io::Write;
//!
//! let hello = Command::new("hello [--utf8] [--message <message>]")
//!     .short("print a hello message")
//!     .long("Command hello prints the well known \"hello, world\" message.")
//!     .flags(|cmd| {
//!         cmd.arg(Arg::new("utf8").long("utf8").action(ArgAction::SetTrue))
//!             .arg(Arg::new("message").long("message").default_value("world"))
//!     })
//!     .run(|ctx, _args| {
//!         let message = ctx.flags().get_one::<String>("message").cloned();
//!         writeln!(ctx.stdout(), "hello, {}", message.unwrap_or_default())?;
//!         Ok(())
//!     });
//!
//! assert_eq!(hello.name(), "hello");
//! assert!(hello.is_runnable());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::dispatch::Context;
use crate::flags::FlagSetup;
use crate::io::{Input, Output};

/// A command's action: receives the invocation context and the positional
/// arguments left after flag parsing.
pub type Action = Arc<dyn Fn(&Context<'_>, &[String]) -> anyhow::Result<()> + Send + Sync>;

/// A command in an application, like `run` in `go run`.
#[derive(Clone, Default)]
pub struct Command {
    usage: String,
    short: String,
    long: String,
    pub(crate) action: Option<Action>,
    pub(crate) flags: Option<FlagSetup>,
    pub(crate) stdin: Option<Input>,
    pub(crate) stdout: Option<Output>,
    pub(crate) stderr: Option<Output>,
}

impl Command {
    /// Creates a command from its usage line.
    ///
    /// The usage line documents flags and arguments but not parent
    /// commands. Its first word, lower-cased, is the command's name.
    /// Recommended syntax: `[]` marks optional parts, `<>` a value to be
    /// supplied and `...` repetition.
    pub fn new(usage: impl Into<String>) -> Self {
        Self {
            usage: usage.into(),
            ..Self::default()
        }
    }

    /// Sets the one-line summary shown in command listings.
    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = short.into();
        self
    }

    /// Sets the long description shown by help.
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }

    /// Sets the action, making the command runnable.
    pub fn run<F>(mut self, action: F) -> Self
    where
        F: Fn(&Context<'_>, &[String]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Sets the flag declaration callback.
    ///
    /// It runs once per invocation against a fresh parser, so flag values
    /// never leak from one invocation into the next. Declare flags only;
    /// positional arguments are collected by the dispatcher.
    pub fn flags<F>(mut self, setup: F) -> Self
    where
        F: Fn(clap::Command) -> clap::Command + Send + Sync + 'static,
    {
        self.flags = Some(Arc::new(setup));
        self
    }

    /// Overrides standard input for this command and its descendants.
    pub fn stdin(mut self, input: Input) -> Self {
        self.stdin = Some(input);
        self
    }

    /// Overrides standard output for this command and its descendants.
    pub fn stdout(mut self, output: Output) -> Self {
        self.stdout = Some(output);
        self
    }

    /// Overrides standard error for this command and its descendants.
    pub fn stderr(mut self, output: Output) -> Self {
        self.stderr = Some(output);
        self
    }

    pub fn get_usage(&self) -> &str {
        &self.usage
    }

    pub fn get_short(&self) -> &str {
        &self.short
    }

    pub fn get_long(&self) -> &str {
        &self.long
    }

    /// The command's name: the first word of its usage, lower-cased.
    ///
    /// Empty when the usage is blank.
    pub fn name(&self) -> String {
        self.usage
            .split_whitespace()
            .next()
            .map(str::to_lowercase)
            .unwrap_or_default()
    }

    /// Returns true if the command has an action.
    pub fn is_runnable(&self) -> bool {
        self.action.is_some()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("usage", &self.usage)
            .field("short", &self.short)
            .field("runnable", &self.action.is_some())
            .field("flags", &self.flags.is_some())
            .finish_non_exhaustive()
    }
}
