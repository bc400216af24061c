//! Hierarchical command dispatch for go/git style CLIs.
//!
//! `cmdtree` hosts applications invoked as
//! `APPNAME COMMAND [SUBCOMMAND...] --FLAG ARGUMENT`. The application builds
//! a tree of commands; each command may run an action, carry its own flags,
//! host further commands, or exist only as a help topic. Usage lines, help
//! pages and error reporting are derived from the tree.
//!
//! # Features
//!
//! - **Registration**: [`CommandTree::add`] links commands, rejecting
//!   duplicate names (case-insensitively), cycles and re-parenting
//! - **Dispatch**: [`CommandTree::execute`] parses each command's flags with
//!   a fresh clap parser and recurses into the named child
//! - **Help**: `app help cmd`, `app cmd -h` and command listings are
//!   rendered from the tree
//! - **Streams**: stdin/stdout/stderr overrides are inherited down the tree
//! - **Errors**: usage errors are told apart from action failures by type
//!
//! # Example
//!
//! ```rust
//! use cmdtree::{Command, CommandTree, Output, SharedBuffer};
//! use std::io::Write;
//!
//! let mut tree = CommandTree::new();
//! let app = tree.insert(Command::new("app <command> [<argument>...]").short("an example"));
//! tree.add_command(
//!     app,
//!     Command::new("echo <argument>...")
//!         .short("print its arguments")
//!         .run(|ctx, args| {
//!             writeln!(ctx.stdout(), "{}", args.join(" "))?;
//!             Ok(())
//!         }),
//! )?;
//!
//! let out = SharedBuffer::new();
//! tree.set_stdout(app, Output::from_writer(out.clone()));
//!
//! tree.execute(app, ["echo", "hello", "world"])?;
//! assert_eq!(out.contents(), "hello world\n");
//!
//! let err = tree.execute(app, ["unknown"]).unwrap_err();
//! assert!(err.is_usage());
//! assert_eq!(err.to_string(), "app unknown: unknown command");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! In a binary, hand the root to [`CommandTree::main`], which reads the
//! process arguments, reports errors and exits.

mod command;
mod dispatch;
mod error;
mod flags;
mod help;
mod io;
mod run;
mod tree;

pub use command::{Action, Command};
pub use dispatch::Context;
pub use error::{DispatchError, TreeError, UsageError, UsageErrorKind};
pub use flags::FlagSetup;
pub use help::{HelpConfig, NAME_COLUMN_WIDTH};
pub use io::{Input, Output, SharedBuffer};
pub use run::{EXIT_FAILURE, EXIT_SUCCESS};
pub use tree::{CommandTree, NodeId, NodeKind};

// Re-exported so applications can declare flags without a direct clap
// dependency.
pub use clap;
