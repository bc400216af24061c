//! Process entry point.

use std::error::Error as _;
use std::io::{self, Write};

use log::warn;

use crate::error::{DispatchError, TreeError};
use crate::io::Output;
use crate::tree::{CommandTree, NodeId};

/// Exit status of a successful run.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit status after a usage or execution error.
pub const EXIT_FAILURE: i32 = 1;

impl CommandTree {
    /// Executes the root command `root` and reports errors on its standard
    /// error, returning the process exit status.
    ///
    /// A usage error prints the message, the usage line of the command it is
    /// attributed to and a `Run "<help path>" for details.` hint. Any other
    /// error prints the message and its chain of causes, followed by a
    /// period.
    pub fn run<I, S>(&self, root: NodeId, args: I) -> Result<i32, TreeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.is_root(root) {
            return Err(TreeError::NotRoot {
                command: self.long_name(root),
            });
        }

        let Err(err) = self.execute(root, args) else {
            return Ok(EXIT_SUCCESS);
        };
        if let Err(io_err) = self.report(root, &err) {
            warn!("could not report {:?}: {}", err.to_string(), io_err);
        }
        Ok(EXIT_FAILURE)
    }

    fn report(&self, root: NodeId, err: &DispatchError) -> io::Result<()> {
        let mut out: Output = self.stderr(root);
        match err {
            DispatchError::Usage(usage) => {
                writeln!(out, "{usage}")?;
                let from = usage.node();
                if let Some(line) = self.usage_line(from) {
                    writeln!(out, "{line}")?;
                }
                writeln!(out, "Run {:?} for details.", self.help_path(from))?;
            }
            DispatchError::Action { .. } => {
                write!(out, "{err}")?;
                // The first source is the action's error, already shown.
                let mut cause = err.source().and_then(|source| source.source());
                while let Some(next) = cause {
                    write!(out, ": {next}")?;
                    cause = next.source();
                }
                writeln!(out, ".")?;
            }
        }
        out.flush()
    }

    /// Runs `root` with the process arguments and exits.
    ///
    /// # Panics
    ///
    /// Panics if `root` has a parent.
    pub fn main(&self, root: NodeId) -> ! {
        let args = std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned());
        match self.run(root, args) {
            Ok(status) => std::process::exit(status),
            Err(err) => panic!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Command, SharedBuffer};

    fn app() -> (CommandTree, NodeId, SharedBuffer) {
        let mut tree = CommandTree::new();
        let app = tree.insert(Command::new("app <command>"));
        tree.add_command(
            app,
            Command::new("error").run(|_, _| Err(anyhow::anyhow!("an error from a command"))),
        )
        .unwrap();
        tree.add_command(
            app,
            Command::new("usage <argument>")
                .run(|ctx, _| Err(ctx.usage_error("expecting arguments").into())),
        )
        .unwrap();
        tree.add_command(app, Command::new("ok").run(|_, _| Ok(())))
            .unwrap();
        let err = SharedBuffer::new();
        tree.set_stderr(app, Output::from_writer(err.clone()));
        (tree, app, err)
    }

    #[test]
    fn test_success_status() {
        let (tree, app, err) = app();
        assert_eq!(tree.run(app, ["ok"]), Ok(EXIT_SUCCESS));
        assert_eq!(err.contents(), "");
    }

    #[test]
    fn test_execution_error_report() {
        let (tree, app, err) = app();
        assert_eq!(tree.run(app, ["error"]), Ok(EXIT_FAILURE));
        assert_eq!(err.contents(), "app error: an error from a command.\n");
    }

    #[test]
    fn test_execution_error_report_includes_causes() {
        use anyhow::Context as _;

        let (mut tree, app, err) = app();
        tree.add_command(
            app,
            Command::new("save").run(|_, _| {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
                    .context("writing notes.txt")
                    .context("saving notes")
            }),
        )
        .unwrap();

        assert_eq!(tree.run(app, ["save"]), Ok(EXIT_FAILURE));
        assert_eq!(
            err.contents(),
            "app save: saving notes: writing notes.txt: disk full.\n"
        );
    }

    #[test]
    fn test_usage_error_report() {
        let (tree, app, err) = app();
        assert_eq!(tree.run(app, ["usage"]), Ok(EXIT_FAILURE));
        assert_eq!(
            err.contents(),
            "app usage: expecting arguments\nusage: app usage <argument>\nRun \"app help usage\" for details.\n"
        );
    }

    #[test]
    fn test_unknown_command_report_has_no_usage_line() {
        let (tree, app, err) = app();
        assert_eq!(tree.run(app, ["bogus"]), Ok(EXIT_FAILURE));
        assert_eq!(
            err.contents(),
            "app bogus: unknown command\nRun \"app help\" for details.\n"
        );
    }

    #[test]
    fn test_run_requires_root() {
        let (tree, app, _) = app();
        let child = tree.child(app, "ok").unwrap();
        let err = tree.run(child, Vec::<String>::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"command "app ok": running the entry point on a command with a parent"#
        );
    }
}
