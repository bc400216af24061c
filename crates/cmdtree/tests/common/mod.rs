//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::io::{Read, Write};

use cmdtree::clap::{Arg, ArgAction};
use cmdtree::{Command, CommandTree, Input, NodeId, Output, SharedBuffer};

/// Captured streams of a tree under test.
pub struct Captured {
    pub out: SharedBuffer,
    pub err: SharedBuffer,
}

impl Captured {
    /// Installs `input` and two fresh buffers as the streams of `id`.
    pub fn install(tree: &mut CommandTree, id: NodeId, input: &str) -> Self {
        let out = SharedBuffer::new();
        let err = SharedBuffer::new();
        tree.set_stdin(id, Input::from_string(input));
        tree.set_stdout(id, Output::from_writer(out.clone()));
        tree.set_stderr(id, Output::from_writer(err.clone()));
        Self { out, err }
    }

    pub fn out(&self) -> String {
        self.out.contents().trim().to_string()
    }

    pub fn err(&self) -> String {
        self.err.contents().trim().to_string()
    }
}

pub fn echo_to_stderr() -> Command {
    Command::new("echo <argument>...")
        .short("print its arguments")
        .run(|ctx, args| {
            writeln!(ctx.stderr(), "{}", args.join(" "))?;
            Ok(())
        })
}

pub fn cat() -> Command {
    Command::new("cat")
        .short("print stdin")
        .long("Command cat is used to print the content of the stdin into the stdout.")
        .run(|ctx, _| {
            let mut text = String::new();
            ctx.stdin().read_to_string(&mut text)?;
            write!(ctx.stdout(), "{text}")?;
            Ok(())
        })
}

pub fn failing() -> Command {
    Command::new("error")
        .short("always return an error")
        .run(|_, _| Err(anyhow::anyhow!("an error from a command")))
}

pub fn usage_failing() -> Command {
    Command::new("error <argument>...")
        .short("always return an error")
        .run(|ctx, _| Err(ctx.usage_error("expecting arguments").into()))
}

pub fn hello() -> Command {
    Command::new("hello [--utf8] [--message <message>]")
        .short("print a hello message")
        .long(
            "
Command hello prints the well known \"hello, world\" message, or if --message
flag is defined, a personalized hello message.
		",
        )
        .flags(|cmd| {
            cmd.arg(
                Arg::new("utf8")
                    .long("utf8")
                    .action(ArgAction::SetTrue)
                    .help("print an utf8 message"),
            )
            .arg(
                Arg::new("message")
                    .long("message")
                    .default_value("world")
                    .help("sets the greeting message"),
            )
        })
        .run(|ctx, _| {
            let flags = ctx.flags();
            if flags.get_flag("utf8") {
                writeln!(ctx.stdout(), "hello, 世界")?;
                return Ok(());
            }
            let message = flags
                .get_one::<String>("message")
                .map(String::as_str)
                .unwrap_or_default();
            writeln!(ctx.stdout(), "hello, {message}")?;
            Ok(())
        })
}

pub fn topic() -> Command {
    Command::new("topic")
        .short("a help topic")
        .long("A help topic is a non-runnable command used only for documentation.")
}

/// The test application:
///
/// ```text
/// app
/// ├── cmd
/// │   ├── cat
/// │   ├── echo
/// │   └── error    (usage error)
/// ├── error
/// ├── hello        (--utf8, --message)
/// └── topic
/// ```
pub fn new_app() -> (CommandTree, NodeId) {
    let mut tree = CommandTree::new();
    let app = tree.insert(
        Command::new("app <command> [<argument>...]").short("app is an app for testing"),
    );
    tree.add_command(app, hello()).unwrap();
    tree.add_command(app, failing()).unwrap();
    tree.add_command(app, topic()).unwrap();
    let cmd = tree
        .add_command(
            app,
            Command::new("cmd <command> [<argument>...]").short("a collection of commands"),
        )
        .unwrap();
    tree.add_command(cmd, echo_to_stderr()).unwrap();
    tree.add_command(cmd, cat()).unwrap();
    tree.add_command(cmd, usage_failing()).unwrap();
    (tree, app)
}

/// A tree holding only `command`, as its root.
pub fn single(command: Command) -> (CommandTree, NodeId) {
    let mut tree = CommandTree::new();
    let id = tree.insert(command);
    (tree, id)
}

pub const APP_HELP: &str = r#"App is an app for testing

Usage:

    app <command> [<argument>...]

The commands are:

    cmd              a collection of commands
    error            always return an error
    hello            print a hello message

Use "app help <command>" for more information about a command.

Additional help topics:

    topic            a help topic

Use "app help <topic>" for more information about that topic."#;

pub const CMD_HELP: &str = r#"A collection of commands

Usage:

    app cmd <command> [<argument>...]

The commands are:

    cat              print stdin
    echo             print its arguments
    error            always return an error

Use "app help cmd <command>" for more information about a command."#;

pub const HELLO_HELP: &str = r#"Print a hello message

Usage:

    app hello [--utf8] [--message <message>]

Command hello prints the well known "hello, world" message, or if --message
flag is defined, a personalized hello message."#;

pub const CAT_HELP: &str = r#"Print stdin

Usage:

    app cmd cat

Command cat is used to print the content of the stdin into the stdout."#;

pub const TOPIC_HELP: &str = r#"A help topic

A help topic is a non-runnable command used only for documentation."#;
