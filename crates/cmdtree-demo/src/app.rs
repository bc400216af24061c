//! The demonstration command tree.
//!
//! ```text
//! myapp
//! ├── cmd
//! │   ├── cat      [--stderr]
//! │   ├── echo
//! │   └── error    (usage error)
//! ├── error
//! ├── hello        [--utf8] [--message <message>]
//! └── topic
//! ```

use std::io::{self, Write};

use clap::{Arg, ArgAction};
use cmdtree::{Command, CommandTree, NodeId, TreeError};
use log::debug;

/// Builds the application and returns it with its root.
pub fn build() -> Result<(CommandTree, NodeId), TreeError> {
    let mut tree = CommandTree::new();
    let app = tree.insert(
        Command::new("myapp <command> [<argument>...]")
            .short("a demonstration application for the cmdtree crate"),
    );

    let cmd = tree.add_command(app, cmd())?;
    tree.add_command(cmd, cat())?;
    tree.add_command(cmd, echo())?;
    tree.add_command(cmd, usage_error())?;

    tree.add_command(app, error())?;
    tree.add_command(app, hello())?;
    tree.add_command(app, topic())?;

    debug!("built {} commands under {:?}", tree.children(app).len(), tree.name(app));
    Ok((tree, app))
}

fn cmd() -> Command {
    Command::new("cmd <command> [<argument>...]").short("a collection of commands")
}

fn cat() -> Command {
    Command::new("cat [--stderr]")
        .short("print stdin into stdout")
        .long(
            "
Command cat demonstrates basic IO redirection. By default it will print the
contents of stdin into stdout. If flag --stderr is defined, it will output in
the stderr.
",
        )
        .flags(|cmd| cmd.arg(Arg::new("stderr").long("stderr").action(ArgAction::SetTrue)))
        .run(|ctx, _| {
            let mut out = if ctx.flags().get_flag("stderr") {
                ctx.stderr()
            } else {
                ctx.stdout()
            };
            io::copy(&mut ctx.stdin(), &mut out)?;
            out.flush()?;
            Ok(())
        })
}

fn echo() -> Command {
    Command::new("echo <argument>...")
        .short("print its arguments to stdout")
        .long("Command echo prints its arguments to stdout in a single line.")
        .run(|ctx, args| {
            writeln!(ctx.stdout(), "{}", args.join(" "))?;
            Ok(())
        })
}

fn usage_error() -> Command {
    Command::new("error <argument>")
        .short("always return an usage error")
        .long(
            "
Command error always returns a usage error. It demonstrates errors produced
when parsing flags and arguments.
",
        )
        .run(|ctx, _| Err(ctx.usage_error("expecting arguments").into()))
}

fn error() -> Command {
    Command::new("error")
        .short("always return an error")
        .long(
            "
Command error always returns an error. It demonstrates errors produced from a
command.
",
        )
        .run(|_, _| anyhow::bail!("an error from a command"))
}

fn hello() -> Command {
    Command::new("hello [--utf8] [--message <message>]")
        .short("print a greeting message")
        .long(
            "
Command hello prints a greeting \"hello, world\" message.

Flags are:

    --utf8
        Show an utf message.

    --message <message>
        Use the indicated message instead of \"world\" message.
",
        )
        .flags(|cmd| {
            cmd.arg(Arg::new("utf8").long("utf8").action(ArgAction::SetTrue))
                .arg(Arg::new("message").long("message").default_value("world"))
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
                .unwrap_or("world");
            writeln!(ctx.stdout(), "hello, {message}")?;
            Ok(())
        })
}

fn topic() -> Command {
    Command::new("topic").short("a help topic").long(
        "
A help topic is a command that does not have any children, and it does not run
any action. It is used to provide online documentation of a particular topic
or subject relevant for the application.
",
    )
}
