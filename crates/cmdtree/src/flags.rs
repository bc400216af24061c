//! Flag parsing adapter.
//!
//! Every invocation of a command builds a fresh [`clap::Command`], lets the
//! command's flag setup declare its flags on it and parses the arguments.
//! The adapter behaves like a getopt/Go-flag parser rather than like a full
//! clap application:
//!
//! - parsing stops at the first positional argument; it and everything after
//!   it are returned untouched,
//! - `--` ends flag parsing,
//! - long flags may be written with one dash (`-message x`),
//! - a repeated flag keeps its last value,
//! - a flag's value may start with a dash (`-message -x`),
//! - boolean flags accept `=true`/`=false`,
//! - `-h`/`--help` is reported as [`FlagOutcome::Help`], separate from parse
//!   failures.

use std::sync::Arc;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, ArgAction, ArgMatches, ColorChoice};

/// Id of the catch-all positional the adapter appends to every command.
const POSITIONALS: &str = "cmdtree-positionals";

/// Declares flags on the per-invocation parser.
pub type FlagSetup = Arc<dyn Fn(clap::Command) -> clap::Command + Send + Sync>;

/// Flags and positional arguments of one invocation.
#[derive(Debug, Clone)]
pub struct ParsedFlags {
    pub matches: ArgMatches,
    pub positionals: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum FlagOutcome {
    /// `-h` or `--help` was given.
    Help,
    Parsed(ParsedFlags),
}

/// Parses `args` against the flags declared by `setup`.
///
/// On failure returns a message suitable for a usage error.
pub fn parse(
    name: &str,
    setup: Option<&FlagSetup>,
    args: &[String],
) -> Result<FlagOutcome, String> {
    let mut cmd = parser(name, setup);
    cmd.build();
    let args = normalize(&cmd, args);

    match cmd.try_get_matches_from_mut(args) {
        Ok(mut matches) => {
            let positionals = matches
                .remove_many::<String>(POSITIONALS)
                .map(|values| values.collect())
                .unwrap_or_default();
            Ok(FlagOutcome::Parsed(ParsedFlags {
                matches,
                positionals,
            }))
        }
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Ok(FlagOutcome::Help)
            }
            _ => Err(describe(&err)),
        },
    }
}

fn parser(name: &str, setup: Option<&FlagSetup>) -> clap::Command {
    let cmd = clap::Command::new(name.to_owned())
        .no_binary_name(true)
        .disable_version_flag(true)
        .disable_help_subcommand(true)
        .args_override_self(true)
        .color(ColorChoice::Never);
    let cmd = match setup {
        Some(setup) => setup(cmd),
        None => cmd,
    };
    cmd.arg(
        Arg::new(POSITIONALS)
            .num_args(0..)
            .action(ArgAction::Append)
            .trailing_var_arg(true)
            .hide(true),
    )
}

/// Rewrites the leading flag tokens into a form clap parses the way a Go
/// flag set would.
///
/// - Single-dash long flags (`-message`) become `--message`.
/// - A value taken from the next token is glued to its flag
///   (`--message=<value>`, `-m<value>`), so values may start with a dash.
/// - `--flag=true` and `--flag=false` on a boolean flag become the bare
///   flag or no flag at all. A later `=false` cancels earlier occurrences.
///
/// Rewriting stops at `--` or at the first token that is not a flag. A
/// multi-letter single-dash token is treated as a short flag cluster only
/// when its first letter is a declared short flag.
fn normalize(cmd: &clap::Command, args: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len());
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--" || arg == "-" || !arg.starts_with('-') {
            out.push(arg.clone());
            break;
        }

        let (body, double) = match arg.strip_prefix("--") {
            Some(body) => (body, true),
            None => (&arg[1..], false),
        };
        let (flag, inline_value) = match body.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (body, None),
        };

        if let Some(def) = cmd.get_arguments().find(|a| a.get_long() == Some(flag)) {
            let long = format!("--{flag}");
            match (inline_value, def.get_action().takes_values()) {
                (Some(value), false) if matches!(def.get_action(), ArgAction::SetTrue) => {
                    match parse_bool(value) {
                        Some(true) => out.push(long),
                        Some(false) => out.retain(|token| *token != long),
                        None => out.push(format!("{long}={value}")),
                    }
                }
                (Some(value), _) => out.push(format!("{long}={value}")),
                (None, true) => match iter.next() {
                    Some(value) if !value.is_empty() => out.push(format!("{long}={value}")),
                    Some(value) => out.extend([long, value.clone()]),
                    None => out.push(long),
                },
                (None, false) => out.push(long),
            }
            continue;
        }

        let mut letters = flag.chars();
        let short = match (letters.next(), letters.next()) {
            (Some(first), rest) if !double => cmd
                .get_arguments()
                .find(|a| a.get_short() == Some(first))
                .map(|a| (a, rest.is_some())),
            _ => None,
        };
        match short {
            Some((def, clustered)) => {
                out.push(arg.clone());
                if def.get_action().takes_values() && !clustered && inline_value.is_none() {
                    if let Some(value) = iter.next() {
                        // Glued so clap takes dash-leading values.
                        match out.last_mut() {
                            Some(last) if !value.is_empty() => last.push_str(value),
                            _ => out.push(value.clone()),
                        }
                    }
                }
            }
            // Unknown: let clap report it in long form.
            None => out.push(format!("--{body}")),
        }
    }

    out.extend(iter.cloned());
    out
}

/// Boolean spellings accepted by Go's `strconv.ParseBool`.
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Turns a clap error into a one-line message.
fn describe(err: &clap::Error) -> String {
    if err.kind() == ErrorKind::UnknownArgument {
        if let Some(ContextValue::String(arg)) = err.get(ContextKind::InvalidArg) {
            return format!("flag provided but not defined: {arg}");
        }
    }
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default().trim();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeting_flags() -> FlagSetup {
        Arc::new(|cmd: clap::Command| {
            cmd.arg(Arg::new("utf8").long("utf8").action(ArgAction::SetTrue))
                .arg(
                    Arg::new("message")
                        .long("message")
                        .short('m')
                        .default_value("world"),
                )
        })
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parsed(setup: Option<&FlagSetup>, list: &[&str]) -> ParsedFlags {
        match parse("hello", setup, &args(list)) {
            Ok(FlagOutcome::Parsed(p)) => p,
            other => panic!("expected parsed flags, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_apply() {
        let setup = greeting_flags();
        let p = parsed(Some(&setup), &[]);
        assert!(!p.matches.get_flag("utf8"));
        assert_eq!(
            p.matches.get_one::<String>("message").map(String::as_str),
            Some("world")
        );
        assert!(p.positionals.is_empty());
    }

    #[test]
    fn test_single_dash_long_flags() {
        let setup = greeting_flags();
        let p = parsed(Some(&setup), &["-message", "x", "-utf8"]);
        assert!(p.matches.get_flag("utf8"));
        assert_eq!(
            p.matches.get_one::<String>("message").map(String::as_str),
            Some("x")
        );
    }

    #[test]
    fn test_inline_value() {
        let setup = greeting_flags();
        let p = parsed(Some(&setup), &["-message=inline", "rest"]);
        assert_eq!(
            p.matches.get_one::<String>("message").map(String::as_str),
            Some("inline")
        );
        assert_eq!(p.positionals, args(&["rest"]));
    }

    #[test]
    fn test_short_flag_with_value() {
        let setup = greeting_flags();
        let p = parsed(Some(&setup), &["-m", "short", "-utf8"]);
        assert!(p.matches.get_flag("utf8"));
        assert_eq!(
            p.matches.get_one::<String>("message").map(String::as_str),
            Some("short")
        );
    }

    #[test]
    fn test_bool_flag_with_explicit_value() {
        let setup = greeting_flags();
        let p = parsed(Some(&setup), &["-utf8=true", "x"]);
        assert!(p.matches.get_flag("utf8"));
        assert_eq!(p.positionals, args(&["x"]));

        let p = parsed(Some(&setup), &["--utf8=false"]);
        assert!(!p.matches.get_flag("utf8"));

        let p = parsed(Some(&setup), &["-utf8", "-utf8=0"]);
        assert!(!p.matches.get_flag("utf8"));

        let p = parsed(Some(&setup), &["-utf8=T", "-utf8=1"]);
        assert!(p.matches.get_flag("utf8"));
    }

    #[test]
    fn test_bool_flag_rejects_other_values() {
        let setup = greeting_flags();
        let err = parse("hello", Some(&setup), &args(&["-utf8=maybe"])).unwrap_err();
        assert!(err.contains("maybe"), "got {err:?}");
    }

    #[test]
    fn test_repeated_flag_keeps_last_value() {
        let setup = greeting_flags();
        let p = parsed(Some(&setup), &["-message", "a", "-message", "b", "-utf8", "-utf8"]);
        assert_eq!(
            p.matches.get_one::<String>("message").map(String::as_str),
            Some("b")
        );
        assert!(p.matches.get_flag("utf8"));
    }

    #[test]
    fn test_value_may_start_with_dash() {
        let setup = greeting_flags();
        let p = parsed(Some(&setup), &["-message", "-x", "rest"]);
        assert_eq!(
            p.matches.get_one::<String>("message").map(String::as_str),
            Some("-x")
        );
        assert_eq!(p.positionals, args(&["rest"]));

        let p = parsed(Some(&setup), &["-m", "--y"]);
        assert_eq!(
            p.matches.get_one::<String>("message").map(String::as_str),
            Some("--y")
        );
    }

    #[test]
    fn test_parsing_stops_at_first_positional() {
        let p = parsed(None, &["cmd", "echo", "-x", "--y"]);
        assert_eq!(p.positionals, args(&["cmd", "echo", "-x", "--y"]));
    }

    #[test]
    fn test_double_dash_ends_flags() {
        let setup = greeting_flags();
        let p = parsed(Some(&setup), &["--", "--utf8"]);
        assert!(!p.matches.get_flag("utf8"));
        assert_eq!(p.positionals, args(&["--utf8"]));
    }

    #[test]
    fn test_help_signal() {
        for flag in ["-h", "--help", "-help"] {
            let outcome = parse("hello", None, &args(&[flag])).unwrap();
            assert!(matches!(outcome, FlagOutcome::Help), "flag {flag}");
        }
    }

    #[test]
    fn test_unknown_flag_message() {
        let err = parse("hello", None, &args(&["--invalid"])).unwrap_err();
        assert_eq!(err, "flag provided but not defined: --invalid");
    }

    #[test]
    fn test_unknown_single_dash_flag_reported_in_long_form() {
        let setup = greeting_flags();
        let err = parse("hello", Some(&setup), &args(&["-undef"])).unwrap_err();
        assert_eq!(err, "flag provided but not defined: --undef");
    }

    #[test]
    fn test_missing_value_message() {
        let setup = greeting_flags();
        let err = parse("hello", Some(&setup), &args(&["--message"])).unwrap_err();
        assert!(err.contains("--message"), "got {err:?}");
        assert!(!err.starts_with("error:"));
        assert!(!err.contains('\n'));
    }

    #[test]
    fn test_flags_are_fresh_per_parse() {
        let setup = greeting_flags();
        let first = parsed(Some(&setup), &["--message", "first"]);
        let second = parsed(Some(&setup), &[]);
        assert_eq!(
            first.matches.get_one::<String>("message").map(String::as_str),
            Some("first")
        );
        assert_eq!(
            second.matches.get_one::<String>("message").map(String::as_str),
            Some("world")
        );
    }
}
