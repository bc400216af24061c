//! Error types for tree construction and dispatch.
//!
//! Two families live here:
//!
//! - [`TreeError`]: raised while wiring the tree. These are programmer errors
//!   in the host application; most applications abort on them at startup.
//! - [`DispatchError`]: raised while executing an invocation. It is either a
//!   [`UsageError`] (malformed invocation, attributed to one node) or an
//!   action failure prefixed with the path of the node that ran it.

use std::fmt;

use crate::tree::NodeId;

/// Error returned when linking commands into a tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The child handle does not belong to the tree being modified.
    #[error("command {parent:?}: adding a command from another tree")]
    InvalidChild {
        /// Full path of the parent.
        parent: String,
    },

    /// The child's usage string has no first word to take a name from.
    #[error("command {parent:?}: adding a command without usage")]
    MissingName {
        /// Full path of the parent.
        parent: String,
    },

    /// The child already hangs from another command.
    #[error("command {parent:?}: adding {name:?}: command has another parent: {other:?}")]
    AlreadyParented {
        /// Full path of the parent.
        parent: String,
        /// Name of the child.
        name: String,
        /// Full path of the existing parent.
        other: String,
    },

    /// The child is the parent itself or one of its ancestors.
    #[error("command {parent:?}: adding {name:?}: adding a command to itself or its children")]
    CycleDetected {
        /// Full path of the parent.
        parent: String,
        /// Name of the child.
        name: String,
    },

    /// A sibling with the same (case-insensitive) name already exists.
    #[error("command {parent:?}: adding {name:?}: command name already in use")]
    DuplicateName {
        /// Full path of the parent.
        parent: String,
        /// Lower-cased name of the child.
        name: String,
    },

    /// The process entry point was invoked on a command with a parent.
    #[error("command {command:?}: running the entry point on a command with a parent")]
    NotRoot {
        /// Full path of the command.
        command: String,
    },
}

/// What kind of malformed invocation a [`UsageError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageErrorKind {
    /// The flag adapter rejected the arguments.
    FlagParse,
    /// No command matches the given token, or a help topic was executed.
    UnknownCommand,
    /// `help` was asked about a path that does not exist.
    UnknownHelpTopic,
    /// An action rejected its arguments.
    Invalid,
}

impl fmt::Display for UsageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageErrorKind::FlagParse => write!(f, "flag parse"),
            UsageErrorKind::UnknownCommand => write!(f, "unknown command"),
            UsageErrorKind::UnknownHelpTopic => write!(f, "unknown help topic"),
            UsageErrorKind::Invalid => write!(f, "invalid arguments"),
        }
    }
}

/// A malformed invocation, attributed to the node that detected it.
///
/// The message is fully formatted when the error is created (it already
/// starts with the node path) and is never altered afterwards. Callers
/// recognise usage errors by type, not by message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct UsageError {
    node: NodeId,
    kind: UsageErrorKind,
    message: String,
}

impl UsageError {
    pub(crate) fn new(node: NodeId, kind: UsageErrorKind, message: impl Into<String>) -> Self {
        Self {
            node,
            kind,
            message: message.into(),
        }
    }

    /// The node the error is attributed to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> UsageErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error returned by [`CommandTree::execute`](crate::CommandTree::execute).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Malformed invocation.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// An action failed. Displays as `<path>: <source>`.
    #[error("{path}: {source}")]
    Action {
        /// The node whose action failed.
        node: NodeId,
        /// Full path of that node.
        path: String,
        /// What the action returned.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl DispatchError {
    pub(crate) fn action(
        node: NodeId,
        path: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        DispatchError::Action {
            node,
            path: path.into(),
            source: source.into(),
        }
    }

    /// Returns true if this is a usage error.
    pub fn is_usage(&self) -> bool {
        matches!(self, DispatchError::Usage(_))
    }

    /// Returns the usage error, if this is one.
    pub fn as_usage(&self) -> Option<&UsageError> {
        match self {
            DispatchError::Usage(e) => Some(e),
            DispatchError::Action { .. } => None,
        }
    }

    /// The node the error is attributed to.
    pub fn node(&self) -> NodeId {
        match self {
            DispatchError::Usage(e) => e.node(),
            DispatchError::Action { node, .. } => *node,
        }
    }

    /// Classifies whatever an action returned.
    ///
    /// Usage errors and errors that already went through classification (an
    /// action that dispatched another node) pass through unchanged; anything
    /// else is wrapped with `path`.
    pub(crate) fn classify(node: NodeId, path: String, err: anyhow::Error) -> Self {
        let err = match err.downcast::<UsageError>() {
            Ok(usage) => return DispatchError::Usage(usage),
            Err(err) => err,
        };
        match err.downcast::<DispatchError>() {
            Ok(classified) => classified,
            Err(err) => DispatchError::action(node, path, err),
        }
    }
}
