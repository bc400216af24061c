//! The command tree.
//!
//! [`CommandTree`] is an arena that owns every command. Nodes refer to their
//! parent by index, so the parent relation never keeps anything alive and
//! cycle checks are plain walks up the chain. Children are kept in a sorted
//! map keyed by lower-cased name.
//!
//! Registration takes `&mut self`: the exclusive borrow serialises changes
//! to the topology. Once built, the tree is `Send + Sync` and every
//! read-only operation, including
//! [`execute`](CommandTree::execute), takes `&self`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, trace};

use crate::command::Command;
use crate::error::TreeError;
use crate::help::HelpConfig;
use crate::io::{Input, Output};

static NEXT_TREE_ID: AtomicUsize = AtomicUsize::new(0);

/// Handle to a command inside a [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    tree: usize,
    index: usize,
}

/// What a command does when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Has an action. Children, if any, are only reachable through `help`.
    Runnable,
    /// No action, at least one child.
    Dispatcher,
    /// No action and no children: documentation only.
    Topic,
}

impl NodeKind {
    fn of(runnable: bool, has_children: bool) -> Self {
        match (runnable, has_children) {
            (true, _) => NodeKind::Runnable,
            (false, true) => NodeKind::Dispatcher,
            (false, false) => NodeKind::Topic,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) command: Command,
    pub(crate) parent: Option<usize>,
    pub(crate) children: BTreeMap<String, usize>,
}

/// An arena of commands linked into one or more trees.
#[derive(Debug)]
pub struct CommandTree {
    id: usize,
    nodes: Vec<Node>,
    pub(crate) help_config: HelpConfig,
}

impl Default for CommandTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTree {
    pub fn new() -> Self {
        Self {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            help_config: HelpConfig::default(),
        }
    }

    /// Replaces the help rendering configuration.
    pub fn with_help_config(mut self, config: HelpConfig) -> Self {
        self.help_config = config;
        self
    }

    pub fn help_config(&self) -> &HelpConfig {
        &self.help_config
    }

    /// Adds a detached command to the arena and returns its handle.
    ///
    /// The command has no parent until it is linked with [`add`](Self::add).
    pub fn insert(&mut self, command: Command) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(Node {
            command,
            parent: None,
            children: BTreeMap::new(),
        });
        NodeId {
            tree: self.id,
            index,
        }
    }

    /// Links `child` under `parent`.
    ///
    /// Fails when the child belongs to another tree, is `parent` or one of
    /// its ancestors, has a blank usage, clashes (case-insensitively) with a
    /// sibling, or already has a parent. Checks run in that order. On error
    /// the tree is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `parent` belongs to another tree.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        let parent_path = self.long_name(parent);

        if !self.owns(child) {
            return Err(TreeError::InvalidChild {
                parent: parent_path,
            });
        }
        if std::iter::once(parent.index)
            .chain(self.ancestors(parent))
            .any(|index| index == child.index)
        {
            return Err(TreeError::CycleDetected {
                parent: parent_path,
                name: self.name(child),
            });
        }

        let name = self.name(child);
        if name.is_empty() {
            return Err(TreeError::MissingName {
                parent: parent_path,
            });
        }
        if self.nodes[parent.index].children.contains_key(&name) {
            return Err(TreeError::DuplicateName {
                parent: parent_path,
                name,
            });
        }
        if let Some(other) = self.nodes[child.index].parent {
            return Err(TreeError::AlreadyParented {
                parent: parent_path,
                name,
                other: self.long_name(self.id_of(other)),
            });
        }

        debug!("registering {:?} under {:?}", name, parent_path);
        self.nodes[parent.index]
            .children
            .insert(name, child.index);
        self.nodes[child.index].parent = Some(parent.index);
        Ok(())
    }

    /// Inserts `command` and links it under `parent` in one step.
    pub fn add_command(&mut self, parent: NodeId, command: Command) -> Result<NodeId, TreeError> {
        let child = self.insert(command);
        match self.add(parent, child) {
            Ok(()) => Ok(child),
            Err(err) => {
                // The new node is the last slot.
                self.nodes.pop();
                Err(err)
            }
        }
    }

    /// The command stored at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to another tree.
    pub fn command(&self, id: NodeId) -> &Command {
        &self.node(id).command
    }

    /// Returns the command at `id`, or `None` for a handle of another tree.
    pub fn get(&self, id: NodeId) -> Option<&Command> {
        self.owns(id).then(|| &self.nodes[id.index].command)
    }

    /// Replaces the standard input override of `id`.
    pub fn set_stdin(&mut self, id: NodeId, input: Input) {
        self.node_mut(id).command.stdin = Some(input);
    }

    /// Replaces the standard output override of `id`.
    pub fn set_stdout(&mut self, id: NodeId, output: Output) {
        self.node_mut(id).command.stdout = Some(output);
    }

    /// Replaces the standard error override of `id`.
    pub fn set_stderr(&mut self, id: NodeId, output: Output) {
        self.node_mut(id).command.stderr = Some(output);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent.map(|p| self.id_of(p))
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.node(id).parent.is_none()
    }

    /// Looks up a child by name, case-insensitively.
    pub fn child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let name = name.to_lowercase();
        if name.is_empty() {
            return None;
        }
        self.node(id)
            .children
            .get(&name)
            .map(|&index| self.id_of(index))
    }

    /// The children of `id`, sorted by name.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .children
            .values()
            .map(|&index| self.id_of(index))
            .collect()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.node(id).children.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        let node = self.node(id);
        NodeKind::of(node.command.is_runnable(), !node.children.is_empty())
    }

    /// The command's own name.
    pub fn name(&self, id: NodeId) -> String {
        self.node(id).command.name()
    }

    /// The names from the root down to `id`, root first.
    pub fn path(&self, id: NodeId) -> Vec<String> {
        let mut names: Vec<String> = std::iter::once(id.index)
            .chain(self.ancestors(id))
            .map(|index| self.nodes[index].command.name())
            .collect();
        names.reverse();
        names
    }

    /// The command's name prefixed by all its ancestors, space-joined.
    pub fn long_name(&self, id: NodeId) -> String {
        self.path(id).join(" ")
    }

    /// The command's usage line prefixed by its ancestors' names.
    pub fn long_usage(&self, id: NodeId) -> String {
        let mut parts: Vec<String> = self
            .ancestors(id)
            .map(|index| self.nodes[index].command.name())
            .collect();
        parts.reverse();
        parts.push(self.command(id).get_usage().to_string());
        parts.join(" ")
    }

    /// The `help` invocation for the command: its path with `help` spliced
    /// in after the root (`app help cmd`).
    pub fn help_path(&self, id: NodeId) -> String {
        let mut path = self.path(id);
        path.insert(1, "help".to_string());
        path.join(" ")
    }

    /// The effective standard input of `id`.
    pub fn stdin(&self, id: NodeId) -> Input {
        self.resolve(id, |c| c.stdin.clone())
            .unwrap_or_else(Input::stdin)
    }

    /// The effective standard output of `id`.
    pub fn stdout(&self, id: NodeId) -> Output {
        self.resolve(id, |c| c.stdout.clone())
            .unwrap_or_else(Output::stdout)
    }

    /// The effective standard error of `id`.
    pub fn stderr(&self, id: NodeId) -> Output {
        self.resolve(id, |c| c.stderr.clone())
            .unwrap_or_else(Output::stderr)
    }

    /// Walks from `id` up to the root and returns the first override found.
    fn resolve<T>(&self, id: NodeId, pick: impl Fn(&Command) -> Option<T>) -> Option<T> {
        let found = std::iter::once(id.index)
            .chain(self.ancestors(id))
            .find_map(|index| pick(&self.nodes[index].command));
        trace!(
            "stream for {:?}: {}",
            self.long_name(id),
            if found.is_some() { "override" } else { "process" }
        );
        found
    }

    /// Indices of the ancestors of `id`, nearest first.
    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.node(id).parent, move |&index| {
            self.nodes[index].parent
        })
    }

    fn owns(&self, id: NodeId) -> bool {
        id.tree == self.id && id.index < self.nodes.len()
    }

    fn id_of(&self, index: usize) -> NodeId {
        NodeId {
            tree: self.id,
            index,
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        assert!(self.owns(id), "command handle {:?} is not part of this tree", id);
        &self.nodes[id.index]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        assert!(self.owns(id), "command handle {:?} is not part of this tree", id);
        &mut self.nodes[id.index]
    }
}
