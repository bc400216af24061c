//! Standard stream handles.
//!
//! A command may override any of its three streams. Overrides are shared
//! handles: the same [`Input`] or [`Output`] can be installed on several
//! commands and cloned into action contexts. Without an override a command
//! inherits its parent's stream, and the root falls back to the process
//! streams (see [`CommandTree::stdin`](crate::CommandTree::stdin)).

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T: ?Sized>(m: &Mutex<T>) -> io::Result<MutexGuard<'_, T>> {
    m.lock()
        .map_err(|_| io::Error::new(io::ErrorKind::Other, "stream lock poisoned"))
}

#[derive(Clone)]
enum Source {
    Stdin,
    Shared(Arc<Mutex<dyn Read + Send>>),
}

/// A readable stream handle.
#[derive(Clone)]
pub struct Input {
    source: Source,
}

impl Input {
    /// The process standard input.
    pub fn stdin() -> Self {
        Self {
            source: Source::Stdin,
        }
    }

    /// Wraps any reader.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            source: Source::Shared(Arc::new(Mutex::new(reader))),
        }
    }

    /// An input that yields the given text.
    pub fn from_string(content: impl Into<String>) -> Self {
        Self::from_reader(io::Cursor::new(content.into().into_bytes()))
    }

    /// Returns true if this is the process standard input.
    pub fn is_process(&self) -> bool {
        matches!(self.source, Source::Stdin)
    }
}

impl Read for Input {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &self.source {
            Source::Stdin => io::stdin().read(buf),
            Source::Shared(reader) => lock(reader)?.read(buf),
        }
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Source::Stdin => f.write_str("Input::Stdin"),
            Source::Shared(_) => f.write_str("Input::Shared"),
        }
    }
}

#[derive(Clone)]
enum Sink {
    Stdout,
    Stderr,
    Shared(Arc<Mutex<dyn Write + Send>>),
}

/// A writable stream handle.
#[derive(Clone)]
pub struct Output {
    sink: Sink,
}

impl Output {
    /// The process standard output.
    pub fn stdout() -> Self {
        Self { sink: Sink::Stdout }
    }

    /// The process standard error.
    pub fn stderr() -> Self {
        Self { sink: Sink::Stderr }
    }

    /// Wraps any writer.
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            sink: Sink::Shared(Arc::new(Mutex::new(writer))),
        }
    }

    /// Returns true if this is one of the process streams.
    pub fn is_process(&self) -> bool {
        !matches!(self.sink, Sink::Shared(_))
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.sink {
            Sink::Stdout => io::stdout().write(buf),
            Sink::Stderr => io::stderr().write(buf),
            Sink::Shared(writer) => lock(writer)?.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        // The whole buffer is written under one lock.
        match &self.sink {
            Sink::Stdout => io::stdout().lock().write_all(buf),
            Sink::Stderr => io::stderr().lock().write_all(buf),
            Sink::Shared(writer) => lock(writer)?.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.sink {
            Sink::Stdout => io::stdout().flush(),
            Sink::Stderr => io::stderr().flush(),
            Sink::Shared(writer) => lock(writer)?.flush(),
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sink {
            Sink::Stdout => f.write_str("Output::Stdout"),
            Sink::Stderr => f.write_str("Output::Stderr"),
            Sink::Shared(_) => f.write_str("Output::Shared"),
        }
    }
}

/// An in-memory writer whose clones share one buffer.
///
/// Install a clone as a command's output and read the captured text back
/// after the invocation:
///
/// ```rust
/// use cmdtree::{Command, CommandTree, Output, SharedBuffer};
/// use std::io::Write;
///
/// let out = SharedBuffer::new();
/// let mut tree = CommandTree::new();
/// let root = tree.insert(
///     Command::new("hi")
///         .stdout(Output::from_writer(out.clone()))
///         .run(|ctx, _args| {
///             writeln!(ctx.stdout(), "hi there")?;
///             Ok(())
///         }),
/// );
///
/// tree.execute(root, Vec::<String>::new()).unwrap();
/// assert_eq!(out.contents(), "hi there\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The captured bytes as (lossy) UTF-8.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Discards everything captured so far.
    pub fn clear(&self) {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        lock(&self.buf)?.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
