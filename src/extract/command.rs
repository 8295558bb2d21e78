//! Process-based extractor.
//!
//! Each page is handed to a fresh child process: the page is written as JSON
//! to its standard input, descriptors are read from its standard output and
//! diagnostics from its standard error. The child is always killed and
//! reaped before [`CommandExtractor::extract`] returns.

use super::{CoordinateOrigin, ExtractContext, ExtractorOutput, TableDescriptor, TableExtractor};
use crate::error::ExtractionError;
use crate::model::{Element, Page};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How long to wait for the output pipes to close once the child is gone.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Table extraction flavor passed to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Tables delimited by ruling lines
    #[default]
    Lattice,
    /// Tables inferred from whitespace between text
    Stream,
}

impl Flavor {
    /// Lowercase name of the flavor.
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Lattice => "lattice",
            Flavor::Stream => "stream",
        }
    }
}

/// Runs an external program once per page.
///
/// Arguments may contain the placeholders `{page}` (1-based page number),
/// `{index}` (0-based page index), `{source}` (source document path) and
/// `{flavor}`.
///
/// # Example
///
/// ```no_run
/// use doctables::extract::{CommandExtractor, CoordinateOrigin, Flavor};
///
/// let extractor = CommandExtractor::new("python3")
///     .arg("camelot_bridge.py")
///     .arg("{source}")
///     .arg("--page")
///     .arg("{page}")
///     .arg("--flavor")
///     .arg("{flavor}")
///     .with_flavor(Flavor::Stream)
///     .with_origin(CoordinateOrigin::BottomLeft);
/// ```
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: PathBuf,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
    flavor: Flavor,
    origin: CoordinateOrigin,
    poll_interval: Duration,
}

impl CommandExtractor {
    /// Create an extractor running `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            envs: Vec::new(),
            flavor: Flavor::default(),
            origin: CoordinateOrigin::default(),
            poll_interval: Duration::from_millis(10),
        }
    }

    /// Append an argument template.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several argument templates.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory of the child.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Add an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Set the extraction flavor.
    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Set the coordinate origin of the program's output.
    pub fn with_origin(mut self, origin: CoordinateOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Set how often a running child is checked for exit, timeout and
    /// cancellation.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Expand the argument templates for one page.
    fn render_args(&self, page: &Page, source: Option<&Path>) -> Result<Vec<String>, ExtractionError> {
        self.args
            .iter()
            .map(|template| {
                let mut arg = template
                    .replace("{page}", &page.number().to_string())
                    .replace("{index}", &page.index.to_string())
                    .replace("{flavor}", self.flavor.as_str());
                if arg.contains("{source}") {
                    let source = source.ok_or_else(|| {
                        ExtractionError::Spawn(io::Error::new(
                            io::ErrorKind::InvalidInput,
                            "argument uses {source} but the document has no source path",
                        ))
                    })?;
                    arg = arg.replace("{source}", &source.to_string_lossy());
                }
                Ok(arg)
            })
            .collect()
    }

    /// Run the child to completion and capture its output triple.
    fn run(
        &self,
        args: &[String],
        request: Vec<u8>,
        ctx: &ExtractContext<'_>,
    ) -> Result<ExtractorOutput, ExtractionError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref dir) = self.current_dir {
            command.current_dir(dir);
        }
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        let child = command.spawn().map_err(ExtractionError::Spawn)?;
        let mut guard = ChildGuard::new(child);
        let started = Instant::now();

        if let Some(mut stdin) = guard.child.stdin.take() {
            // The child may exit without reading its input; a broken pipe is fine.
            thread::spawn(move || {
                let _ = stdin.write_all(&request);
            });
        }
        let stdout = guard.child.stdout.take().map(spawn_reader);
        let stderr = guard.child.stderr.take().map(spawn_reader);

        let status = loop {
            match guard.child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    return Err(ExtractionError::Process {
                        status: -1,
                        stderr: format!("failed to wait for extractor: {}", e),
                    })
                }
            }
            if ctx.cancel.is_cancelled() {
                log::debug!("{}: cancelled, killing pid {}", self.name(), guard.child.id());
                guard.kill();
                return Err(ExtractionError::Cancelled);
            }
            if started.elapsed() >= ctx.timeout {
                log::warn!(
                    "{}: timed out after {:?}, killing pid {}",
                    self.name(),
                    ctx.timeout,
                    guard.child.id()
                );
                guard.kill();
                return Err(ExtractionError::Timeout { after: ctx.timeout });
            }
            thread::sleep(self.poll_interval);
        };
        guard.reaped = true;

        // Both pipes share one budget.
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        let stderr = drain(stderr, deadline, "stderr")?;
        let payload = drain(stdout, deadline, "stdout")?;

        Ok(ExtractorOutput {
            status: exit_code(status),
            stderr,
            payload,
        })
    }
}

impl TableExtractor for CommandExtractor {
    fn name(&self) -> &str {
        "command"
    }

    fn extract(
        &self,
        page: &Page,
        ctx: &ExtractContext<'_>,
    ) -> Result<Vec<TableDescriptor>, ExtractionError> {
        if ctx.cancel.is_cancelled() {
            return Err(ExtractionError::Cancelled);
        }

        let source = ctx.metadata.source.as_deref();
        let args = self.render_args(page, source)?;
        let request = serde_json::to_vec(&PageRequest {
            index: page.index,
            number: page.number(),
            width: page.width,
            height: page.height,
            source,
            flavor: self.flavor,
            elements: &page.elements,
        })
        .map_err(|e| ExtractionError::Spawn(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        log::debug!(
            "{}: running {} {:?} for page {}",
            self.name(),
            self.program.display(),
            args,
            page.number()
        );
        let output = self.run(&args, request, ctx)?;
        let descriptors = output.into_descriptors()?;
        Ok(self.origin.normalize(descriptors, page))
    }
}

/// Page context written to the child's standard input.
#[derive(Serialize)]
struct PageRequest<'a> {
    index: u32,
    number: u32,
    width: f32,
    height: f32,
    source: Option<&'a Path>,
    flavor: Flavor,
    elements: &'a [Element],
}

/// Owns a child process; kills and reaps it unless it already exited.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    fn kill(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
            self.reaped = true;
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Read a pipe to the end on a helper thread.
fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// Collect a reader's bytes, giving up at `deadline`.
///
/// A grandchild that inherited the pipe can keep it open after the child
/// exited. The output is then incomplete and the call fails.
fn drain(
    rx: Option<Receiver<Vec<u8>>>,
    deadline: Instant,
    pipe: &str,
) -> Result<String, ExtractionError> {
    let Some(rx) = rx else {
        return Ok(String::new());
    };
    match rx.recv_deadline(deadline) {
        Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Err(RecvTimeoutError::Timeout) => {
            log::warn!("extractor {} still open {:?} after exit", pipe, DRAIN_TIMEOUT);
            Err(ExtractionError::Process {
                status: -1,
                stderr: format!(
                    "{} pipe still open {:?} after the extractor exited; output discarded",
                    pipe, DRAIN_TIMEOUT
                ),
            })
        }
        Err(RecvTimeoutError::Disconnected) => Err(ExtractionError::Process {
            status: -1,
            stderr: format!("{} reader stopped before the pipe closed", pipe),
        }),
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
