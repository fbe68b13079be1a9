//! node process runner.

use crate::compiler::{CompileError, LessCompiler, RenderError, RenderOptions, RenderOutput};
use async_trait::async_trait;
use blake3::Hasher;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const NODE_SCRIPT_FILENAME: &str = "node-less-compiler.mjs";
/// How much of the worker's stderr is kept for error reports.
const STDERR_TAIL_BYTES: usize = 64 * 1024;
const NODE_SCRIPT_SOURCE: &str = r#"import { createInterface } from 'node:readline';
import { stdin, stdout } from 'node:process';
import { createRequire } from 'node:module';
import { pathToFileURL } from 'node:url';

const require = createRequire(pathToFileURL(process.cwd() + '/'));

let less = null;
try {
  less = require('less');
} catch (err) {
  const message = err && err.message ? err.message : String(err);
  console.error(`stencil-less node runner failed to load less: ${message}`);
  process.exit(2);
}

function loadPlugin(entry) {
  if (typeof entry === 'string') {
    const mod = require(entry);
    return typeof mod === 'function' ? new mod() : mod;
  }
  if (entry && typeof entry.module === 'string') {
    const mod = require(entry.module);
    return typeof mod === 'function' ? new mod(entry.options) : mod;
  }
  return entry;
}

function located(err) {
  return {
    message: err && err.message ? err.message : String(err),
    status: err && typeof err.status === 'number' ? err.status : null,
    line: err && typeof err.line === 'number' ? err.line : null,
    column: err && typeof err.column === 'number' ? err.column : null
  };
}

stdout.write(JSON.stringify({ ready: true }) + '\n');

const rl = createInterface({ input: stdin, crlfDelay: Infinity });

for await (const line of rl) {
  if (!line.trim()) continue;

  let req;
  try {
    req = JSON.parse(line);
  } catch (err) {
    const message = err && err.message ? err.message : String(err);
    stdout.write(JSON.stringify({ id: null, fatal: `invalid json: ${message}` }) + '\n');
    continue;
  }

  const id = req.id;

  let plugins;
  try {
    plugins = (req.plugins || []).map(loadPlugin);
  } catch (err) {
    const error = located(err);
    error.message = `failed to load less plugin: ${error.message}`;
    stdout.write(JSON.stringify({ id, error }) + '\n');
    continue;
  }

  try {
    const result = await less.render(req.source, { plugins, filename: req.filename });
    stdout.write(JSON.stringify({ id, css: result.css }) + '\n');
  } catch (err) {
    stdout.write(JSON.stringify({ id, error: located(err) }) + '\n');
  }
}
"#;

/// Error types for the node runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Failed to spawn node.
    #[error("failed to spawn node: {0}")]
    SpawnFailed(#[from] std::io::Error),

    /// node exited with error.
    #[error("node exited with code {code}: {stderr}")]
    ProcessFailed { code: i32, stderr: String },

    /// node binary not found.
    #[error("node binary not found at: {0}")]
    NotFound(Utf8PathBuf),

    /// The runner script could not be installed.
    #[error("failed to install runner script: {0}")]
    ScriptInstallFailed(String),

    /// Runner protocol error.
    #[error("node runner protocol error: {0}")]
    ProtocolError(String),

    /// Failed to parse a runner response.
    #[error("failed to parse node response: {0}")]
    ParseError(String),
}

#[derive(Debug, Serialize)]
struct LessRequest<'a> {
    id: u64,
    filename: &'a str,
    source: &'a str,
    plugins: &'a [Value],
}

#[derive(Debug, Deserialize)]
struct LessResponse {
    id: Option<u64>,
    css: Option<String>,
    error: Option<CompileError>,
    fatal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NodeReady {
    ready: bool,
}

/// Runs the `less` package inside a persistent node process.
///
/// A single worker is spawned on first use and reused. Requests are
/// serialized through it; a worker that fails is dropped and replaced on the
/// next request.
#[derive(Debug)]
pub struct NodeLessRunner {
    node_path: Utf8PathBuf,
    workspace_root: Utf8PathBuf,
    script_path: Utf8PathBuf,
    worker: Mutex<Option<LessWorker>>,
    next_id: AtomicU64,
}

impl NodeLessRunner {
    /// Creates a new runner. The worker is not spawned until the first render.
    pub fn new(node_path: Utf8PathBuf, workspace_root: Utf8PathBuf) -> Result<Self, RunnerError> {
        if !node_path.exists() {
            return Err(RunnerError::NotFound(node_path));
        }
        let cache_dir = Self::get_cache_dir().ok_or_else(|| {
            RunnerError::ScriptInstallFailed("could not determine cache directory".into())
        })?;
        let script_path = ensure_script(&cache_dir)?;
        Ok(Self {
            node_path,
            workspace_root,
            script_path,
            worker: Mutex::new(None),
            next_id: AtomicU64::new(1),
        })
    }

    /// Attempts to find node in the workspace or on PATH.
    /// 1. Workspace node_modules/.bin/node (if workspace_root provided)
    /// 2. PATH
    pub fn find_node(workspace_root: Option<&Utf8Path>) -> Option<Utf8PathBuf> {
        if let Some(workspace) = workspace_root {
            let bin = workspace.join("node_modules/.bin");
            if let Some(path) = find_node_in_bin(&bin) {
                return Some(path);
            }
        }

        which::which("node")
            .ok()
            .and_then(|path| Utf8PathBuf::try_from(path).ok())
    }

    /// Gets the cache directory for stencil-less.
    pub fn get_cache_dir() -> Option<Utf8PathBuf> {
        dirs::cache_dir()
            .and_then(|p| Utf8PathBuf::try_from(p).ok())
            .map(|p| p.join("stencil-less"))
    }

    /// Stops the worker, if one is running.
    pub async fn shutdown(&self) {
        if let Some(mut worker) = self.worker.lock().await.take() {
            let _ = worker.child.kill().await;
            tracing::debug!("node less worker stopped");
        }
    }
}

#[async_trait]
impl LessCompiler for NodeLessRunner {
    async fn render(
        &self,
        source: &str,
        options: &RenderOptions,
    ) -> Result<RenderOutput, RenderError> {
        let mut guard = self.worker.lock().await;
        // A caller dropped mid-exchange may have left a partial request in
        // node's stdin or an unread reply in its stdout.
        if guard.as_ref().is_some_and(|worker| worker.in_flight) {
            tracing::debug!("replacing node less worker with an abandoned request");
            if let Some(mut abandoned) = guard.take() {
                let _ = abandoned.child.start_kill();
            }
        }
        if guard.is_none() {
            *guard = Some(
                LessWorker::spawn(&self.node_path, &self.workspace_root, &self.script_path)
                    .await?,
            );
        }
        let Some(worker) = guard.as_mut() else {
            return Err(RunnerError::ProtocolError("node worker unavailable".into()).into());
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let result = worker.render(id, source, options).await;
        if matches!(result, Err(RenderError::Runner(_))) {
            tracing::debug!("dropping failed node less worker");
            *guard = None;
        }
        result
    }
}

fn find_node_in_bin(bin: &Utf8Path) -> Option<Utf8PathBuf> {
    let candidates: &[&str] = if cfg!(windows) {
        &["node.exe", "node.cmd", "node"]
    } else {
        &["node"]
    };

    candidates
        .iter()
        .map(|candidate| bin.join(candidate))
        .find(|path| path.exists())
}

/// Writes the runner script into `cache_dir` unless an identical copy exists.
fn ensure_script(cache_dir: &Utf8Path) -> Result<Utf8PathBuf, RunnerError> {
    fs::create_dir_all(cache_dir).map_err(|e| {
        RunnerError::ScriptInstallFailed(format!("failed to create cache dir: {e}"))
    })?;

    let script_path = cache_dir.join(NODE_SCRIPT_FILENAME);
    let mut hasher = Hasher::new();
    hasher.update(NODE_SCRIPT_SOURCE.as_bytes());
    let expected_hash = hasher.finalize();

    if let Ok(existing) = fs::read(&script_path) {
        let mut hasher = Hasher::new();
        hasher.update(&existing);
        if hasher.finalize() == expected_hash {
            return Ok(script_path);
        }
    }

    fs::write(&script_path, NODE_SCRIPT_SOURCE).map_err(|e| {
        RunnerError::ScriptInstallFailed(format!("failed to write node runner script: {e}"))
    })?;
    tracing::debug!(path = %script_path, "installed node less runner script");

    Ok(script_path)
}

#[derive(Debug)]
struct LessWorker {
    child: Child,
    stdin: ChildStdin,
    stdout: tokio::io::Lines<BufReader<ChildStdout>>,
    stderr_task: Option<JoinHandle<String>>,
    in_flight: bool,
}

impl LessWorker {
    async fn spawn(
        node_path: &Utf8Path,
        workspace_root: &Utf8Path,
        script_path: &Utf8Path,
    ) -> Result<Self, RunnerError> {
        let mut child = Command::new(node_path)
            .arg(script_path)
            .current_dir(workspace_root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(RunnerError::SpawnFailed)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RunnerError::ProtocolError("failed to open node stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::ProtocolError("failed to open node stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::ProtocolError("failed to open node stderr".to_string()))?;

        let stderr_task = tokio::spawn(stderr_tail(stderr, STDERR_TAIL_BYTES));

        let mut stdout_reader = BufReader::new(stdout).lines();

        let ready_line = stdout_reader
            .next_line()
            .await
            .map_err(|e| RunnerError::ProtocolError(format!("failed to read node ready: {e}")))?;

        let Some(ready_line) = ready_line else {
            let stderr = stderr_task.await.unwrap_or_default();
            let status = child.wait().await.map_err(RunnerError::SpawnFailed)?;
            return Err(RunnerError::ProcessFailed {
                code: status.code().unwrap_or(-1),
                stderr,
            });
        };

        let ready: NodeReady = serde_json::from_str(&ready_line)
            .map_err(|e| RunnerError::ParseError(format!("invalid ready response: {e}")))?;
        if !ready.ready {
            return Err(RunnerError::ProtocolError(format!(
                "unexpected node ready response: {}",
                ready_line
            )));
        }

        tracing::debug!(node = %node_path, cwd = %workspace_root, "node less worker ready");

        Ok(Self {
            child,
            stdin,
            stdout: stdout_reader,
            stderr_task: Some(stderr_task),
            in_flight: false,
        })
    }

    async fn render(
        &mut self,
        id: u64,
        source: &str,
        options: &RenderOptions,
    ) -> Result<RenderOutput, RenderError> {
        let request = LessRequest {
            id,
            filename: &options.filename,
            source,
            plugins: &options.plugins,
        };

        let line = serde_json::to_string(&request).map_err(|e| {
            RunnerError::ProtocolError(format!("failed to serialize request: {e}"))
        })?;
        self.in_flight = true;
        self.stdin.write_all(line.as_bytes()).await.map_err(|e| {
            RunnerError::ProtocolError(format!("failed to write to node stdin: {e}"))
        })?;
        self.stdin
            .write_all(b"\n")
            .await
            .map_err(|e| RunnerError::ProtocolError(format!("failed to write newline: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| RunnerError::ProtocolError(format!("failed to flush node stdin: {e}")))?;

        let line = self.stdout.next_line().await.map_err(|e| {
            RunnerError::ProtocolError(format!("failed to read node response: {e}"))
        })?;

        let Some(line) = line else {
            return Err(self.exit_error().await.into());
        };
        self.in_flight = false;

        decode_response(id, &line)
    }

    async fn exit_error(&mut self) -> RunnerError {
        let stderr = match self.stderr_task.take() {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };
        match self.child.wait().await {
            Ok(status) => RunnerError::ProcessFailed {
                code: status.code().unwrap_or(-1),
                stderr,
            },
            Err(e) => RunnerError::SpawnFailed(e),
        }
    }
}

/// Reads `reader` to the end, keeping only the last `limit` bytes.
async fn stderr_tail<R: AsyncRead + Unpin>(reader: R, limit: usize) -> String {
    let mut reader = BufReader::new(reader);
    let mut tail = Vec::new();
    let mut chunk = [0u8; 8 * 1024];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                tail.extend_from_slice(&chunk[..n]);
                if tail.len() > limit {
                    let excess = tail.len() - limit;
                    tail.drain(..excess);
                }
            }
        }
    }
    String::from_utf8_lossy(&tail).into_owned()
}

fn decode_response(id: u64, line: &str) -> Result<RenderOutput, RenderError> {
    let response: LessResponse = serde_json::from_str(line)
        .map_err(|e| RunnerError::ParseError(format!("invalid response: {e} ({line})")))?;

    if let Some(fatal) = response.fatal {
        return Err(RunnerError::ProtocolError(fatal).into());
    }

    match response.id {
        Some(response_id) if response_id == id => {}
        Some(other) => {
            return Err(RunnerError::ProtocolError(format!("unexpected response id {other}")).into())
        }
        None => {
            return Err(RunnerError::ProtocolError(format!("missing response id: {line}")).into())
        }
    }

    if let Some(error) = response.error {
        return Err(RenderError::Compile(error));
    }

    response
        .css
        .map(|css| RenderOutput { css })
        .ok_or_else(|| RunnerError::ProtocolError(format!("response without css: {line}")).into())
}
