//! Nested build run as an external process
//!
//! The configured command is run with the selected task list appended.
//! Output lines starting with the artifact prefix are reported as produced
//! outputs; everything else is forwarded to the log.

use super::{BuildObserver, BuildPlan, NestedBuildDriver};
use crate::config::schema::BuildConfig;
use crate::error::{NestError, NestResult};
use crate::operation::ExecutionContext;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Environment variable carrying the parent operation ID into the child
pub const PARENT_OPERATION_ENV: &str = "NESTBUILD_PARENT_OPERATION";

/// Max number of output lines to include in build error messages.
const BUILD_ERROR_TAIL_LINES: usize = 50;

/// Driver running the nested build as a child process
#[derive(Debug)]
pub struct ProcessDriver {
    config: BuildConfig,
    context: ExecutionContext,
}

impl ProcessDriver {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            context: ExecutionContext::new(),
        }
    }

    /// Full argv for a run with the given plan
    pub fn command_line(&self, plan: &BuildPlan) -> Vec<String> {
        let tasks = if plan.clean {
            &self.config.clean_tasks
        } else {
            &self.config.tasks
        };
        self.config
            .command
            .iter()
            .chain(tasks.iter())
            .cloned()
            .collect()
    }

    fn working_dir(&self) -> NestResult<PathBuf> {
        match self.config.working_dir {
            Some(ref dir) => Ok(dir.clone()),
            None => std::env::current_dir()
                .map_err(|e| NestError::io("getting current directory", e)),
        }
    }

    /// Parse an artifact report line, resolving relative paths
    ///
    /// The line is taken as raw bytes so paths need not be valid UTF-8.
    fn parse_artifact(&self, line: &[u8], working_dir: &Path) -> Option<PathBuf> {
        let rest = line
            .strip_prefix(self.config.artifact_prefix.as_bytes())?
            .trim_ascii();
        if rest.is_empty() {
            return None;
        }
        let path = path_from_bytes(rest);
        Some(if path.is_absolute() {
            path
        } else {
            working_dir.join(path)
        })
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    PathBuf::from(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Output line as text for logging, with invalid UTF-8 replaced
fn line_text(line: &[u8]) -> String {
    let text = String::from_utf8_lossy(line);
    text.strip_suffix('\r').unwrap_or(&*text).to_string()
}

/// Keep the last `BUILD_ERROR_TAIL_LINES` lines of output
fn push_tail(tail: &mut VecDeque<String>, line: String) {
    if tail.len() == BUILD_ERROR_TAIL_LINES {
        tail.pop_front();
    }
    tail.push_back(line);
}

#[async_trait]
impl NestedBuildDriver for ProcessDriver {
    fn execution_context(&self) -> &ExecutionContext {
        &self.context
    }

    async fn run(&self, observer: &mut dyn BuildObserver) -> NestResult<()> {
        if self.config.command.is_empty() {
            return Err(NestError::NoBuildCommand);
        }

        let mut plan = BuildPlan::default();
        observer.build_starting(&mut plan);

        let argv = self.command_line(&plan);
        let command_display = argv.join(" ");
        let working_dir = self.working_dir()?;
        info!("Running nested build: {}", command_display);

        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..])
            .current_dir(&working_dir)
            .envs(&self.config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(parent) = self.context.parent_operation() {
            cmd.env(PARENT_OPERATION_ENV, parent.id.to_string());
        }

        let mut child = cmd.spawn().map_err(|e| NestError::BuildSpawn {
            command: command_display.clone(),
            source: e,
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| NestError::Internal("nested build stdout not piped".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| NestError::Internal("nested build stderr not piped".to_string()))?;

        let mut stdout_reader = BufReader::new(stdout).split(b'\n');
        let mut stderr_reader = BufReader::new(stderr).split(b'\n');
        let mut stdout_done = false;
        let mut stderr_done = false;
        let mut tail = VecDeque::new();

        while !stdout_done || !stderr_done {
            tokio::select! {
                segment = stdout_reader.next_segment(), if !stdout_done => {
                    let segment = segment.map_err(|e| {
                        NestError::io(format!("reading stdout of {}", command_display), e)
                    })?;
                    match segment {
                        Some(raw) => {
                            let line = line_text(&raw);
                            if let Some(path) = self.parse_artifact(&raw, &working_dir) {
                                debug!("Nested build produced {}", path.display());
                                observer.output_produced(path);
                            } else {
                                debug!("{}", line);
                            }
                            push_tail(&mut tail, line);
                        }
                        None => stdout_done = true,
                    }
                }
                segment = stderr_reader.next_segment(), if !stderr_done => {
                    let segment = segment.map_err(|e| {
                        NestError::io(format!("reading stderr of {}", command_display), e)
                    })?;
                    match segment {
                        Some(raw) => {
                            let line = line_text(&raw);
                            debug!("{}", line);
                            push_tail(&mut tail, line);
                        }
                        None => stderr_done = true,
                    }
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| NestError::io(format!("waiting for {}", command_display), e))?;

        if !status.success() {
            let output_tail = Vec::from(tail).join("\n");
            return Err(match status.code() {
                Some(code) => NestError::BuildFailed {
                    command: command_display,
                    code,
                    output_tail,
                },
                None => NestError::BuildSignaled(command_display),
            });
        }

        observer.build_finished();
        info!("Nested build finished: {}", command_display);
        Ok(())
    }

    fn driver_name(&self) -> &'static str {
        "process"
    }
}
