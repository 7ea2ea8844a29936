//! Running a submodule's tool copy as a child process.

use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, ScopedJoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{DelegateConfig, DelegateOutput, DelegateStrategy};
use crate::types::{NestError, NestResult};

/// `ETXTBSY`: the executable is still open for writing somewhere.
#[cfg(unix)]
const TEXT_FILE_BUSY: i32 = 26;

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Spawns `<module root>/<executable>` with the module root as working
/// directory, retrying start failures caused by the executable bit racing
/// the filesystem.
pub struct SubprocessDelegate {
    executable_name: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl SubprocessDelegate {
    pub fn new(config: &DelegateConfig) -> Self {
        Self {
            executable_name: config.executable_name.clone(),
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay,
        }
    }

    fn spawn(
        &self,
        executable: &Path,
        module_root: &Path,
        args: &[String],
        capture: bool,
    ) -> io::Result<Child> {
        Command::new(executable)
            .args(args)
            .current_dir(module_root)
            .stdin(if capture { Stdio::null() } else { Stdio::inherit() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
    }

    /// Call `start` until it succeeds, retrying start races up to
    /// `max_attempts` times. `Ok(None)` means the executable vanished in
    /// between attempts.
    fn start_with_retry<T>(
        &self,
        executable: &Path,
        mut start: impl FnMut() -> io::Result<T>,
    ) -> NestResult<Option<T>> {
        let mut attempt = 1;
        loop {
            match start() {
                Ok(started) => return Ok(Some(started)),
                Err(e) if is_start_race(&e) && !executable.exists() => {
                    warn!(path = %executable.display(), "delegate executable disappeared");
                    return Ok(None);
                }
                Err(e) if is_start_race(&e) && attempt < self.max_attempts => {
                    warn!(
                        path = %executable.display(),
                        attempt,
                        "delegate start raced the filesystem, retrying: {}",
                        e
                    );
                    thread::sleep(self.retry_delay);
                    attempt += 1;
                }
                Err(source) => {
                    return Err(NestError::DelegateStart {
                        path: executable.to_path_buf(),
                        attempts: attempt,
                        source,
                    })
                }
            }
        }
    }
}

impl DelegateStrategy for SubprocessDelegate {
    fn invoke(
        &self,
        module_root: &Path,
        args: &[String],
        capture: bool,
    ) -> NestResult<DelegateOutput> {
        let executable = module_root.join(&self.executable_name);
        if !executable.is_file() {
            warn!(path = %executable.display(), "delegate executable is missing");
            return Ok(DelegateOutput::missing());
        }

        mark_executable(&executable);

        let started = self.start_with_retry(&executable, || {
            info!(path = %executable.display(), ?args, "starting delegate process");
            self.spawn(&executable, module_root, args, capture)
        })?;
        match started {
            Some(child) => collect_output(child, capture),
            None => Ok(DelegateOutput::missing()),
        }
    }
}

/// A start failure that says "not found" (or "busy") about a file that is
/// there: the permission change has not become visible yet.
fn is_start_race(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::NotFound || is_text_file_busy(error)
}

#[cfg(unix)]
fn is_text_file_busy(error: &io::Error) -> bool {
    error.raw_os_error() == Some(TEXT_FILE_BUSY)
}

#[cfg(not(unix))]
fn is_text_file_busy(_error: &io::Error) -> bool {
    false
}

/// Best-effort `chmod +x`; failures only get logged.
#[cfg(unix)]
fn mark_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(path = %path.display(), "could not stat delegate executable: {}", e);
            return;
        }
    };
    let mut permissions = metadata.permissions();
    let mode = permissions.mode();
    if mode & 0o111 == 0o111 {
        return;
    }
    permissions.set_mode(mode | 0o111);
    if let Err(e) = fs::set_permissions(path, permissions) {
        warn!(path = %path.display(), "could not mark delegate executable: {}", e);
    }
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) {}

/// Pump both pipes on their own threads until the child closes them, then
/// wait for it to exit.
fn collect_output(mut child: Child, capture: bool) -> NestResult<DelegateOutput> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (stdout, stderr) = thread::scope(|scope| {
        let out = scope.spawn(move || pump(stdout, Stream::Stdout, capture));
        let err = scope.spawn(move || pump(stderr, Stream::Stderr, capture));
        (join_pump(out, Stream::Stdout), join_pump(err, Stream::Stderr))
    });

    let status = child.wait()?;
    let exit_code = status.code().unwrap_or(-1);
    debug!(exit_code, "delegate process exited");

    Ok(DelegateOutput {
        exit_code,
        stdout,
        stderr,
    })
}

/// A pump that panicked (say, writing to a closed stdout) leaves its
/// output truncated; report it rather than pass it off as complete.
fn join_pump(handle: ScopedJoinHandle<'_, String>, stream: Stream) -> String {
    match handle.join() {
        Ok(buffer) => buffer,
        Err(_) => {
            warn!(?stream, "delegate output pump panicked, output is incomplete");
            String::new()
        }
    }
}

/// Forward (or, when capturing, accumulate) one stream line by line.
fn pump<R: Read>(reader: Option<R>, stream: Stream, capture: bool) -> String {
    let mut buffer = String::new();
    let Some(reader) = reader else {
        return buffer;
    };

    for line in BufReader::new(reader).split(b'\n') {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(?stream, "failed reading delegate output: {}", e);
                break;
            }
        };
        let line = String::from_utf8_lossy(&line);
        let line = line.strip_suffix('\r').unwrap_or(&*line);

        if capture {
            buffer.push_str(line);
            buffer.push('\n');
        } else {
            match stream {
                Stream::Stdout => println!("{}", line),
                Stream::Stderr => eprintln!("{}", line),
            }
        }
    }

    buffer
}
