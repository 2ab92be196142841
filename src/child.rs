//! Detached child-process supervision (§4.2 of spec.md).
//!
//! The adapter is spawned in a new session so that it (and whatever it
//! forks beneath itself) can never steal the controlling terminal and send
//! `SIGTTIN`/`SIGTTOU` back at the parent on background I/O. Teardown kills
//! the whole process group, not just the direct pid, because adapters
//! typically fork a launcher and a debuggee beneath themselves.

use std::os::unix::process::CommandExt;
use std::process::{Child as StdChild, Command};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use os_pipe::{PipeReader, PipeWriter};

use crate::error::{Error, Result};

/// A running adapter process with piped stdio, detached into its own
/// session/process-group.
pub struct AdapterProcess {
    child: StdChild,
    stdin: PipeWriter,
    stdout: PipeReader,
    // Held open only so the adapter doesn't see EPIPE/SIGPIPE writing to
    // stderr once nothing reads it; its contents are never consulted.
    #[allow(dead_code)]
    stderr: PipeReader,
}

impl AdapterProcess {
    /// Spawn `argv[0]` with `argv[1..]` as arguments, piping stdin/stdout/stderr.
    ///
    /// Between fork and exec the child calls `setsid()` to start a new
    /// session before `exec`'ing, detaching it from any controlling
    /// terminal. All pipe ends are close-on-exec by construction
    /// (`os_pipe` sets `CLOEXEC` on the ends retained by the parent).
    pub fn spawn(argv: &[String]) -> Result<Self> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            Error::InvalidResponse("adapter argv must have at least one element".to_string())
        })?;

        let (stdin_reader, stdin_writer) = os_pipe::pipe().map_err(Error::Spawn)?;
        let (stdout_reader, stdout_writer) = os_pipe::pipe().map_err(Error::Spawn)?;
        let (stderr_reader, stderr_writer) = os_pipe::pipe().map_err(Error::Spawn)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(stdin_reader)
            .stdout(stdout_writer)
            .stderr(stderr_writer);

        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()
                    .map_err(|errno| std::io::Error::from_raw_os_error(errno as i32))?;
                Ok(())
            });
        }

        let child = command.spawn().map_err(Error::Spawn)?;

        Ok(AdapterProcess {
            child,
            stdin: stdin_writer,
            stdout: stdout_reader,
            stderr: stderr_reader,
        })
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn stdin(&self) -> &PipeWriter {
        &self.stdin
    }

    pub fn stdin_mut(&mut self) -> &mut PipeWriter {
        &mut self.stdin
    }

    pub fn stdout_reader(&self) -> Result<PipeReader> {
        self.stdout.try_clone().map_err(Error::Spawn)
    }

    /// Tear down the process group: `SIGTERM` first, then `SIGKILL`, both
    /// best-effort (failures are swallowed — the process may already be gone).
    pub fn kill(&mut self) {
        let pid = Pid::from_raw(self.child.id() as i32);
        let group = Pid::from_raw(-(self.child.id() as i32));
        let _ = signal::kill(group, Signal::SIGTERM);
        let _ = self.child.wait();
        let _ = signal::kill(pid, Signal::SIGKILL);
    }
}

impl Drop for AdapterProcess {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_and_kill_a_real_process() {
        let mut proc = AdapterProcess::spawn(&["/bin/cat".to_string()]).unwrap();
        assert!(proc.pid() > 0);
        proc.kill();
    }

    #[test]
    fn empty_argv_is_rejected() {
        assert!(AdapterProcess::spawn(&[]).is_err());
    }
}
