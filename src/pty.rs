use anyhow::{Context, Result};
use portable_pty::{Child, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};
use tracing::debug;

/// A program running inside a PTY, so it writes as it would to a live terminal
pub struct PtySession {
    #[allow(dead_code)]
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
}

/// The program's side of the conversation: its output and its input
pub struct PtyIo {
    pub reader: Box<dyn Read + Send>,
    pub writer: Box<dyn Write + Send>,
}

impl PtySession {
    /// Spawn a program in a new PTY
    pub fn spawn(command: &str, args: &[String]) -> Result<(Self, PtyIo)> {
        let pty_system = portable_pty::native_pty_system();

        let pty_size = PtySize {
            rows: 24,
            cols: 80,
            pixel_width: 0,
            pixel_height: 0,
        };

        let pair = pty_system
            .openpty(pty_size)
            .context("Failed to open PTY")?;

        let mut cmd = CommandBuilder::new(command);
        cmd.args(args);
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .with_context(|| format!("Failed to spawn {command}"))?;
        debug!(command, ?args, pid = ?child.process_id(), "spawned program");

        let writer = pair
            .master
            .take_writer()
            .context("Failed to get PTY writer")?;

        let reader = pair
            .master
            .try_clone_reader()
            .context("Failed to get PTY reader")?;

        let session = PtySession {
            master: pair.master,
            child,
        };

        Ok((session, PtyIo { reader, writer }))
    }

    /// Wait for the program to exit and return its exit code
    pub fn wait(&mut self) -> Result<u32> {
        let status = self.child.wait().context("Failed to wait for program")?;
        Ok(status.exit_code())
    }
}
