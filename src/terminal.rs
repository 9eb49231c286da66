use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::process::{Command, Stdio};

use nix::fcntl::OFlag;
use tokio::net::unix::pipe;

pub const DEFAULT_TTY: &str = "/dev/tty";

/// The controlling terminal, opened for one subprocess and closed on drop.
pub struct Terminal {
    input: File,
    output: File,
}

impl Terminal {
    pub fn open(path: &Path) -> io::Result<Self> {
        let input = OpenOptions::new().read(true).open(path)?;
        let output = OpenOptions::new().write(true).open(path)?;
        Ok(Self { input, output })
    }

    /// Open the terminal for a prompt read from async code.
    ///
    /// The input is non-blocking and driven by the runtime, so dropping it
    /// closes the terminal even while a read is pending. Must be called from
    /// within a tokio runtime.
    pub fn open_prompt(path: &Path) -> io::Result<(pipe::Receiver, File)> {
        let input = OpenOptions::new()
            .read(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(path)?;
        let output = OpenOptions::new().write(true).open(path)?;
        Ok((pipe::Receiver::from_file_unchecked(input)?, output))
    }

    /// Wire the terminal to the standard streams of `cmd`.
    pub fn attach(&self, cmd: &mut Command) -> io::Result<()> {
        cmd.stdin(Stdio::from(self.input.try_clone()?))
            .stdout(Stdio::from(self.output.try_clone()?))
            .stderr(Stdio::from(self.output.try_clone()?));
        Ok(())
    }
}
