use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::terminal::Terminal;

const EOF_RETRY_DELAY: Duration = Duration::from_millis(100);

/// A yes/no question asked on the terminal before the job is submitted.
///
/// Ctrl-C answers "no".
pub struct ConfirmationGate {
    prompt: String,
    terminal: PathBuf,
}

impl ConfirmationGate {
    pub fn new(prompt: impl Into<String>, terminal: impl Into<PathBuf>) -> Self {
        Self {
            prompt: prompt.into(),
            terminal: terminal.into(),
        }
    }

    pub async fn confirm(&self) -> Result<bool> {
        let (input, output) = Terminal::open_prompt(&self.terminal)
            .with_context(|| format!("failed to open terminal {}", self.terminal.display()))?;

        let interrupt = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                debug!("unable to listen for ctrl-c: {err}");
                std::future::pending::<()>().await;
            }
        };

        ask(&self.prompt, BufReader::new(input), output, interrupt)
            .await
            .context("failed to read answer")
    }
}

/// Ask `prompt` until a y/n answer is read or `interrupt` resolves.
///
/// `input` is consumed, so it is closed as soon as an answer or the interrupt
/// arrives and no later line is read from it. End of input is retried rather
/// than reported.
pub async fn ask<R, W, I>(prompt: &str, input: R, mut output: W, interrupt: I) -> io::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    I: Future<Output = ()>,
{
    writeln!(output, "{prompt} [y/n]")?;
    output.flush()?;

    let mut lines = input.lines();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            _ = &mut interrupt => {
                debug!("confirmation interrupted");
                return Ok(false);
            }
            line = lines.next_line() => match line? {
                Some(answer) => match parse_answer(&answer) {
                    Some(answer) => return Ok(answer),
                    None => {
                        writeln!(output, "Please answer y or n:")?;
                        output.flush()?;
                    }
                },
                None => tokio::select! {
                    _ = &mut interrupt => {
                        debug!("confirmation interrupted");
                        return Ok(false);
                    }
                    _ = tokio::time::sleep(EOF_RETRY_DELAY) => {}
                },
            },
        }
    }
}

fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::pending;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::task::Poll;
    use tokio::io::{AsyncRead, AsyncWriteExt, ReadBuf, duplex};

    async fn answer(input: &'static str) -> (bool, String) {
        let mut output = Vec::new();
        let confirmed = ask("Create job?", Cursor::new(input), &mut output, pending())
            .await
            .unwrap();
        (confirmed, String::from_utf8(output).unwrap())
    }

    #[test]
    fn answers_are_parsed() {
        assert_eq!(parse_answer("y\n"), Some(true));
        assert_eq!(parse_answer(" YES "), Some(true));
        assert_eq!(parse_answer("n"), Some(false));
        assert_eq!(parse_answer("\n"), Some(false));
        assert_eq!(parse_answer("maybe"), None);
    }

    #[tokio::test]
    async fn yes_confirms() {
        let (confirmed, output) = answer("y\n").await;
        assert!(confirmed);
        assert_eq!(output, "Create job? [y/n]\n");
    }

    #[tokio::test]
    async fn unknown_answer_prompts_again() {
        let (confirmed, output) = answer("maybe\nn\n").await;
        assert!(!confirmed);
        assert!(output.ends_with("Please answer y or n:\n"));
    }

    #[tokio::test]
    async fn end_of_input_is_retried_until_interrupt() {
        let mut output = Vec::new();
        let interrupt = tokio::time::sleep(Duration::from_millis(250));

        let confirmed = ask("Create job?", Cursor::new(""), &mut output, interrupt)
            .await
            .unwrap();
        assert!(!confirmed);
    }

    #[tokio::test]
    async fn read_error_is_reported() {
        struct Broken;

        impl AsyncRead for Broken {
            fn poll_read(
                self: Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
                _: &mut ReadBuf<'_>,
            ) -> Poll<io::Result<()>> {
                Poll::Ready(Err(io::Error::other("device gone")))
            }
        }

        let mut output = Vec::new();
        let err = ask("Create job?", BufReader::new(Broken), &mut output, pending())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "device gone");
    }

    #[tokio::test]
    async fn answer_closes_the_input() {
        let (mut operator, terminal) = duplex(64);
        operator.write_all(b"y\n").await.unwrap();

        let mut output = Vec::new();
        let confirmed = ask("Create job?", BufReader::new(terminal), &mut output, pending())
            .await
            .unwrap();
        assert!(confirmed);

        let err = operator.write_all(b"next-command-input\n").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn interrupt_closes_a_pending_read() {
        let (mut operator, terminal) = duplex(64);
        let interrupt = tokio::time::sleep(Duration::from_millis(50));

        let mut output = Vec::new();
        let confirmed = ask("Create job?", BufReader::new(terminal), &mut output, interrupt)
            .await
            .unwrap();
        assert!(!confirmed);

        let err = operator.write_all(b"y\n").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
