use std::io::Write;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line-oriented terminal input shared by every prompt in one command
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `label` to stderr and read one line; `None` on EOF
    pub async fn ask(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        eprint!("{}", label);
        std::io::stderr().flush()?;
        Ok(self.lines.next_line().await?)
    }

    /// Wait for Enter or until `timeout` elapses, whichever comes first
    pub async fn wait_for_enter(&mut self, label: &str, timeout: Duration) -> anyhow::Result<()> {
        eprintln!("{}", label);
        tokio::select! {
            line = self.lines.next_line() => { line?; }
            _ = tokio::time::sleep(timeout) => {}
        }
        Ok(())
    }
}

impl Default for Prompt {
    fn default() -> Self {
        Self::new()
    }
}
