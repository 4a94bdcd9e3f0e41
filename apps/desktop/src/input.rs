use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{stdin, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line-oriented terminal input shared by the interactive screens.
pub struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(stdin()).lines(),
        }
    }

    /// Next trimmed line, or `None` once stdin is closed.
    pub async fn line(&mut self, prompt: &str) -> Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush().context("failed to flush stdout")?;
        let line = self
            .lines
            .next_line()
            .await
            .context("failed to read from stdin")?;
        Ok(line.map(|l| l.trim().to_string()))
    }

    /// Asks for one field; an empty answer keeps `current`.
    pub async fn field(&mut self, label: &str, current: &str) -> Result<Option<String>> {
        let prompt = if current.is_empty() {
            format!("{label}: ")
        } else {
            format!("{label} [{current}]: ")
        };
        Ok(self.line(&prompt).await?.map(|answer| {
            if answer.is_empty() {
                current.to_string()
            } else {
                answer
            }
        }))
    }
}
