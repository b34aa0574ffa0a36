use std::io;
use tickpair::{Trigger, TriggerSource};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// A [`TriggerSource`] reading line-based operator input from stdin.
///
/// `c` requests a capture, `g` requests a lookup (the next line is then
/// consumed as the 12-digit query). Anything else is reported at debug
/// level and ignored.
#[derive(Debug)]
pub struct StdinTriggerSource {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for StdinTriggerSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StdinTriggerSource {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl TriggerSource for StdinTriggerSource {
    async fn next_trigger(&mut self) -> Option<Trigger> {
        loop {
            let line = self.lines.next_line().await.ok().flatten()?;
            match line.trim() {
                "c" | "C" => return Some(Trigger::Capture),
                "g" | "G" => return Some(Trigger::Lookup),
                "" => {}
                other => tracing::debug!(input = other, "ignoring unrecognized input"),
            }
        }
    }

    async fn query_value(&mut self) -> io::Result<String> {
        println!("enter the 12-digit value to look up:");
        self.lines
            .next_line()
            .await?
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"))
    }
}
