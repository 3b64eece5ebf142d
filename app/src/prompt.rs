use std::io::{self, BufRead, Write};
use tracing::debug;

/// Blocking text prompt. `None` means the user backed out.
pub trait NamePrompt {
    fn ask(&mut self, title: &str, prompt: &str) -> Option<String>;
}

/// Line-based prompt on the controlling terminal. End of input cancels.
pub struct StdinPrompt<R, W> {
    input: R,
    output: W,
}

impl StdinPrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn new() -> Self {
        Self::with_io(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdinPrompt<R, W> {
    pub fn with_io(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> NamePrompt for StdinPrompt<R, W> {
    fn ask(&mut self, title: &str, prompt: &str) -> Option<String> {
        let shown = write!(self.output, "{title}\n{prompt}: ").and_then(|_| self.output.flush());
        if let Err(e) = shown {
            debug!(error = %e, "could not write prompt");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                debug!(error = %e, "could not read name");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_one_line() {
        let mut out = Vec::new();
        let mut prompt = StdinPrompt::with_io(&b"Ada Lovelace\r\nnext\n"[..], &mut out);
        assert_eq!(
            prompt.ask("Create New Minecraft Block", "Please enter your full name"),
            Some("Ada Lovelace".to_string())
        );
        drop(prompt);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Create New Minecraft Block\nPlease enter your full name: "
        );
    }

    #[test]
    fn end_of_input_cancels() {
        let mut prompt = StdinPrompt::with_io(&b""[..], io::sink());
        assert_eq!(prompt.ask("t", "p"), None);
    }

    #[test]
    fn empty_line_is_an_answer() {
        let mut prompt = StdinPrompt::with_io(&b"\n"[..], io::sink());
        assert_eq!(prompt.ask("t", "p"), Some(String::new()));
    }
}
