use std::io::{self, BufRead, Write};

/// Asks whether the pending rotation should go ahead.
pub trait Confirm {
    fn confirm(&mut self, pending: usize) -> io::Result<bool>;
}

/// Only `y` or `yes` proceed; anything else, including EOF, is a no.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Reads one line per prompt. Blocks the thread until the user answers.
pub struct StdinConfirm<R, W> {
    input: R,
    output: W,
}

impl StdinConfirm<io::StdinLock<'static>, io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdinConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for StdinConfirm<R, W> {
    fn confirm(&mut self, pending: usize) -> io::Result<bool> {
        writeln!(self.output, "Move {pending} videos to the end? y/n")?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

/// Always says yes, for unattended runs.
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _pending: usize) -> io::Result<bool> {
        Ok(true)
    }
}
