//! Output trait for rendering driver progress.

use std::time::Duration;

/// Target output for everything the driver shows the user.
///
/// The driver describes *what* happened through these semantic methods;
/// implementations decide *how* to render it.
pub trait Output {
    /// A stage request finished.
    fn stage_timing(&mut self, url: &str, elapsed: Duration);

    /// A diagnostic's title.
    fn diagnostic(&mut self, title: &str);

    /// A highlighted piece of source belonging to the last diagnostic.
    fn source_excerpt(&mut self, excerpt: &str);

    /// One token from `--dumptokens`.
    fn token(&mut self, token: &str);

    /// The IR module from `--dumpir`.
    fn module(&mut self, module: &str);

    /// The generated target-language source.
    fn generated_source(&mut self, source: &str);

    /// Wall-clock time of the whole run.
    fn total_time(&mut self, elapsed: Duration);
}

/// Terminal output implementation.
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for TerminalOutput {
    fn stage_timing(&mut self, url: &str, elapsed: Duration) {
        println!("{}", format_timing(url, elapsed));
    }

    fn diagnostic(&mut self, title: &str) {
        println!("{}", title);
    }

    fn source_excerpt(&mut self, excerpt: &str) {
        print!("{}", format_excerpt(excerpt));
    }

    fn token(&mut self, token: &str) {
        println!("{}", token);
    }

    fn module(&mut self, module: &str) {
        println!("{}", module);
    }

    fn generated_source(&mut self, source: &str) {
        println!("{}", source);
    }

    fn total_time(&mut self, elapsed: Duration) {
        print!("{}", format_total(elapsed));
    }
}

/// `> <label padded to 45> <elapsed>`
pub fn format_timing(label: &str, elapsed: Duration) -> String {
    format!("> {:<45} {:?}", label, elapsed)
}

/// An excerpt line with a blank line on either side.
pub fn format_excerpt(excerpt: &str) -> String {
    format!("\n |>    {}\n\n", excerpt)
}

/// The closing timing line, set off by a blank line.
pub fn format_total(elapsed: Duration) -> String {
    format!("\n{}\n", format_timing("total compilation time", elapsed))
}
