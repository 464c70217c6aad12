//! Input/Output utilities.

use std::{
    fmt::Display,
    io::{BufRead, Write},
};

use anyhow::Context;
use dialoguer::Editor;

const CUT_MARKER: &str = "# ------------------------ >8 ------------------------";

const DESCRIPTION_TEMPLATE: &str = "

# ------------------------ >8 ------------------------
# Do not modify or remove the line above.
# Everything below it will be ignored.

Explain the work done in this pull request above the cut marker.
Save and exit your editor to continue.
";

/// Line-oriented prompt/response channel.
///
/// Production code reads stdin and writes stdout; tests hand in byte
/// buffers.
pub struct Terminal<'a> {
    input: &'a mut dyn BufRead,
    output: &'a mut dyn Write,
}

impl<'a> Terminal<'a> {
    pub fn new(input: &'a mut dyn BufRead, output: &'a mut dyn Write) -> Self {
        Self { input, output }
    }

    /// Writes a line.
    pub fn say(&mut self, message: impl Display) -> anyhow::Result<()> {
        writeln!(self.output, "{message}").context("Failed to write to the terminal")
    }

    /// Writes text verbatim.
    pub fn write(&mut self, text: &str) -> anyhow::Result<()> {
        self.output
            .write_all(text.as_bytes())
            .context("Failed to write to the terminal")
    }

    /// Asks a question and returns the answer as typed, trailing newline
    /// included. End of input yields whatever was read so far.
    pub fn ask_raw(&mut self, question: &str) -> anyhow::Result<String> {
        write!(self.output, "{question}").context("Failed to write to the terminal")?;
        self.output.flush().context("Failed to flush the terminal")?;

        let mut answer = String::new();

        self.input
            .read_line(&mut answer)
            .context("Failed to read answer")?;

        Ok(answer)
    }

    /// Asks a question and returns the trimmed answer.
    pub fn ask(&mut self, question: &str) -> anyhow::Result<String> {
        Ok(self.ask_raw(question)?.trim().to_string())
    }

    /// Asks a yes/no question where only `y` or `Y` counts as yes.
    pub fn confirm(&mut self, question: &str) -> anyhow::Result<bool> {
        Ok(matches!(self.ask(question)?.as_str(), "y" | "Y"))
    }

    /// Reads every remaining line until end of input.
    pub fn read_to_end(&mut self) -> anyhow::Result<String> {
        let mut text = String::new();

        for line in (&mut *self.input).lines() {
            text.push_str(&line.context("Failed to read input")?);
            text.push('\n');
        }

        Ok(text)
    }
}

/// Opens the user's text editor to write a longer text. Everything below the
/// cut marker is dropped.
pub fn write_in_editor() -> anyhow::Result<String> {
    let Some(file_content) = Editor::new()
        .edit(DESCRIPTION_TEMPLATE)
        .context("Failed opening text editor to enter the description")?
    else {
        anyhow::bail!("Aborting: No description provided (editor closed without saving)")
    };

    strip_below_cut_marker(&file_content)
}

fn strip_below_cut_marker(content: &str) -> anyhow::Result<String> {
    match content.rsplit_once(CUT_MARKER) {
        Some((text, _)) => Ok(text.trim().to_string()),
        None => anyhow::bail!(
            "The cut marker '{CUT_MARKER}' was removed or modified. \
             This marker is required to separate your text from the help text."
        ),
    }
}
