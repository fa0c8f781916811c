use colored::*;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("terminal input failed: {0}")]
    Readline(#[from] ReadlineError),
}

/// Source of user answers.
///
/// Each method returns `Ok(None)` when the user aborts the prompt (Ctrl-C or
/// end of input); the session treats that as a request to leave.
pub trait Prompter {
    /// Pick one of `choices`, answering with its index
    fn select(&mut self, message: &str, choices: &[&str]) -> Result<Option<usize>, PromptError>;

    /// Read one line of free text
    fn text(&mut self, message: &str) -> Result<Option<String>, PromptError>;

    /// Yes/no question; an empty answer takes `default`
    fn confirm(&mut self, message: &str, default: bool) -> Result<Option<bool>, PromptError>;
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn select(&mut self, message: &str, choices: &[&str]) -> Result<Option<usize>, PromptError> {
        (**self).select(message, choices)
    }

    fn text(&mut self, message: &str) -> Result<Option<String>, PromptError> {
        (**self).text(message)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<Option<bool>, PromptError> {
        (**self).confirm(message, default)
    }
}

/// Interactive prompts on the terminal, backed by rustyline
pub struct LinePrompter {
    editor: DefaultEditor,
}

impl LinePrompter {
    pub fn new() -> Result<Self, PromptError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }

    /// Reads a line, mapping Ctrl-C and EOF to `None`
    fn read(&mut self, prompt: &str) -> Result<Option<String>, PromptError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Prompter for LinePrompter {
    fn select(&mut self, message: &str, choices: &[&str]) -> Result<Option<usize>, PromptError> {
        println!("\n{}", choices_table(choices));
        let prompt = format!("? {} [1-{}]: ", message, choices.len());

        loop {
            let Some(answer) = self.read(&prompt)? else {
                return Ok(None);
            };
            match parse_selection(&answer, choices) {
                Some(index) => return Ok(Some(index)),
                None => println!(
                    "{}",
                    format!("Please enter a number between 1 and {}.", choices.len()).yellow()
                ),
            }
        }
    }

    fn text(&mut self, message: &str) -> Result<Option<String>, PromptError> {
        let answer = self.read(&format!("? {}: ", message))?;
        if let Some(line) = &answer {
            if !line.trim().is_empty() {
                let _ = self.editor.add_history_entry(line.as_str());
            }
        }
        Ok(answer)
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<Option<bool>, PromptError> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let prompt = format!("? {} {} ", message, hint);

        loop {
            let Some(answer) = self.read(&prompt)? else {
                return Ok(None);
            };
            match parse_confirm(&answer, default) {
                Some(value) => return Ok(Some(value)),
                None => println!("{}", "Please answer y or n.".yellow()),
            }
        }
    }
}

/// Numbered menu of the choices
fn choices_table(choices: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("#").fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold),
            Cell::new("Model").fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let last = choices.len().saturating_sub(1);
    for (i, choice) in choices.iter().enumerate() {
        // The trailing custom entry is styled apart from real model names
        let color = if i == last { comfy_table::Color::Yellow } else { comfy_table::Color::Green };
        table.add_row(vec![
            Cell::new((i + 1).to_string()).fg(comfy_table::Color::White).set_alignment(CellAlignment::Center),
            Cell::new(choice).fg(color),
        ]);
    }
    table
}

/// Accepts a 1-based menu number or the exact text of a choice
pub(crate) fn parse_selection(answer: &str, choices: &[&str]) -> Option<usize> {
    let answer = answer.trim();
    if let Ok(number) = answer.parse::<usize>() {
        return (1..=choices.len()).contains(&number).then(|| number - 1);
    }
    choices.iter().position(|choice| choice.eq_ignore_ascii_case(answer))
}

pub(crate) fn parse_confirm(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
