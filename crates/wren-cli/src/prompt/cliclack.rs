use std::io::{self, Write};

use anyhow::Result;
use cliclack::{input, multiselect, select};
use console::style;

use super::prompt::{Prompt, SubsetItem};

const SKIP_VALUE: &str = "\u{0}skip";

pub struct CliclackPrompt;

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt
    }
}

impl Prompt for CliclackPrompt {
    fn ask_text(&mut self, message: &str) -> Result<String> {
        let text: String = input(message).placeholder("").required(false).interact()?;
        Ok(text.trim().to_string())
    }

    fn ask_one_of(&mut self, message: &str, labels: &[String]) -> Result<Option<String>> {
        let mut picker = select(message);
        for label in labels {
            picker = picker.item(label.clone(), label, "");
        }
        picker = picker.item(SKIP_VALUE.to_string(), "Continue without picking one", "");

        let choice = picker.interact()?;
        if choice == SKIP_VALUE {
            Ok(None)
        } else {
            Ok(Some(choice))
        }
    }

    fn ask_subset(
        &mut self,
        message: &str,
        items: &[SubsetItem],
        checked: &[String],
    ) -> Result<Vec<String>> {
        let mut picker = multiselect(message).required(false);
        for (id, label, hint) in items {
            picker = picker.item(id.clone(), label, hint);
        }
        Ok(picker.initial_values(checked.to_vec()).interact()?)
    }

    fn ask_long_text(&mut self, message: &str, min_len: usize) -> Result<String> {
        let text: String = input(message)
            .validate(move |value: &String| {
                if value.trim().len() < min_len {
                    Err(format!("Please provide at least {} characters", min_len))
                } else {
                    Ok(())
                }
            })
            .interact()?;
        Ok(text.trim().to_string())
    }

    fn render_system(&mut self, text: &str) {
        println!("{}", style(text).cyan());
    }

    fn assistant_start(&mut self) {
        println!("{}", style("assistant").green().bold());
    }

    fn assistant_chunk(&mut self, chunk: &str) {
        print!("{}", chunk);
        let _ = io::stdout().flush();
    }

    fn assistant_end(&mut self) {
        println!("\n");
    }
}
