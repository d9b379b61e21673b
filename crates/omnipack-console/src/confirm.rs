use thiserror::Error;

use crate::console::Console;

// Invalid answers tolerated before the prompt gives up. A typo should not
// punish an interactive user, but a pipe feeding blank lines must not
// spin forever.
pub const MAX_PROMPT_ATTEMPTS: u32 = 10;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("no valid selection after {attempts} attempts")]
    InvalidInput { attempts: u32 },
    #[error("terminal unavailable: {0}")]
    Terminal(#[source] anyhow::Error),
}

/// Shows `prompt` with a 1-based numbered choice list and reads lines
/// until one parses as an in-range selection. Returns the chosen label.
pub fn prompt_for_confirmation(
    console: &dyn Console,
    prompt: &str,
    choices: &[String],
) -> Result<String, PromptError> {
    if choices.is_empty() {
        return Err(PromptError::InvalidArgument(
            "No choices passed in.".to_string(),
        ));
    }
    if prompt.trim().is_empty() {
        return Err(PromptError::InvalidArgument(
            "prompt text must not be empty".to_string(),
        ));
    }

    let mut rendered = String::new();
    rendered.push_str(prompt);
    rendered.push('\n');
    for (index, choice) in choices.iter().enumerate() {
        rendered.push_str(&format!(" {}) {}\n", index + 1, choice));
    }

    let mut attempts = 0;
    while attempts < MAX_PROMPT_ATTEMPTS {
        console.write(&rendered).map_err(PromptError::Terminal)?;

        let line = console.read_line().map_err(PromptError::Terminal)?;
        if let Some(choice) = parse_selection(&line, choices) {
            return Ok(choice);
        }

        attempts += 1;
        console
            .write_error(&format!(
                "'{}' is not a valid selection, enter a number between 1 and {}\n",
                line.trim(),
                choices.len()
            ))
            .map_err(PromptError::Terminal)?;
    }

    Err(PromptError::InvalidInput { attempts })
}

fn parse_selection(line: &str, choices: &[String]) -> Option<String> {
    let selection = line.trim().parse::<usize>().ok()?;
    if (1..=choices.len()).contains(&selection) {
        Some(choices[selection - 1].clone())
    } else {
        None
    }
}
