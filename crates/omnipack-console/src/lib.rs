mod confirm;
mod console;

pub use confirm::{prompt_for_confirmation, PromptError, MAX_PROMPT_ATTEMPTS};
pub use console::{Console, ScriptedConsole, StdConsole};

#[cfg(test)]
mod tests;
