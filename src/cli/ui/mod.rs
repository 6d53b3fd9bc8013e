mod output;
mod terminal;

pub use output::Output;
pub use terminal::{ConsoleTerminal, Terminal};

#[cfg(test)]
pub(crate) use terminal::scripted::ScriptedTerminal;
