use rustyline::error::ReadlineError;
use rustyline::Editor;

pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<String, ReadlineError>;
}

pub struct ReplInput {
    rl: Editor<()>,
}

impl ReplInput {
    pub fn new() -> Self {
        ReplInput { rl: Editor::new() }
    }
}

impl Default for ReplInput {
    fn default() -> Self {
        ReplInput::new()
    }
}

impl LineReader for ReplInput {
    fn read_line(&mut self, prompt: &str) -> Result<String, ReadlineError> {
        let line = self.rl.readline(prompt)?;
        self.rl.add_history_entry(line.as_str());
        Ok(line + "\n")
    }
}
