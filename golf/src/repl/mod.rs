//! REPL (Read-Eval-Print Loop) for golf

use crate::config::RunConfig;
use crate::interp::Interpreter;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "> ";
const HISTORY_FILE: &str = ".golf_history";

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    interpreter: Interpreter,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL
    pub fn new() -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let interpreter = Interpreter::new(RunConfig::new().read_stdin(false));
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            interpreter,
            history_path,
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("golf {}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    let _ = self.editor.add_history_entry(line);

                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.eval_line(line);
                    println!();
                    println!("{}", self.stack_listing());
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :); true means exit
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" => true,
            ":help" | ":h" => {
                self.print_help();
                false
            }
            ":stack" | ":s" => {
                println!("{}", self.stack_listing());
                false
            }
            ":clear" => {
                self.interpreter.clear_stack();
                false
            }
            ":names" => {
                println!("{}", self.interpreter.bindings().names().join(" "));
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  :help, :h       Show this help");
        println!("  :stack, :s      Show the stack");
        println!("  :clear          Empty the stack");
        println!("  :names          List bound names");
        println!("  :quit, :q       Exit the REPL");
        println!();
        println!("Any other line runs as a program against the current stack.");
    }

    /// Run one line; errors are reported and the stack is kept as it was
    /// when the error happened
    fn eval_line(&mut self, line: &str) {
        if let Err(err) = self.interpreter.execute(line) {
            eprintln!("{err}");
        }
    }

    /// Literal form of every stack value, bottom first
    fn stack_listing(&self) -> String {
        let items: Vec<String> = self
            .interpreter
            .stack()
            .iter()
            .map(|value| value.to_string())
            .collect();
        format!("[{}]", items.join(" "))
    }
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
