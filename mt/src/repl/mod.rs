//! REPL (Read-Eval-Print Loop) for SML

use crate::config::Config;
use crate::error::{report_error, Result};
use crate::interp::{Registry, Session, Value};
use crate::lexer::tokenize;
use crate::parser::parse;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use std::sync::Arc;

const HISTORY_FILE: &str = ".mt_history";
const SOURCE_NAME: &str = "<repl>";

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    session: Session,
    config: Config,
    history_path: Option<PathBuf>,
    /// Number shown in the prompt
    line: usize,
}

impl Repl {
    /// Create a new REPL
    pub fn new(registry: Arc<Registry>, config: Config) -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let session = Session::with_config(registry, &config);

        // Try to find history file in home directory
        let history_path = if config.history {
            dirs_home().map(|h| h.join(HISTORY_FILE))
        } else {
            None
        };

        let mut repl = Repl {
            editor,
            session,
            config,
            history_path,
            line: 1,
        };

        // Load history if available
        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    fn prompt(&self) -> String {
        format!("mt:{}> ", self.line)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("Mt {}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");
        if self.config.show_env {
            println!("{}\n", self.config);
        }

        loop {
            let prompt = self.prompt();
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    // Add to history
                    let _ = self.editor.add_history_entry(line);
                    self.line += 1;

                    // Handle commands
                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.eval_input(line);
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :)
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                true
            }
            ":help" | ":h" | ":?" => {
                self.print_help();
                false
            }
            ":vars" => {
                let root = self.session.root().borrow();
                for name in root.names() {
                    match root.get_value(&name) {
                        Some(value) => println!("  {name} = {value}"),
                        None => println!("  {name} (function)"),
                    }
                }
                false
            }
            ":builtins" => {
                println!("  {}", self.session.registry().names().join(" "));
                false
            }
            ":clear" => {
                self.session.clear();
                println!("All bindings cleared.");
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }

    /// Print help message
    fn print_help(&self) {
        println!("Mt REPL Commands:");
        println!("  :help, :h, :?   Show this help");
        println!("  :quit, :q       Exit the REPL");
        println!("  :vars           List session bindings");
        println!("  :builtins       List built-in functions");
        println!("  :clear          Forget all session bindings");
        println!();
        println!("You can enter:");
        println!("  - Expressions: 1 + 2, (1+2i)*(3-1i), sqrt(-4)");
        println!("  - Variables: x := 3, x = x + 1");
        println!("  - Functions: F := (x) {{ ret x * x + 1 }}");
        println!("  - Several statements on one line, separated by ;");
    }

    /// Lex, parse and run one input line in the session
    pub fn eval_line(&mut self, input: &str) -> Result<Option<Value>> {
        let tokens = tokenize(input)?;
        let program = parse(SOURCE_NAME, input, tokens)?;
        Ok(self.session.run(&program)?)
    }

    /// Evaluate user input and print the result or the error
    fn eval_input(&mut self, input: &str) {
        match self.eval_line(input) {
            Ok(Some(value)) => println!("{value}"),
            Ok(None) => {}
            Err(err) => report_error(SOURCE_NAME, input, &err),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
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
