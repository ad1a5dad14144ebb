//! Line-editing console over the command dispatcher.

use console::{Style, style};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use eviloauth::{Dispatcher, Outcome};

use crate::errors::ConsoleError;

/// What the loop does with one line of input.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Print(String),
    Error(String),
    Exit,
}

/// Runs on a blocking thread; async dispatch goes through the runtime handle.
pub(crate) struct Repl {
    dispatcher: Dispatcher,
    editor: Editor<(), DefaultHistory>,
    runtime: Handle,
}

impl Repl {
    pub(crate) fn new(dispatcher: Dispatcher, runtime: Handle) -> Result<Self, ConsoleError> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .build();
        let editor = Editor::with_config(config)?;

        Ok(Self {
            dispatcher,
            editor,
            runtime,
        })
    }

    /// Read and dispatch lines until `exit`, Ctrl-C or Ctrl-D.
    pub(crate) fn run(&mut self) -> Result<(), ConsoleError> {
        self.print_welcome();

        loop {
            let target = self.runtime.block_on(self.dispatcher.state().target.get());
            let prompt = format_prompt(target.as_deref());

            match self.editor.readline(&prompt) {
                Ok(line) => match step(&self.runtime, &self.dispatcher, &line) {
                    Step::Print(text) if text.is_empty() => {}
                    Step::Print(text) => println!("{text}"),
                    Step::Error(message) => print_error(&message),
                    Step::Exit => break,
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }

        print_dim("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        let dim = Style::new().dim();
        println!();
        println!("{}", style("eviloauth").bold().red());
        println!("{}", dim.apply_to("-".repeat(40)));
        println!(
            "{}",
            dim.apply_to(format!(
                "Modules loaded: {}",
                self.dispatcher.modules().names().join(", ")
            ))
        );
        println!("{}", dim.apply_to("Type 'help' for commands, 'exit' or Ctrl-D to quit."));
        println!();
    }
}

/// How the console ended.
#[derive(Debug)]
pub(crate) enum ConsoleExit {
    /// `exit`, Ctrl-D, or Ctrl-C at the prompt; carries the loop's own result
    Finished(Result<(), ConsoleError>),
    /// Interrupt signal while a command was running
    Interrupted,
}

/// Wait for the console thread, or for `interrupt` to fire first.
pub(crate) async fn wait_for_console<F>(
    console: JoinHandle<Result<(), ConsoleError>>,
    interrupt: F,
) -> Result<ConsoleExit, ConsoleError>
where
    F: Future<Output = ()>,
{
    tokio::select! {
        result = console => Ok(ConsoleExit::Finished(result?)),
        () = interrupt => Ok(ConsoleExit::Interrupted),
    }
}

fn step(runtime: &Handle, dispatcher: &Dispatcher, line: &str) -> Step {
    match runtime.block_on(dispatcher.dispatch(line)) {
        Ok(Outcome::Exit) => Step::Exit,
        Ok(Outcome::Continue(text)) => Step::Print(text),
        Err(e) => Step::Error(e.log().to_string()),
    }
}

fn format_prompt(target: Option<&str>) -> String {
    match target {
        Some(key) => format!("eviloauth ({}) > ", style(key).cyan()),
        None => "eviloauth > ".to_string(),
    }
}

fn print_error(message: &str) {
    eprintln!("{} {}", style("error:").red().bold(), message);
}

fn print_dim(message: &str) {
    println!("{}", Style::new().dim().apply_to(message));
}
