use colored::*;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use crate::core::{GateError, GateResult};
use crate::permissions::{
    PermissionDecision, PermissionPrompt, PermissionRequest, PromptAnswer, Verdict, VerdictSource,
};

/// Console handles all terminal I/O with colored formatting
pub struct Console {
    input: Mutex<Box<dyn BufRead + Send>>,
    prompt_color: Color,
}

impl Console {
    /// Create a new Console reading from stdin
    pub fn new() -> Self {
        Self::with_input(io::BufReader::new(io::stdin()))
    }

    /// Create a Console reading from any line source
    pub fn with_input(input: impl BufRead + Send + 'static) -> Self {
        Self {
            input: Mutex::new(Box::new(input)),
            prompt_color: Color::Cyan,
        }
    }

    /// Read a line of input, `None` on end of input
    pub fn read_line(&self) -> io::Result<Option<String>> {
        let mut input = self
            .input
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "console input lock poisoned"))?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Print the input marker and read a request line
    pub fn read_input(&self) -> io::Result<Option<String>> {
        print!("{} ", ">".color(self.prompt_color).bold());
        io::stdout().flush()?;
        self.read_line()
    }

    /// Print a system message (errors, info, etc.)
    pub fn print_system(&self, message: &str) {
        println!("{} {}", "System:".yellow().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    /// Print the outcome of a request
    pub fn print_verdict(&self, request: &PermissionRequest, verdict: Verdict) {
        let how = match verdict.source() {
            VerdictSource::Trusted => "trusted origin",
            VerdictSource::Stored => "remembered",
            VerdictSource::Prompted => "user choice",
            VerdictSource::Rejected => "no origin",
        };
        let label = if verdict.is_granted() {
            "granted".green().bold()
        } else {
            "denied".red().bold()
        };
        println!(
            "{} {} for {} ({})",
            label,
            request.capability,
            request.origin,
            how.bright_black()
        );
    }

    /// Print one stored record
    pub fn print_record(&self, origin: &str, capability: &str, decision: PermissionDecision) {
        let value = match decision {
            PermissionDecision::Granted => decision.as_str().green(),
            PermissionDecision::Denied => decision.as_str().red(),
        };
        println!("  {} {} {}", origin, capability.bold(), value);
    }

    /// Print a welcome banner
    pub fn print_banner(&self) {
        println!("{}", "=".repeat(60).bright_blue());
        println!("{}", "  Permission Gate".bright_blue().bold());
        println!("{}", "=".repeat(60).bright_blue());
        println!();
        println!("Enter '<url> <capability>' to request a capability, 'list' to show");
        println!("remembered decisions, 'exit' or 'quit' to end.");
        println!();
    }

    /// Print a separator line
    pub fn print_separator(&self) {
        println!("{}", "-".repeat(60).bright_black());
    }
}

impl PermissionPrompt for Console {
    /// Ask until one of y/n/a/d is entered; end of input denies once
    fn ask(&self, request: &PermissionRequest) -> GateResult<PromptAnswer> {
        println!(
            "{} {} wants to use {}",
            "Permission:".magenta().bold(),
            request.origin.bold(),
            request.capability.bold()
        );
        if let Some(url) = &request.url {
            println!("  {}", url.bright_black());
        }

        loop {
            print!("  [y] allow  [n] deny  [a] always allow  [d] always deny: ");
            io::stdout()
                .flush()
                .map_err(|e| GateError::Prompt(e.to_string()))?;

            let line = self
                .read_line()
                .map_err(|e| GateError::Prompt(e.to_string()))?;

            let Some(line) = line else {
                println!();
                return Ok(PromptAnswer::Deny);
            };

            match parse_answer(&line) {
                Some(answer) => return Ok(answer),
                None => self.print_error("please answer y, n, a or d"),
            }
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_answer(input: &str) -> Option<PromptAnswer> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(PromptAnswer::Allow),
        "n" | "no" => Some(PromptAnswer::Deny),
        "a" | "always" => Some(PromptAnswer::AlwaysAllow),
        "d" | "never" => Some(PromptAnswer::AlwaysDeny),
        _ => None,
    }
}
