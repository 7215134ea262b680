//! Parsing of the line-oriented commands read from stdin.

use anyhow::bail;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replace the search box text (one keystroke).
    Type(String),
    /// Pick a symbol; becomes the active symbol.
    Select(String),
    /// Re-fetch the active symbol.
    Refresh,
    /// Empty the search box.
    Clear,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let line = line.trim_start();
        if line.trim().is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest),
            None => (line.trim_end(), ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            // The rest of the line is kept verbatim; the debouncer trims it.
            "type" | "t" => Self::Type(rest.trim_end_matches(['\r', '\n']).to_string()),
            "select" | "s" => {
                let symbol = rest.trim();
                if symbol.is_empty() {
                    bail!("usage: select <SYMBOL>");
                }
                Self::Select(symbol.to_ascii_uppercase())
            }
            "refresh" | "r" => Self::Refresh,
            "clear" | "c" => Self::Clear,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => bail!("unknown command '{}', try 'help'", other),
        };

        Ok(Some(command))
    }
}

pub const HELP: &str = "\
commands:
  type <text>      update the search box (searches after a short pause)
  select <SYMBOL>  make SYMBOL the active symbol and load its quote and chain
  refresh          reload the active symbol
  clear            empty the search box
  quit             exit";
