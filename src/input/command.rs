//! Command parsing for the terminal page
//!
//! One command per line:
//! `hover <row>`, `click <row>`, `focus`, `type <email>`, `submit [email]`, `quit`.
//! Rows are 1-based as printed on the page.

/// A user interaction on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Pointer entered a collection row (0-based)
    RowHover(usize),
    /// Pointer clicked a collection row (0-based)
    RowClick(usize),
    /// Email field gained focus
    FieldFocus,
    /// Email field content replaced
    Input(String),
    /// Submit button pressed, optionally typing the address first
    Submit(Option<String>),
    /// Leave the page
    Quit,
}

/// A line that is not a valid command
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("'{0}' is not a row number")]
    InvalidRow(String),
}

impl UiEvent {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>, InputError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let event = match command.to_ascii_lowercase().as_str() {
            "hover" => UiEvent::RowHover(parse_row("hover", rest)?),
            "click" => UiEvent::RowClick(parse_row("click", rest)?),
            "focus" => UiEvent::FieldFocus,
            "type" => {
                if rest.is_empty() {
                    return Err(InputError::MissingArgument("type"));
                }
                UiEvent::Input(rest.to_string())
            }
            "submit" => UiEvent::Submit((!rest.is_empty()).then(|| rest.to_string())),
            "quit" | "exit" => UiEvent::Quit,
            other => return Err(InputError::UnknownCommand(other.to_string())),
        };

        Ok(Some(event))
    }
}

fn parse_row(command: &'static str, arg: &str) -> Result<usize, InputError> {
    if arg.is_empty() {
        return Err(InputError::MissingArgument(command));
    }
    match arg.parse::<usize>() {
        Ok(row) if row >= 1 => Ok(row - 1),
        _ => Err(InputError::InvalidRow(arg.to_string())),
    }
}
