#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandLineError {
    #[error("unclosed single quote")]
    UnclosedSingleQuote,
    #[error("unclosed double quote")]
    UnclosedDoubleQuote,
    #[error("trailing escape (\\)")]
    TrailingEscape,
    #[error("no program given")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Split a command line such as `uv run python` into argv tokens.
///
/// Whitespace separates tokens outside of quotes. Single quotes keep their
/// content literally; double quotes and bare text honour backslash escapes.
pub fn split_command_line(input: &str) -> Result<Vec<String>, CommandLineError> {
    let mut tokens = Vec::new();
    let mut current: Option<String> = None;
    let mut quote = Quote::None;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Quote::None, c) if c.is_whitespace() => {
                if let Some(token) = current.take() {
                    tokens.push(token);
                }
            }
            (Quote::None, '\'') => {
                current.get_or_insert_with(String::new);
                quote = Quote::Single;
            }
            (Quote::None, '"') => {
                current.get_or_insert_with(String::new);
                quote = Quote::Double;
            }
            (Quote::Single, '\'') | (Quote::Double, '"') => quote = Quote::None,
            (Quote::None | Quote::Double, '\\') => {
                let escaped = chars.next().ok_or(CommandLineError::TrailingEscape)?;
                current.get_or_insert_with(String::new).push(escaped);
            }
            (_, c) => current.get_or_insert_with(String::new).push(c),
        }
    }

    match quote {
        Quote::None => {}
        Quote::Single => return Err(CommandLineError::UnclosedSingleQuote),
        Quote::Double => return Err(CommandLineError::UnclosedDoubleQuote),
    }

    tokens.extend(current);
    Ok(tokens)
}

/// Parse an interpreter command into the program and its leading arguments.
pub fn parse_interpreter(input: &str) -> Result<(String, Vec<String>), CommandLineError> {
    let mut tokens = split_command_line(input)?;
    if tokens.first().is_none_or(|program| program.trim().is_empty()) {
        return Err(CommandLineError::Empty);
    }
    let program = tokens.remove(0);
    Ok((program, tokens))
}

/// Render one argument so that `split_command_line` reads it back unchanged.
pub fn quote_arg(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

pub fn join_command_line<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|part| quote_arg(part.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
