use std::io::Write;

/// Prompt and read one line. `None` once stdin is closed.
pub fn readline() -> Result<Option<String>, String> {
    write!(std::io::stdout(), "buysearch> ").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())?;

    let mut buffer = String::new();
    let read = std::io::stdin()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    Ok((read > 0).then_some(buffer))
}
