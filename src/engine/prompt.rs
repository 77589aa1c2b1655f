//! Yes/no confirmation before renaming.

use anyhow::{Result, bail};
use std::io::{BufRead, Write};

/// Ask `msg` on stdout and read the answer from stdin.
pub fn prompt(msg: &str) -> Result<bool> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    prompt_with(&mut stdin.lock(), &mut stdout.lock(), msg)
}

/// `yes` → true, `no`/`n` → false (case and surrounding whitespace ignored); anything else is an error.
pub fn prompt_with<R: BufRead, W: Write>(input: &mut R, output: &mut W, msg: &str) -> Result<bool> {
    writeln!(output, "{msg} [yes/no]")?;
    output.flush()?;
    let mut response = String::new();
    if input.read_line(&mut response)? == 0 {
        bail!("no response (end of input)");
    }
    let response = response.trim().to_lowercase();
    match response.as_str() {
        "yes" => Ok(true),
        "no" | "n" => Ok(false),
        _ => bail!("\"{}\" is not \"yes\" or \"no\"", response),
    }
}
