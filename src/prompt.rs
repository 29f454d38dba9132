//! Line-oriented prompting for values missing from the command line.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

pub const WACC_PROMPT: &str = "Enter WACC (as decimal, e.g., 0.10 for 10%): ";
pub const TERMINAL_GROWTH_PROMPT: &str = "Enter terminal growth rate (as decimal): ";
pub const PROJECTION_YEARS_PROMPT: &str = "Enter number of years to project (1-10): ";

/// Asks for a value until `parse` accepts it, echoing each rejection reason.
///
/// End of input is an `UnexpectedEof` error rather than a retry.
pub fn prompt_until_valid<T, E, R, W>(
    label: &str,
    parse: impl Fn(&str) -> Result<T, E>,
    input: &mut R,
    output: &mut W,
) -> io::Result<T>
where
    E: Display,
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        write!(output, "{label}")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input ended before a valid value was entered",
            ));
        }

        match parse(line.trim()) {
            Ok(value) => return Ok(value),
            Err(reason) => writeln!(output, "{reason}")?,
        }
    }
}
