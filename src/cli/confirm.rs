use std::io::{self, BufRead, Write};

pub fn is_affirmative(reply: &str) -> bool {
    matches!(reply.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Writes `question` and blocks for one line of input. End of input declines.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut reply = String::new();
    if input.read_line(&mut reply)? == 0 {
        return Ok(false);
    }

    Ok(is_affirmative(&reply))
}
