//! Interactive prompts
//!
//! Questions go to stderr so stdout stays reserved for the final result line.
//! Reading and writing are generic so the flows can be driven from tests.

use std::io::{BufRead, Write};

use crate::crypto::SecureString;
use crate::error::{ExportError, ExportResult};

/// Line-oriented question/answer helper
pub struct Prompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl Prompter<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompter over the process's stdin and stderr
    pub fn terminal() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a line without expecting an answer
    pub fn say(&mut self, message: &str) -> ExportResult<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }

    fn read_answer(&mut self) -> ExportResult<String> {
        self.output.flush()?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(ExportError::Cancelled("input closed".into()));
        }
        Ok(line.trim().to_string())
    }

    /// Free-text question; a blank answer returns `default`
    pub fn ask(&mut self, question: &str, default: &str) -> ExportResult<String> {
        if default.is_empty() {
            write!(self.output, "{}: ", question)?;
        } else {
            write!(self.output, "{} [{}]: ", question, default)?;
        }
        let answer = self.read_answer()?;
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer
        })
    }

    /// Yes/no question; a blank answer returns `default`
    pub fn confirm(&mut self, question: &str, default: bool) -> ExportResult<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            write!(self.output, "{} ({}): ", question, hint)?;
            match self.read_answer()?.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer yes or no.")?,
            }
        }
    }

    /// Pick one option by number; a blank answer picks `default`
    pub fn choose(&mut self, question: &str, options: &[&str], default: usize) -> ExportResult<usize> {
        writeln!(self.output, "{}", question)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, option)?;
        }
        loop {
            write!(self.output, "Choice [{}]: ", default + 1)?;
            let answer = self.read_answer()?;
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(self.output, "Enter a number between 1 and {}.", options.len())?,
            }
        }
    }

    /// Pick any number of items by comma-separated numbers; blank means none
    pub fn multi_select(&mut self, question: &str, items: &[String]) -> ExportResult<Vec<String>> {
        writeln!(self.output, "{}", question)?;
        for (i, item) in items.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, item)?;
        }
        loop {
            write!(self.output, "Numbers separated by commas (blank for all): ")?;
            let answer = self.read_answer()?;
            match parse_selection(&answer, items.len()) {
                Some(indices) => return Ok(indices.into_iter().map(|i| items[i].clone()).collect()),
                None => writeln!(self.output, "Invalid selection.")?,
            }
        }
    }
}

/// Parse "1, 3" into zero-based indices; `None` on any invalid number
pub fn parse_selection(answer: &str, count: usize) -> Option<Vec<usize>> {
    let mut indices = Vec::new();
    for part in answer.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let n: usize = part.parse().ok()?;
        if n == 0 || n > count {
            return None;
        }
        if !indices.contains(&(n - 1)) {
            indices.push(n - 1);
        }
    }
    Some(indices)
}

/// Validate a password and its confirmation
pub fn check_password_pair(first: &str, second: &str) -> Result<(), &'static str> {
    if first.trim().is_empty() {
        return Err("Password cannot be empty.");
    }
    if first != second {
        return Err("Passwords do not match.");
    }
    Ok(())
}

/// Ask for the document password twice with hidden input
pub fn prompt_access_password() -> ExportResult<SecureString> {
    loop {
        let first = SecureString::new(read_hidden("PDF password: ")?);
        let second = SecureString::new(read_hidden("Confirm PDF password: ")?);
        match check_password_pair(first.as_str(), second.as_str()) {
            Ok(()) => return Ok(first),
            Err(message) => eprintln!("{}", message),
        }
    }
}

fn read_hidden(prompt: &str) -> ExportResult<String> {
    rpassword::prompt_password(prompt)
        .map_err(|e| ExportError::Io(format!("Failed to read password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_ask_uses_default_on_blank() {
        let mut p = prompter("\nreport.pdf\n");
        assert_eq!(p.ask("Output", "vault-export.pdf").unwrap(), "vault-export.pdf");
        assert_eq!(p.ask("Output", "vault-export.pdf").unwrap(), "report.pdf");
    }

    #[test]
    fn test_confirm_retries_on_garbage() {
        let mut p = prompter("maybe\nYES\n");
        assert!(p.confirm("Continue?", false).unwrap());
        let prompts = String::from_utf8(p.output).unwrap();
        assert!(prompts.contains("Please answer yes or no."));
    }

    #[test]
    fn test_closed_input_cancels() {
        let mut p = prompter("");
        assert!(matches!(p.confirm("Continue?", true), Err(ExportError::Cancelled(_))));
    }

    #[test]
    fn test_choose() {
        let mut p = prompter("7\n2\n");
        assert_eq!(p.choose("Source", &["op", "csv", "1pux"], 0).unwrap(), 1);

        let mut p = prompter("\n");
        assert_eq!(p.choose("Source", &["op", "csv"], 0).unwrap(), 0);
    }

    #[test]
    fn test_multi_select() {
        let vaults = vec!["Personal".to_string(), "Work".to_string(), "Shared".to_string()];
        let mut p = prompter("3, 1\n");
        assert_eq!(p.multi_select("Vaults", &vaults).unwrap(), vec!["Shared", "Personal"]);

        let mut p = prompter("\n");
        assert!(p.multi_select("Vaults", &vaults).unwrap().is_empty());
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1,1,2", 2), Some(vec![0, 1]));
        assert_eq!(parse_selection("0", 2), None);
        assert_eq!(parse_selection("x", 2), None);
        assert_eq!(parse_selection("", 2), Some(vec![]));
    }

    #[test]
    fn test_check_password_pair() {
        assert!(check_password_pair("secret", "secret").is_ok());
        assert_eq!(check_password_pair("  ", "  "), Err("Password cannot be empty."));
        assert_eq!(check_password_pair("a", "b"), Err("Passwords do not match."));
    }
}
