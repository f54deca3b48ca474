use colored::*;
use std::fmt::Display;

// Error of any phase (lexing, parsing, resolution, evaluation) once it has
// been located in the source. Lines are stored 0-based and shown 1-based.
#[derive(Debug, PartialEq)]
pub struct CodeErr {
    line: u64,
    message: String,
}

impl CodeErr {
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for CodeErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}\n{}", "Line:".bold(), self.line + 1, self.message)
    }
}

pub trait ReportCodeErr {
    fn to_glob_err(&self, line: u64) -> CodeErr
    where
        Self: std::fmt::Display,
    {
        CodeErr {
            line,
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;

    impl Display for Dummy {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "dummy failure")
        }
    }

    impl ReportCodeErr for Dummy {}

    #[test]
    fn glob_err_keeps_line_and_message() {
        let err = Dummy.to_glob_err(4);

        assert_eq!(err.line(), 4);
        assert_eq!(err.message(), "dummy failure");
        assert!(err.to_string().ends_with("5\ndummy failure"));
    }
}
