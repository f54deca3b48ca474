use colored::*;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

use tools::errors::{CodeErr, ReportCodeErr};

#[derive(Debug, Error, PartialEq)]
pub enum LexerError {
    #[error("{} while tokenizing code, unsupported character: -{0}-.", "Error".bold().red())]
    UnrecognizedToken(String),

    #[error("{} while tokenizing number, only digits are supported to declare a number.", "Error".bold().red())]
    AlphaCharInNumberToken,

    #[error("{} while tokenizing string, missing closing '\"'.", "Error".bold().red())]
    UnterminatedString,

    #[error("{} while tokenizing string, unknown escape sequence: -\\{0}-.", "Error".bold().red())]
    UnknownEscape(char),
}

impl ReportCodeErr for LexerError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    // Literal types
    Number,
    String,
    Identifier,

    // Operators
    Declare,         // :=
    Equals,          // =
    BinaryOperator,  // + - * / % ** < > <= >= == !=
    LogicalOperator, // && ||
    Bang,            // !
    Increment,       // ++
    Decrement,       // --
    FatArrow,        // =>

    // Grouping
    OpenParen,  // (
    CloseParen, // )
    OpenBrace,  // {
    CloseBrace, // }
    Comma,      // ,
    Colon,      // :
    Dot,        // .

    // Keywords
    Func,
    Class,
    This,
    If,
    Else,
    While,
    Return,
    True,
    False,

    // File
    EOF,
}

// We use a struct instead of enum to be able to loop only on value without to have to
// extract it from enum each time with if let syntax
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: u64,
}

// Append a white space at the end of the code to allow the window to work
// correctly. Otherwise, last character is never in its own window.
fn append_space_and_eof(mut source_code: String) -> String {
    source_code.push('\n');
    source_code.push(' ');
    source_code
}

// Skip listed char. New lines are handled apart to keep the line count
fn is_skippable(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[derive(Default)]
pub struct Lexer<'a> {
    pub tokens: VecDeque<Token>,
    reserved_keywords: HashMap<&'a str, TokenKind>,
}

impl<'a> Lexer<'a> {
    // Keywords generation
    fn generate_keywords(&mut self) {
        self.reserved_keywords.insert("func", TokenKind::Func);
        self.reserved_keywords.insert("class", TokenKind::Class);
        self.reserved_keywords.insert("this", TokenKind::This);
        self.reserved_keywords.insert("if", TokenKind::If);
        self.reserved_keywords.insert("else", TokenKind::Else);
        self.reserved_keywords.insert("while", TokenKind::While);
        self.reserved_keywords.insert("return", TokenKind::Return);
        self.reserved_keywords.insert("true", TokenKind::True);
        self.reserved_keywords.insert("false", TokenKind::False);
    }

    pub fn tokenize(&mut self, source_code: String) -> Result<(), CodeErr> {
        self.generate_keywords();

        let modified_code = append_space_and_eof(source_code);
        let chars = modified_code.chars().collect::<Vec<char>>();
        let mut window = chars.windows(2);

        // We keep the count of the current line
        let mut line: u64 = 0;

        self.tokens.clear();

        while let Some(c) = window.next() {
            let first_char = c[0];
            let second_char = c[1];

            if is_skippable(first_char) {
                continue;
            }

            match first_char {
                '\n' => line += 1,
                '(' => self.push(TokenKind::OpenParen, "(", line),
                ')' => self.push(TokenKind::CloseParen, ")", line),
                '{' => self.push(TokenKind::OpenBrace, "{", line),
                '}' => self.push(TokenKind::CloseBrace, "}", line),
                ',' => self.push(TokenKind::Comma, ",", line),
                '.' => self.push(TokenKind::Dot, ".", line),
                '%' => self.push(TokenKind::BinaryOperator, "%", line),
                // Two characters tokens, we look at the second char of the window
                // and skip it when it belongs to the token
                ':' => {
                    if second_char == '=' {
                        self.push(TokenKind::Declare, ":=", line);
                        window.next();
                    } else {
                        self.push(TokenKind::Colon, ":", line);
                    }
                }
                '=' => match second_char {
                    '=' => {
                        self.push(TokenKind::BinaryOperator, "==", line);
                        window.next();
                    }
                    '>' => {
                        self.push(TokenKind::FatArrow, "=>", line);
                        window.next();
                    }
                    _ => self.push(TokenKind::Equals, "=", line),
                },
                '!' => {
                    if second_char == '=' {
                        self.push(TokenKind::BinaryOperator, "!=", line);
                        window.next();
                    } else {
                        self.push(TokenKind::Bang, "!", line);
                    }
                }
                '<' | '>' => {
                    if second_char == '=' {
                        self.push(TokenKind::BinaryOperator, &format!("{first_char}="), line);
                        window.next();
                    } else {
                        self.push(TokenKind::BinaryOperator, &first_char.to_string(), line);
                    }
                }
                '*' => {
                    if second_char == '*' {
                        self.push(TokenKind::BinaryOperator, "**", line);
                        window.next();
                    } else {
                        self.push(TokenKind::BinaryOperator, "*", line);
                    }
                }
                '+' => {
                    if second_char == '+' {
                        self.push(TokenKind::Increment, "++", line);
                        window.next();
                    } else {
                        self.push(TokenKind::BinaryOperator, "+", line);
                    }
                }
                '-' => {
                    if second_char == '-' {
                        self.push(TokenKind::Decrement, "--", line);
                        window.next();
                    } else {
                        self.push(TokenKind::BinaryOperator, "-", line);
                    }
                }
                '&' | '|' => {
                    if second_char != first_char {
                        return Err(LexerError::UnrecognizedToken(first_char.into()).to_glob_err(line));
                    }

                    self.push(TokenKind::LogicalOperator, &format!("{first_char}{first_char}"), line);
                    window.next();
                }
                '/' => {
                    // We check if this is comment
                    if second_char == '/' {
                        while let Some(s) = window.next() {
                            // We break the loop at the end of the line
                            if s[1] == '\n' {
                                break;
                            }
                        }
                    } else {
                        self.push(TokenKind::BinaryOperator, "/", line);
                    }
                }
                '"' => {
                    let start_line = line;
                    let mut val = String::new();
                    let mut closed = false;

                    while let Some(s) = window.next() {
                        match s[0] {
                            '"' => {
                                closed = true;
                                break;
                            }
                            '\\' => {
                                let escaped = match s[1] {
                                    'n' => '\n',
                                    't' => '\t',
                                    '"' => '"',
                                    '\\' => '\\',
                                    other => {
                                        return Err(LexerError::UnknownEscape(other).to_glob_err(line))
                                    }
                                };
                                val.push(escaped);
                                // We skip the escaped char
                                window.next();
                            }
                            '\n' => {
                                line += 1;
                                val.push('\n');
                            }
                            other => val.push(other),
                        }
                    }

                    if !closed {
                        return Err(LexerError::UnterminatedString.to_glob_err(start_line));
                    }

                    self.tokens.push_back(Token::new(TokenKind::String, val, start_line));
                }
                _ => {
                    // Multiple characters token
                    if first_char.is_numeric() {
                        let mut val = String::from(first_char);
                        // Char right after the last digit
                        let mut next = second_char;

                        if second_char.is_numeric() {
                            while let Some(r) = window.next() {
                                val.push(r[0]);
                                next = r[1];

                                if !r[1].is_numeric() {
                                    break;
                                }
                            }
                        }

                        if next.is_alphabetic() || next == '_' {
                            return Err(LexerError::AlphaCharInNumberToken.to_glob_err(line));
                        }

                        self.tokens.push_back(Token::new(TokenKind::Number, val, line));
                    } else if first_char.is_alphabetic() || first_char == '_' {
                        let mut val = String::from(first_char);

                        // Support for variable like init_pos and variable with number like vec2
                        if is_identifier_char(second_char) {
                            while let Some(r) = window.next() {
                                val.push(r[0]);

                                if !is_identifier_char(r[1]) {
                                    break;
                                }
                            }
                        }

                        // Check for reserved keywords
                        match self.reserved_keywords.get(val.as_str()) {
                            Some(kind) => self.tokens.push_back(Token::new(*kind, val, line)),
                            None => self.tokens.push_back(Token::new(TokenKind::Identifier, val, line)),
                        }
                    } else {
                        return Err(LexerError::UnrecognizedToken(first_char.into()).to_glob_err(line));
                    }
                }
            }
        }

        // We append manualy end of file
        self.tokens.push_back(Token::new_eof(line));
        Ok(())
    }

    fn push(&mut self, kind: TokenKind, value: &str, line: u64) {
        self.tokens.push_back(Token::new(kind, value.to_string(), line));
    }
}

// ---------
//  Helpers
// ---------
impl Token {
    pub fn new(kind: TokenKind, value: String, line: u64) -> Self {
        Self { kind, value, line }
    }

    pub fn new_number(value: &str, line: u64) -> Token {
        Token::new(TokenKind::Number, value.to_string(), line)
    }

    pub fn new_identifier(value: &str, line: u64) -> Token {
        Token::new(TokenKind::Identifier, value.to_string(), line)
    }

    pub fn new_operator(value: &str, line: u64) -> Token {
        Token::new(TokenKind::BinaryOperator, value.to_string(), line)
    }

    pub fn new_eof(line: u64) -> Token {
        Token::new(TokenKind::EOF, "EOF".to_string(), line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(code: &str) -> Vec<TokenKind> {
        let mut lexer: Lexer = Default::default();
        lexer.tokenize(code.to_string()).expect("Should tokenize");

        lexer.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenize_single_char() {
        assert_eq!(
            kinds("(){},.: = !"),
            vec![
                TokenKind::OpenParen,
                TokenKind::CloseParen,
                TokenKind::OpenBrace,
                TokenKind::CloseBrace,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Colon,
                TokenKind::Equals,
                TokenKind::Bang,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn tokenize_operators() {
        let mut lexer: Lexer = Default::default();
        lexer
            .tokenize(String::from("+ - * / % ** < > <= >= == != && || := => ++ --"))
            .unwrap();

        let values: Vec<String> = lexer.tokens.iter().map(|t| t.value.clone()).collect();
        assert_eq!(
            values,
            vec!["+", "-", "*", "/", "%", "**", "<", ">", "<=", ">=", "==", "!=", "&&", "||", ":=", "=>", "++", "--", "EOF"]
        );

        assert_eq!(lexer.tokens[12].kind, TokenKind::LogicalOperator);
        assert_eq!(lexer.tokens[14].kind, TokenKind::Declare);
        assert_eq!(lexer.tokens[15].kind, TokenKind::FatArrow);
        assert_eq!(lexer.tokens[16].kind, TokenKind::Increment);
        assert_eq!(lexer.tokens[17].kind, TokenKind::Decrement);
    }

    #[test]
    fn tokenize_numeric_literal() {
        let mut lexer: Lexer = Default::default();
        lexer.tokenize(String::from("123 3454 6768")).unwrap();

        assert_eq!(
            lexer.tokens,
            vec![
                Token::new_number("123", 0),
                Token::new_number("3454", 0),
                Token::new_number("6768", 0),
                Token::new_eof(1),
            ]
        );
    }

    #[test]
    fn number_followed_by_letter_is_an_error() {
        let mut lexer: Lexer = Default::default();

        assert!(lexer.tokenize(String::from("12ab")).is_err());
    }

    #[test]
    fn number_then_member_access() {
        assert_eq!(
            kinds("5.x"),
            vec![TokenKind::Number, TokenKind::Dot, TokenKind::Identifier, TokenKind::EOF]
        );
    }

    #[test]
    fn tokenize_identifier() {
        let mut lexer: Lexer = Default::default();
        lexer.tokenize(String::from("init_pos vec2 _tmp")).unwrap();

        assert_eq!(
            lexer.tokens,
            vec![
                Token::new_identifier("init_pos", 0),
                Token::new_identifier("vec2", 0),
                Token::new_identifier("_tmp", 0),
                Token::new_eof(1),
            ]
        );
    }

    #[test]
    fn tokenize_keywords() {
        assert_eq!(
            kinds("func class this if else while return true false"),
            vec![
                TokenKind::Func,
                TokenKind::Class,
                TokenKind::This,
                TokenKind::If,
                TokenKind::Else,
                TokenKind::While,
                TokenKind::Return,
                TokenKind::True,
                TokenKind::False,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn tokenize_string() {
        let mut lexer: Lexer = Default::default();
        lexer.tokenize(String::from(r#"x := "hello\n \"world\"""#)).unwrap();

        assert_eq!(lexer.tokens[2].kind, TokenKind::String);
        assert_eq!(lexer.tokens[2].value, "hello\n \"world\"");
    }

    #[test]
    fn unterminated_string() {
        let mut lexer: Lexer = Default::default();
        let err = lexer.tokenize(String::from("\"abc")).unwrap_err();

        assert_eq!(err.line(), 0);
    }

    #[test]
    fn comments_and_lines() {
        let mut lexer: Lexer = Default::default();
        lexer
            .tokenize(String::from("a // first\n// whole line\nb"))
            .unwrap();

        assert_eq!(
            lexer.tokens,
            vec![
                Token::new_identifier("a", 0),
                Token::new_identifier("b", 2),
                Token::new_eof(3),
            ]
        );
    }

    #[test]
    fn single_ampersand_is_rejected() {
        let mut lexer: Lexer = Default::default();

        assert!(lexer.tokenize(String::from("a & b")).is_err());
    }
}
