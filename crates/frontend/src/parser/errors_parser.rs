use colored::*;
use thiserror::*;

use super::TokenKind;
use tools::errors::ReportCodeErr;

#[derive(Error, Debug, PartialEq)]
pub enum ParserError {
    // Token
    #[error("{} expected token: -{0:?}-, token found: -{1:?}-", "Error".red().bold())]
    FoundWrongToken(TokenKind, TokenKind),

    #[error("{} tryed to use non existant token", "Error".red().bold())]
    EmptyTokenBufferUsed,

    #[error("{} unexpected token: -{0}-", "Error".red().bold())]
    UnexpectedToken(String),

    #[error("{} unexpected end of file", "Error".red().bold())]
    UnexpectedEof,

    #[error("{} number literal doesn't fit in a 64 bits integer: {0}", "Error".red().bold())]
    InvalidNumber(String),

    #[error("{} missing closing parenthesis", "Error".red().bold())]
    MissingCloseParen,

    // Variables
    #[error("{} only a name can be declared with {}, like: {}", "Error".red().bold(), ":=".cyan(), "x := 5".cyan())]
    InvalidDeclarationTarget,

    #[error("{} only a variable or a member can be assigned, like: {} or {}", "Error".red().bold(), "x = 5".cyan(), "obj.x = 5".cyan())]
    InvalidAssignmentTarget,

    #[error("{} only a variable can be incremented or decremented, like: {}", "Error".red().bold(), "x++".cyan())]
    InvalidUpdateTarget,

    // Member
    #[error("{} missing identifier after '.'", "Error".red().bold())]
    MissingIdentifierAfterDot,

    // Functions
    #[error("{} while parsing function declaration. Expected function name after {} keyword.", "Error".red().bold(), "func".cyan())]
    MissingFnName,

    #[error("{} while parsing parameters. Expected parameter name, found: {0}.", "Error".red().bold())]
    ExpectedParamName(String),

    #[error("{} while parsing arrow function. Expected {} after parameters.", "Error".red().bold(), "=>".cyan())]
    MissingFatArrow,

    // Classes
    #[error("{} while parsing class declaration. Expected class name after {} keyword.", "Error".red().bold(), "class".cyan())]
    MissingClassName,

    #[error("{} while parsing class declaration. Only methods are allowed in a class body, found: {0}.", "Error".red().bold())]
    ExpectedMethod(String),

    // Blocks
    #[error("{} expected '{{' to open the body of {0}.", "Error".red().bold())]
    MissingOpenBrace(String),

    #[error("{} missing '}}' to close the block.", "Error".red().bold())]
    UnclosedBlock,
}

impl ReportCodeErr for ParserError {}
