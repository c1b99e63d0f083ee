//! Tokenizer for the DBML subset.
//!
//! The grammar is line-oriented, so newlines are preserved as tokens and the
//! parser treats them as field-declaration terminators. The lexer itself is
//! infallible: anything that is not whitespace or one of the structural
//! symbols is folded into a [`Token::Word`], and deciding whether a word
//! makes sense is the parser's problem.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A run of non-whitespace, non-structural characters. Covers table and
    /// field names, type names like `varchar(255)`, and annotation words.
    Word(String),

    LBrace,   // {
    RBrace,   // }
    LBracket, // [
    RBracket, // ]
    Gt,       // >
    Lt,       // <
    Colon,    // :
    Dot,      // .
    Newline,  // \n

    Eof,
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '{' | '}' | '[' | ']' | '<' | '>' | ':' | '.')
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    /// Skip horizontal whitespace and `//` line comments, stopping at `\n`.
    fn skip_blanks(&mut self) {
        loop {
            match self.chars.peek() {
                Some('\n') => break,
                Some(c) if c.is_whitespace() => {
                    self.chars.next();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    if ahead.peek() == Some(&'/') {
                        while let Some(&c) = self.chars.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.chars.next();
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    fn read_word(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if is_word_char(c) {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_blanks();

        let c = match self.chars.next() {
            Some(c) => c,
            None => return Token::Eof,
        };

        match c {
            '\n' => Token::Newline,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '>' => Token::Gt,
            '<' => Token::Lt,
            ':' => Token::Colon,
            '.' => Token::Dot,
            c => Token::Word(self.read_word(c)),
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let done = tok == Token::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }
}
