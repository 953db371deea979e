use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use log::trace;

use crate::error::{OxErr, OxResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TkType {
	Word,
	Pipe,
	RedirectIn,
	RedirectOut,
	RedirectAppend,
	Background,
	And,
	Or,
	Semicolon,
	End,
}

impl TkType {
	/// Tokens that end a simple command
	pub fn is_cmd_boundary(&self) -> bool {
		matches!(self, TkType::Pipe | TkType::Semicolon | TkType::And | TkType::Or | TkType::End)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tk {
	pub tk_type: TkType,
	pub text: String,
}

impl Tk {
	pub fn new(tk_type: TkType, text: impl Into<String>) -> Self {
		Self { tk_type, text: text.into() }
	}
	pub fn word(text: impl Into<String>) -> Self {
		Self::new(TkType::Word, text)
	}
	pub fn end() -> Self {
		Self::new(TkType::End, "")
	}
	pub fn is(&self, tk_type: TkType) -> bool {
		self.tk_type == tk_type
	}
}

impl fmt::Display for Tk {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.tk_type {
			TkType::End => write!(f, "end of input"),
			_ => write!(f, "`{}'", self.text),
		}
	}
}

/// Blank characters, the same set C's isspace() accepts
pub fn is_blank(c: char) -> bool {
	matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

pub fn is_operator(c: char) -> bool {
	matches!(c, '|' | '&' | ';' | '<' | '>')
}

/// Characters that may appear in an unquoted word
pub fn is_word_char(c: char) -> bool {
	!is_blank(c) && !is_operator(c)
}

pub fn is_quote(c: char) -> bool {
	matches!(c, '"' | '\'')
}

/// Splits an input line into a flat token stream terminated by an `End` token.
///
/// Words are maximal runs of word characters. Quoted spans inside a run are unquoted in place:
/// single quotes keep everything literally, double quotes honour backslash escapes.
/// A missing closing quote silently extends the span to the end of the input.
pub struct OxTokenizer<'a> {
	chars: Peekable<Chars<'a>>,
	max_tokens: usize,
}

impl<'a> OxTokenizer<'a> {
	pub fn new(input: &'a str, max_tokens: usize) -> Self {
		Self { chars: input.chars().peekable(), max_tokens }
	}

	pub fn tokenize(mut self) -> OxResult<Vec<Tk>> {
		let mut tokens = vec![];
		while let Some(tk) = self.next_token() {
			if tokens.len() == self.max_tokens {
				return Err(OxErr::OversizedInput { what: "tokens", limit: self.max_tokens })
			}
			tokens.push(tk);
		}
		tokens.push(Tk::end());
		trace!("tokens: {:?}", tokens);
		Ok(tokens)
	}

	fn skip_blanks(&mut self) {
		while self.chars.next_if(|c| is_blank(*c)).is_some() {}
	}

	fn next_token(&mut self) -> Option<Tk> {
		self.skip_blanks();
		let c = *self.chars.peek()?;
		let tk = match c {
			'|' => {
				self.chars.next();
				if self.chars.next_if_eq(&'|').is_some() {
					Tk::new(TkType::Or, "||")
				} else {
					Tk::new(TkType::Pipe, "|")
				}
			}
			'&' => {
				self.chars.next();
				if self.chars.next_if_eq(&'&').is_some() {
					Tk::new(TkType::And, "&&")
				} else {
					Tk::new(TkType::Background, "&")
				}
			}
			'>' => {
				self.chars.next();
				if self.chars.next_if_eq(&'>').is_some() {
					Tk::new(TkType::RedirectAppend, ">>")
				} else {
					Tk::new(TkType::RedirectOut, ">")
				}
			}
			'<' => {
				self.chars.next();
				Tk::new(TkType::RedirectIn, "<")
			}
			';' => {
				self.chars.next();
				Tk::new(TkType::Semicolon, ";")
			}
			_ => Tk::word(self.read_word()),
		};
		Some(tk)
	}

	fn read_word(&mut self) -> String {
		let mut word = String::new();
		while let Some(c) = self.chars.next_if(|c| is_word_char(*c)) {
			match c {
				'\'' => {
					while let Some(qt_ch) = self.chars.next() {
						if qt_ch == '\'' {
							break
						}
						word.push(qt_ch);
					}
				}
				'"' => {
					while let Some(qt_ch) = self.chars.next() {
						match qt_ch {
							'"' => break,
							'\\' => {
								// A trailing backslash is kept as-is
								word.push(self.chars.next().unwrap_or('\\'));
							}
							_ => word.push(qt_ch),
						}
					}
				}
				_ => word.push(c),
			}
		}
		word
	}
}

/// Tokenize `input` with an explicit token bound
pub fn tokenize(input: &str, max_tokens: usize) -> OxResult<Vec<Tk>> {
	OxTokenizer::new(input, max_tokens).tokenize()
}
