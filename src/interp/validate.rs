use std::iter::Peekable;
use std::str::Chars;

use super::token::{is_blank, is_word_char};

// Fast syntax gate, run over the raw line before any tokens are built.
// It is a two-state automaton: either a word is expected next or one was just completed.
// Quoted spans are skipped the same way the tokenizer reads them, so the gate and the
// parser accept exactly the same lines.

struct Validator<'a> {
	chars: Peekable<Chars<'a>>,
	expect_word: bool,
	cmd_has_word: bool,
	ended_with_background: bool,
}

impl<'a> Validator<'a> {
	fn new(input: &'a str) -> Self {
		Self {
			chars: input.chars().peekable(),
			expect_word: true,
			cmd_has_word: false,
			ended_with_background: false,
		}
	}

	fn skip_blanks(&mut self) {
		while self.chars.next_if(|c| is_blank(*c)).is_some() {}
	}

	/// Consume one word run, quotes included. Returns false if there was nothing to consume.
	fn skip_word(&mut self) -> bool {
		let mut consumed = false;
		while let Some(c) = self.chars.next_if(|c| is_word_char(*c)) {
			consumed = true;
			match c {
				'\'' => {
					for qt_ch in self.chars.by_ref() {
						if qt_ch == '\'' {
							break
						}
					}
				}
				'"' => {
					while let Some(qt_ch) = self.chars.next() {
						match qt_ch {
							'"' => break,
							'\\' => { self.chars.next(); }
							_ => {}
						}
					}
				}
				_ => {}
			}
		}
		consumed
	}

	/// `|`, `;` and `&` may only follow a command that has at least one word
	fn separator(&mut self) -> bool {
		if self.expect_word || !self.cmd_has_word {
			return false
		}
		self.expect_word = true;
		self.cmd_has_word = false;
		true
	}

	/// A redirection needs a filename after it, blanks allowed in between
	fn redirection(&mut self) -> bool {
		self.skip_blanks();
		if !self.skip_word() {
			return false
		}
		self.expect_word = false;
		true
	}

	fn run(mut self) -> bool {
		self.skip_blanks();
		while let Some(c) = self.chars.next() {
			let ok = match c {
				'|' | ';' => {
					self.ended_with_background = false;
					self.separator()
				}
				'&' => {
					let ok = self.separator();
					self.ended_with_background = true;
					ok
				}
				'<' => {
					self.ended_with_background = false;
					self.redirection()
				}
				'>' => {
					self.ended_with_background = false;
					self.chars.next_if_eq(&'>');
					self.redirection()
				}
				c if is_word_char(c) => {
					self.ended_with_background = false;
					// The run started with `c`, put the rest of it behind us
					match c {
						'\'' | '"' => self.skip_quoted(c),
						_ => {}
					}
					self.skip_word();
					self.expect_word = false;
					self.cmd_has_word = true;
					true
				}
				_ => false,
			};
			if !ok {
				return false
			}
			self.skip_blanks();
		}

		if self.expect_word {
			return self.ended_with_background
		}
		self.cmd_has_word
	}

	fn skip_quoted(&mut self, quote: char) {
		while let Some(qt_ch) = self.chars.next() {
			if qt_ch == quote {
				break
			}
			if quote == '"' && qt_ch == '\\' {
				self.chars.next();
			}
		}
	}
}

/// Returns true if the operators in `input` are placed legally
pub fn is_valid(input: &str) -> bool {
	Validator::new(input).run()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_plain_commands() {
		assert!(is_valid("ls"));
		assert!(is_valid("  ls -la /tmp  "));
		assert!(is_valid("echo a | cat"));
		assert!(is_valid("false ; echo ok"));
		assert!(is_valid("cat < in.txt > out.txt"));
		assert!(is_valid("cat <in.txt >>out.txt"));
	}

	#[test]
	fn trailing_ampersand_is_a_terminator() {
		assert!(is_valid("sleep 5 &"));
		assert!(is_valid("sleep 5 &   "));
		assert!(is_valid("sleep 5 & echo hi"));
		assert!(is_valid("a & b &"));
	}

	#[test]
	fn rejects_misplaced_operators() {
		assert!(!is_valid(""));
		assert!(!is_valid("   "));
		assert!(!is_valid("| cat"));
		assert!(!is_valid("; ls"));
		assert!(!is_valid("&"));
		assert!(!is_valid("ls |"));
		assert!(!is_valid("ls ;"));
		assert!(!is_valid("ls | | cat"));
		assert!(!is_valid("ls && cat"));
		assert!(!is_valid("ls || cat"));
		assert!(!is_valid("ls & ; cat"));
	}

	#[test]
	fn redirections_need_a_file() {
		assert!(!is_valid("cat <"));
		assert!(!is_valid("cat >"));
		assert!(!is_valid("cat >>"));
		assert!(!is_valid("cat > | wc"));
		assert!(!is_valid("cat >>> f"));
		assert!(!is_valid("cat < ; ls"));
	}

	#[test]
	fn redirection_alone_is_not_a_command() {
		assert!(!is_valid("< in.txt"));
		assert!(!is_valid("> out.txt | cat"));
		assert!(is_valid("> out.txt echo hi"));
	}

	#[test]
	fn quotes_hide_operators() {
		assert!(is_valid("echo \"a | b\""));
		assert!(is_valid("echo 'x ; y'"));
		assert!(is_valid("echo \"unterminated |"));
		assert!(is_valid("echo \"escaped \\\" | still quoted\""));
		assert!(is_valid("cat > \"my file\""));
	}
}
