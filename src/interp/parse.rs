use std::fmt;

use log::{debug, warn};

use crate::builtin::Builtin;
use crate::config::Limits;
use crate::error::{OxErr, OxResult, RedirKind};
use crate::utils::RustFd;

use super::token::{is_blank, is_operator, is_quote, tokenize, Tk, TkType};

/// One simple command: its words, at most one effective input and output file, and its flags
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
	pub argv: Vec<String>,
	pub input_file: Option<String>,
	pub output_file: Option<String>,
	pub append: bool,
	pub background: bool,
	pub builtin: Option<Builtin>,
}

impl Command {
	pub fn name(&self) -> &str {
		self.argv.first().map(|s| s.as_str()).unwrap_or("unknown")
	}

	pub fn has_redirection(&self) -> bool {
		self.input_file.is_some() || self.output_file.is_some()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pipeline {
	pub commands: Vec<Command>,
	pub background: bool,
}

impl Pipeline {
	/// Name shown in job notices, the first stage's program
	pub fn display_name(&self, max_len: usize) -> String {
		let name = self.commands.first().map(|cmd| cmd.name()).unwrap_or("unknown");
		name.chars().take(max_len).collect()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandSequence {
	pub pipelines: Vec<Pipeline>,
}

/// Recursive-descent parser over a token slice that always ends with an `End` token.
///
/// Grammar:
///   sequence := pipeline ((';' | <after '&'>) pipeline)*
///   pipeline := command ('|' command)* ['&']
///   command  := (WORD | '<' WORD | '>' WORD | '>>' WORD)+
pub struct OxParser<'a> {
	tokens: &'a [Tk],
	pos: usize,
	limits: &'a Limits,
}

impl<'a> OxParser<'a> {
	pub fn new(tokens: &'a [Tk], limits: &'a Limits) -> Self {
		Self { tokens, pos: 0, limits }
	}

	pub fn cursor(&self) -> usize {
		self.pos
	}

	fn peek(&self) -> &'a Tk {
		// The slice is End-terminated, and End is never consumed
		let tokens = self.tokens;
		let last = tokens.len().saturating_sub(1);
		&tokens[self.pos.min(last)]
	}

	fn advance(&mut self) -> &'a Tk {
		let tk = self.peek();
		if !tk.is(TkType::End) {
			self.pos += 1;
		}
		tk
	}

	fn expect_word(&mut self, after: &Tk) -> OxResult<String> {
		let tk = self.peek();
		if !tk.is(TkType::Word) {
			return Err(OxErr::syntax(format!("expected a filename after {}, found {}", after, tk)))
		}
		self.advance();
		Ok(tk.text.clone())
	}

	pub fn parse_command(&mut self) -> OxResult<Command> {
		let mut cmd = Command::default();
		loop {
			let tk = self.peek();
			match tk.tk_type {
				TkType::Word => {
					self.advance();
					cmd.argv.push(tk.text.clone());
				}
				TkType::RedirectIn => {
					self.advance();
					cmd.input_file = Some(self.expect_word(tk)?);
				}
				TkType::RedirectOut | TkType::RedirectAppend => {
					self.advance();
					let path = self.expect_word(tk)?;
					if let Some(prev) = cmd.output_file.take() {
						touch_output(&prev, cmd.append);
					}
					cmd.output_file = Some(path);
					cmd.append = tk.is(TkType::RedirectAppend);
				}
				TkType::Background => {
					self.advance();
					cmd.background = true;
					break
				}
				_ => break,
			}
		}

		if cmd.argv.is_empty() {
			return Err(OxErr::syntax(format!("expected a command before {}", self.peek())))
		}
		cmd.builtin = Builtin::from_name(&cmd.argv[0]);
		Ok(cmd)
	}

	pub fn parse_pipeline(&mut self) -> OxResult<Pipeline> {
		let mut pipeline = Pipeline::default();
		loop {
			let cmd = self.parse_command()?;
			let ends_pipeline = cmd.background;
			pipeline.commands.push(cmd);
			if pipeline.commands.len() > self.limits.max_pipeline_commands {
				return Err(OxErr::OversizedInput { what: "commands in a pipeline", limit: self.limits.max_pipeline_commands })
			}
			if ends_pipeline || !self.peek().is(TkType::Pipe) {
				break
			}
			self.advance();
		}

		// The last command already consumed the pipeline's `&`, if there was one
		pipeline.background = pipeline.commands.last().is_some_and(|cmd| cmd.background);
		Ok(pipeline)
	}

	pub fn parse_command_sequence(&mut self) -> OxResult<CommandSequence> {
		let mut seq = CommandSequence::default();
		loop {
			let pipeline = self.parse_pipeline()?;
			let background = pipeline.background;
			seq.pipelines.push(pipeline);
			if seq.pipelines.len() > self.limits.max_sequence_pipelines {
				return Err(OxErr::OversizedInput { what: "pipelines in a sequence", limit: self.limits.max_sequence_pipelines })
			}

			let tk = self.peek();
			match tk.tk_type {
				TkType::End => break,
				TkType::Semicolon if background => {
					return Err(OxErr::syntax(format!("unexpected {} after &", tk)))
				}
				TkType::Semicolon => {
					self.advance();
				}
				// `&` already separated this pipeline from the next one
				_ if background => {}
				_ => return Err(OxErr::syntax(format!("unexpected {}", tk))),
			}
		}
		debug!("parsed {} pipeline(s)", seq.pipelines.len());
		Ok(seq)
	}
}

/// An output redirection that gets overridden by a later one still creates its file
fn touch_output(path: &str, append: bool) {
	match RustFd::open_redirect(path, RedirKind::Output, append) {
		Ok(mut fd) => {
			if let Err(e) = fd.close() {
				warn!("failed to close {}: {}", path, e);
			}
		}
		Err(e) => warn!("failed to create {}: {}", path, e),
	}
}

/// Tokenize and parse a whole input line
pub fn parse_line(input: &str, limits: &Limits) -> OxResult<CommandSequence> {
	let tokens = tokenize(input, limits.max_tokens)?;
	OxParser::new(&tokens, limits).parse_command_sequence()
}

/// Quote a word so that the tokenizer reads it back unchanged
pub fn quote_word(word: &str) -> String {
	let plain = !word.is_empty() && word.chars().all(|c| !is_blank(c) && !is_operator(c) && !is_quote(c));
	if plain {
		return word.to_string()
	}
	if !word.contains('\'') {
		return format!("'{}'", word)
	}
	let mut quoted = String::from("\"");
	for c in word.chars() {
		if matches!(c, '"' | '\\') {
			quoted.push('\\');
		}
		quoted.push(c);
	}
	quoted.push('"');
	quoted
}

impl fmt::Display for Command {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let words: Vec<String> = self.argv.iter().map(|w| quote_word(w)).collect();
		write!(f, "{}", words.join(" "))?;
		if let Some(input) = &self.input_file {
			write!(f, " < {}", quote_word(input))?;
		}
		if let Some(output) = &self.output_file {
			let op = if self.append { ">>" } else { ">" };
			write!(f, " {} {}", op, quote_word(output))?;
		}
		Ok(())
	}
}

impl fmt::Display for Pipeline {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let stages: Vec<String> = self.commands.iter().map(|cmd| cmd.to_string()).collect();
		write!(f, "{}", stages.join(" | "))?;
		if self.background {
			write!(f, " &")?;
		}
		Ok(())
	}
}

impl fmt::Display for CommandSequence {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut pipelines = self.pipelines.iter().peekable();
		while let Some(pipeline) = pipelines.next() {
			write!(f, "{}", pipeline)?;
			if pipelines.peek().is_some() {
				let sep = if pipeline.background { " " } else { " ; " };
				write!(f, "{}", sep)?;
			}
		}
		Ok(())
	}
}
