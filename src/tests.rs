#[cfg(test)]
pub mod agreement_tests {
	use crate::config::Limits;
	use crate::interp::{is_valid, parse_line};

	// Every line here goes through both the validator and the parser.
	// Output redirections point at /dev/null since parsing may create files.
	const CORPUS: &[&str] = &[
		"ls",
		"ls -la /tmp",
		"echo a | cat",
		"false ; echo ok",
		"sleep 5 &",
		"sleep 5 &   ",
		"sleep 5 & echo hi",
		"a | b | c &",
		"a & b & c &",
		"cat < in.txt > /dev/null",
		"cat<in.txt>/dev/null",
		"echo hi >> /dev/null",
		"> /dev/null echo hi",
		"echo a > /dev/null > /dev/null",
		"echo 'a | b'",
		"echo \"a ; b\"",
		"echo \"unterminated | quote",
		"echo 'unterminated",
		"echo \"esc \\\" | still\"",
		"echo \"\"",
		"echo a\\|b",
		"ls\t|\twc",
		"échο | wc -l",
		"",
		"   ",
		"|",
		"| ls",
		"ls |",
		"ls | | wc",
		"ls ||",
		"ls || cat",
		"ls && cat",
		"ls &&",
		"&&",
		"; ls",
		"ls ;",
		"ls ; ;",
		"&",
		"& ls",
		"ls & &",
		"ls & ;",
		"ls & ; cat",
		"a | b & ; c",
		"ls &;",
		"ls & |",
		"ls | &",
		"ls >",
		"ls <",
		"ls >>",
		"ls > ;",
		"ls < | wc",
		"ls >>> /dev/null",
		"< in.txt",
		"> /dev/null",
		"> /dev/null | cat",
	];

	#[test]
	fn validator_and_parser_agree() {
		let limits = Limits::default();
		for input in CORPUS {
			let valid = is_valid(input);
			let parsed = parse_line(input, &limits);
			assert_eq!(valid, parsed.is_ok(), "disagreement on {:?}: validator={} parser={:?}", input, valid, parsed);
		}
	}

	#[test]
	fn corpus_has_both_outcomes() {
		let valid = CORPUS.iter().filter(|input| is_valid(input)).count();
		assert!(valid > 10);
		assert!(CORPUS.len() - valid > 10);
	}
}

#[cfg(test)]
pub mod roundtrip_tests {
	use crate::config::Limits;
	use crate::interp::{parse_line, CommandSequence};

	fn parse(input: &str) -> CommandSequence {
		parse_line(input, &Limits::default()).unwrap()
	}

	fn reparse(input: &str) {
		let seq = parse(input);
		let again = parse(&seq.to_string());
		assert_eq!(seq, again, "{:?} serialized as {:?}", input, seq.to_string());
	}

	#[test]
	fn whitespace_is_normalized() {
		insta::assert_snapshot!(parse("ls   -la\t /tmp  ").to_string(), @"ls -la /tmp");
	}

	#[test]
	fn operators_are_spaced_out() {
		insta::assert_snapshot!(parse("cat<in.txt|sort -r>>out.txt&").to_string(), @"cat < in.txt | sort -r >> out.txt &");
	}

	#[test]
	fn background_separates_without_semicolon() {
		insta::assert_snapshot!(parse("sleep 5 &echo hi;ls").to_string(), @"sleep 5 & echo hi ; ls");
	}

	#[test]
	fn quoted_words_are_requoted() {
		insta::assert_snapshot!(parse("echo \"a  b\" 'c|d' \"it's\" ''").to_string(), @r#"echo 'a  b' 'c|d' "it's" ''"#);
	}

	#[test]
	fn only_the_last_output_survives() {
		insta::assert_snapshot!(parse("echo a > /dev/null >> /dev/null").to_string(), @"echo a >> /dev/null");
	}

	#[test]
	fn serialized_form_parses_back() {
		for input in [
			"ls -la /tmp",
			"cat < in.txt | sort -r | uniq -c >> /dev/null &",
			"sleep 5 & echo hi ; ls",
			"echo \"a  b\" 'c|d' \"it's\" '' \"say \\\"hi\\\" it's\"",
			"hop .. ; reveal -la ; fg %1",
			"a ; b ; c &",
		] {
			reparse(input);
		}
	}
}

#[cfg(test)]
pub mod idempotence_tests {
	use crate::config::Limits;
	use crate::interp::parse_line;

	#[test]
	fn parsing_twice_gives_the_same_tree() {
		let limits = Limits::default();
		for input in ["echo a | cat", "false ; echo ok", "sleep 5 | cat & ls < /dev/null", "fg 1"] {
			let first = parse_line(input, &limits).unwrap();
			let second = parse_line(input, &limits).unwrap();
			assert_eq!(first, second);
		}
	}

	#[test]
	fn failed_parse_leaves_nothing_behind() {
		let limits = Limits::default();
		assert!(parse_line("ls |", &limits).is_err());
		let seq = parse_line("ls", &limits).unwrap();
		assert_eq!(seq.pipelines.len(), 1);
		assert_eq!(seq.pipelines[0].commands.len(), 1);
	}
}

#[cfg(test)]
pub mod shell_tests {
	use crate::config::ShellConfig;
	use crate::{OxErr, Shell};

	fn shell() -> Shell {
		Shell::new(ShellConfig::default(), false).unwrap()
	}

	#[test]
	fn blank_lines_do_nothing() {
		let mut shell = shell();
		assert_eq!(shell.exec_line("   \t").unwrap(), 0);
		assert!(shell.jobs().is_empty());
	}

	#[test]
	fn syntax_error_is_status_one() {
		let mut shell = shell();
		assert_eq!(shell.exec_line("| cat").unwrap(), 1);
		assert_eq!(shell.last_status(), 1);
	}

	#[test]
	fn fg_and_bg_without_jobs() {
		let mut shell = shell();
		assert_eq!(shell.exec_line("fg").unwrap(), 1);
		assert_eq!(shell.exec_line("bg").unwrap(), 1);
		assert_eq!(shell.exec_line("fg 3").unwrap(), 1);
		assert_eq!(shell.exec_line("fg x").unwrap(), 1);
		assert_eq!(shell.exec_line("bg 1 2").unwrap(), 1);
	}

	#[test]
	fn activities_with_no_jobs() {
		let mut shell = shell();
		assert_eq!(shell.exec_line("activities").unwrap(), 0);
	}

	#[test]
	fn exit_escapes_the_line() {
		let mut shell = shell();
		assert!(matches!(shell.exec_line("exit 3"), Err(OxErr::CleanExit(3))));
		assert!(matches!(shell.exec_line("exit"), Err(OxErr::CleanExit(0))));
		// Whatever follows the exit never runs
		assert!(matches!(shell.exec_line("exit 4 ; fg"), Err(OxErr::CleanExit(4))));
	}

	#[test]
	fn ping_argument_errors() {
		let mut shell = shell();
		assert_eq!(shell.exec_line("ping").unwrap(), 1);
		assert_eq!(shell.exec_line("ping abc 9").unwrap(), 1);
		assert_eq!(shell.exec_line("ping 0 9").unwrap(), 1);
		assert_eq!(shell.exec_line("ping 1 nine").unwrap(), 1);
	}

	#[test]
	fn ping_self_with_signal_zero() {
		let mut shell = shell();
		let line = format!("ping {} 32", std::process::id());
		assert_eq!(shell.exec_line(&line).unwrap(), 0);
	}
}
