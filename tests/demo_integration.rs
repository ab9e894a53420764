#![cfg(not(feature = "loom"))]

use lockstep::demo::{self, ConsoleObserver, Summary};
use lockstep::PipelineConfig;
use std::io::{self, BufRead, Read};

fn run(program: &str) -> (Vec<String>, Summary) {
    let console = ConsoleObserver::new(Vec::new());
    let report = demo::pipeline(program.as_bytes(), PipelineConfig::default())
        .with_observer(&console)
        .run()
        .unwrap();
    let text = String::from_utf8(console.writer().clone()).unwrap();
    (text.lines().map(str::to_owned).collect(), Summary::from_report(&report))
}

#[test]
fn test_two_instructions_walk_the_five_stages() {
    let (mut lines, summary) = run("add\nsub\n");
    lines.sort();
    let mut expected = vec![
        "IF 1: add", "ID 2: add", "EX 3: add", "MEM 4: add", "WB 5: add",
        "IF 2: sub", "ID 3: sub", "EX 4: sub", "MEM 5: sub", "WB 6: sub",
    ];
    expected.sort_unstable();
    assert_eq!(lines, expected);
    assert_eq!(summary.cycles, 6);
    assert_eq!(summary.retired, 2);
    assert_eq!(summary.cpi(), Some(3.0));
}

#[test]
fn test_nop_is_squashed_in_decode() {
    let (lines, summary) = run("add\nnop\nor");
    assert!(lines.contains(&"ID 3: nop".to_owned()));
    assert!(!lines.iter().any(|l| l.starts_with("EX") && l.ends_with("nop")));
    // The last line has no terminator and is still fetched.
    assert!(lines.contains(&"WB 7: or".to_owned()));
    assert_eq!(summary.retired, 2);
    assert_eq!(summary.cycles, 7);
}

#[test]
fn test_empty_program_only_runs_the_drain() {
    let (lines, summary) = run("");
    assert!(lines.is_empty());
    assert_eq!(summary.retired, 0);
    assert_eq!(summary.cycles, 4);
    assert_eq!(summary.cpi(), None);
}

/// Yields one good line, then fails.
struct Flaky {
    served: bool,
}

impl Read for Flaky {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "unreadable"))
    }
}

impl BufRead for Flaky {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.served {
            Err(io::Error::new(io::ErrorKind::Other, "unreadable"))
        } else {
            Ok(b"add\n")
        }
    }

    fn consume(&mut self, _amt: usize) {
        self.served = true;
    }
}

#[test]
fn test_read_error_ends_the_program() {
    let console = ConsoleObserver::new(Vec::new());
    let report = demo::pipeline(Flaky { served: false }, PipelineConfig::default())
        .with_observer(&console)
        .run()
        .unwrap();
    let summary = Summary::from_report(&report);
    assert_eq!(summary.retired, 1);
    assert_eq!(report.cycles, 6);
}
