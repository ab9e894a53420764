//! The five demo stages.

use super::Instruction;
use crate::pipeline::{Stage, StageContext};
use crate::token::Token;
use std::io::BufRead;

/// Instruction fetch: the generator.
///
/// Reads one line per invocation and ends the stream at end of input.
#[derive(Debug)]
pub struct Fetch<R> {
    program: R,
    line: String,
}

impl<R: BufRead> Fetch<R> {
    /// Fetches from `program`, one instruction per line.
    pub fn new(program: R) -> Self {
        Self {
            program,
            line: String::new(),
        }
    }

    fn next_line(&mut self) -> Option<String> {
        self.line.clear();
        match self.program.read_line(&mut self.line) {
            Ok(0) => None,
            Ok(_) => {
                let text = self.line.trim_end_matches(['\n', '\r']);
                Some(text.to_owned())
            }
            Err(err) => {
                tracing::warn!(error = %err, "instruction fetch failed, ending the program");
                None
            }
        }
    }
}

impl<R: BufRead + Send> Stage<Instruction> for Fetch<R> {
    fn process(&mut self, _retired: Option<Instruction>, cx: &StageContext<'_>) -> Token<Instruction> {
        match self.next_line() {
            Some(text) => {
                cx.report(format_args!("{text}"));
                Token::Payload(Instruction::new(text))
            }
            None => Token::Terminate,
        }
    }
}

/// Instruction decode. Squashes `nop` into a bubble.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decode;

impl Stage<Instruction> for Decode {
    fn process(&mut self, input: Option<Instruction>, cx: &StageContext<'_>) -> Token<Instruction> {
        let Some(instruction) = input else {
            return Token::Noop;
        };
        cx.report(format_args!("{instruction}"));
        if instruction.is_nop() {
            Token::Noop
        } else {
            Token::Payload(instruction)
        }
    }
}

/// Execute. Passes the instruction through.
#[derive(Debug, Clone, Copy, Default)]
pub struct Execute;

impl Stage<Instruction> for Execute {
    fn process(&mut self, input: Option<Instruction>, cx: &StageContext<'_>) -> Token<Instruction> {
        pass_through(input, cx)
    }
}

/// Memory access. Passes the instruction through.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryAccess;

impl Stage<Instruction> for MemoryAccess {
    fn process(&mut self, input: Option<Instruction>, cx: &StageContext<'_>) -> Token<Instruction> {
        pass_through(input, cx)
    }
}

/// Write-back. Retires the instruction and gives the fetch stage its go-ahead.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteBack;

impl Stage<Instruction> for WriteBack {
    fn process(&mut self, input: Option<Instruction>, cx: &StageContext<'_>) -> Token<Instruction> {
        if let Some(instruction) = input {
            cx.report(format_args!("{instruction}"));
        }
        Token::Bootstrap
    }
}

fn pass_through(input: Option<Instruction>, cx: &StageContext<'_>) -> Token<Instruction> {
    match input {
        Some(instruction) => {
            cx.report(format_args!("{instruction}"));
            Token::Payload(instruction)
        }
        None => Token::Noop,
    }
}
