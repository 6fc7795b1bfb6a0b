//! Recursive Descent Parser
//!
//! Consumes tokens from the lexer and produces a command tree.
//!
//! Grammar:
//!   chain     ::= cmd (('|' | ';') cmd)*
//!   cmd       ::= simple | if_else | for_loop | empty
//!   simple    ::= WORD+ redir*
//!   redir     ::= '<' WORD | ('>' | '>>' | '>|') WORD
//!               | ('2>' | '2>>' | '2>|') WORD
//!   if_else   ::= 'if' chain body ('else' body)?
//!   for_loop  ::= 'for' CHAR 'in' WORD option* body
//!   option    ::= '-A' | '-r' | '-e' WORD | '-t' CHAR | '-p' INT
//!   body      ::= '{' chain '}'
//!
//! `|` and `;` bind a flat chain; conditional and loop bodies re-enter the
//! chain parser with `{`/`}` as terminators. `if` and `for` are keywords
//! only when they begin a command slot; in particular the right operand of
//! `|` is always parsed as a simple command, so a keyword there is a plain
//! word.

use log::debug;

use crate::ast::types::{
    ChainOp, Command, CommandKind, FileKind, ForCommand, IfElseCommand, RedirMode,
    SimpleCommand,
};
use crate::parser::lexer::Lexer;
use crate::parser::types::{is_chain_end_token, is_operator_token, is_redirection_token, ParseError};

/// Parse one command line into a tree. An empty line parses to an empty
/// command; a surplus token after the top-level chain is a syntax error.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let mut parser = Parser::new(line);
    let chain = parser.parse_chain()?;
    if let Some(token) = parser.lexer.peek() {
        return Err(ParseError::Syntax(token.to_string()));
    }
    debug!("parsed: {}", chain);
    Ok(chain)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    fn new(line: &'a str) -> Self {
        Parser { lexer: Lexer::new(line) }
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    /// Consume `expected` or fail with a syntax error.
    fn expect(&mut self, expected: &str) -> Result<(), ParseError> {
        match self.lexer.peek() {
            Some(token) if token == expected => {
                self.lexer.advance();
                Ok(())
            }
            Some(token) => Err(ParseError::Syntax(token.to_string())),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    /// Consume the next token, which must be a WORD (non-operator).
    fn word_token(&mut self) -> Result<&'a str, ParseError> {
        match self.lexer.peek() {
            Some(token) if !is_operator_token(token) => {
                self.lexer.advance();
                Ok(token)
            }
            Some(token) => Err(ParseError::Syntax(token.to_string())),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    // =========================================================================
    // CHAINS
    // =========================================================================

    /// Parse a chain of commands until end of line or a body delimiter.
    /// The delimiter itself is left for the caller.
    fn parse_chain(&mut self) -> Result<Command, ParseError> {
        // Flat parse into slots and the operators between them; the chain is
        // linked up from the back once the run is complete.
        let mut slots: Vec<CommandKind> = vec![CommandKind::Empty];
        let mut ops: Vec<ChainOp> = Vec::new();

        while let Some(token) = self.lexer.peek() {
            match token {
                "{" | "}" => break,
                ";" => {
                    // An empty slot before `;` has nothing to sequence.
                    if matches!(slots.last(), Some(CommandKind::Empty)) {
                        return Err(ParseError::Syntax(";".to_string()));
                    }
                    self.lexer.advance();
                    ops.push(ChainOp::Semicolon);
                    slots.push(CommandKind::Empty);
                }
                "|" => {
                    // Only a simple command can feed a pipe.
                    if !matches!(slots.last(), Some(CommandKind::Simple(_))) {
                        return Err(ParseError::Syntax("|".to_string()));
                    }
                    self.lexer.advance();
                    ops.push(ChainOp::Pipe);
                    slots.push(CommandKind::Simple(self.parse_simple()?));
                }
                "if" => {
                    self.fill_slot(&slots, token)?;
                    *slots.last_mut().unwrap() = CommandKind::IfElse(self.parse_if_else()?);
                }
                "for" => {
                    self.fill_slot(&slots, token)?;
                    *slots.last_mut().unwrap() = CommandKind::For(self.parse_for()?);
                }
                _ => {
                    self.fill_slot(&slots, token)?;
                    *slots.last_mut().unwrap() = CommandKind::Simple(self.parse_simple()?);
                }
            }
        }

        Ok(link_chain(slots, ops))
    }

    /// Guard that the current slot is still empty before parsing into it.
    fn fill_slot(&self, slots: &[CommandKind], token: &str) -> Result<(), ParseError> {
        if matches!(slots.last(), Some(CommandKind::Empty)) {
            Ok(())
        } else {
            Err(ParseError::Syntax(token.to_string()))
        }
    }

    // =========================================================================
    // SIMPLE COMMANDS
    // =========================================================================

    fn parse_simple(&mut self) -> Result<SimpleCommand, ParseError> {
        let mut argv: Vec<String> = Vec::new();
        while let Some(token) = self.lexer.peek() {
            if is_chain_end_token(token) || is_redirection_token(token) {
                break;
            }
            argv.push(token.to_string());
            self.lexer.advance();
        }
        if argv.is_empty() {
            return match self.lexer.peek() {
                Some(token) => Err(ParseError::Syntax(token.to_string())),
                None => Err(ParseError::UnexpectedEnd),
            };
        }

        // Redirections close the command: only further redirections may
        // follow. A repeated stream keeps the last redirection.
        let mut simple = SimpleCommand::new(argv);
        while let Some(token) = self.lexer.peek() {
            if is_chain_end_token(token) {
                break;
            }
            if !is_redirection_token(token) {
                return Err(ParseError::Syntax(token.to_string()));
            }
            self.lexer.advance();
            let target = self.redirection_target()?;
            match token {
                "<" => simple.stdin = Some(target),
                ">" => simple.stdout = Some((target, RedirMode::Exclusive)),
                ">>" => simple.stdout = Some((target, RedirMode::Append)),
                ">|" => simple.stdout = Some((target, RedirMode::Truncate)),
                "2>" => simple.stderr = Some((target, RedirMode::Exclusive)),
                "2>>" => simple.stderr = Some((target, RedirMode::Append)),
                "2>|" => simple.stderr = Some((target, RedirMode::Truncate)),
                _ => unreachable!("redirection token"),
            }
        }
        Ok(simple)
    }

    /// The filename after a redirection operator.
    fn redirection_target(&mut self) -> Result<String, ParseError> {
        self.word_token().map(str::to_string)
    }

    // =========================================================================
    // CONTROL FLOW
    // =========================================================================

    fn parse_if_else(&mut self) -> Result<IfElseCommand, ParseError> {
        self.lexer.advance(); // 'if'
        let test = self.parse_chain()?;
        let then_branch = self.parse_body()?;
        let else_branch = match self.lexer.peek() {
            Some("else") => {
                self.lexer.advance();
                Some(Box::new(self.parse_body()?))
            }
            _ => None,
        };
        Ok(IfElseCommand {
            test: Box::new(test),
            then_branch: Box::new(then_branch),
            else_branch,
        })
    }

    fn parse_for(&mut self) -> Result<ForCommand, ParseError> {
        self.lexer.advance(); // 'for'

        let var_token = self.word_token()?;
        if var_token.len() != 1 {
            return Err(ParseError::Syntax(var_token.to_string()));
        }
        let var = var_token.as_bytes()[0];

        self.expect("in")?;
        let dir = self.word_token()?.to_string();

        let mut for_cmd = ForCommand::new(var, dir, Command::empty());
        self.parse_for_options(&mut for_cmd)?;
        *for_cmd.body = self.parse_body()?;
        Ok(for_cmd)
    }

    /// Parse the option run between the directory name and the body. Each
    /// option may appear once, keyed off the field it sets.
    fn parse_for_options(&mut self, for_cmd: &mut ForCommand) -> Result<(), ParseError> {
        while let Some(token) = self.lexer.peek() {
            match token {
                "{" => break,
                "-A" => {
                    self.reject_duplicate(for_cmd.list_all, "-A")?;
                    self.lexer.advance();
                    for_cmd.list_all = true;
                }
                "-r" => {
                    self.reject_duplicate(for_cmd.recursive, "-r")?;
                    self.lexer.advance();
                    for_cmd.recursive = true;
                }
                "-e" => {
                    self.reject_duplicate(for_cmd.filter_ext.is_some(), "-e")?;
                    self.lexer.advance();
                    for_cmd.filter_ext = Some(self.option_argument("-e")?.to_string());
                }
                "-t" => {
                    self.reject_duplicate(for_cmd.filter_type.is_some(), "-t")?;
                    self.lexer.advance();
                    let arg = self.option_argument("-t")?;
                    let kind = match arg.len() {
                        1 => FileKind::from_option_char(arg.chars().next().unwrap()),
                        _ => None,
                    };
                    for_cmd.filter_type = Some(kind.ok_or_else(|| {
                        ParseError::ForArg(format!("invalid file type `{arg}`"))
                    })?);
                }
                "-p" => {
                    self.reject_duplicate(for_cmd.parallel != 0, "-p")?;
                    self.lexer.advance();
                    let arg = self.option_argument("-p")?;
                    for_cmd.parallel = arg.parse().map_err(|_| {
                        ParseError::ForArg(format!("invalid worker count `{arg}`"))
                    })?;
                }
                _ if token.starts_with('-') => {
                    return Err(ParseError::ForArg(format!("unknown option `{token}`")));
                }
                _ => return Err(ParseError::Syntax(token.to_string())),
            }
        }
        Ok(())
    }

    fn reject_duplicate(&self, already_set: bool, option: &str) -> Result<(), ParseError> {
        if already_set {
            Err(ParseError::ForArg(format!("duplicate option `{option}`")))
        } else {
            Ok(())
        }
    }

    /// The argument token after `-e`, `-t` or `-p`.
    fn option_argument(&mut self, option: &str) -> Result<&'a str, ParseError> {
        match self.lexer.peek() {
            Some(token) if !is_operator_token(token) => {
                self.lexer.advance();
                Ok(token)
            }
            _ => Err(ParseError::ForArg(format!("option `{option}` requires an argument"))),
        }
    }

    // =========================================================================
    // BODIES
    // =========================================================================

    fn parse_body(&mut self) -> Result<Command, ParseError> {
        self.expect("{")?;
        let chain = self.parse_chain()?;
        self.expect("}")?;
        Ok(chain)
    }
}

/// Link parsed slots into a chain, folding from the back so every operator
/// carries its successor.
fn link_chain(mut kinds: Vec<CommandKind>, ops: Vec<ChainOp>) -> Command {
    debug_assert_eq!(kinds.len(), ops.len() + 1);
    let mut chain = Command::new(kinds.pop().expect("at least one slot"));
    for op in ops.into_iter().rev() {
        chain = Command {
            kind: kinds.pop().expect("slot per operator"),
            next: Some((op, Box::new(chain))),
        };
    }
    chain
}

// =============================================================================
// TESTS
// =============================================================================
