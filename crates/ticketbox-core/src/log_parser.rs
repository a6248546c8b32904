use std::collections::VecDeque;

use regex::Regex;

use crate::commit::Commit;
use crate::mention::Mention;

const COMMIT_HEADER: &str = "commit ";
const MESSAGE_INDENT: &str = "    ";

#[derive(Debug)]
enum ParseState {
    NoCommit,
    InCommit(Commit),
}

/// Line-at-a-time parser for default-format `git log` output.
///
/// ```text
/// commit 3f1c9d2e8a... (HEAD -> main)
/// Author: Someone <someone@example.com>
/// Date:   Tue Oct 1 12:00:00 2024 +0200
///
///     Fix login redirect, see ABC-12
/// ```
///
/// `commit` headers open a new commit; 4-space indented lines are message
/// lines and are scanned with the issue pattern. Everything else is skipped.
///
/// Lines go in through [`feed`](Self::feed); mentions come out in order
/// through [`pop`](Self::pop). Both [`Mentions`] and the async `git log`
/// stream drive it this way.
#[derive(Debug)]
pub struct LogParser {
    pattern: Regex,
    state: ParseState,
    pending: VecDeque<Mention>,
}

impl LogParser {
    pub fn new(pattern: Regex) -> Self {
        Self {
            pattern,
            state: ParseState::NoCommit,
            pending: VecDeque::new(),
        }
    }

    /// Parse `line` and queue its mentions behind any not yet popped.
    pub fn feed(&mut self, line: &str) {
        let found = self.parse_line(line);
        self.pending.extend(found);
    }

    pub fn pop(&mut self) -> Option<Mention> {
        self.pending.pop_front()
    }

    /// Mentions on one line (often none).
    fn parse_line(&mut self, line: &str) -> Vec<Mention> {
        if let Some(rest) = line.strip_prefix(COMMIT_HEADER) {
            let hash = rest.split(' ').next().unwrap_or_default();
            self.state = if hash.is_empty() {
                ParseState::NoCommit
            } else {
                ParseState::InCommit(Commit::new(hash))
            };
            return Vec::new();
        }

        let Some(body) = line.strip_prefix(MESSAGE_INDENT) else {
            return Vec::new();
        };
        let ParseState::InCommit(commit) = &mut self.state else {
            return Vec::new();
        };

        commit.set_title_once(body);

        self.pattern
            .find_iter(line)
            .map(|m| Mention::new(commit.clone(), m.as_str()))
            .collect()
    }
}

/// Lazy iterator of mentions over any source of log lines.
///
/// Single pass: once the underlying lines are exhausted the iterator is done.
pub struct Mentions<I> {
    lines: I,
    parser: LogParser,
}

impl<I> Mentions<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    pub fn new(lines: I, pattern: Regex) -> Self {
        Self {
            lines,
            parser: LogParser::new(pattern),
        }
    }
}

impl<I> Iterator for Mentions<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Mention;

    fn next(&mut self) -> Option<Mention> {
        loop {
            if let Some(mention) = self.parser.pop() {
                return Some(mention);
            }
            let line = self.lines.next()?;
            self.parser.feed(line.as_ref());
        }
    }
}
