//! Field tokenizer for comma-delimited lines with optional double-quote enclosure.
//!
//! The tokenizer is a three-state machine:
//!
//! - `Between`: no field content seen yet. Whitespace is dropped, which trims
//!   the leading whitespace of unquoted fields.
//! - `Unquoted`: inside field content outside quotes.
//! - `Quoted`: inside a `"..."` section; commas and whitespace are data.
//!
//! A closing quote returns to `Unquoted`, so `"New York" City` is a single
//! field. Trailing whitespace collected outside quotes is trimmed when a field
//! is emitted; whitespace inside quotes is always kept. The last field is
//! always emitted, so a line with N unquoted commas yields N + 1 fields.
//! Unterminated quotes are not an error: the remaining text becomes the last
//! field.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Between,
    Unquoted,
    Quoted,
}

#[derive(Debug, Default)]
struct FieldBuffer {
    text: String,
    protected: usize,
}

impl FieldBuffer {
    fn push(&mut self, c: char) {
        self.text.push(c);
    }

    fn protect(&mut self) {
        self.protected = self.text.len();
    }

    fn take(&mut self) -> String {
        let keep = self.text.trim_end().len().max(self.protected);
        self.text.truncate(keep);
        self.protected = 0;
        std::mem::take(&mut self.text)
    }
}

pub fn tokenize(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut fields = Vec::new();
    let mut field = FieldBuffer::default();
    let mut state = State::Between;

    for c in line.chars() {
        state = match (state, c) {
            (State::Quoted, '"') => {
                field.protect();
                State::Unquoted
            }
            (State::Quoted, c) => {
                field.push(c);
                State::Quoted
            }
            (_, '"') => State::Quoted,
            (_, ',') => {
                fields.push(field.take());
                State::Between
            }
            (State::Between, c) if c.is_whitespace() => State::Between,
            (_, c) => {
                field.push(c);
                State::Unquoted
            }
        };
    }

    if state == State::Quoted {
        field.protect();
    }
    fields.push(field.take());
    fields
}
