//! Streaming S-expression reader.
//!
//! The reader is infallible: every byte stream produces a tree. Malformed
//! input degrades instead of erroring; an unmatched `)` at top level is
//! absorbed into the current token, and truncated input terminates the token
//! in progress and implicitly closes any open lists.

use crate::intern::Interner;
use crate::parser::node::Node;

/// Parses `text` into a root list whose children are the top-level forms.
pub fn parse(text: &str, interner: &mut Interner) -> Node {
    Reader::new(text).run(interner)
}

fn is_separator(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n' | b'(' | b')')
}

fn unescape(c: u8) -> u8 {
    match c {
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0c,
        b'n' => b'\n',
        b'r' => b'\r',
        b't' => b'\t',
        b'v' => 0x0b,
        _ => c,
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    stack: Vec<Vec<Node>>,
    work: Vec<u8>,
    in_number: bool,
    in_fraction: bool,
    in_string: bool,
    in_quote: bool,
    in_escape: bool,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
            stack: vec![Vec::new()],
            work: Vec::new(),
            in_number: false,
            in_fraction: false,
            in_string: false,
            in_quote: false,
            in_escape: false,
        }
    }

    fn run(mut self, interner: &mut Interner) -> Node {
        while self.pos < self.bytes.len() {
            let c = self.bytes[self.pos];
            self.pos += 1;

            if self.in_number {
                match c {
                    b'0'..=b'9' => {
                        self.work.push(c);
                        continue;
                    }
                    b'.' if !self.in_fraction => {
                        self.work.push(c);
                        self.in_fraction = true;
                        continue;
                    }
                    _ => {
                        self.in_number = false;
                        self.in_fraction = false;
                        if is_separator(c) {
                            self.emit_number();
                            self.in_string = false;
                            // reprocess the separator outside of a value state
                            self.pos -= 1;
                            continue;
                        }
                        // token collapses back to a symbol; fall through
                    }
                }
            }

            if self.in_string {
                if is_separator(c) {
                    self.emit_symbol(interner);
                    self.in_string = false;
                    // reprocess the separator outside of a token state
                    self.pos -= 1;
                } else {
                    self.work.push(c);
                }
                continue;
            }

            if self.in_quote {
                if self.in_escape {
                    self.work.push(unescape(c));
                    self.in_escape = false;
                } else if c == b'\\' {
                    self.in_escape = true;
                } else if c == b'"' {
                    if self.bytes.get(self.pos) == Some(&b'"') {
                        // "" is a literal quote, not end-of-string
                        self.work.push(b'"');
                        self.pos += 1;
                    } else {
                        self.emit_symbol(interner);
                        self.in_quote = false;
                    }
                } else {
                    self.work.push(c);
                }
                continue;
            }

            match c {
                b'0'..=b'9' | b'+' | b'-' => {
                    self.work.push(c);
                    self.in_number = true;
                    self.in_string = true;
                }
                b'.' => {
                    self.work.push(c);
                    self.in_number = true;
                    self.in_fraction = true;
                    self.in_string = true;
                }
                b'"' => {
                    self.in_quote = true;
                }
                b'(' => {
                    self.stack.push(Vec::new());
                }
                b')' => {
                    if self.stack.len() > 1 {
                        self.close_list();
                    } else {
                        // stray close paren becomes token text
                        self.work.push(c);
                        self.in_string = true;
                    }
                }
                b' ' | b'\t' | b'\r' | b'\n' => {}
                _ => {
                    self.work.push(c);
                    self.in_string = true;
                }
            }
        }

        if self.in_number {
            self.emit_number();
        } else if self.in_string || self.in_quote {
            self.emit_symbol(interner);
        }
        while self.stack.len() > 1 {
            self.close_list();
        }

        Node::List(self.stack.pop().unwrap_or_default())
    }

    fn close_list(&mut self) {
        let children = self.stack.pop().unwrap_or_default();
        self.push_node(Node::List(children));
    }

    fn emit_number(&mut self) {
        let text = String::from_utf8_lossy(&self.work);
        // strtod semantics: tokens like "+" or "." read as zero
        let value = text.parse::<f64>().unwrap_or(0.0);
        self.work.clear();
        self.push_node(Node::Number(value));
    }

    fn emit_symbol(&mut self, interner: &mut Interner) {
        let text = String::from_utf8_lossy(&self.work);
        let sym = interner.intern(&text);
        self.work.clear();
        self.push_node(Node::Symbol(sym));
    }

    fn push_node(&mut self, node: Node) {
        self.stack
            .last_mut()
            .expect("reader stack always holds the root frame")
            .push(node);
    }
}
