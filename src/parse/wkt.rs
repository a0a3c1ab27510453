//! WKT tokenizer and bracket-tree builder.
//!
//! Accepts both `KEYWORD[...]` and `KEYWORD(...)`. The tree keeps quoted
//! strings apart from bare words (`EAST`, `Cartesian`) because the WKT2
//! converter needs the difference.

use crate::error::{ProjError, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum Wkt {
    Node { keyword: String, args: Vec<Wkt> },
    Text(String),
    Number(f64),
    Word(String),
}

impl Wkt {
    pub fn keyword(&self) -> Option<&str> {
        match self {
            Wkt::Node { keyword, .. } => Some(keyword),
            _ => None,
        }
    }

    pub fn args(&self) -> &[Wkt] {
        match self {
            Wkt::Node { args, .. } => args,
            _ => &[],
        }
    }

    /// First child node with this keyword (case-insensitive).
    pub fn child(&self, keyword: &str) -> Option<&Wkt> {
        self.args()
            .iter()
            .find(|a| a.keyword().is_some_and(|k| k.eq_ignore_ascii_case(keyword)))
    }

    pub fn children<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Wkt> + 'a {
        self.args()
            .iter()
            .filter(move |a| a.keyword().is_some_and(|k| k.eq_ignore_ascii_case(keyword)))
    }

    /// Quoted text or bare word.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Wkt::Text(s) | Wkt::Word(s) => Some(s),
            _ => None,
        }
    }

    /// Numbers, and quoted text that parses as one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Wkt::Number(n) => Some(*n),
            Wkt::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// The `n`th argument as a string.
    pub fn str_arg(&self, n: usize) -> Option<&str> {
        self.args().get(n).and_then(Wkt::as_str)
    }

    pub fn f64_arg(&self, n: usize) -> Option<f64> {
        self.args().get(n).and_then(Wkt::as_f64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
    /// Expecting an item
    Neutral,
    Keyword,
    /// Keyword ended by whitespace; a bracket may still follow
    AfterKeyword,
    Quoted,
    /// Closing quote seen; a second one is an escaped quote
    AfterQuote,
    Number,
    AfterItem,
    Done,
}

struct TreeBuilder {
    state: State,
    word: String,
    /// Open nodes, innermost last
    stack: Vec<(String, Vec<Wkt>)>,
    root: Option<Wkt>,
}

impl TreeBuilder {
    fn error(&self, at: usize, what: &str) -> ProjError {
        ProjError::Wkt(format!("{what} at character {at}"))
    }

    fn push_item(&mut self, item: Wkt, at: usize) -> Result<()> {
        match self.stack.last_mut() {
            Some((_, args)) => {
                args.push(item);
                self.state = State::AfterItem;
                Ok(())
            }
            None => Err(self.error(at, "value outside of any node")),
        }
    }

    fn open(&mut self) {
        let keyword = std::mem::take(&mut self.word);
        self.stack.push((keyword, Vec::new()));
        self.state = State::Neutral;
    }

    fn close(&mut self, at: usize) -> Result<()> {
        let (keyword, args) = self
            .stack
            .pop()
            .ok_or_else(|| self.error(at, "unbalanced closing bracket"))?;
        let node = Wkt::Node { keyword, args };
        if self.stack.is_empty() {
            self.root = Some(node);
            self.state = State::Done;
            Ok(())
        } else {
            self.push_item(node, at)
        }
    }

    fn finish_word(&mut self, at: usize) -> Result<()> {
        let word = std::mem::take(&mut self.word);
        self.push_item(Wkt::Word(word), at)
    }

    fn finish_text(&mut self, at: usize) -> Result<()> {
        let text = std::mem::take(&mut self.word);
        self.push_item(Wkt::Text(text), at)
    }

    fn finish_number(&mut self, at: usize) -> Result<()> {
        let word = std::mem::take(&mut self.word);
        let n = word
            .parse()
            .map_err(|_| self.error(at, &format!("invalid number '{word}'")))?;
        self.push_item(Wkt::Number(n), at)
    }

    /// Separator or closing bracket after a complete item.
    fn after_item(&mut self, c: char, at: usize) -> Result<()> {
        match c {
            c if c.is_whitespace() => Ok(()),
            ',' => {
                self.state = State::Neutral;
                Ok(())
            }
            ']' => self.close(at),
            _ => Err(self.error(at, &format!("unexpected '{c}'"))),
        }
    }

    fn feed(&mut self, c: char, at: usize) -> Result<()> {
        let c = match c {
            '(' => '[',
            ')' => ']',
            c => c,
        };
        match self.state {
            State::Neutral => match c {
                c if c.is_whitespace() => Ok(()),
                '"' => {
                    self.state = State::Quoted;
                    Ok(())
                }
                c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                    self.word.push(c);
                    self.state = State::Number;
                    Ok(())
                }
                c if c.is_alphabetic() || c == '_' => {
                    self.word.push(c);
                    self.state = State::Keyword;
                    Ok(())
                }
                ']' if self.stack.last().is_some_and(|(_, args)| args.is_empty()) => self.close(at),
                _ => Err(self.error(at, &format!("unexpected '{c}'"))),
            },
            State::Keyword => match c {
                c if c.is_alphanumeric() || c == '_' => {
                    self.word.push(c);
                    Ok(())
                }
                '[' => {
                    self.open();
                    Ok(())
                }
                c if c.is_whitespace() => {
                    self.state = State::AfterKeyword;
                    Ok(())
                }
                _ if self.stack.is_empty() => Err(self.error(at, "expected '[' after the root keyword")),
                _ => {
                    self.finish_word(at)?;
                    self.after_item(c, at)
                }
            },
            State::AfterKeyword => match c {
                c if c.is_whitespace() => Ok(()),
                '[' => {
                    self.open();
                    Ok(())
                }
                _ if self.stack.is_empty() => Err(self.error(at, "expected '[' after the root keyword")),
                _ => {
                    self.finish_word(at)?;
                    self.after_item(c, at)
                }
            },
            State::Quoted => {
                if c == '"' {
                    self.state = State::AfterQuote;
                } else {
                    self.word.push(c);
                }
                Ok(())
            }
            State::AfterQuote => {
                if c == '"' {
                    self.word.push('"');
                    self.state = State::Quoted;
                    Ok(())
                } else {
                    self.finish_text(at)?;
                    self.after_item(c, at)
                }
            }
            State::Number => {
                if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+') {
                    self.word.push(c);
                    Ok(())
                } else {
                    self.finish_number(at)?;
                    self.after_item(c, at)
                }
            }
            State::AfterItem => self.after_item(c, at),
            State::Done => {
                if c.is_whitespace() {
                    Ok(())
                } else {
                    Err(self.error(at, "trailing characters after the root node"))
                }
            }
        }
    }
}

/// Build the bracket tree of a WKT string.
pub fn parse_wkt(text: &str) -> Result<Wkt> {
    let mut builder = TreeBuilder {
        state: State::Neutral,
        word: String::new(),
        stack: Vec::new(),
        root: None,
    };
    for (at, c) in text.chars().enumerate() {
        builder.feed(c, at)?;
    }
    match (builder.state, builder.root) {
        (State::Done, Some(root)) => Ok(root),
        _ if !builder.stack.is_empty() => Err(ProjError::Wkt(format!(
            "unbalanced brackets: {} node(s) left open",
            builder.stack.len()
        ))),
        _ => Err(ProjError::Wkt("no WKT node found".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_tree() {
        let tree = parse_wkt(
            r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],AXIS["Lat",NORTH]]"#,
        )
        .unwrap();
        assert_eq!(tree.keyword(), Some("GEOGCS"));
        assert_eq!(tree.str_arg(0), Some("WGS 84"));
        let spheroid = tree.child("DATUM").and_then(|d| d.child("SPHEROID")).unwrap();
        assert_eq!(spheroid.f64_arg(1), Some(6378137.0));
        assert_eq!(spheroid.f64_arg(2), Some(298.257223563));
        let axis = tree.child("axis").unwrap();
        assert_eq!(axis.args()[1], Wkt::Word("NORTH".into()));
    }

    #[test]
    fn test_parentheses_and_whitespace() {
        let tree = parse_wkt("UNIT ( \"metre\" , 1.0E0 )").unwrap();
        assert_eq!(
            tree,
            Wkt::Node {
                keyword: "UNIT".into(),
                args: vec![Wkt::Text("metre".into()), Wkt::Number(1.0)],
            }
        );
    }

    #[test]
    fn test_escaped_quote_and_empty_node() {
        let tree = parse_wkt(r#"REMARK["say ""hi""",EMPTY[]]"#).unwrap();
        assert_eq!(tree.str_arg(0), Some(r#"say "hi""#));
        assert!(tree.child("EMPTY").unwrap().args().is_empty());
    }

    #[test]
    fn test_malformed_input() {
        for bad in [
            r#"PROJCS["x",GEOGCS["y""#,
            r#"GEOGCS["x"]]"#,
            r#"GEOGCS["x",1.2.3]"#,
            r#"GEOGCS["x"] extra"#,
            "",
            r#"GEOGCS["x",,1]"#,
        ] {
            assert!(matches!(parse_wkt(bad), Err(ProjError::Wkt(_))), "accepted {bad:?}");
        }
    }
}
