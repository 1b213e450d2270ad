//! A small CSS selector engine.
//!
//! Supports what the dashboard views query with: comma separated lists,
//! descendant and child combinators, and compounds made of a tag (or `*`),
//! an `#id`, any number of `.class` parts and `[attr]` / `[attr="value"]`
//! tests.

use crate::error::SelectorError;

/// Tree access needed to evaluate a selector against a node.
pub trait SelectorContext {
    type Node: Copy;

    /// Parent element of `node`, if any.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// Lowercase tag name; `None` for non-element nodes.
    fn tag(&self, node: Self::Node) -> Option<&str>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    alternatives: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser { input, pos: 0 }.list()
    }

    pub fn matches<C: SelectorContext>(&self, cx: &C, node: C::Node) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches_at(cx, node, complex.steps.len() - 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    // The combinator of step `i` links it to step `i - 1`; the first one is unused.
    steps: Vec<(Combinator, Compound)>,
}

impl ComplexSelector {
    fn matches_at<C: SelectorContext>(&self, cx: &C, node: C::Node, idx: usize) -> bool {
        let (combinator, compound) = &self.steps[idx];
        if !compound.matches(cx, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => cx
                .parent(node)
                .is_some_and(|parent| self.matches_at(cx, parent, idx - 1)),
            Combinator::Descendant => {
                let mut ancestor = cx.parent(node);
                while let Some(candidate) = ancestor {
                    if self.matches_at(cx, candidate, idx - 1) {
                        return true;
                    }
                    ancestor = cx.parent(candidate);
                }
                false
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeTest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeTest {
    name: String,
    value: Option<String>,
}

impl Compound {
    fn matches<C: SelectorContext>(&self, cx: &C, node: C::Node) -> bool {
        let Some(tag) = cx.tag(node) else {
            return false;
        };
        if let Some(expected) = &self.tag
            && !expected.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if let Some(id) = &self.id
            && cx.attribute(node, "id") != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.is_empty() {
            let class_attr = cx.attribute(node, "class").unwrap_or("");
            let present = class_attr.split_whitespace();
            if !self
                .classes
                .iter()
                .all(|class| present.clone().any(|have| have == class))
            {
                return false;
            }
        }
        self.attributes
            .iter()
            .all(|test| match (&test.value, cx.attribute(node, &test.name)) {
                (_, None) => false,
                (None, Some(_)) => true,
                (Some(expected), Some(actual)) => expected == actual,
            })
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                found,
                offset: self.pos,
            },
            None => SelectorError::Empty,
        }
    }

    fn list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut alternatives = Vec::new();
        loop {
            self.skip_ws();
            alternatives.push(self.complex()?);
            self.skip_ws();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.bump();
                }
                Some(_) => return Err(self.unexpected()),
            }
        }
        Ok(SelectorList { alternatives })
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut steps = vec![(Combinator::Descendant, self.compound()?)];
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            steps.push((combinator, self.compound()?));
        }
        Ok(ComplexSelector { steps })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let mut compound = Compound::default();
        match self.peek() {
            Some('*') => {
                self.bump();
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attributes.push(self.attribute()?);
                }
                _ => break,
            }
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn attribute(&mut self) -> Result<AttributeTest, SelectorError> {
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();
        match self.bump() {
            Some(']') => Ok(AttributeTest { name, value: None }),
            Some('=') => {
                self.skip_ws();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.bump();
                        let start = self.pos;
                        loop {
                            match self.bump() {
                                Some(c) if c == quote => break,
                                Some(_) => {}
                                None => return Err(SelectorError::UnterminatedAttribute),
                            }
                        }
                        self.input[start..self.pos - 1].to_string()
                    }
                    _ => self.ident()?,
                };
                self.skip_ws();
                match self.bump() {
                    Some(']') => Ok(AttributeTest {
                        name,
                        value: Some(value),
                    }),
                    None => Err(SelectorError::UnterminatedAttribute),
                    Some(found) => Err(SelectorError::Unexpected {
                        found,
                        offset: self.pos - found.len_utf8(),
                    }),
                }
            }
            None => Err(SelectorError::UnterminatedAttribute),
            Some(found) => Err(SelectorError::Unexpected {
                found,
                offset: self.pos - found.len_utf8(),
            }),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat tree: each entry is (parent index, tag, id, class).
    struct Tree(Vec<(Option<usize>, &'static str, &'static str, &'static str)>);

    impl SelectorContext for Tree {
        type Node = usize;

        fn parent(&self, node: usize) -> Option<usize> {
            self.0[node].0
        }

        fn tag(&self, node: usize) -> Option<&str> {
            Some(self.0[node].1)
        }

        fn attribute(&self, node: usize, name: &str) -> Option<&str> {
            let (_, _, id, class) = self.0[node];
            match name {
                "id" if !id.is_empty() => Some(id),
                "class" if !class.is_empty() => Some(class),
                _ => None,
            }
        }
    }

    fn tree() -> Tree {
        Tree(vec![
            (None, "body", "", ""),
            (Some(0), "ul", "logsList", "divide-y"),
            (Some(1), "li", "", "px-4 py-3"),
            (Some(2), "span", "", "text-sm"),
            (Some(0), "div", "", "border-b"),
        ])
    }

    #[test]
    fn descendant_and_child_combinators() {
        let t = tree();
        let desc = SelectorList::parse("#logsList span").unwrap();
        assert!(desc.matches(&t, 3));
        let child = SelectorList::parse("ul > span").unwrap();
        assert!(!child.matches(&t, 3));
        let child_ok = SelectorList::parse("ul > li").unwrap();
        assert!(child_ok.matches(&t, 2));
    }

    #[test]
    fn compound_classes_must_all_be_present() {
        let t = tree();
        assert!(SelectorList::parse("li.px-4.py-3").unwrap().matches(&t, 2));
        assert!(!SelectorList::parse("li.px-4.missing").unwrap().matches(&t, 2));
    }

    #[test]
    fn comma_lists_match_any_alternative() {
        let t = tree();
        let list = SelectorList::parse(".border-b, .divide-y li").unwrap();
        assert!(list.matches(&t, 4));
        assert!(list.matches(&t, 2));
        assert!(!list.matches(&t, 3));
    }

    #[test]
    fn malformed_selectors_are_rejected() {
        assert_eq!(SelectorList::parse("   "), Err(SelectorError::Empty));
        assert!(matches!(
            SelectorList::parse("li $"),
            Err(SelectorError::Unexpected { found: '$', .. })
        ));
        assert_eq!(
            SelectorList::parse("[data-x=\"open"),
            Err(SelectorError::UnterminatedAttribute)
        );
    }
}
