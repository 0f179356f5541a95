//! CSS selector subset used to locate recorded elements
//!
//! Only what the recorder emits is supported: compound steps made of a tag,
//! `#id`, `.class`, `[attr=value]` / `[attr="value"]`, `:nth-child(n)` and
//! `:root`, chained with the child combinator (`>`).

use std::fmt;
use std::str::FromStr;

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::{NodeId, NodeType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSelector {
    pub name: String,
    pub value: String,
    /// Render as `[name="value"]` instead of `[name=value]`
    pub quoted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorStep {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrSelector>,
    pub nth_child: Option<usize>,
    pub root: bool,
}

impl SelectorStep {
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            ..Default::default()
        }
    }

    pub fn id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn class(class: &str) -> Self {
        Self {
            classes: vec![class.to_string()],
            ..Default::default()
        }
    }

    pub fn attr(name: &str, value: &str, quoted: bool) -> Self {
        Self {
            attrs: vec![AttrSelector {
                name: name.to_string(),
                value: value.to_string(),
                quoted,
            }],
            ..Default::default()
        }
    }

    /// Does this single step match the node, ignoring its ancestors?
    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        let Ok(node) = arena.get(node_id) else {
            return false;
        };
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !node.node_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|class| node.classes().any(|c| c == class))
        {
            return false;
        }
        if !self
            .attrs
            .iter()
            .all(|attr| node.attr(&attr.name) == Some(attr.value.as_str()))
        {
            return false;
        }
        if let Some(n) = self.nth_child {
            if nth_child_index(arena, node_id) != Some(n) {
                return false;
            }
        }
        if self.root && !is_document_element(arena, node_id) {
            return false;
        }
        true
    }
}

impl fmt::Display for SelectorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote = false;
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
            wrote = true;
        }
        if let Some(id) = &self.id {
            write!(f, "#{}", escape_ident(id))?;
            wrote = true;
        }
        for class in &self.classes {
            write!(f, ".{}", escape_ident(class))?;
            wrote = true;
        }
        for attr in &self.attrs {
            if attr.quoted {
                let value = attr.value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "[{}=\"{}\"]", attr.name, value)?;
            } else {
                write!(f, "[{}={}]", attr.name, attr.value)?;
            }
            wrote = true;
        }
        if let Some(n) = self.nth_child {
            write!(f, ":nth-child({})", n)?;
            wrote = true;
        }
        if self.root {
            f.write_str(":root")?;
            wrote = true;
        }
        if !wrote {
            f.write_str("*")?;
        }
        Ok(())
    }
}

/// A chain of steps joined by the child combinator, outermost first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub steps: Vec<SelectorStep>,
}

impl Selector {
    pub fn new(steps: Vec<SelectorStep>) -> Self {
        Self { steps }
    }

    /// Attribute-equality shorthand, e.g. `[data-cy=submit]`
    pub fn attribute(name: &str, value: &str) -> Self {
        Self::new(vec![SelectorStep::attr(name, value, false)])
    }

    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| DomError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let steps = split_top_level(input)
            .into_iter()
            .map(|part| parse_step(part.trim()).map_err(|reason| invalid(reason.as_str())))
            .collect::<Result<Vec<_>>>()?;

        if steps.is_empty() {
            return Err(invalid("empty selector"));
        }
        Ok(Self { steps })
    }

    /// Match the last step against the node and every earlier step against
    /// the corresponding parent element.
    pub fn matches(&self, arena: &DomArena, node_id: NodeId) -> bool {
        let mut current = Some(node_id);
        for (i, step) in self.steps.iter().enumerate().rev() {
            let Some(id) = current else {
                return false;
            };
            if !step.matches(arena, id) {
                return false;
            }
            if i > 0 {
                current = arena.parent_element(id);
            }
        }
        !self.steps.is_empty()
    }

    /// Every element matching the selector, in arena order
    pub fn query_all(&self, arena: &DomArena) -> Vec<NodeId> {
        arena
            .node_ids()
            .filter(|&id| self.matches(arena, id))
            .collect()
    }

    /// True when exactly one element in the document matches
    pub fn is_unique(&self, arena: &DomArena) -> bool {
        let mut matches = arena.node_ids().filter(|&id| self.matches(arena, id));
        matches.next().is_some() && matches.next().is_none()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// 1-based position among element siblings
pub fn nth_child_index(arena: &DomArena, node_id: NodeId) -> Option<usize> {
    let parent = arena.get(node_id).ok()?.parent_id?;
    arena
        .element_children(parent)
        .ok()?
        .iter()
        .position(|&id| id == node_id)
        .map(|p| p + 1)
}

fn is_document_element(arena: &DomArena, node_id: NodeId) -> bool {
    match arena.parent(node_id) {
        Ok(None) => true,
        Ok(Some(parent)) => parent.node_type == NodeType::Document,
        Err(_) => false,
    }
}

/// Identifier usable after `#` or `.` without escaping
pub fn is_valid_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let first_ok = match chars.next() {
        Some('-') => matches!(chars.clone().next(), Some(c) if is_name_start(c)),
        Some(c) => is_name_start(c),
        None => false,
    };
    first_ok && s.chars().all(is_name_char)
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn escape_ident(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if !is_name_char(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Split on `>` outside of brackets, parentheses and quotes
fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            '[' | '(' if !quoted => depth += 1,
            ']' | ')' if !quoted => depth = depth.saturating_sub(1),
            '>' if !quoted && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_step(input: &str) -> std::result::Result<SelectorStep, String> {
    if input.is_empty() {
        return Err("empty step".to_string());
    }
    let mut step = SelectorStep::default();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '*' => {
                chars.next();
            }
            '#' => {
                chars.next();
                step.id = Some(read_ident(&mut chars)?);
            }
            '.' => {
                chars.next();
                step.classes.push(read_ident(&mut chars)?);
            }
            '[' => {
                chars.next();
                step.attrs.push(read_attr(&mut chars)?);
            }
            ':' => {
                chars.next();
                match read_ident(&mut chars)?.as_str() {
                    "root" => step.root = true,
                    "nth-child" => step.nth_child = Some(read_nth(&mut chars)?),
                    other => return Err(format!("unsupported pseudo-class :{}", other)),
                }
            }
            c if is_name_char(c) && step.tag.is_none() => {
                step.tag = Some(read_ident(&mut chars)?.to_ascii_lowercase());
            }
            c => return Err(format!("unexpected character '{}'", c)),
        }
    }
    Ok(step)
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

fn read_ident(chars: &mut Chars<'_>) -> std::result::Result<String, String> {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if c == '\\' {
            chars.next();
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => return Err("dangling escape".to_string()),
            }
        } else if is_name_char(c) {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if out.is_empty() {
        Err("expected identifier".to_string())
    } else {
        Ok(out)
    }
}

fn read_attr(chars: &mut Chars<'_>) -> std::result::Result<AttrSelector, String> {
    let name = read_ident(chars)?;
    if chars.next() != Some('=') {
        return Err(format!("expected '=' after attribute {}", name));
    }

    let (value, quoted) = if chars.peek() == Some(&'"') {
        chars.next();
        let mut value = String::new();
        loop {
            match chars.next() {
                Some('\\') => match chars.next() {
                    Some(c) => value.push(c),
                    None => return Err("dangling escape".to_string()),
                },
                Some('"') => break,
                Some(c) => value.push(c),
                None => return Err("unterminated string".to_string()),
            }
        }
        (value, true)
    } else {
        let mut value = String::new();
        while let Some(&c) = chars.peek() {
            if c == ']' {
                break;
            }
            value.push(c);
            chars.next();
        }
        (value.trim().to_string(), false)
    };

    if chars.next() != Some(']') {
        return Err("expected ']'".to_string());
    }
    Ok(AttrSelector {
        name,
        value,
        quoted,
    })
}

fn read_nth(chars: &mut Chars<'_>) -> std::result::Result<usize, String> {
    if chars.next() != Some('(') {
        return Err("expected '(' after :nth-child".to_string());
    }
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if c == ')' {
            break;
        }
        digits.push(c);
        chars.next();
    }
    if chars.next() != Some(')') {
        return Err("expected ')'".to_string());
    }
    match digits.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("invalid :nth-child argument '{}'", digits)),
    }
}
