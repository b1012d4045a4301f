//! Minimal CSS selector support for the in-memory document.
//!
//! Supports comma-separated compound selectors built from an optional tag,
//! an optional `#id`, any number of `.class` parts and attribute tests
//! (`[name]`, `[name="v"]`, `[name^="v"]`). Combinators are not supported.

use crate::error::{StageError, StageResult};

/// Attribute condition inside `[...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    /// `[name]`
    Exists(String),
    /// `[name="value"]`
    Equals(String, String),
    /// `[name^="value"]`
    Prefix(String, String),
}

impl AttrMatch {
    fn name(&self) -> &str {
        match self {
            AttrMatch::Exists(name) | AttrMatch::Equals(name, _) | AttrMatch::Prefix(name, _) => {
                name
            }
        }
    }

    fn matches(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (_, None) => false,
            (AttrMatch::Exists(_), Some(_)) => true,
            (AttrMatch::Equals(_, expected), Some(v)) => v == expected,
            (AttrMatch::Prefix(_, prefix), Some(v)) => v.starts_with(prefix.as_str()),
        }
    }
}

/// One compound selector such as `a.nav[href^="#"]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrMatch>,
}

impl Compound {
    /// Test an element described by accessor closures.
    pub fn matches<'a>(
        &self,
        tag: &str,
        has_class: impl Fn(&str) -> bool,
        attribute: impl Fn(&str) -> Option<&'a str>,
    ) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| has_class(c))
            && self.attrs.iter().all(|a| a.matches(attribute(a.name())))
    }
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub alternatives: Vec<Compound>,
}

impl Selector {
    pub fn parse(input: &str) -> StageResult<Self> {
        let invalid = |reason: &str| StageError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let mut alternatives = Vec::new();
        for part in input.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty selector"));
            }
            if part.contains(char::is_whitespace) && !part.contains('[') {
                return Err(invalid("combinators are not supported"));
            }
            alternatives.push(parse_compound(part).map_err(|reason| invalid(&reason))?);
        }
        Ok(Self { alternatives })
    }

    pub fn matches<'a>(
        &self,
        tag: &str,
        has_class: impl Fn(&str) -> bool,
        attribute: impl Fn(&str) -> Option<&'a str>,
    ) -> bool {
        self.alternatives
            .iter()
            .any(|c| c.matches(tag, &has_class, &attribute))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_compound(text: &str) -> Result<Compound, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    let tag = take_ident(&chars, &mut pos);
    if !tag.is_empty() {
        compound.tag = Some(tag);
    } else if chars.first() == Some(&'*') {
        pos += 1;
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                let id = take_ident(&chars, &mut pos);
                if id.is_empty() {
                    return Err("missing id after '#'".to_string());
                }
                compound.id = Some(id);
            }
            '.' => {
                pos += 1;
                let class = take_ident(&chars, &mut pos);
                if class.is_empty() {
                    return Err("missing class after '.'".to_string());
                }
                compound.classes.push(class);
            }
            '[' => {
                pos += 1;
                compound.attrs.push(parse_attr(&chars, &mut pos)?);
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    if compound == Compound::default() && chars.first() != Some(&'*') {
        return Err("empty compound selector".to_string());
    }
    Ok(compound)
}

fn parse_attr(chars: &[char], pos: &mut usize) -> Result<AttrMatch, String> {
    let name = take_ident(chars, pos);
    if name.is_empty() {
        return Err("missing attribute name".to_string());
    }

    let prefix = match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            return Ok(AttrMatch::Exists(name));
        }
        Some('=') => {
            *pos += 1;
            false
        }
        Some('^') if chars.get(*pos + 1) == Some(&'=') => {
            *pos += 2;
            true
        }
        Some(other) => return Err(format!("unexpected character '{}' in attribute", other)),
        None => return Err("unterminated attribute".to_string()),
    };

    let value = match chars.get(*pos) {
        Some(&quote) if quote == '"' || quote == '\'' => {
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != quote {
                *pos += 1;
            }
            if *pos >= chars.len() {
                return Err("unterminated string".to_string());
            }
            let value: String = chars[start..*pos].iter().collect();
            *pos += 1;
            value
        }
        _ => take_ident(chars, pos),
    };

    if chars.get(*pos) != Some(&']') {
        return Err("unterminated attribute".to_string());
    }
    *pos += 1;

    Ok(if prefix {
        AttrMatch::Prefix(name, value)
    } else {
        AttrMatch::Equals(name, value)
    })
}
