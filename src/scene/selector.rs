use super::ElementSnapshot;
use crate::error::{RegionError, Result};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Простой CSS-подобный селектор: список составных селекторов через запятую.
///
/// Поддерживаются `*`, `tag`, `.class`, `#id` и их сочетания (`button.primary#ok`).
/// Комбинаторы, атрибуты и псевдоклассы не поддерживаются.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: SmallVec<[Compound; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    html_id: Option<String>,
    classes: SmallVec<[String; 2]>,
}

impl Compound {
    fn matches(&self, element: &ElementSnapshot) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != element.tag {
                return false;
            }
        }
        if let Some(id) = &self.html_id {
            if element.html_id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| element.has_class(c))
    }

    fn parse(part: &str) -> std::result::Result<Self, String> {
        if part.is_empty() {
            return Err("пустой селектор".to_string());
        }
        if let Some(bad) = part.chars().find(|c| c.is_whitespace() || "[]:>+~()".contains(*c)) {
            return Err(format!("неподдерживаемый символ '{}' в '{}'", bad, part));
        }

        let mut compound = Compound::default();
        let mut rest = part;

        // Ведущий тег или '*'
        let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
        let (tag, tail) = rest.split_at(tag_end);
        if !tag.is_empty() && tag != "*" {
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        rest = tail;

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return Err(format!("пустое имя после '{}' в '{}'", marker, part));
            }
            match marker {
                '.' => compound.classes.push(name.to_string()),
                '#' => {
                    if compound.html_id.replace(name.to_string()).is_some() {
                        return Err(format!("два id в '{}'", part));
                    }
                }
                _ => unreachable!("split only at '.' or '#'"),
            }
            rest = &body[end..];
        }

        Ok(compound)
    }
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        let alternatives = source
            .split(',')
            .map(|part| Compound::parse(part.trim()))
            .collect::<std::result::Result<SmallVec<_>, _>>()
            .map_err(|e| RegionError::Config(format!("Неверный селектор '{}': {}", source, e)))?;

        Ok(Self {
            source: source.trim().to_string(),
            alternatives,
        })
    }

    pub fn matches(&self, element: &ElementSnapshot) -> bool {
        self.alternatives.iter().any(|c| c.matches(element))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Selector {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
