use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Идентификатор элемента внутри одной сцены
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    #[default]
    Block,
    Inline,
    InlineBlock,
    Flex,
    Grid,
    Contents,
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerEvents {
    #[default]
    Auto,
    None,
}

/// Цвет заливки. В документе сцены задаётся строкой:
/// `transparent`, `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` или `rgba(r, g, b, a)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba { r: 0, g: 0, b: 0, a: 0 };

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

impl FromStr for Rgba {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "transparent" || s.is_empty() {
            return Ok(Rgba::TRANSPARENT);
        }

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| format!("Неверный hex-цвет: #{}", hex));
        }

        let (body, has_alpha) = if let Some(body) = s.strip_prefix("rgba(") {
            (body, true)
        } else if let Some(body) = s.strip_prefix("rgb(") {
            (body, false)
        } else {
            return Err(format!("Неизвестный формат цвета: {}", s));
        };

        let body = body
            .strip_suffix(')')
            .ok_or_else(|| format!("Нет закрывающей скобки: {}", s))?;
        let parts: SmallVec<[&str; 4]> = body.split(',').map(str::trim).collect();

        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return Err(format!("Ожидалось {} компонент цвета: {}", expected, s));
        }

        let channel = |p: &str| p.parse::<u8>().map_err(|e| format!("Неверный канал '{}': {}", p, e));
        let a = if has_alpha {
            let alpha: f32 = parts[3]
                .parse()
                .map_err(|e| format!("Неверная альфа '{}': {}", parts[3], e))?;
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
        } else {
            255
        };

        Ok(Rgba {
            r: channel(parts[0])?,
            g: channel(parts[1])?,
            b: channel(parts[2])?,
            a,
        })
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => Some(Rgba { r: nibble(0)?, g: nibble(1)?, b: nibble(2)?, a: 255 }),
        6 => Some(Rgba { r: byte(0)?, g: byte(2)?, b: byte(4)?, a: 255 }),
        8 => Some(Rgba { r: byte(0)?, g: byte(2)?, b: byte(4)?, a: byte(6)? }),
        _ => None,
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
    }
}

/// Вычисленный стиль элемента (только то, что влияет на классификацию)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ComputedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub opacity: f32,
    pub pointer_events: PointerEvents,
    pub background_image: Option<String>,
    pub background_color: Rgba,
    pub border_width: f32,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            visibility: Visibility::Visible,
            opacity: 1.0,
            pointer_events: PointerEvents::Auto,
            background_image: None,
            background_color: Rgba::TRANSPARENT,
            border_width: 0.0,
        }
    }
}

impl ComputedStyle {
    pub fn is_visible(&self) -> bool {
        self.display != Display::None && self.visibility != Visibility::Hidden && self.opacity != 0.0
    }

    pub fn has_visible_background(&self) -> bool {
        let has_image = self
            .background_image
            .as_deref()
            .is_some_and(|img| !img.is_empty() && img != "none");
        has_image || !self.background_color.is_transparent() || self.border_width > 0.0
    }
}

/// Ограничивающий прямоугольник в логических пикселях
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LogicalRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl LogicalRect {
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Размер окна в логических пикселях
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1920.0, height: 1080.0 }
    }
}

/// Снимок элемента на момент опроса
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSnapshot {
    pub id: ElementId,
    pub tag: String,
    pub html_id: Option<String>,
    pub classes: SmallVec<[String; 4]>,
    pub style: ComputedStyle,
    pub bounds: LogicalRect,
}

impl ElementSnapshot {
    pub fn new(id: ElementId, tag: &str) -> Self {
        Self {
            id,
            tag: tag.to_ascii_lowercase(),
            html_id: None,
            classes: SmallVec::new(),
            style: ComputedStyle::default(),
            bounds: LogicalRect::default(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parsing() {
        assert_eq!("transparent".parse::<Rgba>().unwrap(), Rgba::TRANSPARENT);
        assert_eq!("#fff".parse::<Rgba>().unwrap(), Rgba { r: 255, g: 255, b: 255, a: 255 });
        assert_eq!("#10203040".parse::<Rgba>().unwrap(), Rgba { r: 0x10, g: 0x20, b: 0x30, a: 0x40 });
        assert_eq!("rgba(0, 0, 0, 0)".parse::<Rgba>().unwrap(), Rgba::TRANSPARENT);
        assert_eq!("rgb(1, 2, 3)".parse::<Rgba>().unwrap(), Rgba { r: 1, g: 2, b: 3, a: 255 });
        assert!("rgba(0, 0, 0)".parse::<Rgba>().is_err());
        assert!("#12".parse::<Rgba>().is_err());
        assert!("blue".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_style_visibility() {
        let mut style = ComputedStyle::default();
        assert!(style.is_visible());

        style.opacity = 0.0;
        assert!(!style.is_visible());

        style.opacity = 0.5;
        style.visibility = Visibility::Hidden;
        assert!(!style.is_visible());

        style.visibility = Visibility::Visible;
        style.display = Display::None;
        assert!(!style.is_visible());
    }

    #[test]
    fn test_visible_background() {
        let mut style = ComputedStyle::default();
        assert!(!style.has_visible_background());

        style.background_image = Some("none".to_string());
        assert!(!style.has_visible_background());

        style.background_image = Some("url(bg.png)".to_string());
        assert!(style.has_visible_background());

        let border_only = ComputedStyle { border_width: 1.0, ..ComputedStyle::default() };
        assert!(border_only.has_visible_background());
    }

    #[test]
    fn test_style_deserializes_with_defaults() {
        let style: ComputedStyle =
            serde_json::from_str(r##"{"pointer-events": "none", "background-color": "#000"}"##).unwrap();
        assert_eq!(style.pointer_events, PointerEvents::None);
        assert_eq!(style.opacity, 1.0);
        assert!(!style.background_color.is_transparent());
    }
}
