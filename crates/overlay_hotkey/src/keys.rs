//! Teclas, modificadores e o formato textual `"Ctrl+Shift+F10"`.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// Máscara de modificadores. Os bits coincidem com `MOD_*` do Win32.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const ALT: Modifiers = Modifiers(0x1);
    pub const CONTROL: Modifiers = Modifiers(0x2);
    pub const SHIFT: Modifiers = Modifiers(0x4);
    pub const META: Modifiers = Modifiers(0x8);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Modifiers) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        let names = [
            (Modifiers::CONTROL, "Ctrl"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::META, "Win"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str("+")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Virtual-key code da plataforma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualKey(pub u32);

impl VirtualKey {
    pub const F10: VirtualKey = VirtualKey(0x79);

    /// Nome da tecla, quando conhecido.
    pub fn name(self) -> Option<String> {
        let code = self.0;
        let named = NAMED_KEYS.iter().find(|(_, c)| *c == code).map(|(n, _)| (*n).to_string());
        if named.is_some() {
            return named;
        }
        match code {
            0x70..=0x87 => Some(format!("F{}", code - 0x70 + 1)),
            0x30..=0x39 | 0x41..=0x5A => char::from_u32(code).map(|c| c.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(&name),
            None => write!(f, "0x{:02X}", self.0),
        }
    }
}

const NAMED_KEYS: &[(&str, u32)] = &[
    ("Backspace", 0x08),
    ("Tab", 0x09),
    ("Enter", 0x0D),
    ("Pause", 0x13),
    ("Escape", 0x1B),
    ("Space", 0x20),
    ("PageUp", 0x21),
    ("PageDown", 0x22),
    ("End", 0x23),
    ("Home", 0x24),
    ("Left", 0x25),
    ("Up", 0x26),
    ("Right", 0x27),
    ("Down", 0x28),
    ("PrintScreen", 0x2C),
    ("Insert", 0x2D),
    ("Delete", 0x2E),
    ("ScrollLock", 0x91),
];

/// Erros ao interpretar um atalho textual.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyParseError {
    #[error("Atalho vazio")]
    Empty,

    #[error("Tecla desconhecida: {0}")]
    UnknownKey(String),

    #[error("Modificador desconhecido: {0}")]
    UnknownModifier(String),

    #[error("Atalho sem tecla principal: {0}")]
    MissingKey(String),
}

fn parse_key(token: &str) -> Result<VirtualKey, KeyParseError> {
    let upper = token.to_ascii_uppercase();

    if let Some(hex) = upper.strip_prefix("0X") {
        return u32::from_str_radix(hex, 16)
            .ok()
            .filter(|c| (0x01..=0xFE).contains(c))
            .map(VirtualKey)
            .ok_or_else(|| KeyParseError::UnknownKey(token.to_string()));
    }

    if let Some(n) = upper.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
        if (1..=24).contains(&n) {
            return Ok(VirtualKey(0x70 + n - 1));
        }
    }

    let mut chars = upper.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_uppercase() || c.is_ascii_digit() {
            return Ok(VirtualKey(c as u32));
        }
    }

    let alias = match upper.as_str() {
        "ESC" => "ESCAPE",
        "RETURN" => "ENTER",
        "DEL" => "DELETE",
        "INS" => "INSERT",
        "PGUP" => "PAGEUP",
        "PGDN" => "PAGEDOWN",
        other => other,
    };
    NAMED_KEYS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(alias))
        .map(|(_, code)| VirtualKey(*code))
        .ok_or_else(|| KeyParseError::UnknownKey(token.to_string()))
}

fn parse_modifier(token: &str) -> Option<Modifiers> {
    match token.to_ascii_lowercase().as_str() {
        "alt" => Some(Modifiers::ALT),
        "ctrl" | "control" => Some(Modifiers::CONTROL),
        "shift" => Some(Modifiers::SHIFT),
        "win" | "meta" | "super" | "cmd" => Some(Modifiers::META),
        _ => None,
    }
}

/// Combinação de modificadores + tecla.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: VirtualKey,
}

impl Hotkey {
    pub const fn new(modifiers: Modifiers, key: VirtualKey) -> Self {
        Self { modifiers, key }
    }
}

impl FromStr for Hotkey {
    type Err = KeyParseError;

    /// Interpreta `"F10"`, `"Ctrl+Shift+P"`, `"alt + 0x2C"`.
    /// O último segmento é a tecla; os anteriores, modificadores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key_token, modifier_tokens)) = tokens.split_last() else {
            return Err(KeyParseError::Empty);
        };
        if key_token.is_empty() {
            return Err(if tokens.len() == 1 {
                KeyParseError::Empty
            } else {
                KeyParseError::MissingKey(s.to_string())
            });
        }
        if parse_modifier(key_token).is_some() {
            return Err(KeyParseError::MissingKey(s.to_string()));
        }

        let mut modifiers = Modifiers::NONE;
        for token in modifier_tokens {
            modifiers |= parse_modifier(token)
                .ok_or_else(|| KeyParseError::UnknownModifier((*token).to_string()))?;
        }

        Ok(Hotkey::new(modifiers, parse_key(key_token)?))
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_function_key() {
        let hk: Hotkey = "F10".parse().unwrap();
        assert_eq!(hk, Hotkey::new(Modifiers::NONE, VirtualKey::F10));
        assert_eq!("f24".parse::<Hotkey>().unwrap().key, VirtualKey(0x87));
    }

    #[test]
    fn parses_modifier_combination() {
        let hk: Hotkey = "Ctrl+Shift+F10".parse().unwrap();
        assert_eq!(hk.modifiers, Modifiers::CONTROL | Modifiers::SHIFT);
        assert_eq!(hk.modifiers.bits(), 0x6);
        assert_eq!(hk.key, VirtualKey(0x79));
    }

    #[test]
    fn parses_letters_digits_names_and_hex() {
        assert_eq!("alt + p".parse::<Hotkey>().unwrap().key, VirtualKey(0x50));
        assert_eq!("Win+7".parse::<Hotkey>().unwrap().key, VirtualKey(0x37));
        assert_eq!("Esc".parse::<Hotkey>().unwrap().key, VirtualKey(0x1B));
        assert_eq!("PrintScreen".parse::<Hotkey>().unwrap().key, VirtualKey(0x2C));
        assert_eq!("0xC0".parse::<Hotkey>().unwrap().key, VirtualKey(0xC0));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("".parse::<Hotkey>(), Err(KeyParseError::Empty));
        assert_eq!(
            "Ctrl+".parse::<Hotkey>(),
            Err(KeyParseError::MissingKey("Ctrl+".into()))
        );
        assert_eq!(
            "Ctrl+Shift".parse::<Hotkey>(),
            Err(KeyParseError::MissingKey("Ctrl+Shift".into()))
        );
        assert_eq!(
            "Hyper+F1".parse::<Hotkey>(),
            Err(KeyParseError::UnknownModifier("Hyper".into()))
        );
        assert_eq!(
            "F25".parse::<Hotkey>(),
            Err(KeyParseError::UnknownKey("F25".into()))
        );
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for text in ["F10", "Ctrl+Shift+P", "Alt+Space", "Ctrl+Win+0xC0"] {
            let hk: Hotkey = text.parse().unwrap();
            let again: Hotkey = hk.to_string().parse().unwrap();
            assert_eq!(hk, again, "{text} → {hk}");
        }
    }
}
