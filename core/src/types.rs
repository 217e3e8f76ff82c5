//! Shared primitive types used across the persistence core.

/// The stable identity key of an actor, room or object.
pub type EntityKey = String;

/// Number of actor-icon slots tracked by the inventory and game scene.
pub const ACTOR_ICON_SLOTS: usize = 6;

/// A 2D position or offset in room coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Persisted form: `"{x,y}"` with both components truncated to integers.
    pub fn to_save_string(self) -> String {
        format!("{{{},{}}}", self.x as i32, self.y as i32)
    }

    /// Parse the persisted `"{x,y}"` form. Malformed input yields `None`.
    pub fn parse_save_string(s: &str) -> Option<Self> {
        let inner = s.trim().strip_prefix('{')?.strip_suffix('}')?;
        let (x, y) = inner.split_once(',')?;
        let x: f32 = x.trim().parse().ok()?;
        let y: f32 = y.trim().parse().ok()?;
        Some(Self { x, y })
    }
}

/// An RGBA color, persisted as a packed `0xRRGGBBAA` integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_integer(self) -> u32 {
        u32::from(self.r) << 24 | u32::from(self.g) << 16 | u32::from(self.b) << 8 | u32::from(self.a)
    }

    pub fn from_integer(value: u32) -> Self {
        Self {
            r: (value >> 24) as u8,
            g: (value >> 16) as u8,
            b: (value >> 8) as u8,
            a: value as u8,
        }
    }
}

impl Default for Color {
    fn default() -> Self { Color::WHITE }
}

/// Costume facing. Values are the persisted integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i64)]
pub enum Facing {
    #[default]
    Front = 1,
    Back  = 2,
    Left  = 4,
    Right = 8,
}

impl Facing {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Front),
            2 => Some(Self::Back),
            4 => Some(Self::Left),
            8 => Some(Self::Right),
            _ => None,
        }
    }
}

/// Direction an actor faces when using an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i64)]
pub enum UseDirection {
    #[default]
    Front = 1,
    Back  = 2,
    Left  = 4,
    Right = 8,
}

impl UseDirection {
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Front),
            2 => Some(Self::Back),
            4 => Some(Self::Left),
            8 => Some(Self::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_string_truncates_and_parses_back() {
        let pos = Vec2::new(120.7, 80.2);
        assert_eq!(pos.to_save_string(), "{120,80}");
        assert_eq!(Vec2::parse_save_string("{120,80}"), Some(Vec2::new(120.0, 80.0)));
        assert_eq!(Vec2::parse_save_string("{-3, 45}"), Some(Vec2::new(-3.0, 45.0)));
        assert_eq!(Vec2::parse_save_string("120,80"), None);
    }

    #[test]
    fn white_packs_to_all_ones() {
        assert_eq!(Color::WHITE.to_integer(), 0xFFFF_FFFF);
        let c = Color::rgba(0x12, 0x34, 0x56, 0x78);
        assert_eq!(Color::from_integer(c.to_integer()), c);
    }
}
