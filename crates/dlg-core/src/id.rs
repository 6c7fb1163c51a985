use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for scene tags.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned scene identifier (the `scene_tag` of a dialogue file).
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(Spur);

impl SceneId {
    /// Intern a scene tag, or return the existing handle if already interned.
    pub fn intern(s: &str) -> Self {
        SceneId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to the scene tag.
    pub fn as_str(&self) -> &'static str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SceneId({})", self.as_str())
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SceneId {
    fn from(s: &str) -> Self {
        SceneId::intern(s)
    }
}

impl Serialize for SceneId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SceneId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(SceneId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = SceneId::intern("villager_greeting");
        let b = SceneId::intern("villager_greeting");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "villager_greeting");
    }

    #[test]
    fn distinct_tags_are_distinct_ids() {
        assert_ne!(SceneId::intern("shop_open"), SceneId::intern("shop_close"));
    }

    #[test]
    fn display_is_the_bare_tag() {
        assert_eq!(SceneId::intern("intro").to_string(), "intro");
    }
}
