use super::OptionStore;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone)]
struct OptionKey {
    store: OptionStore,
    category: String,
    group: String,
    name: String,
}

impl OptionKey {
    fn new(store: &OptionStore, category: &str, group: &str, name: &str) -> Self {
        Self {
            store: store.clone(),
            category: category.to_string(),
            group: group.to_string(),
            name: name.to_string(),
        }
    }

    fn raw(&self) -> Option<String> {
        self.store.get(&self.category, &self.group, &self.name)
    }

    fn parsed<T: FromStr>(&self) -> Option<T> {
        let raw = self.raw()?;
        match raw.trim().parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(
                    category = %self.category,
                    group = %self.group,
                    name = %self.name,
                    %raw,
                    "Ignoring unparsable option value"
                );
                None
            }
        }
    }

    fn write(&self, value: String, is_default: bool) {
        if is_default {
            self.store.unset(&self.category, &self.group, &self.name);
        } else {
            self.store
                .set(&self.category, &self.group, &self.name, &value);
        }
    }
}

#[derive(Debug, Clone)]
pub struct BooleanOption {
    key: OptionKey,
    default: bool,
}

impl BooleanOption {
    pub fn new(
        store: &OptionStore,
        category: &str,
        group: &str,
        name: &str,
        default: bool,
    ) -> Self {
        Self {
            key: OptionKey::new(store, category, group, name),
            default,
        }
    }

    pub fn value(&self) -> bool {
        self.key.parsed().unwrap_or(self.default)
    }

    pub fn set_value(&self, value: bool) {
        self.key.write(value.to_string(), value == self.default);
    }
}

/// Three-state flag: on, off, or "leave as the document says".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boolean3 {
    False,
    True,
    Undefined,
}

impl Boolean3 {
    pub fn as_str(self) -> &'static str {
        match self {
            Boolean3::False => "false",
            Boolean3::True => "true",
            Boolean3::Undefined => "undefined",
        }
    }
}

impl FromStr for Boolean3 {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "false" => Ok(Boolean3::False),
            "true" => Ok(Boolean3::True),
            "undefined" => Ok(Boolean3::Undefined),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Boolean3Option {
    key: OptionKey,
    default: Boolean3,
}

impl Boolean3Option {
    pub fn new(
        store: &OptionStore,
        category: &str,
        group: &str,
        name: &str,
        default: Boolean3,
    ) -> Self {
        Self {
            key: OptionKey::new(store, category, group, name),
            default,
        }
    }

    pub fn value(&self) -> Boolean3 {
        self.key.parsed().unwrap_or(self.default)
    }

    pub fn set_value(&self, value: Boolean3) {
        self.key
            .write(value.as_str().to_string(), value == self.default);
    }
}

#[derive(Debug, Clone)]
pub struct StringOption {
    key: OptionKey,
    default: String,
}

impl StringOption {
    pub fn new(
        store: &OptionStore,
        category: &str,
        group: &str,
        name: &str,
        default: &str,
    ) -> Self {
        Self {
            key: OptionKey::new(store, category, group, name),
            default: default.to_string(),
        }
    }

    pub fn value(&self) -> String {
        self.key.raw().unwrap_or_else(|| self.default.clone())
    }

    pub fn set_value(&self, value: &str) {
        self.key.write(value.to_string(), value == self.default);
    }
}

/// Integer option whose value is always kept inside `[min, max]`.
#[derive(Debug, Clone)]
pub struct IntegerRangeOption {
    key: OptionKey,
    min: i32,
    max: i32,
    default: i32,
}

impl IntegerRangeOption {
    pub fn new(
        store: &OptionStore,
        category: &str,
        group: &str,
        name: &str,
        min: i32,
        max: i32,
        default: i32,
    ) -> Self {
        let max = max.max(min);
        Self {
            key: OptionKey::new(store, category, group, name),
            min,
            max,
            default: default.clamp(min, max),
        }
    }

    pub fn value(&self) -> i32 {
        self.key
            .parsed::<i32>()
            .map(|v| v.clamp(self.min, self.max))
            .unwrap_or(self.default)
    }

    pub fn min_value(&self) -> i32 {
        self.min
    }

    pub fn max_value(&self) -> i32 {
        self.max
    }

    pub fn set_value(&self, value: i32) {
        let value = value.clamp(self.min, self.max);
        self.key.write(value.to_string(), value == self.default);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(|part| part.trim().parse::<u8>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => Ok(Color { r, g, b }),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColorOption {
    key: OptionKey,
    default: Color,
}

impl ColorOption {
    pub fn new(
        store: &OptionStore,
        category: &str,
        group: &str,
        name: &str,
        default: Color,
    ) -> Self {
        Self {
            key: OptionKey::new(store, category, group, name),
            default,
        }
    }

    pub fn value(&self) -> Color {
        self.key.parsed().unwrap_or(self.default)
    }

    pub fn set_value(&self, value: Color) {
        self.key.write(value.to_string(), value == self.default);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{EXTERNAL_CATEGORY, FORMATS_CATEGORY, LOOK_AND_FEEL_CATEGORY};

    #[test]
    fn default_values_are_not_persisted() {
        let store = OptionStore::in_memory();
        let option = BooleanOption::new(&store, FORMATS_CATEGORY, "Global", "AutoDetect", true);
        option.set_value(false);
        assert_eq!(
            store.get(FORMATS_CATEGORY, "Global", "AutoDetect").as_deref(),
            Some("false")
        );
        option.set_value(true);
        assert!(store.get(FORMATS_CATEGORY, "Global", "AutoDetect").is_none());
        assert!(option.value());
    }

    #[test]
    fn clearing_a_string_option_marks_the_store_dirty() {
        let store = OptionStore::in_memory();
        let path = StringOption::new(&store, EXTERNAL_CATEGORY, "sdcv", "path", "/usr/bin/sdcv");
        path.set_value("");
        assert_eq!(path.value(), "");
        assert!(store.is_dirty());
    }

    #[test]
    fn integer_range_clamps_reads_and_writes() {
        let store = OptionStore::in_memory();
        let option =
            IntegerRangeOption::new(&store, LOOK_AND_FEEL_CATEGORY, "Text", "Size", 8, 36, 16);
        option.set_value(99);
        assert_eq!(option.value(), 36);

        store.set(LOOK_AND_FEEL_CATEGORY, "Text", "Size", "-4");
        assert_eq!(option.value(), 8);

        store.set(LOOK_AND_FEEL_CATEGORY, "Text", "Size", "large");
        assert_eq!(option.value(), 16);
    }

    #[test]
    fn color_parses_stored_triplets() {
        let store = OptionStore::in_memory();
        let option = ColorOption::new(
            &store,
            LOOK_AND_FEEL_CATEGORY,
            "Colors",
            "Background",
            Color::rgb(255, 255, 255),
        );
        option.set_value(Color::rgb(10, 20, 30));
        assert_eq!(
            store.get(LOOK_AND_FEEL_CATEGORY, "Colors", "Background").as_deref(),
            Some("10,20,30")
        );
        store.set(LOOK_AND_FEEL_CATEGORY, "Colors", "Background", "1,2");
        assert_eq!(option.value(), Color::rgb(255, 255, 255));
    }

    #[test]
    fn boolean3_keeps_undefined_distinct() {
        let store = OptionStore::in_memory();
        let option = Boolean3Option::new(
            &store,
            FORMATS_CATEGORY,
            "Text",
            "Hyphenate",
            Boolean3::Undefined,
        );
        assert_eq!(option.value(), Boolean3::Undefined);
        option.set_value(Boolean3::False);
        assert_eq!(option.value(), Boolean3::False);
    }
}
