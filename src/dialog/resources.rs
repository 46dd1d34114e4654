//! Resource strings for dialog labels.
//!
//! Labels are looked up per tab first and then in the shared `common`
//! section. A missing key falls back to the key itself so the dialog still
//! renders something readable.

use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

pub const COMMON_SECTION: &str = "common";

#[derive(Debug, Clone, Default)]
pub struct Resources {
    sections: Rc<BTreeMap<String, BTreeMap<String, String>>>,
}

impl Resources {
    pub fn new(sections: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self {
            sections: Rc::new(sections),
        }
    }

    pub fn value(&self, section: &str, key: &str) -> String {
        let lookup = |name: &str| {
            self.sections
                .get(name)
                .and_then(|values| values.get(key))
                .cloned()
        };
        lookup(section)
            .or_else(|| lookup(COMMON_SECTION))
            .unwrap_or_else(|| {
                debug!(%section, %key, "Missing resource string");
                key.to_string()
            })
    }
}

/// Substitute the first `%s` in `template` with `arg`.
pub fn format_resource(template: &str, arg: &str) -> String {
    match template.find("%s") {
        Some(pos) => {
            let mut out = String::with_capacity(template.len() + arg.len());
            out.push_str(&template[..pos]);
            out.push_str(arg);
            out.push_str(&template[pos + 2..]);
            out
        }
        None => template.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Resources {
        let mut sections = BTreeMap::new();
        sections.insert(
            COMMON_SECTION.to_string(),
            BTreeMap::from([("choice".to_string(), "Program".to_string())]),
        );
        sections.insert(
            "Dictionary".to_string(),
            BTreeMap::from([("choice".to_string(), "Use dictionary".to_string())]),
        );
        Resources::new(sections)
    }

    #[test]
    fn tab_section_wins_over_common() {
        let resources = sample();
        assert_eq!(resources.value("Dictionary", "choice"), "Use dictionary");
        assert_eq!(resources.value("Library", "choice"), "Program");
        assert_eq!(resources.value("Library", "unknownKey"), "unknownKey");
    }

    #[test]
    fn formats_only_first_placeholder() {
        assert_eq!(
            format_resource("Enable %s integration (%s)", "sdcv"),
            "Enable sdcv integration (%s)"
        );
        assert_eq!(format_resource("No placeholder", "x"), "No placeholder");
    }
}
