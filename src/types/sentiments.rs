use serde::ser::{Serialize, SerializeMap, Serializer};

/// Per-aspect mean sentiment, kept in taxonomy order.
///
/// Every taxonomy aspect is present once the aggregation stage has run; aspects
/// the sentence never mentions map to `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AspectSentiments {
    entries: Vec<(String, Option<f64>)>,
}

impl AspectSentiments {
    /// All `names` mapped to `None`.
    pub fn absent<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            entries: names.into_iter().map(|name| (name.to_string(), None)).collect(),
        }
    }

    /// Outer `None`: unknown aspect. Inner `None`: aspect not mentioned.
    pub fn get(&self, aspect: &str) -> Option<Option<f64>> {
        self.entries
            .iter()
            .find(|(name, _)| name == aspect)
            .map(|(_, value)| *value)
    }

    pub(crate) fn set(&mut self, aspect: &str, value: Option<f64>) {
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| name == aspect) {
            entry.1 = value;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when no aspect carries a score.
    pub fn all_absent(&self) -> bool {
        self.entries.iter().all(|(_, value)| value.is_none())
    }
}

impl Serialize for AspectSentiments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_in_taxonomy_order() {
        let mut sentiments = AspectSentiments::absent(["tests", "course"]);
        sentiments.set("course", Some(0.5));
        let json = serde_json::to_string(&sentiments).unwrap();
        assert_eq!(json, r#"{"tests":null,"course":0.5}"#);
    }

    #[test]
    fn test_get_distinguishes_unknown_from_absent() {
        let sentiments = AspectSentiments::absent(["course"]);
        assert_eq!(sentiments.get("course"), Some(None));
        assert_eq!(sentiments.get("exam"), None);
        assert!(sentiments.all_absent());
    }
}
