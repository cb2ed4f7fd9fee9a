use serde::{Deserialize, Serialize};

/// Entities that can be referred to by an identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

/// Either a loaded entity or just its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Resolved(T),
    Unresolved(String),
}

impl<T: Identified> Reference<T> {
    pub fn unresolved(id: impl Into<String>) -> Self {
        Reference::Unresolved(id.into())
    }

    pub fn id(&self) -> &str {
        match self {
            Reference::Resolved(entity) => entity.id(),
            Reference::Unresolved(id) => id,
        }
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Reference::Resolved(entity) => Some(entity),
            Reference::Unresolved(_) => None,
        }
    }
}

impl<T: Identified> From<T> for Reference<T> {
    fn from(entity: T) -> Self {
        Reference::Resolved(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Thing {
        id: String,
        label: String,
    }

    impl Identified for Thing {
        fn id(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn id_is_available_in_both_cases() {
        let resolved: Reference<Thing> = Thing {
            id: "T-1".into(),
            label: "um".into(),
        }
        .into();
        let unresolved: Reference<Thing> = Reference::unresolved("T-2");

        assert_eq!(resolved.id(), "T-1");
        assert_eq!(unresolved.id(), "T-2");
        assert!(resolved.resolved().is_some());
        assert!(unresolved.resolved().is_none());
    }

    #[test]
    fn deserializes_string_or_object() {
        let r: Reference<Thing> = serde_json::from_str("\"T-9\"").unwrap();
        assert_eq!(r, Reference::Unresolved("T-9".into()));

        let r: Reference<Thing> =
            serde_json::from_str(r#"{"id": "T-3", "label": "três"}"#).unwrap();
        assert_eq!(r.resolved().map(|t| t.label.as_str()), Some("três"));
    }
}
