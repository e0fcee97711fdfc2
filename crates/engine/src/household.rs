//! The two members of a household.
//!
//! Order matters: `first` is "participant 1" in every balance computation.
//! It comes from configuration order, never from sorting.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    first: String,
    second: String,
}

impl Participants {
    /// Builds a validated pair: both ids non-empty and distinct.
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> ResultEngine<Self> {
        let first = first.into().trim().to_string();
        let second = second.into().trim().to_string();
        if first.is_empty() || second.is_empty() {
            return Err(EngineError::Validation(
                "participant ids must not be empty".to_string(),
            ));
        }
        if first == second {
            return Err(EngineError::Validation(
                "participants must be two different people".to_string(),
            ));
        }
        Ok(Self { first, second })
    }

    /// Lenient constructor: missing entries become empty ids and extra ones
    /// are ignored. Used to feed the balance functions with whatever list is
    /// at hand; empty ids never match a stored record.
    #[must_use]
    pub fn from_list<S: AsRef<str>>(ids: &[S]) -> Self {
        let get = |idx: usize| {
            ids.get(idx)
                .map(|s| s.as_ref().trim().to_string())
                .unwrap_or_default()
        };
        Self {
            first: get(0),
            second: get(1),
        }
    }

    #[must_use]
    pub fn first(&self) -> &str {
        &self.first
    }

    #[must_use]
    pub fn second(&self) -> &str {
        &self.second
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        !id.is_empty() && (self.first == id || self.second == id)
    }

    /// Resolves the acting user to a household participant.
    pub fn resolve(&self, user: &str) -> ResultEngine<&str> {
        let user = user.trim();
        if user == self.first {
            Ok(&self.first)
        } else if user == self.second {
            Ok(&self.second)
        } else {
            Err(EngineError::Forbidden(format!(
                "'{user}' is not a member of this household"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_duplicates_and_blanks() {
        assert!(Participants::new("Claire", "Claire").is_err());
        assert!(Participants::new(" ", "Claire").is_err());
        let pair = Participants::new(" Claire ", "Stéphane").unwrap();
        assert_eq!(pair.first(), "Claire");
        assert_eq!(pair.second(), "Stéphane");
    }

    #[test]
    fn from_list_pads_short_lists() {
        let empty: [&str; 0] = [];
        let pair = Participants::from_list(&empty);
        assert_eq!((pair.first(), pair.second()), ("", ""));

        let pair = Participants::from_list(&["Claire"]);
        assert_eq!((pair.first(), pair.second()), ("Claire", ""));
        assert!(!pair.contains(""));
    }

    #[test]
    fn resolve_only_accepts_members() {
        let pair = Participants::new("Claire", "Stéphane").unwrap();
        assert_eq!(pair.resolve("Stéphane").unwrap(), "Stéphane");
        assert!(matches!(
            pair.resolve("Mallory"),
            Err(EngineError::Forbidden(_))
        ));
    }
}
