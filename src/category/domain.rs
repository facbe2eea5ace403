//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, TransactionType, database_id::CategoryId};

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::ConstraintViolation] if `name` is
    /// empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::ConstraintViolation(
                "the category name cannot be empty".to_owned(),
            ))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub(crate) fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named grouping for income or expenses (e.g., 'Groceries', 'Salary').
///
/// Categories are labels for the presentation layer; transactions do not
/// reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID assigned by the store.
    pub id: CategoryId,
    /// The unique name of the category.
    pub name: CategoryName,
    /// Whether the category groups income or expenses.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

#[cfg(test)]
mod tests {
    use crate::{CategoryName, Error};

    #[test]
    fn new_fails_on_empty_string() {
        let name = CategoryName::new("");

        assert!(matches!(name, Err(Error::ConstraintViolation(_))));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let name = CategoryName::new("\n\t \r");

        assert!(matches!(name, Err(Error::ConstraintViolation(_))));
    }

    #[test]
    fn new_trims_surrounding_whitespace() {
        let name = CategoryName::new("  Groceries ").unwrap();

        assert_eq!(name.as_ref(), "Groceries");
    }

    #[test]
    fn new_succeeds_on_non_empty_string() {
        let name = CategoryName::new("🔥");

        assert!(name.is_ok())
    }
}
