use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DoccatError;

/// Content-topic label. The twelve categories are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    TechnologyScience,
    DigitalLife,
    Sports,
    FashionBeautyLifestyle,
    MoneyBusiness,
    Politics,
    PeopleShows,
    News,
    Culture,
    Travel,
    Music,
    CarsMotors,
}

impl Category {
    /// Number of categories.
    pub const COUNT: usize = 12;

    /// The fixed category list, in canonical order.
    pub const ALL: [Category; Category::COUNT] = [
        Self::TechnologyScience,
        Self::DigitalLife,
        Self::Sports,
        Self::FashionBeautyLifestyle,
        Self::MoneyBusiness,
        Self::Politics,
        Self::PeopleShows,
        Self::News,
        Self::Culture,
        Self::Travel,
        Self::Music,
        Self::CarsMotors,
    ];

    /// Position of this category in [`Category::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Category::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Label as it appears in the input data.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TechnologyScience => "technology_science",
            Self::DigitalLife => "digital_life",
            Self::Sports => "sports",
            Self::FashionBeautyLifestyle => "fashion_beauty_lifestyle",
            Self::MoneyBusiness => "money_business",
            Self::Politics => "politics",
            Self::PeopleShows => "people_shows",
            Self::News => "news",
            Self::Culture => "culture",
            Self::Travel => "travel",
            Self::Music => "music",
            Self::CarsMotors => "cars_motors",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DoccatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == trimmed)
            .ok_or_else(|| DoccatError::UnknownCategory {
                label: s.to_string(),
                row: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (i, cat) in Category::ALL.iter().enumerate() {
            assert_eq!(cat.index(), i);
            assert_eq!(Category::from_index(i), Some(*cat));
        }
        assert_eq!(Category::from_index(Category::COUNT), None);
    }

    #[test]
    fn parse_labels() {
        assert_eq!("sports".parse::<Category>().unwrap(), Category::Sports);
        assert_eq!(
            " money_business ".parse::<Category>().unwrap(),
            Category::MoneyBusiness
        );
        assert!("Sports".parse::<Category>().is_err());
        assert!("weather".parse::<Category>().is_err());
    }

    #[test]
    fn display_matches_serde() {
        for cat in Category::ALL {
            let json = serde_json::to_string(&cat).unwrap();
            assert_eq!(json, format!("\"{cat}\""));
        }
    }
}
