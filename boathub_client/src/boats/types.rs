use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::build_query_string;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoatType {
    Sailboat,
    Motorboat,
    Yacht,
    Speedboat,
    FishingBoat,
    Other,
}

impl BoatType {
    pub fn display_name(&self) -> &'static str {
        match self {
            BoatType::Sailboat => "Sailboat",
            BoatType::Motorboat => "Motorboat",
            BoatType::Yacht => "Yacht",
            BoatType::Speedboat => "Speedboat",
            BoatType::FishingBoat => "Fishing Boat",
            BoatType::Other => "Other",
        }
    }
}

impl fmt::Display for BoatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boat {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub boat_type: BoatType,
    #[serde(default)]
    pub created_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_date: Option<NaiveDateTime>,
}

/// Body for creating a boat, also used for a full update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoatRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub boat_type: BoatType,
}

pub type CreateBoatRequest = BoatRequest;
pub type UpdateBoatRequest = BoatRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Page request for the boat list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageable {
    pub page: u32,
    pub size: u32,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

impl Pageable {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort_by: None,
            sort_direction: None,
        }
    }

    pub fn sorted(mut self, sort_by: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_direction = Some(direction);
        self
    }

    pub(crate) fn to_query_string(&self) -> String {
        build_query_string([
            ("page", Some(self.page.to_string())),
            ("size", Some(self.size.to_string())),
            ("sortBy", self.sort_by.clone()),
            (
                "sortDirection",
                self.sort_direction.map(|d| d.as_str().to_string()),
            ),
        ])
    }
}

impl Default for Pageable {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

/// One page of results as returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub number_of_elements: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
    #[serde(default)]
    pub empty: bool,
}
