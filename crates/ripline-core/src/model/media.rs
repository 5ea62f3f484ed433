//! Media items and TV seasons.

use serde::{Deserialize, Serialize};

use super::job::{JobStatus, Stage};

pub type ItemId = i64;
pub type SeasonId = i64;

/// Movie or TV show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    /// Accepts `movie`, `tv`, and the legacy `show` spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(MediaType::Movie),
            "tv" | "show" => Some(MediaType::Tv),
            _ => None,
        }
    }

    /// Directory bucket under each staging stage.
    pub fn staging_dir(self) -> &'static str {
        match self {
            MediaType::Movie => "movies",
            MediaType::Tv => "tv",
        }
    }
}

/// Lifecycle of an item as a whole. Items are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Active,
    Completed,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "completed" => ItemStatus::Completed,
            _ => ItemStatus::Active,
        }
    }
}

/// A logical work of media. Movies never own seasons.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub id: ItemId,
    pub media_type: MediaType,
    pub name: String,
    pub safe_name: String,
    pub status: ItemStatus,
    pub current_stage: Stage,
    pub stage_status: JobStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// One season of a TV item, exclusively owned by it.
#[derive(Debug, Clone, PartialEq)]
pub struct Season {
    pub id: SeasonId,
    pub item_id: ItemId,
    pub number: u32,
    pub current_stage: Stage,
    pub stage_status: JobStatus,
    pub created_at: i64,
    pub updated_at: i64,
}
