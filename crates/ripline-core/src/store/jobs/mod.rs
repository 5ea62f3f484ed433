//! Job records: reads in `read`, writes in `write`.

mod read;
mod write;

use crate::model::{ItemId, SeasonId, Stage};

/// Fields supplied when a job is dispatched. New jobs start `pending` with
/// progress 0.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub media_item_id: ItemId,
    pub season_id: Option<SeasonId>,
    pub disc: Option<u32>,
    pub stage: Stage,
    pub input_dir: Option<String>,
    pub output_dir: Option<String>,
}

impl NewJob {
    pub fn new(media_item_id: ItemId, stage: Stage) -> Self {
        Self {
            media_item_id,
            season_id: None,
            disc: None,
            stage,
            input_dir: None,
            output_dir: None,
        }
    }
}
