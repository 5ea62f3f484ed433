//! Media items and seasons.

use anyhow::{bail, Context, Result};

use super::db::{unix_timestamp, PipelineDb};
use super::rows::{self, ITEM_COLUMNS, SEASON_COLUMNS};
use crate::model::{ItemId, ItemStatus, JobStatus, MediaItem, MediaType, Season, SeasonId, Stage};

impl PipelineDb {
    /// Insert a new item at stage `rip`, status `pending`.
    pub async fn create_media_item(
        &self,
        media_type: MediaType,
        name: &str,
        safe_name: &str,
    ) -> Result<ItemId> {
        let now = unix_timestamp();
        let id = sqlx::query(
            r#"
            INSERT INTO media_items (type, name, safe_name, status, current_stage, stage_status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(media_type.as_str())
        .bind(name)
        .bind(safe_name)
        .bind(ItemStatus::Active.as_str())
        .bind(Stage::Rip.as_str())
        .bind(JobStatus::Pending.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .with_context(|| format!("insert media item {:?}", safe_name))?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn get_media_item(&self, id: ItemId) -> Result<Option<MediaItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM media_items WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rows::media_item).transpose()
    }

    pub async fn find_media_item(&self, safe_name: &str) -> Result<Option<MediaItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM media_items WHERE safe_name = ?1");
        let row = sqlx::query(&sql)
            .bind(safe_name)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rows::media_item).transpose()
    }

    /// Existing item with this safe name, or a new one.
    pub async fn find_or_create_media_item(
        &self,
        media_type: MediaType,
        name: &str,
        safe_name: &str,
    ) -> Result<MediaItem> {
        if let Some(item) = self.find_media_item(safe_name).await? {
            return Ok(item);
        }
        let id = self.create_media_item(media_type, name, safe_name).await?;
        self.get_media_item(id)
            .await?
            .context("media item vanished after insert")
    }

    /// All items, oldest first.
    pub async fn list_media_items(&self) -> Result<Vec<MediaItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM media_items ORDER BY created_at ASC, id ASC");
        let found = sqlx::query(&sql).fetch_all(&self.pool).await?;
        found.iter().map(rows::media_item).collect()
    }

    pub async fn set_media_item_status(&self, id: ItemId, status: ItemStatus) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE media_items
            SET status = ?1,
                updated_at = ?2
            WHERE id = ?3
            "#,
        )
        .bind(status.as_str())
        .bind(unix_timestamp())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Add a season to a TV item. Movies cannot own seasons.
    pub async fn create_season(&self, item_id: ItemId, number: u32) -> Result<SeasonId> {
        let item = self
            .get_media_item(item_id)
            .await?
            .with_context(|| format!("media item {} not found", item_id))?;
        if item.media_type != MediaType::Tv {
            bail!("media item {} is a movie and cannot have seasons", item_id);
        }
        let now = unix_timestamp();
        let id = sqlx::query(
            r#"
            INSERT INTO seasons (item_id, number, current_stage, stage_status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(item_id)
        .bind(i64::from(number))
        .bind(Stage::Rip.as_str())
        .bind(JobStatus::Pending.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn get_season(&self, id: SeasonId) -> Result<Option<Season>> {
        let sql = format!("SELECT {SEASON_COLUMNS} FROM seasons WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rows::season).transpose()
    }

    /// Existing season `number` of the item, or a new one.
    pub async fn find_or_create_season(&self, item_id: ItemId, number: u32) -> Result<Season> {
        let existing = self
            .list_seasons(item_id)
            .await?
            .into_iter()
            .find(|s| s.number == number);
        if let Some(season) = existing {
            return Ok(season);
        }
        let id = self.create_season(item_id, number).await?;
        self.get_season(id)
            .await?
            .context("season vanished after insert")
    }

    /// Seasons of an item in season-number order.
    pub async fn list_seasons(&self, item_id: ItemId) -> Result<Vec<Season>> {
        let sql = format!("SELECT {SEASON_COLUMNS} FROM seasons WHERE item_id = ?1 ORDER BY number ASC");
        let found = sqlx::query(&sql)
            .bind(item_id)
            .fetch_all(&self.pool)
            .await?;
        found.iter().map(rows::season).collect()
    }
}
