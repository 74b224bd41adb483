use super::*;

impl PostgresUserRepository {
    pub(super) async fn add_saved_content_impl(
        &self,
        user_id: &str,
        entry: SavedContentRef,
    ) -> AppResult<bool> {
        let Ok(user_id) = Uuid::parse_str(user_id) else {
            return Ok(false);
        };

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start saved content transaction: {error}"))
        })?;

        let Some(mut account) = Self::lock_account(&mut transaction, user_id).await? else {
            return Ok(false);
        };
        if account.has_saved(&entry.reference) {
            return Ok(false);
        }

        account.saved_content.push(entry);
        account.updated_at = Utc::now();
        Self::write_account(&mut transaction, user_id, &account).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit saved content: {error}"))
        })?;

        Ok(true)
    }

    pub(super) async fn remove_saved_content_impl(
        &self,
        user_id: &str,
        content_id: &str,
    ) -> AppResult<bool> {
        let Ok(user_id) = Uuid::parse_str(user_id) else {
            return Ok(false);
        };

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to start saved content transaction: {error}"))
        })?;

        let Some(mut account) = Self::lock_account(&mut transaction, user_id).await? else {
            return Ok(false);
        };
        if !account.has_saved(content_id) {
            return Ok(false);
        }

        account
            .saved_content
            .retain(|saved| saved.reference != content_id);
        account.updated_at = Utc::now();
        Self::write_account(&mut transaction, user_id, &account).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit saved content removal: {error}"))
        })?;

        Ok(true)
    }
}
