use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ClaimOutcome, Owner, Store, StoreResult};
use crate::models::conversation::{ConversationRow, NewConversation};
use crate::models::profile::{NewProfile, ProfileRow};
use crate::models::prompt::{NewPromptTemplate, PromptTemplateRow, ToolKind};

const PROFILE_COLUMNS: &str = "id, user_id, name, email, linkedin_url, headline, data_sources, \
     raw_text, analysis, analysis_source, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_profile(&self, owner: Owner, profile: NewProfile) -> StoreResult<ProfileRow> {
        // owner_key is a generated column that maps a null owner to the nil UUID,
        // so unowned rows share one conflict namespace.
        let sql = format!(
            r#"
            INSERT INTO profiles
                (id, user_id, name, email, linkedin_url, headline,
                 data_sources, raw_text, analysis, analysis_source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (owner_key, linkedin_url) DO UPDATE SET
                name = EXCLUDED.name,
                email = COALESCE(EXCLUDED.email, profiles.email),
                headline = COALESCE(EXCLUDED.headline, profiles.headline),
                data_sources = ARRAY(
                    SELECT DISTINCT unnest(profiles.data_sources || EXCLUDED.data_sources)
                ),
                raw_text = EXCLUDED.raw_text,
                analysis = EXCLUDED.analysis,
                analysis_source = EXCLUDED.analysis_source,
                updated_at = NOW()
            RETURNING {PROFILE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner.user_id())
            .bind(&profile.name)
            .bind(&profile.email)
            .bind(&profile.linkedin_url)
            .bind(&profile.headline)
            .bind(&profile.data_sources)
            .bind(&profile.raw_text)
            .bind(Json(&profile.analysis))
            .bind(&profile.analysis_source)
            .fetch_one(&self.pool)
            .await
    }

    async fn list_profiles(&self, user_id: Uuid) -> StoreResult<Vec<ProfileRow>> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_profile(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<ProfileRow>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn delete_profile(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn claim_profile(&self, user_id: Uuid, id: Uuid) -> StoreResult<ClaimOutcome> {
        let sql = format!(
            "UPDATE profiles SET user_id = $1, updated_at = NOW() \
             WHERE id = $2 AND user_id IS NULL RETURNING {PROFILE_COLUMNS}"
        );
        let claimed = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(user_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = claimed {
            return Ok(ClaimOutcome::Claimed(row));
        }

        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match exists {
            Some(_) => ClaimOutcome::AlreadyOwned,
            None => ClaimOutcome::NotFound,
        })
    }

    async fn create_conversation(
        &self,
        user_id: Uuid,
        conversation: NewConversation,
    ) -> StoreResult<ConversationRow> {
        sqlx::query_as::<_, ConversationRow>(
            r#"
            INSERT INTO conversations (id, user_id, profile_id, kind, title, content)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, profile_id, kind, title, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(conversation.profile_id)
        .bind(&conversation.kind)
        .bind(&conversation.title)
        .bind(&conversation.content)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_conversations(
        &self,
        user_id: Uuid,
        profile_id: Option<Uuid>,
    ) -> StoreResult<Vec<ConversationRow>> {
        sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, user_id, profile_id, kind, title, content, created_at
            FROM conversations
            WHERE user_id = $1 AND ($2::uuid IS NULL OR profile_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_conversation(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<ConversationRow>> {
        sqlx::query_as::<_, ConversationRow>(
            "SELECT id, user_id, profile_id, kind, title, content, created_at \
             FROM conversations WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_conversation(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_prompt_template(
        &self,
        user_id: Uuid,
        template: NewPromptTemplate,
    ) -> StoreResult<PromptTemplateRow> {
        sqlx::query_as::<_, PromptTemplateRow>(
            r#"
            INSERT INTO prompt_templates (id, user_id, name, tool, template)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, tool, template, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&template.name)
        .bind(template.tool.as_str())
        .bind(&template.template)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_prompt_templates(&self, user_id: Uuid) -> StoreResult<Vec<PromptTemplateRow>> {
        sqlx::query_as::<_, PromptTemplateRow>(
            "SELECT id, user_id, name, tool, template, created_at, updated_at \
             FROM prompt_templates WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_prompt_template(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<PromptTemplateRow>> {
        sqlx::query_as::<_, PromptTemplateRow>(
            "SELECT id, user_id, name, tool, template, created_at, updated_at \
             FROM prompt_templates WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn latest_prompt_template(
        &self,
        user_id: Uuid,
        tool: ToolKind,
    ) -> StoreResult<Option<PromptTemplateRow>> {
        sqlx::query_as::<_, PromptTemplateRow>(
            "SELECT id, user_id, name, tool, template, created_at, updated_at \
             FROM prompt_templates WHERE user_id = $1 AND tool = $2 \
             ORDER BY updated_at DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(tool.as_str())
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_prompt_template(
        &self,
        user_id: Uuid,
        id: Uuid,
        template: NewPromptTemplate,
    ) -> StoreResult<Option<PromptTemplateRow>> {
        sqlx::query_as::<_, PromptTemplateRow>(
            r#"
            UPDATE prompt_templates
            SET name = $1, tool = $2, template = $3, updated_at = NOW()
            WHERE id = $4 AND user_id = $5
            RETURNING id, user_id, name, tool, template, created_at, updated_at
            "#,
        )
        .bind(&template.name)
        .bind(template.tool.as_str())
        .bind(&template.template)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_prompt_template(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM prompt_templates WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
