//! In-memory `Store` used by handler and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use super::{ClaimOutcome, Owner, Store, StoreResult};
use crate::models::conversation::{ConversationRow, NewConversation};
use crate::models::profile::{NewProfile, ProfileRow};
use crate::models::prompt::{NewPromptTemplate, PromptTemplateRow, ToolKind};

#[derive(Default)]
struct Tables {
    profiles: Vec<ProfileRow>,
    conversations: Vec<ConversationRow>,
    prompts: Vec<PromptTemplateRow>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile_count(&self) -> usize {
        self.tables.lock().unwrap().profiles.len()
    }

    pub fn conversation_count(&self) -> usize {
        self.tables.lock().unwrap().conversations.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_profile(&self, owner: Owner, profile: NewProfile) -> StoreResult<ProfileRow> {
        let mut tables = self.tables.lock().unwrap();
        let user_id = owner.user_id();
        let now = Utc::now();

        let existing = profile.linkedin_url.as_ref().and_then(|url| {
            tables
                .profiles
                .iter_mut()
                .find(|p| p.user_id == user_id && p.linkedin_url.as_ref() == Some(url))
        });

        if let Some(row) = existing {
            row.name = profile.name;
            row.email = profile.email.or(row.email.take());
            row.headline = profile.headline.or(row.headline.take());
            for source in profile.data_sources {
                if !row.data_sources.contains(&source) {
                    row.data_sources.push(source);
                }
            }
            row.raw_text = profile.raw_text;
            row.analysis = Json(profile.analysis);
            row.analysis_source = profile.analysis_source;
            row.updated_at = now;
            return Ok(row.clone());
        }

        let row = ProfileRow {
            id: Uuid::new_v4(),
            user_id,
            name: profile.name,
            email: profile.email,
            linkedin_url: profile.linkedin_url,
            headline: profile.headline,
            data_sources: profile.data_sources,
            raw_text: profile.raw_text,
            analysis: Json(profile.analysis),
            analysis_source: profile.analysis_source,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(row.clone());
        Ok(row)
    }

    async fn list_profiles(&self, user_id: Uuid) -> StoreResult<Vec<ProfileRow>> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<_> = tables
            .profiles
            .iter()
            .filter(|p| p.user_id == Some(user_id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get_profile(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<ProfileRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .profiles
            .iter()
            .find(|p| p.id == id && p.user_id == Some(user_id))
            .cloned())
    }

    async fn delete_profile(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.profiles.len();
        tables
            .profiles
            .retain(|p| !(p.id == id && p.user_id == Some(user_id)));
        let deleted = tables.profiles.len() < before;
        if deleted {
            tables.conversations.retain(|c| c.profile_id != id);
        }
        Ok(deleted)
    }

    async fn claim_profile(&self, user_id: Uuid, id: Uuid) -> StoreResult<ClaimOutcome> {
        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(ClaimOutcome::NotFound);
        };
        if row.user_id.is_some() {
            return Ok(ClaimOutcome::AlreadyOwned);
        }
        row.user_id = Some(user_id);
        row.updated_at = Utc::now();
        Ok(ClaimOutcome::Claimed(row.clone()))
    }

    async fn create_conversation(
        &self,
        user_id: Uuid,
        conversation: NewConversation,
    ) -> StoreResult<ConversationRow> {
        let mut tables = self.tables.lock().unwrap();
        let row = ConversationRow {
            id: Uuid::new_v4(),
            user_id,
            profile_id: conversation.profile_id,
            kind: conversation.kind,
            title: conversation.title,
            content: conversation.content,
            created_at: Utc::now(),
        };
        tables.conversations.push(row.clone());
        Ok(row)
    }

    async fn list_conversations(
        &self,
        user_id: Uuid,
        profile_id: Option<Uuid>,
    ) -> StoreResult<Vec<ConversationRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .conversations
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .filter(|c| profile_id.map_or(true, |p| c.profile_id == p))
            .cloned()
            .collect())
    }

    async fn get_conversation(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<ConversationRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .conversations
            .iter()
            .find(|c| c.id == id && c.user_id == user_id)
            .cloned())
    }

    async fn delete_conversation(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.conversations.len();
        tables
            .conversations
            .retain(|c| !(c.id == id && c.user_id == user_id));
        Ok(tables.conversations.len() < before)
    }

    async fn create_prompt_template(
        &self,
        user_id: Uuid,
        template: NewPromptTemplate,
    ) -> StoreResult<PromptTemplateRow> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let row = PromptTemplateRow {
            id: Uuid::new_v4(),
            user_id,
            name: template.name,
            tool: template.tool.as_str().to_string(),
            template: template.template,
            created_at: now,
            updated_at: now,
        };
        tables.prompts.push(row.clone());
        Ok(row)
    }

    async fn list_prompt_templates(&self, user_id: Uuid) -> StoreResult<Vec<PromptTemplateRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .prompts
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_prompt_template(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<PromptTemplateRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .prompts
            .iter()
            .find(|p| p.id == id && p.user_id == user_id)
            .cloned())
    }

    async fn latest_prompt_template(
        &self,
        user_id: Uuid,
        tool: ToolKind,
    ) -> StoreResult<Option<PromptTemplateRow>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .prompts
            .iter()
            .rev()
            .find(|p| p.user_id == user_id && p.tool == tool.as_str())
            .cloned())
    }

    async fn update_prompt_template(
        &self,
        user_id: Uuid,
        id: Uuid,
        template: NewPromptTemplate,
    ) -> StoreResult<Option<PromptTemplateRow>> {
        let mut tables = self.tables.lock().unwrap();
        let Some(row) = tables
            .prompts
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
        else {
            return Ok(None);
        };
        row.name = template.name;
        row.tool = template.tool.as_str().to_string();
        row.template = template.template;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete_prompt_template(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.prompts.len();
        tables
            .prompts
            .retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(tables.prompts.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::heuristic::HeuristicAnalyzer;

    fn new_profile(url: Option<&str>, source: &str) -> NewProfile {
        NewProfile {
            name: "Ada".to_string(),
            email: None,
            linkedin_url: url.map(String::from),
            headline: None,
            data_sources: vec![source.to_string()],
            raw_text: "Analytical engineer".to_string(),
            analysis: HeuristicAnalyzer::default().analyze("Analytical engineer"),
            analysis_source: "heuristic".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upsert_same_owner_and_url_updates_in_place() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let url = Some("https://linkedin.com/in/ada");

        let first = store
            .upsert_profile(Owner::User(user), new_profile(url, "linkedin"))
            .await
            .unwrap();
        let second = store
            .upsert_profile(Owner::User(user), new_profile(url, "manual"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.profile_count(), 1);
        assert_eq!(second.data_sources, vec!["linkedin", "manual"]);
    }

    #[tokio::test]
    async fn test_upsert_is_scoped_by_owner() {
        let store = MemoryStore::new();
        let url = Some("https://linkedin.com/in/ada");
        store
            .upsert_profile(Owner::User(Uuid::new_v4()), new_profile(url, "linkedin"))
            .await
            .unwrap();
        store
            .upsert_profile(Owner::Service, new_profile(url, "linkedin"))
            .await
            .unwrap();
        assert_eq!(store.profile_count(), 2);
    }

    #[tokio::test]
    async fn test_claim_only_succeeds_once() {
        let store = MemoryStore::new();
        let row = store
            .upsert_profile(Owner::Service, new_profile(None, "linkedin"))
            .await
            .unwrap();
        let alice = Uuid::new_v4();

        assert!(matches!(
            store.claim_profile(alice, row.id).await.unwrap(),
            ClaimOutcome::Claimed(_)
        ));
        assert!(matches!(
            store.claim_profile(Uuid::new_v4(), row.id).await.unwrap(),
            ClaimOutcome::AlreadyOwned
        ));
        assert!(matches!(
            store.claim_profile(alice, Uuid::new_v4()).await.unwrap(),
            ClaimOutcome::NotFound
        ));
        assert!(store.get_profile(alice, row.id).await.unwrap().is_some());
    }
}
