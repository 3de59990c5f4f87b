//! Persistence boundary. Handlers only see the `Store` trait; production uses
//! `PgStore`, tests use the in-memory implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::conversation::{ConversationRow, NewConversation};
use crate::models::profile::{NewProfile, ProfileRow};
use crate::models::prompt::{NewPromptTemplate, PromptTemplateRow, ToolKind};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

/// Who a profile row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Verified dashboard or extension user; the row is private to them.
    User(Uuid),
    /// Service-credential write from the unauthenticated extension path.
    /// Stored with a null owner until claimed.
    Service,
}

impl Owner {
    pub fn user_id(self) -> Option<Uuid> {
        match self {
            Owner::User(id) => Some(id),
            Owner::Service => None,
        }
    }
}

#[derive(Debug)]
pub enum ClaimOutcome {
    Claimed(ProfileRow),
    NotFound,
    AlreadyOwned,
}

pub type StoreResult<T> = Result<T, sqlx::Error>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Single atomic upsert keyed by (owner, linkedin_url). Rows without a
    /// LinkedIn URL are always inserted.
    async fn upsert_profile(&self, owner: Owner, profile: NewProfile) -> StoreResult<ProfileRow>;
    async fn list_profiles(&self, user_id: Uuid) -> StoreResult<Vec<ProfileRow>>;
    async fn get_profile(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<ProfileRow>>;
    async fn delete_profile(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
    /// Attaches an unowned profile to `user_id`.
    async fn claim_profile(&self, user_id: Uuid, id: Uuid) -> StoreResult<ClaimOutcome>;

    async fn create_conversation(
        &self,
        user_id: Uuid,
        conversation: NewConversation,
    ) -> StoreResult<ConversationRow>;
    async fn list_conversations(
        &self,
        user_id: Uuid,
        profile_id: Option<Uuid>,
    ) -> StoreResult<Vec<ConversationRow>>;
    async fn get_conversation(&self, user_id: Uuid, id: Uuid)
        -> StoreResult<Option<ConversationRow>>;
    async fn delete_conversation(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;

    async fn create_prompt_template(
        &self,
        user_id: Uuid,
        template: NewPromptTemplate,
    ) -> StoreResult<PromptTemplateRow>;
    async fn list_prompt_templates(&self, user_id: Uuid) -> StoreResult<Vec<PromptTemplateRow>>;
    async fn get_prompt_template(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> StoreResult<Option<PromptTemplateRow>>;
    /// Most recently updated customisation for a tool, if any.
    async fn latest_prompt_template(
        &self,
        user_id: Uuid,
        tool: ToolKind,
    ) -> StoreResult<Option<PromptTemplateRow>>;
    async fn update_prompt_template(
        &self,
        user_id: Uuid,
        id: Uuid,
        template: NewPromptTemplate,
    ) -> StoreResult<Option<PromptTemplateRow>>;
    async fn delete_prompt_template(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}
