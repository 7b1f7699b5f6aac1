//! ReliveApi - typed access to the backend endpoints.

use relive_core::family::{ConnectCode, PatientSummary, normalize_connect_code};
use relive_core::http::{HttpResponse, HttpTransport, RequestSpec};
use relive_core::media::{AssetKind, MediaAsset};
use relive_core::memory::{MemoryDetail, MemoryFields, MemoryId, MemoryNavigation, MemoryRecord};
use relive_core::session::AuthTokens;
use relive_core::user::{Role, UserProfile};
use relive_core::{ReliveError, Result};
use std::sync::Arc;

use crate::authenticated_client::AuthenticatedRequestClient;
use crate::dto::{ConnectResponse, LoginRequest, RegisterRequest, TokenPairResponse};
use crate::routes;
use crate::token_lifecycle::TokenLifecycleManager;

/// Endpoint wrapper shared by the application services.
///
/// Login and registration go straight to the transport; everything else goes
/// through the [`AuthenticatedRequestClient`].
#[derive(Clone)]
pub struct ReliveApi {
    transport: Arc<dyn HttpTransport>,
    client: AuthenticatedRequestClient,
}

impl ReliveApi {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: Arc<TokenLifecycleManager>) -> Self {
        let client = AuthenticatedRequestClient::new(transport.clone(), tokens);
        Self { transport, client }
    }

    pub fn client(&self) -> &AuthenticatedRequestClient {
        &self.client
    }

    pub fn tokens(&self) -> &Arc<TokenLifecycleManager> {
        self.client.tokens()
    }

    async fn anonymous(&self, spec: RequestSpec) -> Result<HttpResponse> {
        let response = self.transport.execute(spec.anonymous()).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ReliveError::request_failed(response.status, response.body))
        }
    }

    /// `POST /auth/login/`; returns the issued token pair without storing it.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let response = self
            .anonymous(routes::login(&LoginRequest { email, password }))
            .await?;
        let pair: TokenPairResponse = response.json()?;
        Ok(pair.into_tokens(""))
    }

    /// `POST /auth/register/`; returns the issued token pair without storing it.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AuthTokens> {
        let response = self
            .anonymous(routes::register(&RegisterRequest {
                username,
                email,
                password,
                role,
            }))
            .await?;
        let pair: TokenPairResponse = response.json()?;
        Ok(pair.into_tokens(""))
    }

    pub async fn current_user(&self) -> Result<UserProfile> {
        self.client.request_json(routes::current_user()).await
    }

    pub async fn list_memories(&self) -> Result<Vec<MemoryRecord>> {
        self.client.request_json(routes::list_memories()).await
    }

    pub async fn memory_detail(&self, id: MemoryId) -> Result<MemoryDetail> {
        self.client.request_json(routes::memory_detail(id)).await
    }

    /// Neighbouring memories. Best-effort: `None` on any failure.
    pub async fn memory_navigation(&self, id: MemoryId) -> Option<MemoryNavigation> {
        self.client
            .request_optional(routes::memory_navigation(id))
            .await
    }

    pub async fn create_memory(
        &self,
        fields: &MemoryFields,
        patient_id: Option<u64>,
        inline_image: Option<&MediaAsset>,
    ) -> Result<MemoryRecord> {
        self.client
            .request_json(routes::create_memory(fields, patient_id, inline_image))
            .await
    }

    pub async fn update_memory(&self, id: MemoryId, fields: &MemoryFields) -> Result<MemoryRecord> {
        self.client
            .request_json(routes::update_memory(id, fields))
            .await
    }

    pub async fn upload_asset(&self, memory_id: MemoryId, asset: &MediaAsset) -> Result<()> {
        self.client
            .request(routes::upload_asset(memory_id, asset))
            .await?;
        Ok(())
    }

    /// Deletes one stored image, video or recording by its server id.
    pub async fn delete_asset(&self, kind: AssetKind, server_id: u64) -> Result<()> {
        self.client
            .request(routes::delete_asset(kind, server_id))
            .await?;
        Ok(())
    }

    pub async fn like_memory(&self, id: MemoryId) -> Result<()> {
        self.client.request(routes::like_memory(id)).await?;
        Ok(())
    }

    pub async fn unlike_memory(&self, id: MemoryId) -> Result<()> {
        self.client.request(routes::unlike_memory(id)).await?;
        Ok(())
    }

    pub async fn delete_memory(&self, id: MemoryId) -> Result<()> {
        self.client.request(routes::delete_memory(id)).await?;
        Ok(())
    }

    /// Patients a family member may create memories for.
    pub async fn my_patients(&self) -> Result<Vec<PatientSummary>> {
        self.client.request_json(routes::my_patients()).await
    }

    /// Links the family member to the patient who issued `code`.
    ///
    /// # Returns
    ///
    /// - `Ok(patient)`: The newly linked patient
    /// - `Err(InvalidDraft)`: The code is blank, nothing was sent
    /// - `Err(RequestFailed)`: The code is unknown or expired (400), or the user is not a family member (403)
    pub async fn connect_with_code(&self, code: &str) -> Result<PatientSummary> {
        let code = normalize_connect_code(code)?;
        let response: ConnectResponse = self
            .client
            .request_json(routes::connect_with_code(&code))
            .await?;
        let patient = response.into_patient();
        tracing::info!("[ReliveApi] Linked to patient {}", patient.username);
        Ok(patient)
    }

    /// The patient's current connect code, `None` when none is active.
    pub async fn active_connect_code(&self) -> Result<Option<ConnectCode>> {
        match self.client.request_json(routes::active_connect_code()).await {
            Ok(code) => Ok(Some(code)),
            Err(e) if e.status() == Some(404) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Issues a fresh connect code, replacing any previous one.
    pub async fn create_connect_code(&self) -> Result<ConnectCode> {
        self.client
            .request_json(routes::create_connect_code())
            .await
    }

    pub async fn revoke_connect_code(&self) -> Result<()> {
        self.client
            .request(routes::revoke_connect_code())
            .await?;
        Ok(())
    }
}
