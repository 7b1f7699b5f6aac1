//! Request builders for every backend endpoint.
//!
//! Paths are relative to the API base URL and keep the backend's trailing slash.

use relive_core::http::{FilePart, MultipartForm, RequestSpec};
use relive_core::media::{AssetKind, MediaAsset};
use relive_core::memory::{MemoryFields, MemoryId};

use crate::dto::{ConnectRequest, LoginRequest, RefreshRequest, RegisterRequest};

pub const LOGIN_PATH: &str = "/auth/login/";
pub const REGISTER_PATH: &str = "/auth/register/";
pub const REFRESH_PATH: &str = "/token/refresh/";
pub const CURRENT_USER_PATH: &str = "/auth/me/";
pub const MEMORIES_PATH: &str = "/memories/";
pub const MY_PATIENTS_PATH: &str = "/family-links/my-patients/";
pub const CONNECT_PATH: &str = "/family-links/connect/";
pub const CONNECT_CODE_PATH: &str = "/family-links/code/";
pub const CREATE_CONNECT_CODE_PATH: &str = "/family-links/create-code/";

pub fn login(body: &LoginRequest<'_>) -> RequestSpec {
    RequestSpec::post(LOGIN_PATH).json(serde_json::json!(body))
}

pub fn register(body: &RegisterRequest<'_>) -> RequestSpec {
    RequestSpec::post(REGISTER_PATH).json(serde_json::json!(body))
}

pub fn refresh(refresh_token: &str) -> RequestSpec {
    RequestSpec::post(REFRESH_PATH).json(serde_json::json!(RefreshRequest {
        refresh: refresh_token
    }))
}

pub fn current_user() -> RequestSpec {
    RequestSpec::get(CURRENT_USER_PATH)
}

pub fn list_memories() -> RequestSpec {
    RequestSpec::get(MEMORIES_PATH)
}

pub fn memory_path(id: MemoryId) -> String {
    format!("/memories/{}/", id)
}

pub fn memory_detail(id: MemoryId) -> RequestSpec {
    RequestSpec::get(format!("/memories/{}/detail/", id))
}

pub fn memory_navigation(id: MemoryId) -> RequestSpec {
    RequestSpec::get(format!("/memories/{}/navigation/", id))
}

fn file_part(field: &str, asset: &MediaAsset) -> FilePart {
    FilePart {
        field: field.to_string(),
        file_name: asset.file_name.clone(),
        mime_type: asset.mime_type.clone(),
        data: asset.payload.clone(),
    }
}

fn fields_form(fields: &MemoryFields) -> MultipartForm {
    MultipartForm::new()
        .text("title", fields.title.trim())
        .text("description", fields.description.as_str())
        .text("date", fields.date.trim())
        .text("location", fields.location.as_str())
        .text("tag", fields.tag.as_str())
}

/// `POST /memories/` with the scalar fields and an optional inline image.
pub fn create_memory(
    fields: &MemoryFields,
    patient_id: Option<u64>,
    inline_image: Option<&MediaAsset>,
) -> RequestSpec {
    let mut form = fields_form(fields).text_opt("patient_id", patient_id.map(|id| id.to_string()));
    if let Some(image) = inline_image {
        form = form.file(file_part("image", image));
    }
    RequestSpec::post(MEMORIES_PATH).multipart(form)
}

/// `PUT /memories/{id}/` with the scalar fields only.
pub fn update_memory(id: MemoryId, fields: &MemoryFields) -> RequestSpec {
    RequestSpec::put(memory_path(id)).multipart(fields_form(fields))
}

/// Attaches one asset to a memory.
///
/// Images and videos carry a `caption`; recordings carry the speaker.
pub fn upload_asset(memory_id: MemoryId, asset: &MediaAsset) -> RequestSpec {
    let mut form = MultipartForm::new().file(file_part(asset.kind.upload_field(), asset));
    form = match asset.kind {
        AssetKind::Image | AssetKind::Video => form.text_opt("caption", asset.caption.clone()),
        AssetKind::Audio => {
            let speaker = asset.speaker.clone().unwrap_or_default();
            form.text("speaker_name", speaker.name)
                .text("speaker_relation", speaker.relation)
        }
    };
    RequestSpec::post(format!(
        "/memories/{}/{}/",
        memory_id,
        asset.kind.collection_segment()
    ))
    .multipart(form)
}

pub fn delete_asset(kind: AssetKind, server_id: u64) -> RequestSpec {
    RequestSpec::delete(format!("/{}/{}/", kind.resource_segment(), server_id))
}

pub fn like_memory(id: MemoryId) -> RequestSpec {
    RequestSpec::post(format!("/memories/{}/like/", id))
}

pub fn unlike_memory(id: MemoryId) -> RequestSpec {
    RequestSpec::delete(format!("/memories/{}/like/", id))
}

pub fn delete_memory(id: MemoryId) -> RequestSpec {
    RequestSpec::delete(memory_path(id))
}

pub fn my_patients() -> RequestSpec {
    RequestSpec::get(MY_PATIENTS_PATH)
}

pub fn connect_with_code(code: &str) -> RequestSpec {
    RequestSpec::post(CONNECT_PATH).json(serde_json::json!(ConnectRequest { code }))
}

pub fn active_connect_code() -> RequestSpec {
    RequestSpec::get(CONNECT_CODE_PATH)
}

pub fn create_connect_code() -> RequestSpec {
    RequestSpec::post(CREATE_CONNECT_CODE_PATH)
}

pub fn revoke_connect_code() -> RequestSpec {
    RequestSpec::delete(CONNECT_CODE_PATH)
}
