use axum::{body::Bytes, extract::{Path, State}, http::{HeaderMap, StatusCode}, Json};
use tracing::info;
use uuid::Uuid;

use service::storage::StoredBlob;

use crate::errors::JsonApiError;
use crate::routes::auth::{require_admin, ServerState};

/// Store an image for a service. The key gets a random directory so repeated
/// names do not overwrite each other; the returned URL is usable as `image`.
pub async fn upload(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<StoredBlob>), JsonApiError> {
    let session = require_admin(&state, &headers).await?;
    if body.is_empty() {
        return Err(JsonApiError::new(StatusCode::BAD_REQUEST, "Empty Upload", None));
    }
    let key = format!("{}/{}", Uuid::new_v4(), name);
    let stored = state.blobs.put(&key, body.to_vec()).await?;
    info!(%key, by = %session.email(), size = stored.size, "image_uploaded");
    Ok((StatusCode::CREATED, Json(stored)))
}
