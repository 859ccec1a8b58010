use axum::{
    Json,
    extract::{Multipart, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use crate::error::{ApiMessage, GatewayError};
use crate::router::GatewayState;
use crate::service::registry::{UploadRequest, UploadedFile};
use crate::types::requests::DbNameParams;

/// POST /database/create
pub async fn create(
    State(state): State<GatewayState>,
    WithRejection(Json(req), _): WithRejection<Json<DbNameParams>, GatewayError>,
) -> Result<Json<ApiMessage>, GatewayError> {
    let db_name = req.db_name.unwrap_or_default();
    state.registry.create(&db_name).await?;
    Ok(Json(ApiMessage::new(format!(
        "Database {db_name} created successfully"
    ))))
}

/// GET /database/download -> the database file zipped as `{db_name}.zip`.
pub async fn download(
    State(state): State<GatewayState>,
    WithRejection(Query(params), _): WithRejection<Query<DbNameParams>, GatewayError>,
) -> Result<impl IntoResponse, GatewayError> {
    let db_name = params.db_name.unwrap_or_default();
    let archive = state.registry.download(&db_name).await?;

    let disposition = format!("attachment; filename=\"{db_name}.zip\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    ))
}

/// POST /database/upload (multipart: `file`, `db_name`, `force`)
pub async fn upload(
    State(state): State<GatewayState>,
    WithRejection(multipart, _): WithRejection<Multipart, GatewayError>,
) -> Result<(StatusCode, Json<ApiMessage>), GatewayError> {
    let req = accept_upload(multipart).await?;
    let db_name = req.db_name.clone().unwrap_or_default();
    state.registry.upload(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiMessage::new(format!(
            "Database {db_name} uploaded successfully"
        ))),
    ))
}

/// Read every multipart field into memory. Unknown fields are skipped.
async fn accept_upload(mut multipart: Multipart) -> Result<UploadRequest, GatewayError> {
    let mut req = UploadRequest::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?.to_vec();
                req.file = Some(UploadedFile { filename, bytes });
            }
            "db_name" => req.db_name = Some(field.text().await?),
            "force" => req.force = field.text().await?.eq_ignore_ascii_case("true"),
            _ => {}
        }
    }
    Ok(req)
}
