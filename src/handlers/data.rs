use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use serde_json::Value;

use crate::error::GatewayError;
use crate::router::GatewayState;
use crate::service::sql::RawSql;
use crate::types::requests::{FilterParams, RowQueryParams, RowWriteRequest};
use crate::types::responses::{InsertResponse, RowsAffectedResponse};

type JsonBody<T> = WithRejection<Json<T>, GatewayError>;
type QueryParams<T> = WithRejection<Query<T>, GatewayError>;
type TablePath = WithRejection<Path<RawSql>, GatewayError>;

/// POST /data/{table}
pub async fn insert(
    State(state): State<GatewayState>,
    WithRejection(Path(table), _): TablePath,
    WithRejection(Json(req), _): JsonBody<RowWriteRequest>,
) -> Result<Json<InsertResponse>, GatewayError> {
    let last_id = state
        .gateway
        .insert_row(req.db_name.as_deref(), &table, req.data.as_ref())
        .await?;
    Ok(Json(InsertResponse {
        msg: "Data inserted successfully".to_string(),
        last_id,
    }))
}

/// GET /data/{table}?db_name=..&columns=..&query=..
pub async fn select(
    State(state): State<GatewayState>,
    WithRejection(Path(table), _): TablePath,
    WithRejection(Query(params), _): QueryParams<RowQueryParams>,
) -> Result<Json<Vec<Vec<Value>>>, GatewayError> {
    let rows = state
        .gateway
        .get_rows(
            params.db_name.as_deref(),
            &table,
            params.columns.as_ref(),
            params.query.as_ref(),
        )
        .await?;
    Ok(Json(rows))
}

/// PUT /data/{table}?query=..
pub async fn update(
    State(state): State<GatewayState>,
    WithRejection(Path(table), _): TablePath,
    WithRejection(Query(filter), _): QueryParams<FilterParams>,
    WithRejection(Json(req), _): JsonBody<RowWriteRequest>,
) -> Result<Json<RowsAffectedResponse>, GatewayError> {
    let rows_affected = state
        .gateway
        .update_rows(
            req.db_name.as_deref(),
            &table,
            req.data.as_ref(),
            filter.query.as_ref(),
        )
        .await?;
    Ok(Json(RowsAffectedResponse {
        msg: "Data updated successfully".to_string(),
        rows_affected,
    }))
}

/// DELETE /data/{table}?db_name=..&query=..
pub async fn delete(
    State(state): State<GatewayState>,
    WithRejection(Path(table), _): TablePath,
    WithRejection(Query(params), _): QueryParams<RowQueryParams>,
) -> Result<Json<RowsAffectedResponse>, GatewayError> {
    let rows_affected = state
        .gateway
        .delete_rows(params.db_name.as_deref(), &table, params.query.as_ref())
        .await?;
    Ok(Json(RowsAffectedResponse {
        msg: "Data deleted successfully".to_string(),
        rows_affected,
    }))
}
