use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;

use crate::error::{ApiMessage, GatewayError};
use crate::router::GatewayState;
use crate::service::sql::RawSql;
use crate::types::requests::{CreateTableRequest, DbNameParams};

type DbQuery = WithRejection<Query<DbNameParams>, GatewayError>;
type TablePath = WithRejection<Path<RawSql>, GatewayError>;

/// GET /tables
pub async fn list_tables(
    State(state): State<GatewayState>,
    WithRejection(Query(params), _): DbQuery,
) -> Result<Json<Vec<String>>, GatewayError> {
    let tables = state.gateway.list_tables(params.db_name.as_deref()).await?;
    Ok(Json(tables))
}

/// GET /table/{table}/columns
pub async fn list_columns(
    State(state): State<GatewayState>,
    WithRejection(Path(table), _): TablePath,
    WithRejection(Query(params), _): DbQuery,
) -> Result<Json<Vec<String>>, GatewayError> {
    let columns = state
        .gateway
        .list_columns(params.db_name.as_deref(), &table)
        .await?;
    Ok(Json(columns))
}

/// POST /table
pub async fn create_table(
    State(state): State<GatewayState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateTableRequest>, GatewayError>,
) -> Result<Json<ApiMessage>, GatewayError> {
    state
        .gateway
        .create_table(
            req.db_name.as_deref(),
            req.table_name.as_ref(),
            req.columns.as_ref(),
        )
        .await?;
    let table = req.table_name.unwrap_or_default();
    Ok(Json(ApiMessage::new(format!(
        "Table {table} created successfully"
    ))))
}

/// DELETE /table/{table}
pub async fn delete_table(
    State(state): State<GatewayState>,
    WithRejection(Path(table), _): TablePath,
    WithRejection(Query(params), _): DbQuery,
) -> Result<Json<ApiMessage>, GatewayError> {
    state
        .gateway
        .delete_table(params.db_name.as_deref(), &table)
        .await?;
    Ok(Json(ApiMessage::new(format!(
        "Table {table} deleted successfully"
    ))))
}
