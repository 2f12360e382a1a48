use anyhow::Context;
use axum::{body::Bytes, extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::{
    model::{SignupForm, SignupRecord},
    web::{types::SignupSubmission, Error, WebResult},
    AppState,
};

const NOT_AN_OBJECT: &str = "request body must be a JSON object";

/// Validates a signup submission and stores it as a new entity.
///
/// Ensures the table exists, then inserts. The table client remembers a successful ensure-table,
/// so only the first request of a process pays for both calls.
/// Nothing is retried, a failed write is reported to the client as a 500.
#[tracing::instrument(name = "Capturing a signup submission", skip(app_state, body))]
pub async fn submit_interest(
    State(app_state): State<AppState>,
    body: Bytes,
) -> WebResult<Json<Value>> {
    let submission = parse_submission(&body)?;

    let form = SignupForm::from(submission);
    form.validate_fields().map_err(Error::InvalidSubmission)?;

    let record = SignupRecord::new(form, Utc::now());
    tracing::debug!(
        partition_key = %record.partition_key,
        row_key = %record.row_key,
        source = %record.source,
        "New signup received"
    );

    let store = &app_state.store;
    store.ensure_table().await?;
    store.insert_entity(&record).await?;

    info!(
        table = store.table_name(),
        partition_key = %record.partition_key,
        "Signup saved"
    );

    Ok(Json(json!({ "ok": true })))
}

/// Anything that is not a JSON object is rejected as invalid input.
fn parse_submission(body: &[u8]) -> WebResult<SignupSubmission> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| Error::InvalidSubmission(vec![NOT_AN_OBJECT.to_string()]))?;
    if !value.is_object() {
        return Err(Error::InvalidSubmission(vec![NOT_AN_OBJECT.to_string()]));
    }

    let submission = serde_json::from_value(value).context("deserializing signup submission")?;
    Ok(submission)
}
