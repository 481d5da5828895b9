//! Report submission routes.

use armlink_core::Submission;
use armlink_domain::{ArmLinkError, CaseId, ReportKind, SubmissionReceipt, SubmissionState};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::context::AppContext;
use crate::error::{ApiError, ApiResult};
use crate::session::Authenticated;

#[derive(Debug, Deserialize)]
pub struct CaseQuery {
    /// Case record id.
    q: Option<String>,
}

/// `GET /query?q=<case id>`: client-level report.
pub async fn submit_client_profile(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    Query(query): Query<CaseQuery>,
) -> ApiResult<Json<SubmissionReceipt>> {
    submit(&ctx, &auth, query, ReportKind::ClientProfile).await
}

/// `GET /query-summary?q=<case id>`: Form 9902 summary report.
pub async fn submit_form_9902(
    State(ctx): State<AppContext>,
    auth: Authenticated,
    Query(query): Query<CaseQuery>,
) -> ApiResult<Json<SubmissionReceipt>> {
    submit(&ctx, &auth, query, ReportKind::Form9902).await
}

async fn submit(
    ctx: &AppContext,
    auth: &Authenticated,
    query: CaseQuery,
    kind: ReportKind,
) -> ApiResult<Json<SubmissionReceipt>> {
    let raw = query.q.filter(|q| !q.trim().is_empty()).ok_or(ApiError::MissingQuery)?;
    let case_id = CaseId::parse(&raw)?;

    let crm = ctx.connector.connect(&auth.crm);
    // the monitor keeps running after the response is sent
    let Submission { receipt, .. } = ctx.submissions.submit(crm, kind, case_id).await?;

    info!(kind = %kind, submission_id = %receipt.submission_id, "Report submitted");
    Ok(Json(receipt))
}

/// `GET /submissions/{id}`: tracked state of a submission.
pub async fn submission_status(
    State(ctx): State<AppContext>,
    _auth: Authenticated,
    Path(submission_id): Path<String>,
) -> ApiResult<Json<SubmissionState>> {
    ctx.submissions
        .registry()
        .get(&submission_id)
        .map(Json)
        .ok_or_else(|| ArmLinkError::NotFound(format!("submission {submission_id}")).into())
}
