//! Router tests driven through `tower::ServiceExt::oneshot`.

mod support;

use armlink_api::router;
use armlink_domain::ArmLinkError;
use axum::http::StatusCode;
use serde_json::Value;
use support::{
    body_text, context, get, header, signed_in, submit_response, FakeCrm, ScriptedGateway, CASE_ID,
    GOOD_CODE,
};
use tower::ServiceExt;

// ============================================================================
// Health and session guard
// ============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let app = router(context(FakeCrm::default(), ScriptedGateway::default()));

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, r#"{"ok":true}"#);
}

#[tokio::test]
async fn report_routes_require_a_session() {
    let ctx = context(FakeCrm::default(), ScriptedGateway::default());

    for uri in [format!("/query?q={CASE_ID}"), format!("/query-summary?q={CASE_ID}"), "/auth/whoami".into()] {
        let response = router(ctx.clone()).oneshot(get(&uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body_text(response).await, "No active session");
    }

    let stale = router(ctx).oneshot(get("/query?q=x", Some("armlink_sid=expired"))).await.unwrap();
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_or_invalid_case_id_is_bad_request() {
    let ctx = context(FakeCrm::default(), ScriptedGateway::default());
    let cookie = signed_in(&ctx);

    let response = router(ctx.clone()).oneshot(get("/query", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Missing query parameter.");

    let response =
        router(ctx).oneshot(get("/query-summary?q=a0B'%20OR%20Id!=null", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Submissions
// ============================================================================

#[tokio::test]
async fn query_submits_and_tracks_the_submission() {
    let crm = FakeCrm::default();
    let ctx = context(crm.clone(), ScriptedGateway::new([Ok(submit_response("778899"))]));
    let cookie = signed_in(&ctx);

    let response =
        router(ctx.clone()).oneshot(get(&format!("/query?q={CASE_ID}"), Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let receipt: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(receipt["submissionId"], "778899");
    assert!(receipt["sentXml"].as_str().unwrap().contains("<tns:Client_ID_Num>C-1</tns:Client_ID_Num>"));
    assert_eq!(crm.updates()[0].1["ClientSubmissionID__c"], "778899");

    let response =
        router(ctx.clone()).oneshot(get("/submissions/778899", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let state: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(state["submissionId"], "778899");
    assert_eq!(state["recordId"], CASE_ID);

    let response = router(ctx).oneshot(get("/submissions/000", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reporting_failure_is_bad_gateway() {
    let gateway = ScriptedGateway::new([Err(ArmLinkError::Reporting("HTTP 503: down".into()))]);
    let ctx = context(FakeCrm::default(), gateway);
    let cookie = signed_in(&ctx);

    let response =
        router(ctx).oneshot(get(&format!("/query?q={CASE_ID}"), Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// ============================================================================
// Login flow
// ============================================================================

async fn start_login(ctx: &armlink_api::AppContext, query: &str) -> (String, String, String) {
    let response = router(ctx.clone()).oneshot(get(&format!("/auth/login{query}"), None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let location = header(&response, "location").to_string();
    let cookie = header(&response, "set-cookie").split(';').next().unwrap().to_string();
    let state = location.split("state=").nth(1).unwrap().split('&').next().unwrap().to_string();
    (location, cookie, state)
}

#[tokio::test]
async fn login_callback_whoami_logout() {
    let crm = FakeCrm::default();
    let ctx = context(crm.clone(), ScriptedGateway::default());

    let (location, cookie, state) = start_login(&ctx, "").await;
    assert!(location.starts_with("https://login.salesforce.com/services/oauth2/authorize"));
    assert!(location.contains("client_id=default-client"));
    assert!(cookie.starts_with("armlink_sid="));

    let response = router(ctx.clone())
        .oneshot(get(&format!("/auth/callback?code={GOOD_CODE}&state={state}"), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(header(&response, "location"), "/index.html");

    let response = router(ctx.clone()).oneshot(get("/auth/whoami", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("counselor@example.org"));

    let response = router(ctx.clone()).oneshot(get("/auth/logout", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(header(&response, "set-cookie").contains("Max-Age=0"));
    assert_eq!(crm.revocations(), 1);

    let response = router(ctx).oneshot(get("/auth/whoami", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_query_overrides_configured_client() {
    let ctx = context(FakeCrm::default(), ScriptedGateway::default());

    let (location, _, _) =
        start_login(&ctx, "?loginUrl=https://test.salesforce.com&consumerKey=sandbox-app").await;
    assert!(location.starts_with("https://test.salesforce.com/services/oauth2/authorize"));
    assert!(location.contains("client_id=sandbox-app"));
}

#[tokio::test]
async fn callback_rejects_missing_code_and_wrong_state() {
    let ctx = context(FakeCrm::default(), ScriptedGateway::default());
    let (_, cookie, state) = start_login(&ctx, "").await;

    let response =
        router(ctx.clone()).oneshot(get(&format!("/auth/callback?state={state}"), Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router(ctx.clone())
        .oneshot(get(&format!("/auth/callback?code={GOOD_CODE}&state=forged"), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // the challenge was consumed by the failed attempt
    let response = router(ctx)
        .oneshot(get(&format!("/auth/callback?code={GOOD_CODE}&state={state}"), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rejected_code_is_unauthorized() {
    let ctx = context(FakeCrm::default(), ScriptedGateway::default());
    let (_, cookie, state) = start_login(&ctx, "").await;

    let response = router(ctx)
        .oneshot(get(&format!("/auth/callback?code=stale&state={state}"), Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
