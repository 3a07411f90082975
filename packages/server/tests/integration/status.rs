use crate::common::{TestApp, routes};

#[tokio::test]
async fn reachable_device_farm_reports_connected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "password1").await;

    let res = app.get_with_token(routes::VENDOR_STATUS, &token).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "connected");
    assert!(res.body.get("error").is_none());
}

#[tokio::test]
async fn unreachable_device_farm_still_answers_200() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "password1").await;
    app.farm.fail("ListProjects", "could not resolve host").await;

    let res = app.get_with_token(routes::VENDOR_STATUS, &token).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["status"], "disconnected");
    assert!(res.body["error"].as_str().unwrap().contains("could not resolve host"));
}

#[tokio::test]
async fn status_requires_a_token() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::VENDOR_STATUS).await;

    assert_eq!(res.status, 401);
}
