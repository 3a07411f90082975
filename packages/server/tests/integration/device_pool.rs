use serde_json::json;

use crate::common::{TestApp, routes};

fn android_rule() -> serde_json::Value {
    json!([{"attribute": "PLATFORM", "operator": "EQUALS", "value": "\"ANDROID\""}])
}

#[tokio::test]
async fn linked_project_starts_with_a_curated_pool() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "password1").await;
    let (id, _) = app.create_linked_project(&token, "Shop").await;

    let res = app.get_with_token(&routes::device_pools(id), &token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let pools = res.body.as_array().unwrap();
    assert_eq!(pools.len(), 1);
    assert_eq!(pools[0]["pool_type"], "CURATED");
}

#[tokio::test]
async fn private_pool_can_be_created_renamed_and_deleted() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "password1").await;
    let (id, _) = app.create_linked_project(&token, "Shop").await;

    let created = app
        .post_with_token(
            routes::DEVICE_POOLS,
            &json!({"project_id": id, "name": "Android", "rules": android_rule()}),
            &token,
        )
        .await;
    assert_eq!(created.status, 201, "{}", created.text);
    assert_eq!(created.body["pool_type"], "PRIVATE");
    let arn = created.body["arn"].as_str().unwrap().to_string();

    let renamed = app
        .patch_with_token(
            routes::DEVICE_POOLS,
            &json!({"arn": arn, "name": "Android phones"}),
            &token,
        )
        .await;
    assert_eq!(renamed.status, 200, "{}", renamed.text);
    assert_eq!(renamed.body["name"], "Android phones");
    assert_eq!(renamed.body["rules"][0]["attribute"], "PLATFORM");

    let deleted = app.delete_with_token(&routes::device_pool(&arn), &token).await;
    assert_eq!(deleted.status, 204, "{}", deleted.text);

    let pools = app.get_with_token(&routes::device_pools(id), &token).await;
    assert_eq!(pools.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn incomplete_rule_is_rejected() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "password1").await;
    let (id, _) = app.create_linked_project(&token, "Shop").await;

    let res = app
        .post_with_token(
            routes::DEVICE_POOLS,
            &json!({
                "project_id": id,
                "name": "Broken",
                "rules": [{"attribute": "PLATFORM", "operator": "", "value": "\"IOS\""}],
            }),
            &token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn pools_of_other_users_are_not_found() {
    let app = TestApp::spawn().await;
    let alice = app.create_authenticated_user("alice", "password1").await;
    let bob = app.create_authenticated_user("bob", "password1").await;
    let (id, _) = app.create_linked_project(&alice, "Shop").await;
    let pools = app.get_with_token(&routes::device_pools(id), &alice).await;
    let arn = pools.body[0]["arn"].as_str().unwrap().to_string();

    let update = app
        .patch_with_token(routes::DEVICE_POOLS, &json!({"arn": arn, "name": "Mine"}), &bob)
        .await;
    assert_eq!(update.status, 404);

    let delete = app.delete_with_token(&routes::device_pool(&arn), &bob).await;
    assert_eq!(delete.status, 404);
    assert_eq!(app.farm.calls("DeleteDevicePool").await, 0);
}

#[tokio::test]
async fn malformed_pool_arn_is_a_validation_error() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "password1").await;

    let res = app
        .delete_with_token(&routes::device_pool("not-an-arn"), &token)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn device_catalogue_can_be_filtered_by_platform() {
    let app = TestApp::spawn().await;
    let token = app.create_authenticated_user("alice", "password1").await;

    let all = app.get_with_token(routes::DEVICES, &token).await;
    assert_eq!(all.status, 200);
    assert_eq!(all.body.as_array().unwrap().len(), 3);

    let ios = app
        .get_with_token(&format!("{}?platform=ios", routes::DEVICES), &token)
        .await;
    let ios = ios.body.as_array().unwrap();
    assert_eq!(ios.len(), 1);
    assert_eq!(ios[0]["platform"], "IOS");

    let unknown = app
        .get_with_token(&format!("{}?platform=symbian", routes::DEVICES), &token)
        .await;
    assert_eq!(unknown.status, 400);
    assert_eq!(unknown.body["code"], "VALIDATION_ERROR");
}
