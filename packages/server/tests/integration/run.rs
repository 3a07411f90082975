use serde_json::json;

use crate::common::{TestApp, routes};

mod scheduling {
    use super::*;

    #[tokio::test]
    async fn run_defaults_to_the_first_device_pool() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let app_id = app.create_uploaded_app(&token, id).await.id();
        let pools = app.get_with_token(&routes::device_pools(id), &token).await;

        let res = app.create_run(&token, id, app_id).await;

        assert_eq!(res.body["status"], "pending");
        assert_eq!(res.body["app_id"], app_id);
        assert!(res.body["run_arn"].is_string());
        assert_eq!(res.body["device_pool_arn"], pools.body[0]["arn"]);
    }

    #[tokio::test]
    async fn app_without_confirmed_upload_cannot_be_scheduled() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let bare = app
            .post_with_token(
                routes::APPS,
                &json!({"project_id": id, "name": "Shop", "app_type": "android"}),
                &token,
            )
            .await;

        let res = app
            .post_with_token(
                routes::RUNS,
                &json!({"project_id": id, "app_id": bare.id(), "name": "Nightly"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.farm.calls("ScheduleRun").await, 0);
    }

    #[tokio::test]
    async fn device_pool_of_another_project_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let (other, _) = app.create_linked_project(&token, "Other").await;
        let app_id = app.create_uploaded_app(&token, id).await.id();
        let foreign = app.get_with_token(&routes::device_pools(other), &token).await;

        let res = app
            .post_with_token(
                routes::RUNS,
                &json!({
                    "project_id": id,
                    "app_id": app_id,
                    "name": "Nightly",
                    "device_pool_arn": foreign.body[0]["arn"],
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn sync_maps_the_vendor_run_and_keeps_its_snapshot() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let app_id = app.create_uploaded_app(&token, id).await.id();
        let run = app.create_run(&token, id, app_id).await;
        let run_arn = run.body["run_arn"].as_str().unwrap();

        assert!(app.farm.set_run_state(run_arn, "RUNNING", None).await);
        let running = app
            .post_with_token(&routes::run_sync(run.id()), &json!({}), &token)
            .await;
        assert_eq!(running.status, 200, "{}", running.text);
        assert_eq!(running.body["status"], "running");

        assert!(app.farm.set_run_state(run_arn, "COMPLETED", Some("PASSED")).await);
        let done = app
            .post_with_token(&routes::run_sync(run.id()), &json!({}), &token)
            .await;
        assert_eq!(done.body["status"], "completed");
        assert_eq!(done.body["result"]["result"], "PASSED");
        assert_eq!(done.body["result"]["arn"], run_arn);
    }

    #[tokio::test]
    async fn stopping_a_run_cancels_it_once() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let app_id = app.create_uploaded_app(&token, id).await.id();
        let run_id = app.create_run(&token, id, app_id).await.id();

        let stopped = app
            .post_with_token(&routes::run_stop(run_id), &json!({}), &token)
            .await;
        assert_eq!(stopped.status, 200, "{}", stopped.text);
        assert_eq!(stopped.body["status"], "cancelled");
        assert_eq!(app.farm.calls("StopRun").await, 1);

        let again = app
            .post_with_token(&routes::run_stop(run_id), &json!({}), &token)
            .await;
        assert_eq!(again.status, 400);
        assert_eq!(app.farm.calls("StopRun").await, 1);
    }

    #[tokio::test]
    async fn artifacts_appear_once_the_run_completed() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let app_id = app.create_uploaded_app(&token, id).await.id();
        let run = app.create_run(&token, id, app_id).await;
        let run_arn = run.body["run_arn"].as_str().unwrap();

        let early = app
            .get_with_token(&routes::run_artifacts(run.id(), "LOG"), &token)
            .await;
        assert_eq!(early.status, 200, "{}", early.text);
        assert_eq!(early.body.as_array().unwrap().len(), 0);

        app.farm.set_run_state(run_arn, "COMPLETED", Some("FAILED")).await;
        let logs = app
            .get_with_token(&routes::run_artifacts(run.id(), "LOG"), &token)
            .await;
        let logs = logs.body.as_array().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0]["extension"], "txt");

        let invalid = app
            .get_with_token(&routes::run_artifacts(run.id(), "VIDEO"), &token)
            .await;
        assert_eq!(invalid.status, 400);
    }

    #[tokio::test]
    async fn other_users_cannot_see_or_stop_a_run() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password1").await;
        let bob = app.create_authenticated_user("bob", "password1").await;
        let (id, _) = app.create_linked_project(&alice, "Shop").await;
        let app_id = app.create_uploaded_app(&alice, id).await.id();
        let run_id = app.create_run(&alice, id, app_id).await.id();

        assert_eq!(app.get_with_token(&routes::run(run_id), &bob).await.status, 404);
        let stop = app
            .post_with_token(&routes::run_stop(run_id), &json!({}), &bob)
            .await;
        assert_eq!(stop.status, 404);
        assert_eq!(app.get_with_token(&routes::runs(id), &bob).await.status, 404);
    }
}
