use devicefarm::DeviceFarm;
use devicefarm::memory::{ANDROID_DEVICE_ARN, IOS_DEVICE_ARN};
use sea_orm::ConnectionTrait;

use crate::common::{TestApp, routes};

mod project_deletion {
    use super::*;

    #[tokio::test]
    async fn live_sessions_are_stopped_before_the_project_is_deleted() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, project_arn) = app.create_linked_project(&token, "Shop").await;
        let first = app.start_session(&token, id, ANDROID_DEVICE_ARN).await;
        let second = app.start_session(&token, id, IOS_DEVICE_ARN).await;

        let res = app.delete_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 204, "{}", res.text);
        assert_eq!(app.farm.calls("StopRemoteAccessSession").await, 2);
        assert!(!app.farm.project_arns().await.contains(&project_arn));
        assert!(app.farm.session(&first).await.is_none());
        assert!(app.farm.session(&second).await.is_none());
    }

    #[tokio::test]
    async fn completed_sessions_are_not_stopped_again() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let arn = app.start_session(&token, id, ANDROID_DEVICE_ARN).await;
        app.delete_with_token(&routes::session(&arn), &token).await;

        let res = app.delete_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 204, "{}", res.text);
        assert_eq!(app.farm.calls("StopRemoteAccessSession").await, 1);
    }

    #[tokio::test]
    async fn failed_stop_leaves_the_project_in_place() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, project_arn) = app.create_linked_project(&token, "Shop").await;
        app.start_session(&token, id, ANDROID_DEVICE_ARN).await;
        app.farm
            .fail("StopRemoteAccessSession", "ServiceUnavailable")
            .await;

        let res = app.delete_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "UPSTREAM_ERROR");
        assert!(app.farm.project_arns().await.contains(&project_arn));
        assert_eq!(app.get_with_token(&routes::project(id), &token).await.status, 200);
    }

    #[tokio::test]
    async fn lost_stop_response_does_not_block_deletion() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, project_arn) = app.create_linked_project(&token, "Shop").await;
        app.start_session(&token, id, ANDROID_DEVICE_ARN).await;
        app.farm
            .fail_after_effect("StopRemoteAccessSession", "ServiceException: timed out")
            .await;

        let res = app.delete_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 204, "{}", res.text);
        assert_eq!(app.farm.calls("StopRemoteAccessSession").await, 1);
        assert!(!app.farm.project_arns().await.contains(&project_arn));
        assert_eq!(app.get_with_token(&routes::project(id), &token).await.status, 404);
    }

    #[tokio::test]
    async fn project_already_gone_from_the_device_farm_is_deleted_locally() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, project_arn) = app.create_linked_project(&token, "Shop").await;
        let app_id = app.create_uploaded_app(&token, id).await.id();
        app.farm.delete_project(&project_arn).await.unwrap();

        let res = app.delete_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 204, "{}", res.text);
        assert_eq!(app.get_with_token(&routes::project(id), &token).await.status, 404);
        assert_eq!(app.get_with_token(&routes::app(app_id), &token).await.status, 404);
    }

    #[tokio::test]
    async fn local_failure_after_vendor_deletion_is_a_persistence_error() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, project_arn) = app.create_linked_project(&token, "Shop").await;
        app.db.execute_unprepared("DROP TABLE run").await.unwrap();

        let res = app.delete_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 500, "{}", res.text);
        assert_eq!(res.body["code"], "PERSISTENCE_ERROR");
        assert!(!app.farm.project_arns().await.contains(&project_arn));
    }

    #[tokio::test]
    async fn session_listing_failure_does_not_block_deletion() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, project_arn) = app.create_linked_project(&token, "Shop").await;
        app.farm
            .fail("ListRemoteAccessSessions", "ThrottlingException")
            .await;

        let res = app.delete_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 204, "{}", res.text);
        assert!(!app.farm.project_arns().await.contains(&project_arn));
    }
}

mod account_reset {
    use super::*;

    #[tokio::test]
    async fn reset_without_failures_removes_every_project() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (first, _) = app.create_linked_project(&token, "First").await;
        let (second, _) = app.create_linked_project(&token, "Second").await;
        let app_id = app.create_uploaded_app(&token, second).await.id();
        app.start_session(&token, first, ANDROID_DEVICE_ARN).await;

        let res = app.delete_with_token(routes::RESET, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["projects_deleted"], serde_json::json!([first, second]));
        assert_eq!(res.body["projects_failed"], serde_json::json!([]));
        assert_eq!(app.get_with_token(routes::PROJECTS, &token).await.body, serde_json::json!([]));
        assert_eq!(app.get_with_token(&routes::app(app_id), &token).await.status, 404);
        assert!(app.farm.project_arns().await.is_empty());
    }

    #[tokio::test]
    async fn one_failed_teardown_does_not_stop_the_others() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (first, _) = app.create_linked_project(&token, "First").await;
        let (stuck, stuck_arn) = app.create_linked_project(&token, "Stuck").await;
        let (third, _) = app.create_linked_project(&token, "Third").await;
        let stuck_app = app.create_uploaded_app(&token, stuck).await.id();
        app.farm
            .fail_for_project("DeleteProject", &stuck_arn, "LimitExceededException: busy")
            .await;

        let res = app.delete_with_token(routes::RESET, &token).await;

        assert_eq!(res.status, 207, "{}", res.text);
        assert_eq!(res.body["projects_deleted"], serde_json::json!([first, third]));
        let failed = res.body["projects_failed"].as_array().unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0]["id"], stuck);
        assert_eq!(failed[0]["name"], "Stuck");
        assert_eq!(failed[0]["error"], "LimitExceededException: busy");

        let remaining = app.get_with_token(routes::PROJECTS, &token).await;
        let remaining = remaining.body.as_array().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["id"], stuck);
        assert_eq!(app.get_with_token(&routes::app(stuck_app), &token).await.status, 200);
        assert_eq!(app.farm.project_arns().await, vec![stuck_arn]);
    }

    #[tokio::test]
    async fn failed_session_stop_only_keeps_its_own_project() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (busy, busy_arn) = app.create_linked_project(&token, "Busy").await;
        let (idle, _) = app.create_linked_project(&token, "Idle").await;
        app.start_session(&token, busy, ANDROID_DEVICE_ARN).await;
        app.start_session(&token, idle, IOS_DEVICE_ARN).await;
        app.farm
            .fail_for_project("StopRemoteAccessSession", &busy_arn, "ServiceUnavailable")
            .await;

        let res = app.delete_with_token(routes::RESET, &token).await;

        assert_eq!(res.status, 207, "{}", res.text);
        assert_eq!(res.body["projects_deleted"], serde_json::json!([idle]));
        let failed = res.body["projects_failed"].as_array().unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0]["id"], busy);
        assert!(failed[0]["error"].as_str().unwrap().contains("not completed"));
        assert_eq!(app.farm.project_arns().await, vec![busy_arn]);
        assert_eq!(app.get_with_token(&routes::project(busy), &token).await.status, 200);
    }

    #[tokio::test]
    async fn projects_already_gone_from_the_device_farm_count_as_deleted() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (gone, gone_arn) = app.create_linked_project(&token, "Gone").await;
        let (kept, _) = app.create_linked_project(&token, "Kept").await;
        app.farm.delete_project(&gone_arn).await.unwrap();

        let res = app.delete_with_token(routes::RESET, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["projects_deleted"], serde_json::json!([gone, kept]));
        assert_eq!(res.body["projects_failed"], serde_json::json!([]));
        assert_eq!(app.get_with_token(routes::PROJECTS, &token).await.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn unlinked_projects_are_removed_locally() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        app.farm.fail("CreateProject", "ServiceUnavailable").await;
        let offline = app.create_project(&token, "Offline").await.id();

        let res = app.delete_with_token(routes::RESET, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["projects_deleted"], serde_json::json!([offline]));
        assert_eq!(app.farm.calls("DeleteProject").await, 0);
    }

    #[tokio::test]
    async fn reset_only_touches_the_callers_projects() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password1").await;
        let bob = app.create_authenticated_user("bob", "password1").await;
        app.create_linked_project(&alice, "Mine").await;
        let (bobs, bobs_arn) = app.create_linked_project(&bob, "Theirs").await;

        let res = app.delete_with_token(routes::RESET, &alice).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(app.get_with_token(&routes::project(bobs), &bob).await.status, 200);
        assert_eq!(app.farm.project_arns().await, vec![bobs_arn]);
    }

    #[tokio::test]
    async fn reset_of_an_empty_account_reports_nothing() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;

        let res = app.delete_with_token(routes::RESET, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["projects_deleted"], serde_json::json!([]));
    }
}
