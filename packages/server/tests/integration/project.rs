use serde_json::json;

use crate::common::{TestApp, routes};

mod creation {
    use super::*;

    #[tokio::test]
    async fn new_project_is_linked_to_a_device_farm_project() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;

        let res = app.create_project(&token, "Shop").await;

        assert_eq!(res.body["name"], "Shop");
        assert_eq!(res.body["linked"], true);
        let arn = res.body["vendor_project_arn"].as_str().unwrap();
        assert!(app.farm.project_arns().await.contains(&arn.to_string()));
    }

    #[tokio::test]
    async fn vendor_outage_creates_an_unlinked_project_that_can_be_linked_later() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        app.farm.fail("CreateProject", "ServiceUnavailable").await;

        let res = app.create_project(&token, "Shop").await;
        assert_eq!(res.body["linked"], false);
        assert!(res.body["vendor_project_arn"].is_null());
        let id = res.id();

        let failed = app
            .post_with_token(&routes::project_link(id), &json!({}), &token)
            .await;
        assert_eq!(failed.status, 500);
        assert_eq!(failed.body["code"], "UPSTREAM_ERROR");

        app.farm.clear_failures().await;
        let linked = app
            .post_with_token(&routes::project_link(id), &json!({}), &token)
            .await;
        assert_eq!(linked.status, 200, "{}", linked.text);
        assert_eq!(linked.body["linked"], true);
    }

    #[tokio::test]
    async fn linking_an_already_linked_project_changes_nothing() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, arn) = app.create_linked_project(&token, "Shop").await;

        let res = app
            .post_with_token(&routes::project_link(id), &json!({}), &token)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["vendor_project_arn"], arn.as_str());
        assert_eq!(app.farm.calls("CreateProject").await, 1);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;

        let res = app
            .post_with_token(routes::PROJECTS, &json!({"name": "   "}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod unlinked {
    use super::*;

    #[tokio::test]
    async fn vendor_backed_operations_report_resource_not_linked() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        app.farm.fail("CreateProject", "ServiceUnavailable").await;
        let id = app.create_project(&token, "Shop").await.id();

        let pools = app.get_with_token(&routes::device_pools(id), &token).await;
        assert_eq!(pools.status, 400);
        assert_eq!(pools.body["code"], "RESOURCE_NOT_LINKED");

        let slot = app
            .post_with_token(
                routes::APPS,
                &json!({
                    "action": "get_upload_url",
                    "project_id": id,
                    "name": "Shop",
                    "app_type": "android",
                }),
                &token,
            )
            .await;
        assert_eq!(slot.body["code"], "RESOURCE_NOT_LINKED");

        let session = app
            .post_with_token(
                routes::SESSIONS,
                &json!({"project_id": id, "device_arn": devicefarm::memory::ANDROID_DEVICE_ARN}),
                &token,
            )
            .await;
        assert_eq!(session.body["code"], "RESOURCE_NOT_LINKED");
    }
}

mod ownership {
    use super::*;

    #[tokio::test]
    async fn other_users_cannot_see_or_delete_a_project() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password1").await;
        let bob = app.create_authenticated_user("bob", "password1").await;
        let (id, _) = app.create_linked_project(&alice, "Shop").await;

        let get = app.get_with_token(&routes::project(id), &bob).await;
        assert_eq!(get.status, 404);
        assert_eq!(get.body["code"], "NOT_FOUND");

        let delete = app.delete_with_token(&routes::project(id), &bob).await;
        assert_eq!(delete.status, 404);

        let list = app.get_with_token(routes::PROJECTS, &bob).await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);

        let still_there = app.get_with_token(&routes::project(id), &alice).await;
        assert_eq!(still_there.status, 200);
    }

    #[tokio::test]
    async fn listing_returns_only_own_projects_newest_first() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password1").await;
        let bob = app.create_authenticated_user("bob", "password1").await;
        app.create_project(&alice, "First").await;
        app.create_project(&alice, "Second").await;
        app.create_project(&bob, "Other").await;

        let res = app.get_with_token(routes::PROJECTS, &alice).await;

        let names: Vec<&str> = res
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Second", "First"]);
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn deleting_a_project_without_dependents_removes_it() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, arn) = app.create_linked_project(&token, "Empty").await;

        let res = app.delete_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 204, "{}", res.text);
        assert_eq!(app.get_with_token(&routes::project(id), &token).await.status, 404);
        assert!(!app.farm.project_arns().await.contains(&arn));
    }

    #[tokio::test]
    async fn deleting_a_project_removes_its_app_and_run() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let app_id = app.create_uploaded_app(&token, id).await.id();
        let run_id = app.create_run(&token, id, app_id).await.id();

        let res = app.delete_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 204, "{}", res.text);
        assert_eq!(app.get_with_token(&routes::app(app_id), &token).await.status, 404);
        assert_eq!(app.get_with_token(&routes::run(run_id), &token).await.status, 404);
    }

    #[tokio::test]
    async fn deleting_a_project_removes_every_dependent_but_leaves_other_projects_alone() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let (other, _) = app.create_linked_project(&token, "Other").await;

        let mut app_ids = Vec::new();
        let mut run_ids = Vec::new();
        for _ in 0..3 {
            let app_id = app.create_uploaded_app(&token, id).await.id();
            run_ids.push(app.create_run(&token, id, app_id).await.id());
            run_ids.push(app.create_run(&token, id, app_id).await.id());
            app_ids.push(app_id);
        }
        let other_app = app.create_uploaded_app(&token, other).await.id();
        let other_run = app.create_run(&token, other, other_app).await.id();

        let res = app.delete_with_token(&routes::project(id), &token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        for app_id in app_ids {
            assert_eq!(app.get_with_token(&routes::app(app_id), &token).await.status, 404);
        }
        for run_id in run_ids {
            assert_eq!(app.get_with_token(&routes::run(run_id), &token).await.status, 404);
        }
        assert_eq!(app.get_with_token(&routes::app(other_app), &token).await.status, 200);
        assert_eq!(app.get_with_token(&routes::run(other_run), &token).await.status, 200);
    }

    #[tokio::test]
    async fn deleting_an_unlinked_project_never_calls_the_device_farm() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        app.farm.fail("CreateProject", "ServiceUnavailable").await;
        let id = app.create_project(&token, "Offline").await.id();

        let res = app.delete_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 204);
        assert_eq!(app.farm.calls("DeleteProject").await, 0);
    }

    #[tokio::test]
    async fn vendor_refusal_keeps_the_local_project() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, arn) = app.create_linked_project(&token, "Shop").await;
        let app_id = app.create_uploaded_app(&token, id).await.id();
        app.farm
            .fail_for_project("DeleteProject", &arn, "LimitExceededException")
            .await;

        let res = app.delete_with_token(&routes::project(id), &token).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "UPSTREAM_ERROR");
        assert_eq!(app.get_with_token(&routes::project(id), &token).await.status, 200);
        assert_eq!(app.get_with_token(&routes::app(app_id), &token).await.status, 200);
    }
}
