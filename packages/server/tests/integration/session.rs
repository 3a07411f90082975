use devicefarm::memory::{ANDROID_DEVICE_ARN, ANDROID_TABLET_ARN, IOS_DEVICE_ARN, SessionStep};
use serde_json::json;

use crate::common::{TestApp, routes};

mod polling {
    use super::*;

    #[tokio::test]
    async fn polling_stops_on_the_first_running_response_with_an_endpoint() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        app.farm
            .script_session(
                ANDROID_DEVICE_ARN,
                vec![
                    SessionStep::new("PENDING"),
                    SessionStep::new("PENDING"),
                    SessionStep::new("PENDING"),
                    SessionStep::new("RUNNING").with_endpoint("wss://device.example/d1"),
                ],
            )
            .await;

        let arn = app.start_session(&token, id, ANDROID_DEVICE_ARN).await;

        let mut polls = 0;
        let last = loop {
            let res = app.get_with_token(&routes::session(&arn), &token).await;
            assert_eq!(res.status, 200, "{}", res.text);
            polls += 1;
            if res.body["done"] == true {
                break res;
            }
            assert_eq!(res.body["status"], "PENDING");
            assert!(res.body["endpoint"].is_null());
            assert_eq!(res.body["poll_after_secs"], 5);
            assert!(polls < 10, "polling never finished");
        };

        assert_eq!(polls, 4);
        assert_eq!(app.farm.calls("GetRemoteAccessSession").await, 4);
        assert_eq!(last.body["status"], "RUNNING");
        assert_eq!(last.body["endpoint"], "wss://device.example/d1");
        assert!(last.body["poll_after_secs"].is_null());
    }

    #[tokio::test]
    async fn terminal_phase_ends_polling_without_an_endpoint() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        app.farm
            .script_session(
                IOS_DEVICE_ARN,
                vec![SessionStep::new("PENDING"), SessionStep::new("ERRORED")],
            )
            .await;
        let arn = app.start_session(&token, id, IOS_DEVICE_ARN).await;

        let first = app.get_with_token(&routes::session(&arn), &token).await;
        assert_eq!(first.body["done"], false);

        let second = app.get_with_token(&routes::session(&arn), &token).await;
        assert_eq!(second.body["done"], true);
        assert_eq!(second.body["status"], "ERRORED");
        assert!(second.body["endpoint"].is_null());
    }

    #[tokio::test]
    async fn vendor_failure_while_polling_keeps_its_message() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let arn = app.start_session(&token, id, ANDROID_DEVICE_ARN).await;
        app.farm
            .fail("GetRemoteAccessSession", "ServiceException: device host unreachable")
            .await;

        let res = app.get_with_token(&routes::session(&arn), &token).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "UPSTREAM_ERROR");
        assert_eq!(res.body["error"], "ServiceException: device host unreachable");
    }

    #[tokio::test]
    async fn concurrent_polls_each_read_the_device_farm() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        app.farm
            .script_session(ANDROID_DEVICE_ARN, vec![SessionStep::new("PENDING")])
            .await;
        let arn = app.start_session(&token, id, ANDROID_DEVICE_ARN).await;
        let path = routes::session(&arn);

        let (first, second) = tokio::join!(
            app.get_with_token(&path, &token),
            app.get_with_token(&path, &token),
        );

        for res in [&first, &second] {
            assert_eq!(res.status, 200, "{}", res.text);
            assert_eq!(res.body["arn"], arn.as_str());
            assert_eq!(res.body["status"], "PENDING");
            assert_eq!(res.body["done"], false);
        }
        assert_eq!(app.farm.calls("GetRemoteAccessSession").await, 2);
    }

    #[tokio::test]
    async fn unscripted_session_is_reachable_on_the_second_poll() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let arn = app.start_session(&token, id, ANDROID_TABLET_ARN).await;

        let pending = app.get_with_token(&routes::session(&arn), &token).await;
        assert_eq!(pending.body["status"], "PENDING");
        assert_eq!(pending.body["done"], false);

        let running = app.get_with_token(&routes::session(&arn), &token).await;
        assert_eq!(running.body["status"], "RUNNING");
        assert_eq!(running.body["done"], true);
        assert!(running.body["endpoint"].is_string());
    }
}

mod start {
    use super::*;

    #[tokio::test]
    async fn new_session_is_pending_with_a_default_name() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, project_arn) = app.create_linked_project(&token, "Shop").await;

        let res = app
            .post_with_token(
                routes::SESSIONS,
                &json!({"project_id": id, "device_arn": ANDROID_DEVICE_ARN}),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["status"], "PENDING");
        assert_eq!(res.body["done"], false);
        assert!(res.body["name"].as_str().unwrap().starts_with("Session-"));
        let arn = res.body["arn"].as_str().unwrap();
        assert!(devicefarm::arn::belongs_to_project(arn, "session", &project_arn));
    }

    #[tokio::test]
    async fn missing_device_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;

        let res = app
            .post_with_token(routes::SESSIONS, &json!({"project_id": id}), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.farm.calls("CreateRemoteAccessSession").await, 0);
    }

    #[tokio::test]
    async fn vendor_rejection_is_reported_with_its_message() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        app.farm
            .fail("CreateRemoteAccessSession", "ServiceAccountException: no slots")
            .await;

        let res = app
            .post_with_token(
                routes::SESSIONS,
                &json!({"project_id": id, "device_arn": ANDROID_DEVICE_ARN}),
                &token,
            )
            .await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["code"], "UPSTREAM_ERROR");
        assert_eq!(res.body["error"], "ServiceAccountException: no slots");
    }
}

mod stop {
    use super::*;

    #[tokio::test]
    async fn stopping_twice_succeeds_both_times() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        let arn = app.start_session(&token, id, ANDROID_DEVICE_ARN).await;

        let first = app.delete_with_token(&routes::session(&arn), &token).await;
        assert_eq!(first.status, 200, "{}", first.text);
        assert_eq!(first.body["stop_accepted"], true);

        let second = app.delete_with_token(&routes::session(&arn), &token).await;
        assert_eq!(second.status, 200, "{}", second.text);
        assert_eq!(second.body["stop_accepted"], false);

        let polled = app.get_with_token(&routes::session(&arn), &token).await;
        assert_eq!(polled.body["status"], "COMPLETED");
        assert_eq!(polled.body["done"], true);
    }

    #[tokio::test]
    async fn stopping_an_unknown_session_of_an_owned_project_still_succeeds() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (_, project_arn) = app.create_linked_project(&token, "Shop").await;
        let project_id = project_arn.rsplit(':').next().unwrap();
        let arn = format!(
            "arn:aws:devicefarm:us-west-2:000000000000:session:{project_id}/gone/00000"
        );

        let res = app.delete_with_token(&routes::session(&arn), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["stop_accepted"], false);
    }
}

mod ownership {
    use super::*;

    #[tokio::test]
    async fn other_users_cannot_poll_stop_or_list_sessions() {
        let app = TestApp::spawn().await;
        let alice = app.create_authenticated_user("alice", "password1").await;
        let bob = app.create_authenticated_user("bob", "password1").await;
        let (id, _) = app.create_linked_project(&alice, "Shop").await;
        let arn = app.start_session(&alice, id, ANDROID_DEVICE_ARN).await;

        let poll = app.get_with_token(&routes::session(&arn), &bob).await;
        assert_eq!(poll.status, 404);
        assert_eq!(poll.body["code"], "NOT_FOUND");

        let stop = app.delete_with_token(&routes::session(&arn), &bob).await;
        assert_eq!(stop.status, 404);
        assert_eq!(app.farm.calls("StopRemoteAccessSession").await, 0);

        let list = app.get_with_token(&routes::sessions(id), &bob).await;
        assert_eq!(list.status, 404);
        assert_eq!(app.farm.calls("GetRemoteAccessSession").await, 0);
    }

    #[tokio::test]
    async fn malformed_session_arn_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;

        let res = app
            .get_with_token(&routes::session("arn:aws:s3:::bucket"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn owner_lists_the_sessions_of_a_project() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("alice", "password1").await;
        let (id, _) = app.create_linked_project(&token, "Shop").await;
        app.start_session(&token, id, ANDROID_DEVICE_ARN).await;
        app.start_session(&token, id, IOS_DEVICE_ARN).await;

        let res = app.get_with_token(&routes::sessions(id), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body.as_array().unwrap().len(), 2);
    }
}
