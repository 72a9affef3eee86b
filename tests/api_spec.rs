use speculate2::speculate;

speculate! {
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use event_reminder::api::{create_router, AppState};
    use event_reminder::channels::{ChannelDirectory, ChannelSource, RawChannel};
    use event_reminder::db::{Database, TemplatePolicy};
    use event_reminder::error::UpstreamError;
    use serde_json::{json, Value};
    use std::future::Future;
    use std::sync::Arc;

    struct StaticChannels {
        fail: bool,
    }

    #[async_trait]
    impl ChannelSource for StaticChannels {
        async fn fetch_channels(&self) -> Result<Vec<RawChannel>, UpstreamError> {
            if self.fail {
                return Err(UpstreamError::Status { status: 503, body: "maintenance".into() });
            }
            let channel = |id: &str, name: &str, parent: Option<&str>, children: &[&str]| RawChannel {
                id: id.into(),
                name: name.into(),
                parent_id: parent.map(Into::into),
                archived: false,
                children: children.iter().map(|c| c.to_string()).collect(),
            };
            Ok(vec![
                channel("g", "general", None, &["r"]),
                channel("r", "random", Some("g"), &[]),
                channel("e", "events", None, &[]),
            ])
        }
    }

    fn server_with(db: Database, policy: TemplatePolicy, channels_fail: bool) -> TestServer {
        let channels = ChannelDirectory::new(Arc::new(StaticChannels { fail: channels_fail }));
        let app = create_router(AppState::new(db, channels, policy));
        TestServer::new(app).expect("Failed to start test server")
    }

    fn setup_db() -> Database {
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate");
        db
    }

    fn run<F, Fut>(test: F)
    where
        F: FnOnce(TestServer) -> Fut,
        Fut: Future<Output = ()>,
    {
        tokio_test::block_on(async move {
            let server = server_with(setup_db(), TemplatePolicy::EventDefaults, false);
            test(server).await;
        });
    }

    async fn create_event(server: &TestServer, name: &str) -> String {
        let response = server.post("/api/v1/events").json(&json!({ "name": name })).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()["id"].as_str().expect("id is a string").to_string()
    }

    async fn create_default_task(server: &TestServer, event_id: &str, name: &str, days: i64) {
        server
            .post(&format!("/api/v1/events/{event_id}/default-tasks"))
            .json(&json!({ "name": name, "daysBefore": days, "description": "" }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    async fn create_holding(server: &TestServer, event_id: &str, name: &str, date: &str) -> Value {
        let response = server
            .post("/api/v1/holdings")
            .json(&json!({
                "eventId": event_id,
                "name": name,
                "date": date,
                "channelId": "channel-1",
                "mention": "staff",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    describe "events" {
        it "creates, reads, updates and deletes an event" {
            run(|server| async move {
                let id = create_event(&server, "Hackathon").await;

                let fetched = server.get(&format!("/api/v1/events/{id}")).await;
                fetched.assert_status_ok();
                assert_eq!(fetched.json::<Value>(), json!({ "id": id, "name": "Hackathon" }));

                let updated = server
                    .put(&format!("/api/v1/events/{id}"))
                    .json(&json!({ "name": "Spring Hackathon" }))
                    .await;
                updated.assert_status_ok();
                assert_eq!(updated.json::<Value>()["name"], "Spring Hackathon");

                server.delete(&format!("/api/v1/events/{id}")).await.assert_status(StatusCode::NO_CONTENT);
                server.get(&format!("/api/v1/events/{id}")).await.assert_status_not_found();
            });
        }

        it "lists newest events first" {
            run(|server| async move {
                create_event(&server, "first").await;
                create_event(&server, "second").await;

                let events = server.get("/api/v1/events").await.json::<Vec<Value>>();
                let names: Vec<&str> = events.iter().map(|e| e["name"].as_str().unwrap()).collect();
                assert_eq!(names, vec!["second", "first"]);
            });
        }

        it "rejects a blank name with a JSON error body" {
            run(|server| async move {
                let response = server.post("/api/v1/events").json(&json!({ "name": "  " })).await;
                response.assert_status_bad_request();
                assert!(response.json::<Value>()["error"].as_str().unwrap().contains("event name"));
            });
        }

        it "rejects malformed bodies and ids as bad requests" {
            run(|server| async move {
                server
                    .post("/api/v1/events")
                    .json(&json!({ "title": "missing name" }))
                    .await
                    .assert_status_bad_request();
                server.get("/api/v1/events/not-a-number").await.assert_status_bad_request();
            });
        }

        it "returns 404 when updating an unknown event" {
            run(|server| async move {
                server
                    .put("/api/v1/events/999")
                    .json(&json!({ "name": "ghost" }))
                    .await
                    .assert_status_not_found();
            });
        }
    }

    describe "default tasks" {
        it "lists templates by lead time and edits them partially" {
            run(|server| async move {
                let event_id = create_event(&server, "Camp").await;
                create_default_task(&server, &event_id, "book venue", 30).await;
                create_default_task(&server, &event_id, "buy snacks", 2).await;

                let list = server
                    .get(&format!("/api/v1/events/{event_id}/default-tasks"))
                    .await
                    .json::<Vec<Value>>();
                assert_eq!(list.len(), 2);
                assert_eq!(list[0]["name"], "book venue");
                assert_eq!(list[0]["eventId"], event_id.as_str());

                let id = list[1]["id"].as_str().unwrap();
                let patched = server
                    .patch(&format!("/api/v1/default-tasks/{id}"))
                    .json(&json!({ "daysBefore": 3 }))
                    .await;
                patched.assert_status_ok();
                let patched = patched.json::<Value>();
                assert_eq!(patched["daysBefore"], 3);
                assert_eq!(patched["name"], "buy snacks");
            });
        }

        it "rejects negative lead times" {
            run(|server| async move {
                let event_id = create_event(&server, "Camp").await;
                server
                    .post(&format!("/api/v1/events/{event_id}/default-tasks"))
                    .json(&json!({ "name": "time travel", "daysBefore": -1 }))
                    .await
                    .assert_status_bad_request();
            });
        }

        it "rejects lead times longer than a century" {
            run(|server| async move {
                let event_id = create_event(&server, "Camp").await;
                server
                    .post(&format!("/api/v1/events/{event_id}/default-tasks"))
                    .json(&json!({ "name": "far future", "daysBefore": 4_000_000_000_i64 }))
                    .await
                    .assert_status_bad_request();
            });
        }

        it "returns 404 for templates of an unknown event" {
            run(|server| async move {
                server.get("/api/v1/events/42/default-tasks").await.assert_status_not_found();
            });
        }
    }

    describe "holdings" {
        it "seeds tasks from the event defaults on creation" {
            run(|server| async move {
                let event_id = create_event(&server, "Camp").await;
                create_default_task(&server, &event_id, "book venue", 30).await;
                create_default_task(&server, &event_id, "buy snacks", 2).await;

                let created = create_holding(&server, &event_id, "Camp 2026", "2026-08-01").await;
                assert_eq!(created["date"], "2026-08-01");
                let tasks = created["createdTasks"].as_array().unwrap();
                assert_eq!(tasks.len(), 2);
                assert!(tasks.iter().all(|t| t["reminded"] == false));

                let holding_id = created["id"].as_str().unwrap();
                let listed = server
                    .get(&format!("/api/v1/holdings/{holding_id}/tasks"))
                    .await
                    .json::<Vec<Value>>();
                assert_eq!(listed[0]["name"], "book venue");
                assert_eq!(listed[0]["remindOn"], "2026-07-02");
            });
        }

        it "copies the previous holding's tasks under the carry-forward policy" {
            tokio_test::block_on(async {
                let server = server_with(setup_db(), TemplatePolicy::CarryForward, false);
                let event_id = create_event(&server, "Camp").await;
                create_default_task(&server, &event_id, "template only", 5).await;

                let first = create_holding(&server, &event_id, "Camp 2025", "2025-08-01").await;
                let first_id = first["id"].as_str().unwrap();
                server
                    .post(&format!("/api/v1/holdings/{first_id}/tasks"))
                    .json(&json!({ "name": "rent bus", "daysBefore": 14 }))
                    .await
                    .assert_status(StatusCode::CREATED);

                let second = create_holding(&server, &event_id, "Camp 2026", "2026-08-01").await;
                let names: Vec<&str> = second["createdTasks"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|t| t["name"].as_str().unwrap())
                    .collect();
                assert_eq!(names, vec!["rent bus"]);
            });
        }

        it "filters by source event and orders by date" {
            run(|server| async move {
                let camp = create_event(&server, "Camp").await;
                let party = create_event(&server, "Party").await;
                create_holding(&server, &camp, "Camp 2025", "2025-08-01").await;
                create_holding(&server, &camp, "Camp 2026", "2026-08-01").await;
                create_holding(&server, &party, "Party 2026", "2026-12-24").await;

                let all = server.get("/api/v1/holdings").await.json::<Vec<Value>>();
                assert_eq!(all.len(), 3);
                assert_eq!(all[0]["name"], "Party 2026");

                let filtered = server
                    .get("/api/v1/holdings")
                    .add_query_param("source_event_id", &camp)
                    .await
                    .json::<Vec<Value>>();
                let names: Vec<&str> = filtered.iter().map(|h| h["name"].as_str().unwrap()).collect();
                assert_eq!(names, vec!["Camp 2026", "Camp 2025"]);

                server
                    .get("/api/v1/holdings")
                    .add_query_param("source_event_id", "camp")
                    .await
                    .assert_status_bad_request();
            });
        }

        it "falls back to the configured reminder channel" {
            tokio_test::block_on(async {
                let channels = ChannelDirectory::new(Arc::new(StaticChannels { fail: false }));
                let state = AppState::new(setup_db(), channels, TemplatePolicy::EventDefaults)
                    .with_default_channel(Some("reminders".into()));
                let server = TestServer::new(create_router(state)).expect("Failed to start test server");
                let event_id = create_event(&server, "Camp").await;

                let response = server
                    .post("/api/v1/holdings")
                    .json(&json!({ "eventId": event_id, "name": "Camp", "date": "2026-08-01", "channelId": " ", "mention": "staff" }))
                    .await;
                response.assert_status(StatusCode::CREATED);
                assert_eq!(response.json::<Value>()["channelId"], "reminders");

                let explicit = create_holding(&server, &event_id, "Camp 2", "2026-09-01").await;
                assert_eq!(explicit["channelId"], "channel-1");
            });
        }

        it "requires a channel when no reminder channel is configured" {
            run(|server| async move {
                let event_id = create_event(&server, "Camp").await;
                server
                    .post("/api/v1/holdings")
                    .json(&json!({ "eventId": event_id, "name": "Camp", "date": "2026-08-01", "mention": "staff" }))
                    .await
                    .assert_status_bad_request();
            });
        }

        it "rejects holdings with missing fields or unknown events" {
            run(|server| async move {
                let event_id = create_event(&server, "Camp").await;
                server
                    .post("/api/v1/holdings")
                    .json(&json!({ "eventId": event_id, "name": "Camp", "date": "", "channelId": "c", "mention": "m" }))
                    .await
                    .assert_status_bad_request();
                server
                    .post("/api/v1/holdings")
                    .json(&json!({ "eventId": "777", "name": "Camp", "date": "2026-01-01", "channelId": "c", "mention": "m" }))
                    .await
                    .assert_status_not_found();
            });
        }

        it "moves the holding date and recomputes reminder dates" {
            run(|server| async move {
                let event_id = create_event(&server, "Camp").await;
                create_default_task(&server, &event_id, "book venue", 10).await;
                let created = create_holding(&server, &event_id, "Camp", "2026-08-01").await;
                let id = created["id"].as_str().unwrap();

                let patched = server
                    .patch(&format!("/api/v1/holdings/{id}"))
                    .json(&json!({ "date": "2026-09-01" }))
                    .await;
                patched.assert_status_ok();
                assert_eq!(patched.json::<Value>()["mention"], "staff");

                let tasks = server.get(&format!("/api/v1/holdings/{id}/tasks")).await.json::<Vec<Value>>();
                assert_eq!(tasks[0]["remindOn"], "2026-08-22");
            });
        }

        it "deletes a holding together with its tasks" {
            run(|server| async move {
                let event_id = create_event(&server, "Camp").await;
                create_default_task(&server, &event_id, "book venue", 10).await;
                let created = create_holding(&server, &event_id, "Camp", "2026-08-01").await;
                let id = created["id"].as_str().unwrap();
                let task_id = created["createdTasks"][0]["id"].as_str().unwrap();

                server.delete(&format!("/api/v1/holdings/{id}")).await.assert_status(StatusCode::NO_CONTENT);
                server.get(&format!("/api/v1/holding-tasks/{task_id}")).await.assert_status_not_found();
            });
        }
    }

    describe "holding tasks" {
        it "creates, edits and deletes a task" {
            run(|server| async move {
                let event_id = create_event(&server, "Camp").await;
                let holding = create_holding(&server, &event_id, "Camp", "2026-08-01").await;
                let holding_id = holding["id"].as_str().unwrap();

                let created = server
                    .post(&format!("/api/v1/holdings/{holding_id}/tasks"))
                    .json(&json!({ "name": "print badges", "daysBefore": 3, "description": "A6" }))
                    .await;
                created.assert_status(StatusCode::CREATED);
                let created = created.json::<Value>();
                assert_eq!(created["remindOn"], "2026-07-29");
                assert_eq!(created["holdingId"], holding_id);
                let id = created["id"].as_str().unwrap();

                let patched = server
                    .patch(&format!("/api/v1/holding-tasks/{id}"))
                    .json(&json!({ "description": "A5" }))
                    .await
                    .json::<Value>();
                assert_eq!(patched["description"], "A5");
                assert_eq!(patched["name"], "print badges");

                server.delete(&format!("/api/v1/holding-tasks/{id}")).await.assert_status(StatusCode::NO_CONTENT);
                server.delete(&format!("/api/v1/holding-tasks/{id}")).await.assert_status_not_found();
            });
        }

        it "does not let clients set the reminded flag" {
            run(|server| async move {
                let event_id = create_event(&server, "Camp").await;
                let holding = create_holding(&server, &event_id, "Camp", "2026-08-01").await;
                let holding_id = holding["id"].as_str().unwrap();
                let created = server
                    .post(&format!("/api/v1/holdings/{holding_id}/tasks"))
                    .json(&json!({ "name": "print badges", "daysBefore": 3 }))
                    .await
                    .json::<Value>();
                let id = created["id"].as_str().unwrap();

                server
                    .patch(&format!("/api/v1/holding-tasks/{id}"))
                    .json(&json!({ "reminded": true }))
                    .await
                    .assert_status_bad_request();
            });
        }
    }

    describe "channels" {
        it "lists flattened channel paths" {
            run(|server| async move {
                let response = server.get("/api/v1/channels").await;
                response.assert_status_ok();
                assert_eq!(
                    response.json::<Value>(),
                    json!([
                        { "id": "g", "path": "general" },
                        { "id": "r", "path": "general/random" },
                        { "id": "e", "path": "events" },
                    ])
                );
            });
        }

        it "reports upstream failures as bad gateway" {
            tokio_test::block_on(async {
                let server = server_with(setup_db(), TemplatePolicy::EventDefaults, true);
                let response = server.get("/api/v1/channels").await;
                response.assert_status(StatusCode::BAD_GATEWAY);
                assert!(response.json::<Value>()["error"].is_string());
            });
        }
    }
}
