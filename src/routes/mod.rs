use rocket::{Route, routes};

pub mod auth;
pub mod bitacora;

/// API routes, mounted under `/api`.
pub fn api_routes() -> Vec<Route> {
    routes![
        // Session
        auth::login,
        auth::logout,

        // Activity log
        bitacora::list_entries,
        bitacora::filter_options,
        bitacora::record_entry,
    ]
}

#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use rocket::local::blocking::Client;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use crate::build_rocket;
    use crate::state::AppState;
    use crate::test_support::helpers::{create_user, test_identity, test_pool};

    fn client() -> (TempDir, Client) {
        let (dir, pool) = test_pool();
        create_user(&pool, "admin", "secreto", "admin");
        create_user(&pool, "coach1", "balon", "user");

        let mut state = AppState::new(pool, "liga-admin", 10);
        state.activity = state.activity.clone().with_identity(test_identity());

        let client = Client::tracked(build_rocket(state)).expect("valid rocket instance");
        (dir, client)
    }

    fn login(client: &Client, username: &str, password: &str) -> Status {
        client
            .post("/api/login")
            .header(ContentType::JSON)
            .body(json!({ "username": username, "password": password }).to_string())
            .dispatch()
            .status()
    }

    fn get_json(client: &Client, uri: &str) -> (Status, Value) {
        let response = client.get(uri.to_string()).dispatch();
        let status = response.status();
        let body = response.into_json::<Value>().unwrap_or(Value::Null);
        (status, body)
    }

    #[test]
    fn login_opens_and_logout_closes_a_session() {
        let (_dir, client) = client();
        assert_eq!(login(&client, "admin", "secreto"), Status::Ok);

        let (status, body) = get_json(&client, "/api/bitacora?action=LOGIN");
        assert_eq!(status, Status::Ok);
        assert_eq!(body["total_entries"], 1);
        let entry = &body["entries"][0];
        assert_eq!(entry["actor"], "admin");
        assert_eq!(entry["affected_table"], "users");
        assert_eq!(entry["source_host"], "cancha-01");
        assert!(entry["left_at"].is_null());

        let status = client.post("/api/logout").dispatch().status();
        assert_eq!(status, Status::Ok);

        // Session cookie is gone now.
        let (status, _) = get_json(&client, "/api/bitacora");
        assert_eq!(status, Status::Unauthorized);

        assert_eq!(login(&client, "admin", "secreto"), Status::Ok);
        let (_, body) = get_json(&client, "/api/bitacora?action=LOGIN&actor=admin");
        assert_eq!(body["total_entries"], 2);
        assert!(body["entries"][0]["left_at"].is_null());
        assert!(!body["entries"][1]["left_at"].is_null());
    }

    #[test]
    fn wrong_password_is_rejected_and_not_logged() {
        let (_dir, client) = client();
        assert_eq!(login(&client, "admin", "nope"), Status::Unauthorized);
        assert_eq!(login(&client, "ghost", "secreto"), Status::Unauthorized);
        assert_eq!(login(&client, "", ""), Status::BadRequest);

        assert_eq!(login(&client, "admin", "secreto"), Status::Ok);
        let (_, body) = get_json(&client, "/api/bitacora");
        assert_eq!(body["total_entries"], 1);
    }

    #[test]
    fn listing_requires_an_admin() {
        let (_dir, client) = client();
        let (status, _) = get_json(&client, "/api/bitacora");
        assert_eq!(status, Status::Unauthorized);

        assert_eq!(login(&client, "coach1", "balon"), Status::Ok);
        let (status, body) = get_json(&client, "/api/bitacora");
        assert_eq!(status, Status::Forbidden);
        assert!(body["error"].is_string());

        let (status, _) = get_json(&client, "/api/bitacora/filters");
        assert_eq!(status, Status::Forbidden);
    }

    #[test]
    fn recorded_actions_are_attributed_to_the_session_user() {
        let (_dir, client) = client();
        assert_eq!(login(&client, "coach1", "balon"), Status::Ok);

        for n in 1..=3 {
            let status = client
                .post("/api/bitacora")
                .header(ContentType::JSON)
                .body(
                    json!({
                        "table": "players",
                        "action": "INSERT",
                        "description": format!("Added player {n}"),
                    })
                    .to_string(),
                )
                .dispatch()
                .status();
            assert_eq!(status, Status::Accepted);
        }
        // A blank tag is dropped but still acknowledged.
        let status = client
            .post("/api/bitacora")
            .header(ContentType::JSON)
            .body(json!({ "table": "", "action": "DELETE" }).to_string())
            .dispatch()
            .status();
        assert_eq!(status, Status::Accepted);

        client.post("/api/logout").dispatch();
        assert_eq!(login(&client, "admin", "secreto"), Status::Ok);

        let (status, body) = get_json(&client, "/api/bitacora?actor=coach1&table=players&per_page=2&page=2");
        assert_eq!(status, Status::Ok);
        assert_eq!(body["total_entries"], 3);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["page"], 2);
        assert_eq!(body["entries"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["entries"][0]["description"], "Added player 1");
        assert_eq!(body["entries"][0]["client_label"], "liga-admin");

        let (_, options) = get_json(&client, "/api/bitacora/filters");
        assert_eq!(options["actors"], json!(["admin", "coach1"]));
        assert_eq!(options["tables"], json!(["players", "users"]));
    }

    #[test]
    fn bad_dates_are_a_client_error() {
        let (_dir, client) = client();
        assert_eq!(login(&client, "admin", "secreto"), Status::Ok);

        let (status, body) = get_json(&client, "/api/bitacora?from=10/05/2025");
        assert_eq!(status, Status::BadRequest);
        assert!(body["error"].as_str().unwrap_or_default().contains("from"));

        let (status, body) = get_json(&client, "/api/bitacora?from=&to=&actor=");
        assert_eq!(status, Status::Ok);
        assert_eq!(body["total_entries"], 1);
    }
}
