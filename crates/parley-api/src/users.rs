//! User directory: everyone, online users first, then by last activity.

use tracing::debug;

use parley_db::Database;
use parley_types::envelope::{FunctionRequest, FunctionResponse};
use parley_types::models::User;

use crate::convert::user_from_row;
use crate::{ApiError, response};

pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

pub fn handle(db: &Database, req: &FunctionRequest) -> anyhow::Result<FunctionResponse> {
    response::finish(route(db, req))
}

fn route(db: &Database, req: &FunctionRequest) -> Result<FunctionResponse, ApiError> {
    match req.http_method.to_ascii_uppercase().as_str() {
        "OPTIONS" => Ok(response::preflight(ALLOW_METHODS)),
        "GET" => list_users(db, req),
        _ => Err(ApiError::MethodNotAllowed),
    }
}

fn list_users(db: &Database, req: &FunctionRequest) -> Result<FunctionResponse, ApiError> {
    // The caller is identified but the list is not filtered by it.
    let caller = req.query("userId").or_else(|| req.header("X-User-Id"));

    let users: Vec<User> = db.list_users()?.into_iter().map(user_from_row).collect();

    debug!("Listed {} users (caller: {:?})", users.len(), caller);
    response::json(response::OK, &users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{add_user, test_db};

    #[test]
    fn test_online_users_come_first() {
        let (_dir, db) = test_db();
        add_user(&db, "gone", false, None);
        add_user(&db, "idle", false, Some("2024-05-01T08:00:00Z"));
        add_user(&db, "here-long-ago", true, Some("2024-04-01T08:00:00Z"));
        add_user(&db, "recent", false, Some("2024-05-01T11:00:00Z"));
        add_user(&db, "here", true, Some("2024-05-01T12:00:00Z"));

        let resp = handle(&db, &FunctionRequest::new("GET")).unwrap();
        assert_eq!(resp.status_code, 200);

        let users: Vec<User> = serde_json::from_str(&resp.body).unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["here", "here-long-ago", "gone", "recent", "idle"]);

        let first_offline = users.iter().position(|u| !u.is_online).unwrap();
        assert!(users[..first_offline].iter().all(|u| u.is_online));
        assert!(users[first_offline..].iter().all(|u| !u.is_online));

        for group in [&users[..first_offline], &users[first_offline..]] {
            for pair in group.windows(2) {
                match (pair[0].last_seen, pair[1].last_seen) {
                    (Some(a), Some(b)) => assert!(a >= b),
                    (Some(_), None) => panic!("null last_seen sorted after a timestamp"),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn test_caller_identity_does_not_filter() {
        let (_dir, db) = test_db();
        let me = add_user(&db, "me", true, None);
        add_user(&db, "you", false, None);

        let by_query = FunctionRequest::new("GET").with_query("userId", me.to_string());
        let by_header = FunctionRequest::new("GET").with_header("X-User-Id", me.to_string());
        let anonymous = FunctionRequest::new("GET");

        let bodies: Vec<String> = [by_query, by_header, anonymous]
            .iter()
            .map(|req| handle(&db, req).unwrap().body)
            .collect();

        let users: Vec<User> = serde_json::from_str(&bodies[0]).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(bodies[0], bodies[1]);
        assert_eq!(bodies[1], bodies[2]);
    }

    #[test]
    fn test_user_wire_fields() {
        let (_dir, db) = test_db();
        let id = add_user(&db, "neo", true, Some("2024-05-01T12:00:00Z"));

        let resp = handle(&db, &FunctionRequest::new("GET")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
        let user = &value[0];

        assert_eq!(user["id"], id.to_string());
        assert_eq!(user["firstName"], "neo");
        assert_eq!(user["lastName"], "Tester");
        assert_eq!(user["avatar"], "https://cdn.example/neo.png");
        assert_eq!(user["lastSeen"], "2024-05-01T12:00:00Z");
        assert_eq!(user["isOnline"], true);
        assert_eq!(user["isFriend"], false);
        assert!(user.get("userId").is_none());
    }

    #[test]
    fn test_preflight_and_other_verbs() {
        let (_dir, db) = test_db();

        let resp = handle(&db, &FunctionRequest::new("OPTIONS")).unwrap();
        assert_eq!(resp.status_code, 200);
        assert!(resp.body.is_empty());
        assert_eq!(resp.header("Access-Control-Allow-Methods"), Some("GET, POST, OPTIONS"));
        assert_eq!(resp.header("Access-Control-Max-Age"), Some("86400"));

        let resp = handle(&db, &FunctionRequest::new("POST")).unwrap();
        assert_eq!(resp.status_code, 405);
    }
}
