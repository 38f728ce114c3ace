//! Request body builders shared across the suites

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde_json::{json, Value};

/// Email of the one account the mock API accepts for register/login.
pub const REGISTERED_EMAIL: &str = "eve.holt@reqres.in";

pub const REGISTER_PASSWORD: &str = "pistol";
pub const LOGIN_PASSWORD: &str = "cityslicka";

/// Mock-API user body, the `{name, job}` shape the service echoes back.
pub fn mock_user(name: &str, job: &str) -> Value {
    json!({ "name": name, "job": job })
}

static EMAIL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Sandbox-API user body. The service rejects duplicate emails, so each
/// build gets an address made unique by a timestamp plus a process-wide
/// counter.
pub fn sandbox_user(name: &str) -> Value {
    let nonce = Utc::now().timestamp_micros();
    let seq = EMAIL_SEQ.fetch_add(1, Ordering::Relaxed);
    json!({
        "name": name,
        "gender": "female",
        "email": format!("{}.{nonce}.{seq}@example.test", slug(name)),
        "status": "active",
    })
}

/// Partial sandbox-API update body.
pub fn sandbox_user_update(name: &str, status: &str) -> Value {
    json!({ "name": name, "status": status })
}

/// Register body; `None` deliberately omits the password key so the
/// missing-password rejection can be exercised.
pub fn register(email: &str, password: Option<&str>) -> Value {
    credentials(email, password)
}

/// Login body, same shape and omission rule as [`register`].
pub fn login(email: &str, password: Option<&str>) -> Value {
    credentials(email, password)
}

fn credentials(email: &str, password: Option<&str>) -> Value {
    match password {
        Some(password) => json!({ "email": email, "password": password }),
        None => json!({ "email": email }),
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_user_carries_both_strings() {
        let body = mock_user("Test User", "2024: QA Analyst");
        assert_eq!(body["name"], "Test User");
        assert_eq!(body["job"], "2024: QA Analyst");
    }

    #[test]
    fn sandbox_user_emails_are_unique_and_derived_from_the_name() {
        let first = sandbox_user("Test User");
        let second = sandbox_user("Test User");
        let first_email = first["email"].as_str().expect("email");
        let second_email = second["email"].as_str().expect("email");
        assert!(first_email.starts_with("test.user."));
        assert!(first_email.ends_with("@example.test"));
        assert_ne!(first_email, second_email);
        assert_eq!(first["status"], "active");
    }

    #[test]
    fn omitted_password_leaves_no_key_behind() {
        let body = register(REGISTERED_EMAIL, None);
        assert!(body.get("password").is_none());
        let body = login(REGISTERED_EMAIL, Some(LOGIN_PASSWORD));
        assert_eq!(body["password"], LOGIN_PASSWORD);
    }
}
