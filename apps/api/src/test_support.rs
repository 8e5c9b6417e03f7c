//! Fixtures shared by the unit and router tests.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::principal::Principal;
use crate::config::Config;
use crate::jobs::service::{JobRequest, SalaryRequest};
use crate::models::user::{NewUser, Role};
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::store::Store;

pub async fn seed_user(store: &dyn Store, role: Role) -> Principal {
    let id = Uuid::new_v4();
    let user = store
        .create_user(NewUser {
            name: format!("{role} {id}"),
            email: format!("{id}@example.test"),
            password_hash: "not-a-real-hash".to_string(),
            role,
            phone: None,
            company: None,
            skills: Vec::new(),
        })
        .await
        .unwrap();
    Principal::new(user.id, user.role)
}

pub fn job_request(title: &str) -> JobRequest {
    JobRequest {
        title: Some(title.to_string()),
        company: Some("Acme".to_string()),
        description: Some("Build things".to_string()),
        requirements: Some("Rust".to_string()),
        location: Some("Remote".to_string()),
        job_type: None,
        salary: Some(SalaryRequest {
            min: Some(50_000),
            max: Some(90_000),
            currency: None,
        }),
        skills: Some(vec!["rust".to_string(), "sql".to_string()]),
        status: None,
    }
}

/// App state over a fresh in-memory store. The store is returned too so
/// tests can seed and inspect it directly.
pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), Config::for_tests());
    (state, store)
}

pub fn bearer(state: &AppState, principal: &Principal) -> String {
    format!("Bearer {}", state.tokens.issue(principal).unwrap())
}
