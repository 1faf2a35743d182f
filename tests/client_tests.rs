mod common;

use chrono::NaiveDate;

use leavedesk::client::api::Registration;
use leavedesk::client::{
    AdminDashboard, AdminTab, ApiClient, EmployeeDashboard, FileTokenStorage, LeaveForm,
    MemoryTokenStorage, Session, SessionState, TokenStorage,
};
use leavedesk::models::{LeaveStatus, LeaveType, Role};

use common::PASSWORD;

fn registration(name: &str, email: &str, role: Option<Role>) -> Registration {
    Registration {
        name: name.to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        password_confirmation: PASSWORD.to_string(),
        role,
    }
}

fn form(start: &str, end: &str) -> LeaveForm {
    LeaveForm {
        start_date: start.to_string(),
        end_date: end.to_string(),
        reason: "family trip".to_string(),
        leave_type: LeaveType::Annual,
    }
}

// ── Session ─────────────────────────────────────────────────────

#[tokio::test]
async fn session_login_and_logout() {
    let app = common::spawn_app().await;
    app.employee("Jane", "jane@test.com").await;

    let mut session = Session::new(ApiClient::new(app.base_url()), MemoryTokenStorage::new());
    assert!(matches!(session.state(), SessionState::Anonymous));

    let user = session.login("jane@test.com", PASSWORD).await.unwrap();
    assert_eq!(user.role, Role::Employee);
    assert!(session.is_authenticated());
    assert_eq!(session.storage().peek(), session.token());

    let token = session.token().unwrap().to_string();
    session.logout().await.unwrap();
    assert!(matches!(session.state(), SessionState::Anonymous));
    assert!(session.token().is_none());
    assert!(session.storage().peek().is_none());

    // The server forgot the token too
    let (_, status) = app.get_auth("/api/user", &token).await;
    assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn session_failed_login_stays_anonymous() {
    let app = common::spawn_app().await;
    app.employee("Jane", "jane@test.com").await;

    let mut session = Session::new(ApiClient::new(app.base_url()), MemoryTokenStorage::new());
    let err = session.login("jane@test.com", "wrongpassword").await.unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert!(err.field_errors().is_some_and(|e| e.contains("email")));

    assert!(matches!(session.state(), SessionState::Anonymous));
    assert!(!session.is_authenticated());
    assert!(session.storage().peek().is_none());

    common::cleanup(app).await;
}

#[tokio::test]
async fn session_register_surfaces_field_errors() {
    let app = common::spawn_app().await;

    let mut session = Session::new(ApiClient::new(app.base_url()), MemoryTokenStorage::new());
    let user = session
        .register(&registration("Jane", "jane@test.com", None))
        .await
        .unwrap();
    assert_eq!(user.email, "jane@test.com");
    session.logout().await.unwrap();

    let err = session
        .register(&registration("Jane Again", "jane@test.com", None))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(422));
    assert!(err.field_errors().is_some_and(|e| e.contains("email")));
    assert!(!session.is_authenticated());

    common::cleanup(app).await;
}

#[tokio::test]
async fn session_restores_from_file() {
    let app = common::spawn_app().await;
    app.employee("Jane", "jane@test.com").await;

    let path = std::env::temp_dir()
        .join(format!("leavedesk-{}", uuid::Uuid::now_v7()))
        .join("token");

    let mut first = Session::new(ApiClient::new(app.base_url()), FileTokenStorage::new(&path));
    first.login("jane@test.com", PASSWORD).await.unwrap();
    let token = first.token().unwrap().to_string();

    let mut second = Session::new(ApiClient::new(app.base_url()), FileTokenStorage::new(&path));
    second.restore().await.unwrap();
    assert!(second.is_authenticated());
    assert_eq!(second.token(), Some(token.as_str()));
    assert_eq!(second.user().unwrap().name, "Jane");

    second.logout().await.unwrap();
    assert!(!second.storage().path().exists());

    common::cleanup(app).await;
}

#[tokio::test]
async fn session_restore_discards_revoked_token() {
    let app = common::spawn_app().await;
    let (stale, _) = app.employee("Jane", "jane@test.com").await;
    // A fresh login revokes the registration token
    app.login("jane@test.com", PASSWORD).await;

    let mut session = Session::new(
        ApiClient::new(app.base_url()),
        MemoryTokenStorage::with_token(stale),
    );
    session.restore().await.unwrap();

    assert!(matches!(session.state(), SessionState::Anonymous));
    assert!(session.token().is_none());
    assert!(session.storage().peek().is_none());

    common::cleanup(app).await;
}

#[tokio::test]
async fn session_restore_without_token_is_anonymous() {
    let app = common::spawn_app().await;

    let mut storage = MemoryTokenStorage::new();
    assert_eq!(storage.load().await.unwrap(), None);

    let mut session = Session::new(ApiClient::new(app.base_url()), storage);
    session.restore().await.unwrap();
    assert!(matches!(session.state(), SessionState::Anonymous));

    common::cleanup(app).await;
}

// ── Api client ──────────────────────────────────────────────────

#[tokio::test]
async fn api_client_reads_single_and_per_user_leaves() {
    let app = common::spawn_app().await;
    let (jane, jane_id) = app.employee("Jane", "jane@test.com").await;
    let (john, _) = app.employee("John", "john@test.com").await;
    let created = app.create_leave(&jane, "2099-01-01", "2099-01-03", "sick").await;
    let id: uuid::Uuid = created["id"].as_str().unwrap().parse().unwrap();
    let jane_id: uuid::Uuid = jane_id.parse().unwrap();

    let mut api = ApiClient::new(format!("{}/", app.base_url()));
    api.set_token(Some(jane));

    let view = api.leave(id).await.unwrap();
    assert_eq!(view.leave.leave_type, LeaveType::Sick);
    assert_eq!(view.formatted_dates.end_date, "2099-01-03");
    assert_eq!(view.user.map(|u| u.id), Some(jane_id));

    let own = api.user_leaves(jane_id).await.unwrap();
    assert_eq!(own.len(), 1);

    api.set_token(Some(john));
    let err = api.leave(id).await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    let err = api.user_leaves(jane_id).await.unwrap_err();
    assert_eq!(err.status(), Some(403));

    api.set_token(None);
    let err = api.current_user().await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    common::cleanup(app).await;
}

// ── Dashboards ──────────────────────────────────────────────────

#[tokio::test]
async fn employee_dashboard_submit_and_refresh() {
    let app = common::spawn_app().await;

    let mut session = Session::new(ApiClient::new(app.base_url()), MemoryTokenStorage::new());
    session
        .register(&registration("Jane", "jane@test.com", None))
        .await
        .unwrap();

    let mut dash = EmployeeDashboard::new();
    dash.refresh(&mut session).await;
    assert!(dash.leaves.is_empty());
    assert_eq!(dash.stats().total, 0);

    dash.open_form();
    dash.form = form("2099-01-01", "2099-01-05");
    let created = dash.submit(&mut session).await.unwrap();
    assert_eq!(created.leave.status, LeaveStatus::Pending);
    assert_eq!(
        created.leave.start_date,
        NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
    );
    assert!(!dash.show_form);
    assert_eq!(dash.form, LeaveForm::default());
    assert_eq!(dash.leaves.len(), 1);
    assert_eq!(dash.stats().pending, 1);

    // Rejected submissions keep the form open with its contents
    dash.open_form();
    dash.form = form("2099-02-05", "2099-02-01");
    let err = dash.submit(&mut session).await.unwrap_err();
    assert!(err.field_errors().is_some_and(|e| e.contains("end_date")));
    assert!(dash.show_form);
    assert_eq!(dash.form.start_date, "2099-02-05");
    assert!(dash.last_error.is_some());
    assert_eq!(dash.leaves.len(), 1);

    common::cleanup(app).await;
}

#[tokio::test]
async fn admin_dashboard_tabs_and_decisions() {
    let app = common::spawn_app().await;
    let (jane, _) = app.employee("Jane", "jane@test.com").await;
    let pending = app.create_leave(&jane, "2099-01-01", "2099-01-02", "annual").await;
    app.create_leave(&jane, "2099-02-01", "2099-02-02", "sick").await;

    let mut session = Session::new(ApiClient::new(app.base_url()), MemoryTokenStorage::new());
    session
        .register(&registration("Admin", "admin@test.com", Some(Role::Admin)))
        .await
        .unwrap();

    let mut dash = AdminDashboard::new();
    assert_eq!(dash.tab, AdminTab::Leaves);
    dash.refresh(&mut session).await;
    assert_eq!(dash.leaves.len(), 2);
    assert_eq!(dash.stats().pending, 2);
    assert!(dash.leaves.iter().all(|l| l.user.is_some()));

    dash.select_tab(&mut session, AdminTab::Employees).await;
    assert_eq!(dash.tab, AdminTab::Employees);
    assert_eq!(dash.employees.len(), 1);
    assert_eq!(dash.employees[0].pending_leaves_count, 2);
    assert_eq!(dash.stats().total_employees, 1);

    let id: uuid::Uuid = pending["id"].as_str().unwrap().parse().unwrap();
    dash.decide(&mut session, id, LeaveStatus::Approved)
        .await
        .unwrap();
    let stats = dash.stats();
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.approved, 1);

    // A second decision is refused and the list keeps the first
    let err = dash
        .decide(&mut session, id, LeaveStatus::Rejected)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(dash.stats().approved, 1);
    assert!(dash.last_error.is_some());

    common::cleanup(app).await;
}

#[tokio::test]
async fn employee_cannot_load_admin_data() {
    let app = common::spawn_app().await;

    let mut session = Session::new(ApiClient::new(app.base_url()), MemoryTokenStorage::new());
    session
        .register(&registration("Jane", "jane@test.com", None))
        .await
        .unwrap();

    let mut dash = AdminDashboard::new();
    dash.select_tab(&mut session, AdminTab::Employees).await;
    assert!(dash.employees.is_empty());
    assert!(dash.last_error.is_some());

    let err = session.api().employees().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    // Forbidden is not a dead session
    assert!(session.is_authenticated());

    common::cleanup(app).await;
}

#[tokio::test]
async fn revoked_token_signs_dashboard_session_out() {
    let app = common::spawn_app().await;
    app.employee("Jane", "jane@test.com").await;

    let mut session = Session::new(
        ApiClient::new(app.base_url()),
        MemoryTokenStorage::new(),
    );
    session.login("jane@test.com", PASSWORD).await.unwrap();
    assert!(session.storage().peek().is_some());

    // Signing in elsewhere revokes this session's token
    let (_, status) = app.login("jane@test.com", PASSWORD).await;
    assert_eq!(status, reqwest::StatusCode::OK);

    let mut dash = EmployeeDashboard::new();
    dash.refresh(&mut session).await;

    assert!(dash.last_error.is_some());
    assert!(matches!(session.state(), SessionState::Anonymous));
    assert!(!session.is_authenticated());
    assert!(session.storage().peek().is_none());

    common::cleanup(app).await;
}
