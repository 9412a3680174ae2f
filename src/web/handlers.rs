use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    errors::WebError,
    extract::{CurrentUser, MaybeUser},
    views::{self, GreenhouseView},
};
use crate::{
    analysis::ImageUpload,
    auth::{
        has_role, is_authenticated, is_owner, is_owner_or_role, secrets_match, AuthError,
        SessionUser, SESSION_COOKIE, SESSION_MAX_AGE_SECS,
    },
    control::CommandError,
    cookies,
    db::models::Role,
    i18n::{Locale, Msg},
    state::AppState,
    store::is_foreign_key_violation,
};

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct GreenhouseForm {
    #[serde(default)]
    pub name: String,
    pub location: Option<String>,
    pub plant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ControlForm {
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct IssueForm {
    pub greenhouse_id: Option<Uuid>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pin: String,
}

#[derive(Debug, Deserialize)]
pub struct PinForm {
    #[serde(default)]
    pub pin: String,
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

pub async fn index(MaybeUser(user): MaybeUser) -> Redirect {
    if is_authenticated(user.as_ref()) {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

pub async fn register_form(locale: Locale) -> Html<String> {
    views::register_page(locale, None, "")
}

pub async fn register(
    State(state): State<AppState>,
    locale: Locale,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, WebError> {
    let role = form.role.unwrap_or(Role::Farmer);
    match state.auth.register(&form.username, &form.password, role).await {
        Ok(_) => Ok(Redirect::to("/login").into_response()),
        Err(AuthError::UsernameTaken) => {
            Ok(views::register_page(locale, Some(Msg::UsernameTaken), &form.username).into_response())
        }
        Err(AuthError::MissingField) => {
            Ok(views::register_page(locale, Some(Msg::MissingField), &form.username).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login_form(locale: Locale) -> Html<String> {
    views::login_page(locale, None, "")
}

pub async fn login(
    State(state): State<AppState>,
    locale: Locale,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, WebError> {
    let user = match state.auth.login(&form.username, &form.password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            return Ok(
                views::login_page(locale, Some(Msg::InvalidCredentials), &form.username)
                    .into_response(),
            );
        }
        Err(e) => return Err(e.into()),
    };

    let token = state
        .sessions
        .encode(&SessionUser::from(&user))
        .map_err(anyhow::Error::from)?;
    let cookie = cookies::set(SESSION_COOKIE, &token, SESSION_MAX_AGE_SECS)
        .ok_or_else(|| anyhow::anyhow!("session cookie is not a valid header value"))?;

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/dashboard")).into_response())
}

pub async fn logout() -> Response {
    match cookies::clear(SESSION_COOKIE) {
        Some(cookie) => ([(header::SET_COOKIE, cookie)], Redirect::to("/login")).into_response(),
        None => Redirect::to("/login").into_response(),
    }
}

// ---------------------------------------------------------------------------
// Dashboard & greenhouses
// ---------------------------------------------------------------------------

pub async fn dashboard(
    State(state): State<AppState>,
    locale: Locale,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, WebError> {
    match user.role {
        Role::Technician => {
            let greenhouses = state.store.list_all_greenhouses().await?;
            let unresolved = state.store.list_unresolved_issues().await?;
            Ok(views::technician_dashboard(locale, &user, &greenhouses, &unresolved))
        }
        Role::Farmer => {
            let greenhouses = state.store.list_greenhouses_for_owner(user.user_id).await?;
            let mut rows = Vec::with_capacity(greenhouses.len());
            for gh in greenhouses {
                let latest = state.telemetry.latest(gh.id).await?;
                rows.push((gh, latest));
            }
            Ok(views::farmer_dashboard(locale, &user, &rows))
        }
    }
}

pub async fn new_greenhouse_form(
    State(state): State<AppState>,
    locale: Locale,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, WebError> {
    let plants = state.store.list_plants().await?;
    Ok(views::new_greenhouse_page(locale, &user, &plants, None))
}

async fn rerender_new_greenhouse(
    state: &AppState,
    locale: Locale,
    user: &SessionUser,
    error: Msg,
) -> Result<Response, WebError> {
    let plants = state.store.list_plants().await?;
    Ok(views::new_greenhouse_page(locale, user, &plants, Some(error)).into_response())
}

pub async fn create_greenhouse(
    State(state): State<AppState>,
    locale: Locale,
    CurrentUser(user): CurrentUser,
    Form(form): Form<GreenhouseForm>,
) -> Result<Response, WebError> {
    let name = form.name.trim();
    if name.is_empty() {
        return rerender_new_greenhouse(&state, locale, &user, Msg::MissingField).await;
    }
    let plant_id = match non_blank(form.plant_id).map(|raw| raw.parse::<Uuid>()) {
        Some(Ok(id)) => Some(id),
        Some(Err(_)) => return rerender_new_greenhouse(&state, locale, &user, Msg::UnknownPlant).await,
        None => None,
    };

    let location = non_blank(form.location);
    let gh = match state
        .store
        .insert_greenhouse(name, location.as_deref(), user.user_id, plant_id)
        .await
    {
        Ok(gh) => gh,
        Err(e) if is_foreign_key_violation(&e) => {
            return rerender_new_greenhouse(&state, locale, &user, Msg::UnknownPlant).await;
        }
        Err(e) => return Err(e.into()),
    };

    info!(greenhouse_id = %gh.id, owner_id = %user.user_id, "Greenhouse created");
    Ok(Redirect::to(&format!("/greenhouses/{}", gh.id)).into_response())
}

async fn greenhouse_view(
    state: &AppState,
    user: &SessionUser,
    id: Uuid,
) -> Result<GreenhouseView, WebError> {
    let greenhouse = state.store.find_greenhouse(id).await?.ok_or(WebError::NotFound)?;
    if !is_owner_or_role(&greenhouse, user, Role::Technician) {
        return Err(WebError::Forbidden);
    }

    let plant = match greenhouse.plant_id {
        Some(pid) => state.store.find_plant(pid).await?,
        None => None,
    };
    let readings = state.telemetry.recent(id).await?;
    let issues = state.store.list_issues(id).await?;
    let pending = if is_owner(&greenhouse, user) {
        Some(state.commands.list_pending_for(id, user).await?)
    } else {
        None
    };

    Ok(GreenhouseView {
        greenhouse,
        plant,
        readings,
        issues,
        pending,
    })
}

pub async fn greenhouse_detail(
    State(state): State<AppState>,
    locale: Locale,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, WebError> {
    let view = greenhouse_view(&state, &user, id).await?;
    Ok(views::greenhouse_page(locale, &user, &view, None))
}

pub async fn submit_control(
    State(state): State<AppState>,
    locale: Locale,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Form(form): Form<ControlForm>,
) -> Result<Response, WebError> {
    match state.commands.enqueue(id, &form.device, &form.action, &user).await {
        Ok(_) => Ok(Redirect::to(&format!("/greenhouses/{id}")).into_response()),
        Err(CommandError::MissingField) => {
            let view = greenhouse_view(&state, &user, id).await?;
            Ok(views::greenhouse_page(locale, &user, &view, Some(Msg::MissingField)).into_response())
        }
        Err(e) => {
            warn!(greenhouse_id = %id, user_id = %user.user_id, error = %e, "Command rejected");
            Err(e.into())
        }
    }
}

// ---------------------------------------------------------------------------
// Image analysis
// ---------------------------------------------------------------------------

pub async fn analyze_form(locale: Locale, CurrentUser(user): CurrentUser) -> Html<String> {
    views::analyze_page(locale, &user, None, None)
}

pub async fn analyze(
    State(state): State<AppState>,
    locale: Locale,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Html<String>, WebError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| WebError::BadRequest(e.to_string()))?;
        upload = Some(ImageUpload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    let Some(image) = upload.filter(|u| !u.bytes.is_empty()) else {
        return Ok(views::analyze_page(locale, &user, Some(Msg::MissingUpload), None));
    };

    state.images.save(None, &image).await?;
    let analysis = state.analyzer.analyze(&image, locale)?;
    info!(user_id = %user.user_id, bytes = image.bytes.len(), "Uploaded image analysed");
    Ok(views::analyze_page(locale, &user, None, Some(&analysis)))
}

// ---------------------------------------------------------------------------
// Debug panel (technicians + shared PIN)
// ---------------------------------------------------------------------------

fn require_technician(user: &SessionUser) -> Result<(), WebError> {
    if has_role(Some(user), Role::Technician) {
        Ok(())
    } else {
        Err(WebError::Forbidden)
    }
}

async fn render_debug(
    state: &AppState,
    locale: Locale,
    user: &SessionUser,
    error: Option<Msg>,
) -> Result<Html<String>, WebError> {
    let greenhouses = state.store.list_all_greenhouses().await?;
    let unresolved = state.store.list_unresolved_issues().await?;
    Ok(views::debug_page(locale, user, &greenhouses, &unresolved, error))
}

pub async fn debug_panel(
    State(state): State<AppState>,
    locale: Locale,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, WebError> {
    require_technician(&user)?;
    render_debug(&state, locale, &user, None).await
}

pub async fn create_issue(
    State(state): State<AppState>,
    locale: Locale,
    CurrentUser(user): CurrentUser,
    Form(form): Form<IssueForm>,
) -> Result<Response, WebError> {
    require_technician(&user)?;
    if !secrets_match(&form.pin, &state.config.debug_pin) {
        warn!(user_id = %user.user_id, "Debug PIN rejected");
        return Ok(render_debug(&state, locale, &user, Some(Msg::InvalidPin)).await?.into_response());
    }
    let description = form.description.trim();
    let Some(greenhouse_id) = form.greenhouse_id.filter(|_| !description.is_empty()) else {
        return Ok(render_debug(&state, locale, &user, Some(Msg::MissingField)).await?.into_response());
    };

    let issue = state
        .store
        .insert_issue(greenhouse_id, description)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                WebError::NotFound
            } else {
                WebError::Storage(e)
            }
        })?;

    info!(issue_id = %issue.id, greenhouse_id = %greenhouse_id, "Issue reported");
    Ok(Redirect::to("/debug").into_response())
}

pub async fn resolve_issue(
    State(state): State<AppState>,
    locale: Locale,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Form(form): Form<PinForm>,
) -> Result<Response, WebError> {
    require_technician(&user)?;
    if !secrets_match(&form.pin, &state.config.debug_pin) {
        warn!(user_id = %user.user_id, "Debug PIN rejected");
        return Ok(render_debug(&state, locale, &user, Some(Msg::InvalidPin)).await?.into_response());
    }
    if state.store.resolve_issue(id).await? == 0 {
        return Err(WebError::NotFound);
    }
    info!(issue_id = %id, "Issue resolved");
    Ok(Redirect::to("/debug").into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::{
        multipart::{MultipartForm, Part},
        TestServer,
    };
    use sqlx::PgPool;

    use crate::{
        app,
        db::models::{Role, User},
        state::{test_support::*, AppState},
    };

    fn server(state: &AppState) -> TestServer {
        TestServer::new(app::router(state.clone())).unwrap()
    }

    fn cookie_for(state: &AppState, user: &User) -> HeaderValue {
        HeaderValue::from_str(&session_cookie(state, user)).unwrap()
    }

    fn location(resp: &axum_test::TestResponse) -> String {
        resp.headers()[header::LOCATION].to_str().unwrap().to_owned()
    }

    // -----------------------------------------------------------------------
    // Register / login / logout
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn register_redirects_to_login(pool: PgPool) {
        let state = test_state(pool);
        let resp = server(&state)
            .post("/register")
            .form(&[("username", "ana"), ("password", "pw"), ("role", "technician")])
            .await;
        resp.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/login");

        let stored = state.store.find_user_by_username("ana").await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Technician);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn register_duplicate_rerenders_form(pool: PgPool) {
        let state = test_state(pool);
        user(&state, "ana", Role::Farmer).await;
        let resp = server(&state)
            .post("/register")
            .form(&[("username", "ana"), ("password", "pw")])
            .await;
        resp.assert_status_ok();
        assert!(resp.text().contains("That username is already taken."));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn login_with_wrong_password_rerenders_without_session(pool: PgPool) {
        let state = test_state(pool);
        user(&state, "ana", Role::Farmer).await;
        let resp = server(&state)
            .post("/login")
            .form(&[("username", "ana"), ("password", "wrong")])
            .await;
        resp.assert_status_ok();
        assert!(resp.text().contains("Invalid username or password."));
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn login_sets_session_cookie(pool: PgPool) {
        let state = test_state(pool);
        user(&state, "ana", Role::Farmer).await;
        let resp = server(&state)
            .post("/login")
            .form(&[("username", "ana"), ("password", "pw")])
            .await;
        resp.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/dashboard");
        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_owned();
        assert!(cookie.starts_with("gh_session="));
        assert!(cookie.contains("HttpOnly"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn logout_clears_cookie(pool: PgPool) {
        let state = test_state(pool);
        let resp = server(&state).post("/logout").await;
        resp.assert_status(StatusCode::SEE_OTHER);
        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_owned();
        assert!(cookie.contains("Max-Age=0"));
    }

    // -----------------------------------------------------------------------
    // Session gating
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn anonymous_dashboard_redirects_to_login(pool: PgPool) {
        let state = test_state(pool);
        let resp = server(&state).get("/dashboard").await;
        resp.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/login");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn tampered_cookie_is_ignored(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let mut cookie = session_cookie(&state, &ana);
        cookie.push('0');
        let resp = server(&state)
            .get("/dashboard")
            .add_header(header::COOKIE, HeaderValue::from_str(&cookie).unwrap())
            .await;
        resp.assert_status(StatusCode::SEE_OTHER);
    }

    // -----------------------------------------------------------------------
    // Dashboard
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn farmer_dashboard_lists_only_own_greenhouses(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let bob = user(&state, "bob", Role::Farmer).await;
        state.store.insert_greenhouse("Ana's tomatoes", None, ana.id, None).await.unwrap();
        state.store.insert_greenhouse("Bob's lettuce", None, bob.id, None).await.unwrap();

        let resp = server(&state)
            .get("/dashboard")
            .add_header(header::COOKIE, cookie_for(&state, &ana))
            .await;
        resp.assert_status_ok();
        let html = resp.text();
        assert!(html.contains("Ana&#39;s tomatoes"));
        assert!(!html.contains("Bob&#39;s lettuce"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn technician_dashboard_lists_unresolved_issues(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let tech = user(&state, "tess", Role::Technician).await;
        let gh = state.store.insert_greenhouse("GH1", None, ana.id, None).await.unwrap();
        state.store.insert_issue(gh.id, "leaking valve").await.unwrap();
        let fixed = state.store.insert_issue(gh.id, "broken fan").await.unwrap();
        state.store.resolve_issue(fixed.id).await.unwrap();

        let resp = server(&state)
            .get("/dashboard")
            .add_header(header::COOKIE, cookie_for(&state, &tech))
            .await;
        resp.assert_status_ok();
        let html = resp.text();
        assert!(html.contains("leaking valve"));
        assert!(!html.contains("broken fan"));
        assert!(html.contains("GH1"));
    }

    // -----------------------------------------------------------------------
    // Greenhouses
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn create_greenhouse_with_plant(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let tomato = state
            .store
            .list_plants()
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.name == "Tomato")
            .unwrap();

        let resp = server(&state)
            .post("/greenhouses/new")
            .add_header(header::COOKIE, cookie_for(&state, &ana))
            .form(&[
                ("name", "GH1"),
                ("location", "north"),
                ("plant_id", tomato.id.to_string().as_str()),
            ])
            .await;
        resp.assert_status(StatusCode::SEE_OTHER);

        let owned = state.store.list_greenhouses_for_owner(ana.id).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].name, "GH1");
        assert_eq!(owned[0].plant_id, Some(tomato.id));
        assert_eq!(location(&resp), format!("/greenhouses/{}", owned[0].id));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_greenhouse_without_name_rerenders(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let resp = server(&state)
            .post("/greenhouses/new")
            .add_header(header::COOKIE, cookie_for(&state, &ana))
            .form(&[("name", "  "), ("plant_id", "")])
            .await;
        resp.assert_status_ok();
        assert!(resp.text().contains("Please fill in every field."));
        assert!(state.store.list_greenhouses_for_owner(ana.id).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_greenhouse_with_bad_plant_rerenders(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let server = server(&state);

        for plant_id in ["not-a-uuid".to_owned(), uuid::Uuid::new_v4().to_string()] {
            let resp = server
                .post("/greenhouses/new")
                .add_header(header::COOKIE, cookie_for(&state, &ana))
                .form(&[("name", "GH1"), ("plant_id", plant_id.as_str())])
                .await;
            resp.assert_status_ok();
            assert!(resp.text().contains("Please choose a plant from the list."));
        }
        assert!(state.store.list_greenhouses_for_owner(ana.id).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn detail_visibility_by_owner_and_role(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let bob = user(&state, "bob", Role::Farmer).await;
        let tech = user(&state, "tess", Role::Technician).await;
        let gh = state.store.insert_greenhouse("GH1", None, ana.id, None).await.unwrap();
        state.store.insert_command(gh.id, "pump", "on").await.unwrap();
        let path = format!("/greenhouses/{}", gh.id);
        let server = server(&state);

        let resp = server.get(&path).add_header(header::COOKIE, cookie_for(&state, &ana)).await;
        resp.assert_status_ok();
        let html = resp.text();
        assert!(html.contains("Pending commands"));
        assert!(html.contains("pump: on"));

        let resp = server.get(&path).add_header(header::COOKIE, cookie_for(&state, &bob)).await;
        resp.assert_status(StatusCode::FORBIDDEN);

        let resp = server.get(&path).add_header(header::COOKIE, cookie_for(&state, &tech)).await;
        resp.assert_status_ok();
        let html = resp.text();
        assert!(!html.contains("Pending commands"));
        assert!(!html.contains("pump: on"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn detail_of_unknown_greenhouse_is_404(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let resp = server(&state)
            .get(&format!("/greenhouses/{}", uuid::Uuid::new_v4()))
            .add_header(header::COOKIE, cookie_for(&state, &ana))
            .await;
        resp.assert_status(StatusCode::NOT_FOUND);
    }

    // -----------------------------------------------------------------------
    // Control commands
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn owner_enqueues_command(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let gh = state.store.insert_greenhouse("GH1", None, ana.id, None).await.unwrap();

        let resp = server(&state)
            .post(&format!("/greenhouses/{}/control", gh.id))
            .add_header(header::COOKIE, cookie_for(&state, &ana))
            .form(&[("device", "pump"), ("action", "on")])
            .await;
        resp.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), format!("/greenhouses/{}", gh.id));

        let pending = state.commands.list_pending(gh.id).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!((pending[0].device.as_str(), pending[0].action.as_str()), ("pump", "on"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn non_owner_enqueue_is_forbidden_and_inserts_nothing(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let bob = user(&state, "bob", Role::Farmer).await;
        let gh = state.store.insert_greenhouse("GH1", None, ana.id, None).await.unwrap();

        let resp = server(&state)
            .post(&format!("/greenhouses/{}/control", gh.id))
            .add_header(header::COOKIE, cookie_for(&state, &bob))
            .form(&[("device", "pump"), ("action", "on")])
            .await;
        resp.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(state.store.count_commands(gh.id).await.unwrap(), 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn blank_command_rerenders_detail_with_message(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let gh = state.store.insert_greenhouse("GH1", None, ana.id, None).await.unwrap();

        let resp = server(&state)
            .post(&format!("/greenhouses/{}/control", gh.id))
            .add_header(header::COOKIE, cookie_for(&state, &ana))
            .form(&[("device", " "), ("action", "on")])
            .await;
        resp.assert_status_ok();
        let html = resp.text();
        assert!(html.contains("Please fill in every field."));
        assert!(html.contains(r#"action="/greenhouses/"#));
        assert_eq!(state.store.count_commands(gh.id).await.unwrap(), 0);
    }

    // -----------------------------------------------------------------------
    // Image analysis
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn analyze_without_file_shows_message(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let resp = server(&state)
            .post("/analyze")
            .add_header(header::COOKIE, cookie_for(&state, &ana))
            .multipart(MultipartForm::new().add_text("note", "no image here"))
            .await;
        resp.assert_status_ok();
        assert!(resp.text().contains("Please choose an image to upload."));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn analyze_returns_canned_text_in_chosen_locale(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let form = MultipartForm::new().add_part(
            "image",
            Part::bytes(vec![0x89, b'P', b'N', b'G'])
                .file_name("leaf.png")
                .mime_type("image/png"),
        );
        let resp = server(&state)
            .post("/analyze?lang=es")
            .add_header(header::COOKIE, cookie_for(&state, &ana))
            .multipart(form)
            .await;
        resp.assert_status_ok();
        assert!(resp.text().contains("La planta se ve saludable."));
    }

    // -----------------------------------------------------------------------
    // Debug panel
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn debug_panel_is_technician_only(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let tech = user(&state, "tess", Role::Technician).await;
        let server = server(&state);

        server
            .get("/debug")
            .add_header(header::COOKIE, cookie_for(&state, &ana))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .get("/debug")
            .add_header(header::COOKIE, cookie_for(&state, &tech))
            .await
            .assert_status_ok();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn issue_creation_requires_pin(pool: PgPool) {
        let state = test_state(pool);
        let ana = user(&state, "ana", Role::Farmer).await;
        let tech = user(&state, "tess", Role::Technician).await;
        let gh = state.store.insert_greenhouse("GH1", None, ana.id, None).await.unwrap();
        let gh_id = gh.id.to_string();
        let server = server(&state);

        let resp = server
            .post("/debug/issues")
            .add_header(header::COOKIE, cookie_for(&state, &tech))
            .form(&[
                ("greenhouse_id", gh_id.as_str()),
                ("description", "aphids"),
                ("pin", "0000"),
            ])
            .await;
        resp.assert_status_ok();
        assert!(resp.text().contains("Invalid PIN."));
        assert!(state.store.list_issues(gh.id).await.unwrap().is_empty());

        let resp = server
            .post("/debug/issues")
            .add_header(header::COOKIE, cookie_for(&state, &tech))
            .form(&[
                ("greenhouse_id", gh_id.as_str()),
                ("description", "aphids"),
                ("pin", TEST_DEBUG_PIN),
            ])
            .await;
        resp.assert_status(StatusCode::SEE_OTHER);
        let issues = state.store.list_issues(gh.id).await.unwrap();
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].resolved);

        let resp = server
            .post(&format!("/debug/issues/{}/resolve", issues[0].id))
            .add_header(header::COOKIE, cookie_for(&state, &tech))
            .form(&[("pin", TEST_DEBUG_PIN)])
            .await;
        resp.assert_status(StatusCode::SEE_OTHER);
        assert!(state.store.list_unresolved_issues().await.unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Locale
    // -----------------------------------------------------------------------

    #[sqlx::test(migrations = "./migrations")]
    async fn lang_query_renders_spanish_and_sets_cookie(pool: PgPool) {
        let state = test_state(pool);
        let resp = server(&state).get("/login?lang=es").await;
        resp.assert_status_ok();
        assert!(resp.text().contains("Iniciar sesión"));
        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_owned();
        assert!(cookie.starts_with("lang=es"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn lang_cookie_is_honoured(pool: PgPool) {
        let state = test_state(pool);
        let resp = server(&state)
            .get("/login")
            .add_header(header::COOKIE, HeaderValue::from_static("lang=es"))
            .await;
        resp.assert_status_ok();
        assert!(resp.text().contains("Iniciar sesión"));
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
    }
}
