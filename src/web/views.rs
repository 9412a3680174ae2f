//! Server-rendered HTML. Every dynamic string goes through [`escape`].

use std::fmt::Write as _;

use axum::response::Html;

use crate::{
    auth::SessionUser,
    db::models::{ControlCommand, Greenhouse, Issue, Plant, Role, SensorReading},
    i18n::{Locale, Msg},
};

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn num(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_owned())
}

fn error_banner(locale: Locale, error: Option<Msg>) -> String {
    error
        .map(|m| format!(r#"<p class="error">{}</p>"#, escape(locale.text(m))))
        .unwrap_or_default()
}

pub fn layout(locale: Locale, user: Option<&SessionUser>, title: &str, body: &str) -> Html<String> {
    let t = |m| locale.text(m);
    let nav = match user {
        Some(u) => {
            let debug = if u.role == Role::Technician {
                r#" | <a href="/debug">Debug</a>"#
            } else {
                ""
            };
            format!(
                r#"<a href="/dashboard">{}</a> | <a href="/analyze">{}</a>{debug} | {} <form method="post" action="/logout" style="display:inline"><button>{}</button></form>"#,
                t(Msg::Dashboard),
                t(Msg::AnalyzeImage),
                escape(&u.username),
                t(Msg::Logout),
            )
        }
        None => format!(
            r#"<a href="/login">{}</a> | <a href="/register">{}</a>"#,
            t(Msg::Login),
            t(Msg::Register),
        ),
    };
    Html(format!(
        r#"<!doctype html>
<html lang="{lang}">
<head><meta charset="utf-8"><title>{title} - {app}</title></head>
<body>
<header><strong>{app}</strong> <nav>{nav}</nav> <span class="lang"><a href="?lang=en">EN</a> | <a href="?lang=es">ES</a></span></header>
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        lang = locale.code(),
        app = t(Msg::AppTitle),
        title = escape(title),
    ))
}

pub fn login_page(locale: Locale, error: Option<Msg>, username: &str) -> Html<String> {
    let t = |m| locale.text(m);
    let body = format!(
        r#"{err}<form method="post" action="/login">
<label>{u} <input name="username" value="{name}"></label>
<label>{p} <input name="password" type="password"></label>
<button>{submit}</button>
</form>"#,
        err = error_banner(locale, error),
        u = t(Msg::Username),
        p = t(Msg::Password),
        name = escape(username),
        submit = t(Msg::Login),
    );
    layout(locale, None, t(Msg::Login), &body)
}

pub fn register_page(locale: Locale, error: Option<Msg>, username: &str) -> Html<String> {
    let t = |m| locale.text(m);
    let body = format!(
        r#"{err}<form method="post" action="/register">
<label>{u} <input name="username" value="{name}"></label>
<label>{p} <input name="password" type="password"></label>
<label>{r} <select name="role">
<option value="farmer">{farmer}</option>
<option value="technician">{tech}</option>
</select></label>
<button>{submit}</button>
</form>"#,
        err = error_banner(locale, error),
        u = t(Msg::Username),
        p = t(Msg::Password),
        r = t(Msg::Role),
        farmer = t(Msg::Farmer),
        tech = t(Msg::Technician),
        name = escape(username),
        submit = t(Msg::Register),
    );
    layout(locale, None, t(Msg::Register), &body)
}

fn reading_cells(r: &SensorReading) -> String {
    format!(
        "<td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
        r.recorded_at.format("%Y-%m-%d %H:%M:%S"),
        num(r.temperature),
        num(r.humidity),
        num(r.co2),
        num(r.soil_moisture),
        num(r.ph),
        num(r.nitrogen),
        num(r.phosphorus),
        num(r.potassium),
    )
}

const READING_HEADER: &str = "<th>time</th><th>temperature</th><th>humidity</th><th>co2</th><th>soil_moisture</th><th>ph</th><th>nitrogen</th><th>phosphorus</th><th>potassium</th>";

pub fn farmer_dashboard(
    locale: Locale,
    user: &SessionUser,
    rows: &[(Greenhouse, Option<SensorReading>)],
) -> Html<String> {
    let t = |m| locale.text(m);
    let mut body = format!(
        r#"<p><a href="/greenhouses/new">{}</a></p><h2>{}</h2>"#,
        t(Msg::AddGreenhouse),
        t(Msg::Greenhouses)
    );
    if rows.is_empty() {
        let _ = write!(body, "<p>{}</p>", t(Msg::NoGreenhouses));
    } else {
        let _ = write!(
            body,
            "<table><tr><th>{}</th><th>{}</th>{READING_HEADER}</tr>",
            t(Msg::Name),
            t(Msg::Location)
        );
        for (gh, latest) in rows {
            let cells = match latest {
                Some(r) => reading_cells(r),
                None => format!(r#"<td colspan="9">{}</td>"#, t(Msg::NoReadings)),
            };
            let _ = write!(
                body,
                r#"<tr><td><a href="/greenhouses/{id}">{name}</a></td><td>{loc}</td>{cells}</tr>"#,
                id = gh.id,
                name = escape(&gh.name),
                loc = escape(gh.location.as_deref().unwrap_or("")),
            );
        }
        body.push_str("</table>");
    }
    layout(locale, Some(user), t(Msg::Dashboard), &body)
}

fn issue_list(locale: Locale, issues: &[Issue], resolve_pin_form: bool) -> String {
    if issues.is_empty() {
        return format!("<p>{}</p>", locale.text(Msg::NoIssues));
    }
    let mut out = String::from("<ul>");
    for issue in issues {
        let state = if issue.resolved { " [resolved]" } else { "" };
        let _ = write!(
            out,
            r#"<li>{when} <a href="/greenhouses/{gh}">{gh}</a>: {desc}{state}"#,
            when = issue.created_at.format("%Y-%m-%d %H:%M"),
            gh = issue.greenhouse_id,
            desc = escape(&issue.description),
        );
        if resolve_pin_form && !issue.resolved {
            let _ = write!(
                out,
                r#" <form method="post" action="/debug/issues/{id}/resolve" style="display:inline"><input name="pin" type="password" placeholder="{pin}"><button>{resolve}</button></form>"#,
                id = issue.id,
                pin = locale.text(Msg::Pin),
                resolve = locale.text(Msg::Resolve),
            );
        }
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}

pub fn technician_dashboard(
    locale: Locale,
    user: &SessionUser,
    greenhouses: &[Greenhouse],
    unresolved: &[Issue],
) -> Html<String> {
    let t = |m| locale.text(m);
    let mut body = format!("<h2>{}</h2>", t(Msg::UnresolvedIssues));
    body.push_str(&issue_list(locale, unresolved, false));
    let _ = write!(body, "<h2>{}</h2>", t(Msg::Greenhouses));
    if greenhouses.is_empty() {
        let _ = write!(body, "<p>{}</p>", t(Msg::NoGreenhouses));
    } else {
        body.push_str("<ul>");
        for gh in greenhouses {
            let _ = write!(
                body,
                r#"<li><a href="/greenhouses/{}">{}</a></li>"#,
                gh.id,
                escape(&gh.name)
            );
        }
        body.push_str("</ul>");
    }
    layout(locale, Some(user), t(Msg::Dashboard), &body)
}

pub fn new_greenhouse_page(
    locale: Locale,
    user: &SessionUser,
    plants: &[Plant],
    error: Option<Msg>,
) -> Html<String> {
    let t = |m| locale.text(m);
    let mut options = format!(r#"<option value="">{}</option>"#, t(Msg::NoPlant));
    for p in plants {
        let _ = write!(options, r#"<option value="{}">{}</option>"#, p.id, escape(&p.name));
    }
    let body = format!(
        r#"{err}<form method="post" action="/greenhouses/new">
<label>{n} <input name="name"></label>
<label>{l} <input name="location"></label>
<label>{p} <select name="plant_id">{options}</select></label>
<button>{submit}</button>
</form>"#,
        err = error_banner(locale, error),
        n = t(Msg::Name),
        l = t(Msg::Location),
        p = t(Msg::Plant),
        submit = t(Msg::AddGreenhouse),
    );
    layout(locale, Some(user), t(Msg::AddGreenhouse), &body)
}

/// Data for the greenhouse detail page. `pending` is `None` for viewers who
/// are not the owner.
pub struct GreenhouseView {
    pub greenhouse: Greenhouse,
    pub plant: Option<Plant>,
    pub readings: Vec<SensorReading>,
    pub issues: Vec<Issue>,
    pub pending: Option<Vec<ControlCommand>>,
}

/// `error` is shown above the page body, e.g. after a rejected control form.
pub fn greenhouse_page(
    locale: Locale,
    user: &SessionUser,
    view: &GreenhouseView,
    error: Option<Msg>,
) -> Html<String> {
    let t = |m| locale.text(m);
    let gh = &view.greenhouse;
    let mut body = error_banner(locale, error);

    if let Some(loc) = &gh.location {
        let _ = write!(body, "<p>{}: {}</p>", t(Msg::Location), escape(loc));
    }

    if let Some(plant) = &view.plant {
        let _ = write!(
            body,
            "<h2>{}: {}</h2><table><tr><th></th><th>{}</th></tr>",
            t(Msg::Plant),
            escape(&plant.name),
            t(Msg::Range)
        );
        for (label, min, max) in plant.ranges() {
            let _ = write!(body, "<tr><td>{label}</td><td>{} - {}</td></tr>", num(min), num(max));
        }
        body.push_str("</table>");
    }

    let _ = write!(body, "<h2>{}</h2>", t(Msg::Readings));
    if view.readings.is_empty() {
        let _ = write!(body, "<p>{}</p>", t(Msg::NoReadings));
    } else {
        let _ = write!(body, "<table><tr>{READING_HEADER}</tr>");
        for r in &view.readings {
            let _ = write!(body, "<tr>{}</tr>", reading_cells(r));
        }
        body.push_str("</table>");
    }

    if let Some(pending) = &view.pending {
        let _ = write!(body, "<h2>{}</h2>", t(Msg::PendingCommands));
        if pending.is_empty() {
            let _ = write!(body, "<p>{}</p>", t(Msg::NoPendingCommands));
        } else {
            body.push_str("<ol>");
            for c in pending {
                let _ = write!(
                    body,
                    "<li>{} {}: {}</li>",
                    c.created_at.format("%Y-%m-%d %H:%M:%S"),
                    escape(&c.device),
                    escape(&c.action)
                );
            }
            body.push_str("</ol>");
        }
        let _ = write!(
            body,
            r#"<form method="post" action="/greenhouses/{id}/control">
<label>{d} <input name="device" placeholder="pump"></label>
<label>{a} <input name="action" placeholder="on"></label>
<button>{send}</button>
</form>"#,
            id = gh.id,
            d = t(Msg::Device),
            a = t(Msg::Action),
            send = t(Msg::SendCommand),
        );
    }

    let _ = write!(body, "<h2>{}</h2>", t(Msg::Issues));
    body.push_str(&issue_list(locale, &view.issues, false));

    layout(locale, Some(user), &gh.name, &body)
}

pub fn analyze_page(
    locale: Locale,
    user: &SessionUser,
    error: Option<Msg>,
    result: Option<&str>,
) -> Html<String> {
    let t = |m| locale.text(m);
    let result = result
        .map(|r| format!("<h2>{}</h2><p class=\"analysis\">{}</p>", t(Msg::AnalysisResult), escape(r)))
        .unwrap_or_default();
    let body = format!(
        r#"{err}<form method="post" action="/analyze" enctype="multipart/form-data">
<input type="file" name="image" accept="image/*">
<button>{upload}</button>
</form>
{result}"#,
        err = error_banner(locale, error),
        upload = t(Msg::Upload),
    );
    layout(locale, Some(user), t(Msg::AnalyzeImage), &body)
}

pub fn debug_page(
    locale: Locale,
    user: &SessionUser,
    greenhouses: &[Greenhouse],
    unresolved: &[Issue],
    error: Option<Msg>,
) -> Html<String> {
    let t = |m| locale.text(m);
    let mut options = String::new();
    for gh in greenhouses {
        let _ = write!(options, r#"<option value="{}">{}</option>"#, gh.id, escape(&gh.name));
    }
    let body = format!(
        r#"{err}<h2>{create}</h2>
<form method="post" action="/debug/issues">
<label>{g} <select name="greenhouse_id">{options}</select></label>
<label>{d} <input name="description"></label>
<label>{p} <input name="pin" type="password"></label>
<button>{create}</button>
</form>
<h2>{unresolved_title}</h2>
{issues}"#,
        err = error_banner(locale, error),
        create = t(Msg::CreateIssue),
        g = t(Msg::Greenhouses),
        d = t(Msg::Description),
        p = t(Msg::Pin),
        unresolved_title = t(Msg::UnresolvedIssues),
        issues = issue_list(locale, unresolved, true),
    );
    layout(locale, Some(user), "Debug", &body)
}

pub fn error_page(locale: Locale, msg: Msg) -> Html<String> {
    layout(locale, None, locale.text(msg), "<p><a href=\"/dashboard\">&larr;</a></p>")
}
