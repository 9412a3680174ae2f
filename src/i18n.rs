//! Two-locale message catalog and per-request locale resolution.
//!
//! Resolution order: `?lang=` query parameter, `lang` cookie, configured
//! default. A valid `?lang=` is persisted by [`remember_locale`].

use std::{convert::Infallible, fmt, str::FromStr};

use axum::{
    extract::{FromRequestParts, Query, Request},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::{cookies, state::AppState};

pub const LOCALE_COOKIE: &str = "lang";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    /// First parseable candidate wins; falls back to `default`.
    pub fn resolve(query: Option<&str>, cookie: Option<&str>, default: Locale) -> Locale {
        [query, cookie]
            .into_iter()
            .flatten()
            .find_map(|c| c.parse().ok())
            .unwrap_or(default)
    }

    pub fn text(self, msg: Msg) -> &'static str {
        use Msg::*;
        match self {
            Locale::En => match msg {
                AppTitle => "Greenhouse Monitor",
                Login => "Log in",
                Logout => "Log out",
                Register => "Register",
                Username => "Username",
                Password => "Password",
                Role => "Role",
                Farmer => "Farmer",
                Technician => "Technician",
                InvalidCredentials => "Invalid username or password.",
                UsernameTaken => "That username is already taken.",
                MissingField => "Please fill in every field.",
                UnknownPlant => "Please choose a plant from the list.",
                Dashboard => "Dashboard",
                Greenhouses => "Greenhouses",
                NoGreenhouses => "No greenhouses yet.",
                AddGreenhouse => "Add greenhouse",
                Name => "Name",
                Location => "Location",
                Plant => "Plant",
                NoPlant => "(none)",
                LatestReading => "Latest reading",
                Readings => "Recent readings",
                NoReadings => "No readings yet.",
                PendingCommands => "Pending commands",
                NoPendingCommands => "No pending commands.",
                SendCommand => "Send command",
                Device => "Device",
                Action => "Action",
                Issues => "Issues",
                UnresolvedIssues => "Unresolved issues",
                NoIssues => "No issues.",
                Resolve => "Resolve",
                Description => "Description",
                Pin => "PIN",
                InvalidPin => "Invalid PIN.",
                CreateIssue => "Report issue",
                AnalyzeImage => "Analyze image",
                Upload => "Upload",
                MissingUpload => "Please choose an image to upload.",
                AnalysisResult => "Analysis result",
                Forbidden => "You are not allowed to do that.",
                NotFound => "Not found.",
                ServerError => "Something went wrong. Please try again later.",
                Range => "Acceptable range",
            },
            Locale::Es => match msg {
                AppTitle => "Monitor de Invernaderos",
                Login => "Iniciar sesión",
                Logout => "Cerrar sesión",
                Register => "Registrarse",
                Username => "Usuario",
                Password => "Contraseña",
                Role => "Rol",
                Farmer => "Agricultor",
                Technician => "Técnico",
                InvalidCredentials => "Usuario o contraseña incorrectos.",
                UsernameTaken => "Ese nombre de usuario ya existe.",
                MissingField => "Por favor complete todos los campos.",
                UnknownPlant => "Por favor elija una planta de la lista.",
                Dashboard => "Panel",
                Greenhouses => "Invernaderos",
                NoGreenhouses => "Todavía no hay invernaderos.",
                AddGreenhouse => "Añadir invernadero",
                Name => "Nombre",
                Location => "Ubicación",
                Plant => "Planta",
                NoPlant => "(ninguna)",
                LatestReading => "Última lectura",
                Readings => "Lecturas recientes",
                NoReadings => "Todavía no hay lecturas.",
                PendingCommands => "Comandos pendientes",
                NoPendingCommands => "No hay comandos pendientes.",
                SendCommand => "Enviar comando",
                Device => "Dispositivo",
                Action => "Acción",
                Issues => "Incidencias",
                UnresolvedIssues => "Incidencias sin resolver",
                NoIssues => "No hay incidencias.",
                Resolve => "Resolver",
                Description => "Descripción",
                Pin => "PIN",
                InvalidPin => "PIN incorrecto.",
                CreateIssue => "Reportar incidencia",
                AnalyzeImage => "Analizar imagen",
                Upload => "Subir",
                MissingUpload => "Por favor seleccione una imagen.",
                AnalysisResult => "Resultado del análisis",
                Forbidden => "No tiene permiso para hacer eso.",
                NotFound => "No encontrado.",
                ServerError => "Algo salió mal. Inténtelo de nuevo más tarde.",
                Range => "Rango aceptable",
            },
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "es" => Ok(Self::Es),
            other => Err(anyhow::anyhow!("unsupported locale: {other:?}")),
        }
    }
}

/// Catalog keys for user-visible strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    AppTitle,
    Login,
    Logout,
    Register,
    Username,
    Password,
    Role,
    Farmer,
    Technician,
    InvalidCredentials,
    UsernameTaken,
    MissingField,
    UnknownPlant,
    Dashboard,
    Greenhouses,
    NoGreenhouses,
    AddGreenhouse,
    Name,
    Location,
    Plant,
    NoPlant,
    LatestReading,
    Readings,
    NoReadings,
    PendingCommands,
    NoPendingCommands,
    SendCommand,
    Device,
    Action,
    Issues,
    UnresolvedIssues,
    NoIssues,
    Resolve,
    Description,
    Pin,
    InvalidPin,
    CreateIssue,
    AnalyzeImage,
    Upload,
    MissingUpload,
    AnalysisResult,
    Forbidden,
    NotFound,
    ServerError,
    Range,
}

#[derive(Debug, Default, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

fn query_lang(uri: &axum::http::Uri) -> Option<String> {
    Query::<LangQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.lang)
}

impl FromRequestParts<AppState> for Locale {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let query = query_lang(&parts.uri);
        let cookie = cookies::get(&parts.headers, LOCALE_COOKIE);
        Ok(Locale::resolve(
            query.as_deref(),
            cookie.as_deref(),
            state.config.default_locale,
        ))
    }
}

/// Middleware: persists a valid `?lang=` choice in the `lang` cookie.
pub async fn remember_locale(req: Request, next: Next) -> Response {
    let chosen = query_lang(req.uri()).and_then(|l| l.parse::<Locale>().ok());
    let mut res = next.run(req).await;
    if let Some(locale) = chosen {
        if let Some(v) = cookies::set(LOCALE_COOKIE, locale.code(), 60 * 60 * 24 * 365) {
            res.headers_mut().append(header::SET_COOKIE, v);
        }
    }
    res
}
