use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
};
use chrono::Utc;
use serde::Serialize;
use shared::domain::{Event, MemberSummary};
use tracing::error;

use crate::app_state::AppState;

const UPCOMING_LIMIT: u32 = 10;

pub(crate) const FAVICON_SVG: &str = concat!(
    r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 32 32">"##,
    r##"<rect width="32" height="32" rx="6" fill="#1f4e79"/>"##,
    r##"<text x="16" y="22" font-size="16" text-anchor="middle" fill="#ffffff" font-family="sans-serif">A</text>"##,
    "</svg>"
);

/// Head metadata shared by every rendered page.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SiteMeta {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) favicon_href: String,
    pub(crate) viewport: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Asomameco".into(),
            description: "Asociación Maridos A Mecate Corto".into(),
            favicon_href: "/favicon.svg".into(),
            viewport: "width=device-width, initial-scale=1".into(),
        }
    }
}

/// State handed to client code through the member provider.
#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct MemberContext {
    pub(crate) member: Option<MemberSummary>,
}

pub(crate) fn render_page(site: &SiteMeta, member: &MemberContext, body: &str) -> String {
    // `<` is escaped so the JSON cannot close the script element.
    let member_json = serde_json::to_string(member)
        .unwrap_or_else(|_| "{\"member\":null}".to_string())
        .replace('<', "\\u003c");

    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"es\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<title>{title}</title>\n",
            "<link rel=\"icon\" href=\"{favicon}\">\n",
            "<meta name=\"description\" content=\"{description}\">\n",
            "<meta name=\"viewport\" content=\"{viewport}\">\n",
            "</head>\n",
            "<body>\n",
            "<script id=\"member-context\" type=\"application/json\">{member}</script>\n",
            "<div id=\"app\" data-provider=\"member\">\n",
            "{body}\n",
            "</div>\n",
            "</body>\n",
            "</html>\n"
        ),
        title = escape_html(&site.title),
        favicon = escape_html(&site.favicon_href),
        description = escape_html(&site.description),
        viewport = escape_html(&site.viewport),
        member = member_json,
        body = body,
    )
}

pub(crate) fn render_upcoming_events(events: &[Event]) -> String {
    let mut html = String::from("<main>\n<h1>Próximos eventos</h1>\n");
    if events.is_empty() {
        html.push_str("<p class=\"empty\">No hay eventos programados.</p>\n");
    } else {
        html.push_str("<ul class=\"events\">\n");
        for event in events {
            html.push_str(&format!(
                "<li data-event-id=\"{}\"><time datetime=\"{}\">{}</time> <strong>{}</strong>",
                event.id,
                event.starts_at.to_rfc3339(),
                event.starts_at.format("%d/%m/%Y %H:%M"),
                escape_html(&event.name),
            ));
            if let Some(location) = &event.location {
                html.push_str(&format!(" <span class=\"location\">{}</span>", escape_html(location)));
            }
            html.push_str("</li>\n");
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</main>");
    html
}

pub(crate) async fn landing_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let member = MemberContext::default();
    match state.events.upcoming(Utc::now(), UPCOMING_LIMIT).await {
        Ok(events) => (
            StatusCode::OK,
            Html(render_page(&state.site, &member, &render_upcoming_events(&events))),
        ),
        Err(err) => {
            error!(error = %err, "failed to load upcoming events");
            let body = "<main><p class=\"error\">Los eventos no están disponibles.</p></main>";
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_page(&state.site, &member, body)),
            )
        }
    }
}

pub(crate) async fn favicon() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        FAVICON_SVG,
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
