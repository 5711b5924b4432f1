//! Troubleshooting page for TLS failures behind the managed host's proxy.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use super::config::{Config, Deployment};
use super::state::AppState;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:42rem;margin:3rem auto;padding:0 1rem;line-height:1.5}\
code{background:#f3f3f3;padding:0 .25rem;border-radius:3px}";

pub async fn page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render(&state.config).into_string())
}

pub fn render(config: &Config) -> Markup {
    let display_url = config.deployment.as_ref().map(Deployment::display_url);
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Connection troubleshooting" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                h1 { "Secure connection troubleshooting" }
                p {
                    "The browser could not complete a secure (TLS) connection to this app. "
                    "This is usually a problem with the hosting proxy, not with the app itself."
                }
                @if let Some(url) = &display_url {
                    p { "Deployment URL: " a href=(url) { (url) } }
                }
                h2 { "Symptoms" }
                ul {
                    li { code { "ERR_SSL_PROTOCOL_ERROR" } " or " code { "SSL_ERROR_RX_RECORD_TOO_LONG" } " in the browser" }
                    li { code { "wrong version number" } " or handshake failures in the server log" }
                    li { "The page loads over " code { "http://" } " but not over " code { "https://" } }
                }
                h2 { "Things to try" }
                ol {
                    li { "Open the app with an explicit " code { "https://" } " prefix." }
                    li { "Clear cached HSTS settings and site data for the domain." }
                    li { "Wait a few minutes after redeploying; certificates are provisioned asynchronously." }
                    li { "Restart the deployment." }
                }
                p {
                    "Environment: " code { (config.environment.to_string()) }
                    " · managed host: " code { (if config.managed_host { "yes" } else { "no" }) }
                }
            }
        }
    }
}
