use clap::Subcommand;
use serde_json::json;

use crate::api::format::person_name;
use crate::auth::Session;
use crate::cli::config::{load_profile, save_profile};
use crate::cli::utils::{output_error, output_success, output_value};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum SessionCommands {
    #[command(about = "Set the backend API base URL (e.g. https://firm.example/api)")]
    SetUrl {
        #[arg(help = "API base URL")]
        url: String,
    },

    #[command(about = "Store the session cookie issued by the backend at login")]
    SetCookie {
        #[arg(help = "Cookie header value, e.g. \"connect.sid=...\"")]
        cookie: String,
    },

    #[command(about = "Verify the session and show the current user")]
    Whoami,

    #[command(about = "End the backend session and forget the cookie")]
    Logout,

    #[command(about = "Show the saved profile")]
    Show,
}

pub async fn handle(cmd: SessionCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut profile = load_profile()?;

    match cmd {
        SessionCommands::SetUrl { url } => {
            let url = url.trim().trim_end_matches('/').to_string();
            url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", url, e))?;
            profile.base_url = Some(url.clone());
            profile.current_user = None;
            profile.touch();
            save_profile(&profile)?;
            output_success(&output_format, &format!("Using {}", url), Some(json!({ "base_url": url })))
        }
        SessionCommands::SetCookie { cookie } => {
            profile.session_cookie = Some(cookie);
            profile.current_user = None;
            profile.touch();
            save_profile(&profile)?;
            output_success(&output_format, "Session cookie saved", None)
        }
        SessionCommands::Whoami => {
            let mut session = Session::with_user(profile.client()?, profile.current_user.clone());
            match session.restore().await {
                Some(user) => {
                    let user = user.clone();
                    profile.current_user = Some(user.clone());
                    profile.touch();
                    save_profile(&profile)?;

                    output_value(&output_format, &user, || {
                        vec![
                            format!("User:  {}", person_name(&user)),
                            format!("ID:    {}", user.user_id),
                            format!(
                                "Role:  {}",
                                user.user_role.as_ref().map(|r| r.as_str()).unwrap_or("-")
                            ),
                        ]
                    })
                }
                None => {
                    profile.current_user = None;
                    save_profile(&profile)?;
                    output_error(&output_format, "Not signed in", Some("UNAUTHORIZED"))
                }
            }
        }
        SessionCommands::Logout => {
            let mut session = Session::with_user(profile.client()?, profile.current_user.clone());
            let failure = session.logout().await;

            profile.session_cookie = None;
            profile.current_user = None;
            profile.touch();
            save_profile(&profile)?;

            match failure {
                None => output_success(&output_format, "Logged out", None),
                Some(e) => output_success(
                    &output_format,
                    &format!("Local session cleared (backend logout failed: {})", e),
                    Some(json!({ "backend_error": e.error_code() })),
                ),
            }
        }
        SessionCommands::Show => {
            let redacted = json!({
                "base_url": profile.base_url(),
                "session_cookie": profile.session_cookie.as_ref().map(|_| "<set>"),
                "current_user": profile.current_user,
                "updated_at": profile.updated_at,
            });
            output_value(&output_format, &redacted, || {
                vec![
                    format!("URL:     {}", profile.base_url()),
                    format!(
                        "Cookie:  {}",
                        if profile.session_cookie.is_some() { "set" } else { "not set" }
                    ),
                    format!(
                        "User:    {}",
                        profile.current_user.as_ref().map(person_name).unwrap_or_else(|| "-".into())
                    ),
                ]
            })
        }
    }
}
