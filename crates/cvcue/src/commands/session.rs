//! Session cache handlers: `session login|status|clear`.

use chrono::{DateTime, Local, Utc};

use cvcue_core::{CoreError, SessionStatus};

use crate::cli::{GlobalOpts, SessionArgs, SessionCommand};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::color_enabled;

pub async fn handle(
    args: SessionArgs,
    settings: &Settings,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = color_enabled(settings, global);

    match args.command {
        SessionCommand::Login => {
            let config = settings.client_config()?;
            let client = config.client()?;
            let session = config
                .session_store()
                .login(&config.authenticator(client))
                .await
                .map_err(CoreError::from)?;
            let text = format!(
                "{}\n  Expires: {}",
                output::success("Login successful", color),
                local_time(session.expires_at)
            );
            output::print_output(&text, global.quiet);
            Ok(())
        }

        SessionCommand::Status { remote } => {
            let store = settings.session_store()?;
            let mut text = match store.status() {
                SessionStatus::Valid {
                    client_id,
                    issued_at,
                    expires_at,
                    remaining,
                } => format!(
                    "{}\n  Client:    {client_id}\n  Issued:    {}\n  Expires:   {}\n  Remaining: {}s",
                    output::success("Session is active", color),
                    local_time(issued_at),
                    local_time(expires_at),
                    remaining.as_secs()
                ),
                SessionStatus::Expired {
                    client_id,
                    expires_at,
                } => format!(
                    "{}\n  Client:  {client_id}\n  Expired: {}\n{}",
                    output::warning("Session is not active", color),
                    local_time(expires_at),
                    login_hint(color)
                ),
                SessionStatus::Missing => format!(
                    "{}\n{}",
                    output::warning("Session is not active", color),
                    login_hint(color)
                ),
            };

            if remote {
                if let Some(session) = store.load() {
                    let client = settings.remote_client()?;
                    let active = client.session_active(session.token()).await?;
                    text.push_str(if active {
                        "\n  Server:    session accepted"
                    } else {
                        "\n  Server:    session rejected"
                    });
                }
            }

            output::print_output(&text, global.quiet);
            Ok(())
        }

        SessionCommand::Clear => {
            settings.session_store()?.clear()?;
            output::print_output(
                &output::success("Session cache cleared", color),
                global.quiet,
            );
            Ok(())
        }
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

fn login_hint(color: bool) -> String {
    output::hint("Run 'cvcue session login' to create a new session.", color)
}
