//! Device listing handlers: `list-aps` and `get-all-aps`.

use std::io::{self, IsTerminal};
use std::time::Duration;

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use cvcue_core::{
    CommandExecutor, CountSource, CoreError, CueAuthenticator, CueClient, FilterMode, ListMode,
    ListOutcome, ListRequest, ProjectionMode, QueryIntent, RenderableOutput, SessionStore,
};

use crate::cli::{
    CountFrom, FilterOperatorArg, GetAllApsArgs, GlobalOpts, ListApsArgs, PageOutput, QueryArgs,
    SweepOutput,
};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::color_enabled;

type Executor = CommandExecutor<CueAuthenticator, CueClient>;

// ── list-aps ────────────────────────────────────────────────────────

pub async fn list_aps(
    args: ListApsArgs,
    settings: &Settings,
    global: &GlobalOpts,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let format = args
        .output
        .or_else(|| PageOutput::from_str(&settings.config.defaults.output, true).ok())
        .unwrap_or(PageOutput::Table);
    let start_index = args.query.startindex.unwrap_or(0);

    let mut intent = query_intent(args.query, settings.config.defaults.list_page_size);
    intent.total_count = args.total_count;
    let request = ListRequest {
        intent,
        mode: ListMode::SinglePage,
        projection: match format {
            PageOutput::Json => ProjectionMode::Raw,
            PageOutput::Table => ProjectionMode::Table,
            PageOutput::Compact => ProjectionMode::Compact,
        },
    };

    let executor = executor(settings, cancel)?;
    let outcome = executor
        .list(&request)
        .await
        .map_err(|err| into_cli_error(err, executor.sessions()))?;

    let ListOutcome {
        output: projected,
        total_count,
        has_more,
        ..
    } = outcome;
    let received = match &projected {
        RenderableOutput::Raw(records) => records.len(),
        RenderableOutput::Table(table) => table.rows.len(),
        RenderableOutput::Compact(listing) => listing.lines.len() + listing.skipped,
        RenderableOutput::Count(n) => usize::try_from(*n).unwrap_or(usize::MAX),
    };

    let rendered = match projected {
        RenderableOutput::Raw(records) => {
            let mut body = json!({ "managedDevices": records });
            if let (true, Some(total)) = (args.total_count, total_count) {
                body["totalCount"] = json!(total);
            }
            output::render_json(&body)?
        }
        RenderableOutput::Table(table) => {
            let found = table.rows.len();
            let mut text = output::render(&RenderableOutput::Table(table))?;
            if found > 0 {
                text = format!("Found {found} devices:\n{text}");
            }
            if let (true, Some(total)) = (args.total_count, total_count) {
                text.push_str(&format!("\nTotal: {total}"));
            }
            text
        }
        other => output::render(&other)?,
    };

    output::print_output(&rendered, global.quiet);
    if has_more && !global.quiet {
        let next = start_index.saturating_add(i64::try_from(received).unwrap_or(i64::MAX));
        eprintln!(
            "{}",
            output::hint(
                &format!("More devices available, continue with --startindex {next}"),
                color_enabled(settings, global),
            )
        );
    }
    Ok(())
}

// ── get-all-aps ─────────────────────────────────────────────────────

pub async fn get_all_aps(
    args: GetAllApsArgs,
    settings: &Settings,
    global: &GlobalOpts,
    cancel: CancellationToken,
) -> Result<(), CliError> {
    let request = sweep_request(args, settings.config.defaults.sweep_page_size);

    let executor = executor(settings, cancel)?;
    let progress = spinner(global.quiet);
    let result = executor
        .list_with_progress(&request, |pages, records| {
            progress.set_message(format!("Fetched {records} devices ({pages} pages)"));
        })
        .await;
    progress.finish_and_clear();
    let outcome = result.map_err(|err| into_cli_error(err, executor.sessions()))?;

    let rendered = match outcome.output {
        RenderableOutput::Table(table) if !table.rows.is_empty() => {
            let found = table.rows.len();
            let text = output::render(&RenderableOutput::Table(table))?;
            format!("Found {found} devices:\n{text}")
        }
        other => output::render(&other)?,
    };
    output::print_output(&rendered, global.quiet);
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────

fn query_intent(query: QueryArgs, default_page_size: u32) -> QueryIntent {
    QueryIntent {
        active: query.active,
        models: query.model,
        names: query.name,
        filters: query.filters,
        filter_mode: match query.filter_operator {
            FilterOperatorArg::And => FilterMode::And,
            FilterOperatorArg::Or => FilterMode::Or,
        },
        sort_by: query.sortby,
        descending: query.descending,
        page_size: Some(query.pagesize.unwrap_or(i64::from(default_page_size))),
        start_index: query.startindex,
        total_count: false,
        location_id: query.location_id,
    }
}

fn sweep_request(args: GetAllApsArgs, default_page_size: u32) -> ListRequest {
    let projection = match args.output.unwrap_or(SweepOutput::Json) {
        SweepOutput::Json => ProjectionMode::Raw,
        SweepOutput::Table => ProjectionMode::Table,
        SweepOutput::Compact => ProjectionMode::Compact,
        SweepOutput::Count => ProjectionMode::Count(match args.count_from {
            CountFrom::Local => CountSource::Local,
            CountFrom::Server => CountSource::Server,
        }),
    };
    let mut intent = query_intent(args.query, default_page_size);
    // The server only reports totalCount when asked for it.
    intent.total_count = projection == ProjectionMode::Count(CountSource::Server);
    ListRequest {
        intent,
        mode: ListMode::All,
        projection,
    }
}

fn executor(settings: &Settings, cancel: CancellationToken) -> Result<Executor, CliError> {
    let config = settings.client_config()?;
    let client = config.client()?;
    let authenticator = config.authenticator(client.clone());
    Ok(CommandExecutor::new(config.session_store(), authenticator, client).with_cancellation(cancel))
}

/// A rejected session is dropped from the cache so the next run logs in.
fn into_cli_error(err: CoreError, sessions: &SessionStore) -> CliError {
    let err = CliError::from(err);
    if matches!(err, CliError::SessionRejected) {
        if let Err(clear_err) = sessions.clear() {
            warn!("{clear_err}");
        }
    }
    err
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message("Fetching devices");
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    fn list_args(argv: &[&str]) -> ListApsArgs {
        let cli = Cli::try_parse_from(argv).expect("parse");
        match cli.command {
            Command::ListAps(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn page_size_falls_back_to_configured_default() {
        let args = list_args(&["cvcue", "list-aps"]);
        let intent = query_intent(args.query, 10);
        assert_eq!(intent.page_size, Some(10));
        assert_eq!(intent.start_index, None);
    }

    #[test]
    fn flags_map_onto_intent() {
        let args = list_args(&[
            "cvcue",
            "list-aps",
            "--model",
            "AP-555",
            "--model",
            "C-250",
            "--filter",
            "name:contains:Arista",
            "--filter-operator",
            "or",
            "--active",
            "true",
            "--pagesize",
            "50",
            "--sortby",
            "name",
            "--descending",
        ]);
        let intent = query_intent(args.query, 10);
        assert_eq!(intent.models, vec!["AP-555", "C-250"]);
        assert_eq!(intent.filters, vec!["name:contains:Arista"]);
        assert_eq!(intent.filter_mode, FilterMode::Or);
        assert_eq!(intent.active, Some(true));
        assert_eq!(intent.page_size, Some(50));
        assert_eq!(intent.sort_by.as_deref(), Some("name"));
        assert!(intent.descending);
    }

    #[test]
    fn negative_page_size_reaches_the_compiler() {
        let args = list_args(&["cvcue", "list-aps", "--pagesize", "-5"]);
        let intent = query_intent(args.query, 10);
        assert!(cvcue_core::query::compile(&intent).is_err());
    }

    fn sweep_args(argv: &[&str]) -> GetAllApsArgs {
        let cli = Cli::try_parse_from(argv).expect("parse");
        match cli.command {
            Command::GetAllAps(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn server_count_requests_total_from_the_api() {
        let args = sweep_args(&[
            "cvcue",
            "get-all-aps",
            "--output",
            "count",
            "--count-from",
            "server",
        ]);
        let request = sweep_request(args, 100);
        assert_eq!(
            request.projection,
            ProjectionMode::Count(CountSource::Server)
        );
        assert!(request.intent.total_count);
        assert_eq!(request.intent.page_size, Some(100));
    }

    #[test]
    fn local_count_skips_the_total() {
        let args = sweep_args(&["cvcue", "get-all-aps", "--output", "count"]);
        assert!(!sweep_request(args, 100).intent.total_count);
    }
}
