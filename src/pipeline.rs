//! Record enrichment: resolved year plus rendered citation.

use std::path::PathBuf;
use std::time::Duration;

use crate::cite::{build_citation, resolve_year, sort_records, AuthorPolicy, Clock};
use crate::config::Settings;
use crate::models::Record;
use crate::sources::{
    fetch_records, OpenAlexSource, PublicationQuery, PublicationSource, QueryScope, SourceError,
};
use crate::store::{self, StoreError};
use crate::utils::{HttpClient, RetryConfig, DEFAULT_USER_AGENT};

/// How records are enriched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Field the citation is written to
    pub citation_field: String,
    /// Author truncation rule
    pub policy: AuthorPolicy,
    /// Reorder newest first after enriching
    pub sort: bool,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            citation_field: "citation_nature".to_string(),
            policy: AuthorPolicy::nature(),
            sort: false,
        }
    }
}

/// Enrich one record.
///
/// The input is left untouched; the result is a copy with `year` and the
/// citation field set. Existing fields keep their position.
pub fn enrich_record(record: &Record, options: &EnrichOptions, clock: &dyn Clock) -> Record {
    let mut item = record.clone();
    let year = resolve_year(&item, clock);
    item.set("year", year);
    let citation = build_citation(&item, &options.policy, clock);
    item.set(&options.citation_field, citation);
    item
}

/// Enrich every record, then sort when asked to
pub fn enrich_collection(
    records: &[Record],
    options: &EnrichOptions,
    clock: &dyn Clock,
) -> Vec<Record> {
    let mut out: Vec<Record> = records
        .iter()
        .map(|r| enrich_record(r, options, clock))
        .collect();
    if options.sort {
        sort_records(&mut out, clock);
    }
    out
}

/// One enrich run: source, destination and flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sort: bool,
    pub no_backup: bool,
}

/// Outcome of an enrich run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichReport {
    /// Records written
    pub written: usize,
    /// Backup created before the destination was replaced
    pub backup: Option<PathBuf>,
    /// Why the backup could not be written, if it failed
    pub backup_warning: Option<String>,
}

/// Enrich `records` and write them to `output`, backing up what was there.
///
/// A failed backup is reported but does not stop the write.
pub fn write_enriched(
    records: &[Record],
    output: &std::path::Path,
    options: &EnrichOptions,
    no_backup: bool,
    clock: &dyn Clock,
) -> Result<EnrichReport, StoreError> {
    let enriched = enrich_collection(records, options, clock);
    let mut report = EnrichReport {
        written: enriched.len(),
        ..Default::default()
    };

    if !no_backup {
        match store::write_backup(output, clock) {
            Ok(Some(path)) => {
                tracing::info!("Backup written to {}", path.display());
                report.backup = Some(path);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Could not write backup: {}", e);
                report.backup_warning = Some(e.to_string());
            }
        }
    }

    store::write_collection(output, &enriched)?;
    Ok(report)
}

/// Run an enrich job: load, enrich, optionally sort, back up, write.
pub fn run_enrich(
    job: &EnrichJob,
    settings: &Settings,
    clock: &dyn Clock,
) -> Result<EnrichReport, StoreError> {
    let records = store::load_collection(&job.input)?;
    tracing::info!("Loaded {} records from {}", records.len(), job.input.display());

    let options = EnrichOptions {
        citation_field: settings.citation.field.clone(),
        policy: settings.citation.policy(),
        sort: job.sort,
    };
    write_enriched(&records, &job.output, &options, job.no_backup, clock)
}

/// Errors from a fetch run
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One fetch run: whose publications, where to write them, and flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    pub scope: QueryScope,
    pub output: PathBuf,
    /// Overrides `fetch.max_results`
    pub max_results: Option<usize>,
    /// Overrides `fetch.email`
    pub email: Option<String>,
    pub sort: bool,
    pub no_backup: bool,
}

/// Outcome of a fetch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub report: EnrichReport,
    /// Upstream items that could not be converted
    pub skipped: usize,
}

/// Fetch publications from `source`, enrich them with the fetch policy and
/// write them to the job's output.
pub async fn fetch_into(
    source: &dyn PublicationSource,
    job: &FetchJob,
    settings: &Settings,
    clock: &dyn Clock,
) -> Result<FetchSummary, FetchError> {
    let query = PublicationQuery::new(
        job.scope.clone(),
        job.max_results.unwrap_or(settings.fetch.max_results),
    );
    let retry = RetryConfig::default().max_attempts(settings.fetch.max_retries.saturating_add(1));

    let fetched = fetch_records(source, &query, retry).await?;
    if fetched.skipped > 0 {
        tracing::warn!("Skipped {} malformed items from {}", fetched.skipped, source.name());
    }

    let options = EnrichOptions {
        citation_field: settings.citation.field.clone(),
        policy: settings.fetch.policy(),
        sort: job.sort,
    };
    let report = write_enriched(&fetched.records, &job.output, &options, job.no_backup, clock)?;

    Ok(FetchSummary {
        report,
        skipped: fetched.skipped,
    })
}

/// Run a fetch job against OpenAlex
pub async fn run_fetch(
    job: &FetchJob,
    settings: &Settings,
    clock: &dyn Clock,
) -> Result<FetchSummary, FetchError> {
    let email = job.email.clone().or_else(|| settings.fetch.email.clone());
    let user_agent = match &email {
        Some(e) => format!("{} (mailto:{})", DEFAULT_USER_AGENT, e),
        None => DEFAULT_USER_AGENT.to_string(),
    };
    let timeout = Duration::from_secs(settings.fetch.timeout_secs);
    let client = HttpClient::with_options(&user_agent, timeout)?;

    let source = OpenAlexSource::new(client)
        .with_api_base(settings.fetch.api_base.clone())
        .with_email(email)
        .with_per_page(settings.fetch.per_page);

    fetch_into(&source, job, settings, clock).await
}
