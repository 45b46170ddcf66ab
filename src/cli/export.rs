//! The `export` command
//!
//! Gathers options from flags and, unless `--no-interactive` is given, from
//! prompts, then hands a fully resolved plan to the export service.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use super::prompt::{prompt_access_password, Prompter};
use crate::config::{ExportPaths, Settings, MAX_DETAIL_WORKERS};
use crate::crypto::SecureString;
use crate::error::{ExportError, ExportResult};
use crate::export::FontFileProvider;
use crate::filter::EntryFilter;
use crate::import::{ArchiveSource, CsvSource, EntrySource, OpCli, OpSource, SourceKind};
use crate::models::{Layout, RenderOptions};
use crate::services::export::{with_pdf_extension, ExportService, ExportSummary};

const RISK_NOTICE: &str = "The PDF will contain your secrets. Anyone who learns its \
                           password can read every exported entry.";

/// Arguments of `vault-pdf export`
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Output PDF path (".pdf" is appended when missing)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Entry layout
    #[arg(long, value_enum)]
    pub layout: Option<Layout>,

    /// Replace passwords with a fixed-length mask
    #[arg(long)]
    pub mask_passwords: bool,

    /// Acknowledge that the document will contain secrets
    #[arg(long = "i-understand-the-risk")]
    pub understand_risk: bool,

    /// Keep entries whose title, username or URL contains this text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Password that opens the PDF
    #[arg(long, env = "VAULT_PDF_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Fail instead of prompting for anything missing
    #[arg(long)]
    pub no_interactive: bool,

    /// Read entries from a CSV export instead of the op CLI
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// CSV delimiter (first character is used)
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Read entries from a 1PUX/ZIP export archive
    #[arg(long, visible_alias = "onepux")]
    pub archive: Option<PathBuf>,

    /// Only export these vaults (repeatable)
    #[arg(long = "vault")]
    pub vaults: Vec<String>,

    /// Concurrent detail fetches for the op CLI
    #[arg(long)]
    pub workers: Option<usize>,
}

/// Where entries come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Op,
    Csv { path: PathBuf, delimiter: String },
    Archive { path: PathBuf },
}

impl SourceSpec {
    fn kind(&self) -> SourceKind {
        match self {
            Self::Op => SourceKind::Op,
            Self::Csv { .. } => SourceKind::Csv,
            Self::Archive { .. } => SourceKind::Archive,
        }
    }
}

/// Fully resolved export request
#[derive(Debug, Clone)]
pub struct ExportPlan {
    pub source: SourceSpec,
    pub output: PathBuf,
    pub options: RenderOptions,
    pub filter: EntryFilter,
    pub workers: usize,
}

fn source_from_flags(args: &ExportArgs, settings: &Settings) -> SourceSpec {
    let as_str = |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().into_owned());
    let csv = as_str(&args.csv);
    let archive = as_str(&args.archive);

    match SourceKind::detect(csv.as_deref(), archive.as_deref()) {
        SourceKind::Csv => SourceSpec::Csv {
            path: args.csv.clone().unwrap_or_default(),
            delimiter: args
                .delimiter
                .clone()
                .unwrap_or_else(|| settings.csv_delimiter.clone()),
        },
        SourceKind::Archive => SourceSpec::Archive {
            path: args.archive.clone().unwrap_or_default(),
        },
        SourceKind::Op => SourceSpec::Op,
    }
}

fn workers(args: &ExportArgs, settings: &Settings) -> usize {
    args.workers
        .map(|w| w.clamp(1, MAX_DETAIL_WORKERS))
        .unwrap_or_else(|| settings.effective_workers())
}

#[allow(clippy::too_many_arguments)]
fn build_plan(
    args: &ExportArgs,
    settings: &Settings,
    source: SourceSpec,
    output: PathBuf,
    password: SecureString,
    layout: Layout,
    mask: bool,
    search: &str,
    vaults: &[String],
) -> ExportPlan {
    let options = RenderOptions::new(source.kind().label(), password)
        .with_layout(layout)
        .with_masking(mask);
    ExportPlan {
        source,
        output: with_pdf_extension(&output),
        options,
        filter: EntryFilter::new().with_vaults(vaults).with_query(search),
        workers: workers(args, settings),
    }
}

/// Resolve a plan from flags alone
pub fn plan_non_interactive(args: &ExportArgs, settings: &Settings) -> ExportResult<ExportPlan> {
    if !args.understand_risk {
        return Err(ExportError::Validation(
            "--i-understand-the-risk is required with --no-interactive".into(),
        ));
    }
    let output = args.out.clone().ok_or_else(|| {
        ExportError::Validation("--out is required with --no-interactive".into())
    })?;
    let password = SecureString::new(args.password.clone().unwrap_or_default());
    if password.is_blank() {
        return Err(ExportError::MissingAccessPassword);
    }

    Ok(build_plan(
        args,
        settings,
        source_from_flags(args, settings),
        output,
        password,
        args.layout.unwrap_or(settings.default_layout),
        args.mask_passwords || settings.mask_passwords,
        args.search.as_deref().unwrap_or_default(),
        &args.vaults,
    ))
}

/// Resolve a plan by asking for everything the flags left open.
///
/// `read_password` and `list_vaults` are only called when needed.
pub fn plan_interactive<R, W>(
    args: &ExportArgs,
    settings: &Settings,
    prompter: &mut Prompter<R, W>,
    read_password: impl FnOnce() -> ExportResult<SecureString>,
    list_vaults: impl FnOnce() -> ExportResult<Vec<String>>,
) -> ExportResult<ExportPlan>
where
    R: BufRead,
    W: Write,
{
    if !args.understand_risk {
        prompter.say(RISK_NOTICE)?;
        if !prompter.confirm("Continue?", false)? {
            return Err(ExportError::Cancelled("risk not acknowledged".into()));
        }
    }

    let source = if args.csv.is_some() || args.archive.is_some() {
        source_from_flags(args, settings)
    } else {
        match prompter.choose("Source", &["op CLI", "CSV file", "1PUX archive"], 0)? {
            1 => SourceSpec::Csv {
                path: ask_path(prompter, "CSV file")?,
                delimiter: args
                    .delimiter
                    .clone()
                    .unwrap_or_else(|| settings.csv_delimiter.clone()),
            },
            2 => SourceSpec::Archive {
                path: ask_path(prompter, "Archive file")?,
            },
            _ => SourceSpec::Op,
        }
    };

    let output = match &args.out {
        Some(out) => out.clone(),
        None => PathBuf::from(prompter.ask("Output file", &settings.default_output)?),
    };

    let layout = match args.layout {
        Some(layout) => layout,
        None => {
            let default = match settings.default_layout {
                Layout::Compact => 0,
                Layout::Detailed => 1,
            };
            match prompter.choose("Layout", &["compact", "detailed"], default)? {
                1 => Layout::Detailed,
                _ => Layout::Compact,
            }
        }
    };

    let password = match &args.password {
        Some(password) if !password.trim().is_empty() => SecureString::new(password.clone()),
        _ => read_password()?,
    };

    let mask = args.mask_passwords
        || prompter.confirm("Mask passwords in the PDF?", settings.mask_passwords)?;

    let search = match &args.search {
        Some(search) => search.clone(),
        None => prompter.ask("Search filter (blank for none)", "")?,
    };

    let vaults = if !args.vaults.is_empty() || source != SourceSpec::Op {
        args.vaults.clone()
    } else if prompter.confirm("Limit the export to specific vaults?", false)? {
        let names = list_vaults()?;
        prompter.multi_select("Vaults", &names)?
    } else {
        Vec::new()
    };

    Ok(build_plan(
        args, settings, source, output, password, layout, mask, &search, &vaults,
    ))
}

fn ask_path<R: BufRead, W: Write>(prompter: &mut Prompter<R, W>, question: &str) -> ExportResult<PathBuf> {
    let answer = prompter.ask(question, "")?;
    if answer.is_empty() {
        return Err(ExportError::Validation(format!("{} path is required", question)));
    }
    Ok(PathBuf::from(answer))
}

fn op_source(settings: &Settings, plan_vaults: &[String], workers: usize) -> OpSource<OpCli> {
    OpSource::new(OpCli::new(settings.op_binary.clone()))
        .with_workers(workers)
        .with_vaults(plan_vaults)
}

fn build_source(plan: &ExportPlan, settings: &Settings) -> Box<dyn EntrySource> {
    match &plan.source {
        SourceSpec::Op => Box::new(op_source(settings, plan.filter.vaults(), plan.workers)),
        SourceSpec::Csv { path, delimiter } => {
            Box::new(CsvSource::new(path.clone()).with_delimiter(delimiter))
        }
        SourceSpec::Archive { path } => Box::new(ArchiveSource::new(path.clone())),
    }
}

/// Handle `vault-pdf export`
pub fn handle_export_command(
    paths: &ExportPaths,
    settings: &Settings,
    args: ExportArgs,
) -> ExportResult<ExportSummary> {
    let plan = if args.no_interactive {
        plan_non_interactive(&args, settings)?
    } else {
        let mut prompter = Prompter::terminal();
        plan_interactive(&args, settings, &mut prompter, prompt_access_password, || {
            let vaults = op_source(settings, &[], 1).list_vaults()?;
            Ok(vaults.into_iter().map(|v| v.name).collect())
        })?
    };
    debug!(source = ?plan.source, output = %plan.output.display(), "resolved export plan");

    let source = build_source(&plan, settings);
    let service = ExportService::new(FontFileProvider::from_config(paths, settings));

    eprintln!("Exporting from {}...", source.label());
    service.run(source.as_ref(), &plan.filter, &plan.options, &plan.output)
}
