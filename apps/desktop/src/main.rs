use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{ClientConfig, ConversionClient, DirectorySaver, FormController, SubmitError};
use form_core::{FieldValue, FormConfig, FormField, FormModel, NamePolicy};
use shared::{
    domain::SheetFile,
    i18n::{Catalog, Locale, Translate},
};
use tracing::{info, warn};

mod config;

/// Converts a music sheet (PNG, JPEG or PDF) into a MIDI file.
#[derive(Parser, Debug)]
#[command(name = "maestro", version, about)]
struct Args {
    /// Music sheet to convert
    sheet: PathBuf,
    /// MIDI file name, without the .mid extension
    #[arg(long)]
    name: Option<String>,
    /// Tempo override as TEMPO@MEASURE, with a trailing ! to force it.
    /// TEMPO may be left empty (e.g. @5)
    #[arg(long = "tempo", value_parser = TempoArg::from_str)]
    tempos: Vec<TempoArg>,
    #[arg(long)]
    page_start: Option<i64>,
    #[arg(long)]
    page_end: Option<i64>,
    /// Directory the MIDI file is written to
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[arg(long)]
    backend_url: Option<String>,
    /// en-US or fr-CA
    #[arg(long)]
    locale: Option<String>,
    /// Keep --name instead of deriving it from the sheet file name
    #[arg(long)]
    keep_name: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TempoArg {
    tempo: Option<i64>,
    measure: i64,
    force: bool,
}

impl FromStr for TempoArg {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (body, force) = match raw.strip_suffix('!') {
            Some(body) => (body, true),
            None => (raw, false),
        };
        let (tempo, measure) = body
            .split_once('@')
            .ok_or_else(|| format!("expected TEMPO@MEASURE, got '{raw}'"))?;

        let tempo = match tempo.trim() {
            "" => None,
            value => Some(
                value
                    .parse::<i64>()
                    .map_err(|_| format!("tempo '{value}' is not an integer"))?,
            ),
        };
        let measure = measure
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("measure '{}' is not an integer", measure.trim()))?;

        Ok(Self {
            tempo,
            measure,
            force,
        })
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = config::load_settings();

    let locale_tag = args.locale.clone().unwrap_or(settings.locale);
    let locale = Locale::from_str(&locale_tag).context("invalid locale")?;
    let catalog = Catalog::new(locale);

    let backend_url = args.backend_url.clone().unwrap_or(settings.backend_url);
    let mut client_config = ClientConfig::new(&backend_url).context("invalid backend url")?;
    if let Some(secs) = settings.request_timeout_secs {
        client_config = client_config.with_request_timeout(Duration::from_secs(secs));
    }
    let output_dir = args.output_dir.clone().unwrap_or(settings.output_dir);
    info!(
        backend_url = %client_config.backend_base_url(),
        output_dir = %output_dir.display(),
        locale = locale.tag(),
        "starting maestro"
    );

    let saver = Arc::new(DirectorySaver::new(output_dir));
    let client = Arc::new(ConversionClient::new(client_config, saver)?);

    let name_policy = if args.keep_name {
        NamePolicy::PreserveManualEdit
    } else {
        NamePolicy::AlwaysOverwrite
    };
    let form = FormModel::new(FormConfig {
        name_policy,
        ..FormConfig::default()
    });
    let mut controller = FormController::new(form, client);

    let sheet = read_sheet(&args.sheet).await?;
    fill_form(&mut controller, &args, sheet)?;

    println!(
        "{}",
        catalog.translate(
            "Status.Converting",
            &[("fileName", args.sheet.display().to_string())]
        )
    );
    match controller.submit().await {
        Ok(saved) => {
            println!(
                "{}",
                catalog.translate("Status.Saved", &[("path", saved.location)])
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_failure(&controller, &catalog, &err);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn read_sheet(path: &Path) -> Result<SheetFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read sheet '{}'", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("'{}' has no file name", path.display()))?;
    Ok(SheetFile::new(file_name, bytes))
}

/// Replays the arguments the way a user fills the form: name first, then
/// the sheet, then tempo rows and the page range.
fn fill_form(controller: &mut FormController, args: &Args, sheet: SheetFile) -> Result<()> {
    if let Some(name) = &args.name {
        controller.set_field(FormField::MidiFileName, FieldValue::Text(name.clone()))?;
        if !args.keep_name {
            warn!("--name is replaced by the sheet name unless --keep-name is set");
        }
    }
    controller.attach_file(Some(sheet));

    let first_row = controller.form().tempo_overrides()[0].id;
    for (index, arg) in args.tempos.iter().enumerate() {
        let id = if index == 0 {
            first_row
        } else {
            controller.add_tempo_override()
        };
        controller.set_field(FormField::Tempo(id), FieldValue::Integer(arg.tempo))?;
        controller.set_field(FormField::Measure(id), FieldValue::Integer(Some(arg.measure)))?;
        if arg.force || index > 0 {
            controller.set_field(FormField::Force(id), FieldValue::Flag(arg.force))?;
        }
    }

    if args.page_start.is_some() || args.page_end.is_some() {
        controller.set_field(FormField::PageRangeEnabled, FieldValue::Flag(true))?;
        controller.set_field(FormField::PageRangeStart, FieldValue::Integer(args.page_start))?;
        controller.set_field(FormField::PageRangeEnd, FieldValue::Integer(args.page_end))?;
    }
    Ok(())
}

fn report_failure(controller: &FormController, catalog: &Catalog, err: &SubmitError) {
    match err.translation_key() {
        Some(key) => eprintln!("{}", catalog.translate(key, &[])),
        None => eprintln!(
            "{}",
            catalog.translate("Status.Failed", &[("message", err.to_string())])
        ),
    }
    if err.kind().is_inline() {
        for (path, message) in controller.field_messages(catalog) {
            eprintln!("  {path:?}: {message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tempo_with_force_marker() {
        let arg: TempoArg = "90@4!".parse().expect("parse");
        assert_eq!(
            arg,
            TempoArg {
                tempo: Some(90),
                measure: 4,
                force: true
            }
        );
    }

    #[test]
    fn tempo_may_be_left_empty() {
        let arg: TempoArg = "@7".parse().expect("parse");
        assert_eq!(arg.tempo, None);
        assert_eq!(arg.measure, 7);
        assert!(!arg.force);
    }

    #[test]
    fn rejects_malformed_tempo_args() {
        assert!("120".parse::<TempoArg>().is_err());
        assert!("fast@3".parse::<TempoArg>().is_err());
        assert!("120@".parse::<TempoArg>().is_err());
    }

    #[test]
    fn cli_collects_repeated_tempos() {
        let args = Args::try_parse_from([
            "maestro",
            "sonata.pdf",
            "--tempo",
            "100@1",
            "--tempo",
            "80@9!",
            "--page-start",
            "2",
            "--keep-name",
        ])
        .expect("args");
        assert_eq!(args.tempos.len(), 2);
        assert!(args.tempos[1].force);
        assert_eq!(args.page_start, Some(2));
        assert_eq!(args.page_end, None);
        assert!(args.keep_name);
    }
}
