//! Local one-shot analysis command.

use std::path::Path;

use console::style;

use crate::config::Settings;
use crate::models::SourceDocument;
use crate::ocr::TextExtractor;
use crate::server::resolve_content_type;
use crate::services::AnalysisService;

/// Run the pipeline on a local file and print the response JSON to stdout.
pub async fn cmd_analyze(
    settings: &Settings,
    file: &Path,
    mime: Option<&str>,
    no_ai: bool,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
    if bytes.is_empty() {
        anyhow::bail!("{} is empty", file.display());
    }

    let file_name = file.file_name().and_then(|n| n.to_str());
    let content_type = resolve_content_type(mime, file_name, &bytes);
    eprintln!(
        "{} {} ({} bytes, {})",
        style("→").dim(),
        file.display(),
        bytes.len(),
        content_type
    );

    let service = if no_ai {
        AnalysisService::new(TextExtractor::from_config(&settings.extraction), None)
    } else {
        AnalysisService::from_settings(settings)?
    };

    let response = service
        .process(SourceDocument::new(bytes, content_type))
        .await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
