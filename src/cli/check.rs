//! Environment check command.

use console::style;

use super::icons::{error, info, success, warn};
use crate::config::Settings;
use crate::llm::AiEnhancer;
use crate::ocr::TextExtractor;

/// Report extraction tool availability and the AI setup.
pub async fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("{}", style("Extraction tools").bold());
    let tools = TextExtractor::check_tools(&settings.extraction);
    for (tool, available) in &tools {
        if *available {
            println!("  {} {}", success(), tool);
        } else {
            println!("  {} {} {}", error(), tool, style("(not found in PATH)").dim());
        }
    }
    println!(
        "  {} OCR language: {}",
        style("→").dim(),
        settings.extraction.ocr_language
    );
    if tools.iter().any(|(_, available)| !available) {
        println!(
            "  {} Some extraction tools are missing; PDF or image uploads will fail",
            warn()
        );
    }

    println!();
    println!("{}", style("AI enhancement").bold());
    let ai = &settings.ai;
    if !ai.is_configured() {
        println!(
            "  {} No API key (set GEMINI_API_KEY or GOOGLE_API_KEY); responses will omit AI insights",
            warn()
        );
        return Ok(());
    }

    println!("  {} API key configured", success());
    println!("  {} Endpoint: {}", style("→").dim(), ai.endpoint);
    println!("  {} Discovering models...", info());
    let model = AiEnhancer::from_config(ai.clone())?.select_model().await;
    println!("  {} Selected model: {}", success(), style(model).cyan());

    Ok(())
}
