//! Score command - rate content and suggest a tip

use crate::commands::content_scorer;
use crate::config::AppConfig;
use crate::display;

pub fn run_score(config: &AppConfig, text: &str, json: bool) -> anyhow::Result<()> {
    let analysis = content_scorer(config).analyze(text);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    display::heading("Content Analysis");
    display::analysis(&analysis, &config.session.default_token);
    display::note(&analysis.reasoning);
    println!();
    Ok(())
}
