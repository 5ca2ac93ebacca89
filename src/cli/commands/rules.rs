//! Rules command implementation

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::app::App;
use crate::cli::output::TextRender;
use crate::services::fixes::RuleInfo;

#[derive(Args, Debug)]
pub struct RulesArgs {}

#[derive(Serialize)]
struct RulesResponse {
    count: usize,
    rules: Vec<RuleInfo>,
}

impl TextRender for RulesResponse {
    fn render_text(&self) -> String {
        self.rules
            .iter()
            .map(|r| format!("{}: {}", r.provider, r.diagnostic_ids.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn execute(_args: RulesArgs, app: &App) -> Result<()> {
    let rules = app.fixes.rules();
    app.output.print_success(&RulesResponse {
        count: rules.len(),
        rules,
    });
    Ok(())
}
