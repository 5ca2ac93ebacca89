//! Fixes command implementation
//!
//! Computes the code fixes for a diagnostic at a position and optionally
//! writes the chosen one back to disk.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::App;
use crate::cli::ParsedLocation;
use crate::cli::output::TextRender;
use crate::services::fixes::{CodeAction, RULE_CA2235};
use crate::services::workspace::Workspace;

#[derive(Args, Debug)]
pub struct FixesArgs {
    #[command(subcommand)]
    pub command: FixesCommand,
}

#[derive(Subcommand, Debug)]
pub enum FixesCommand {
    /// List the fixes offered for a diagnostic at a position
    List {
        /// Flagged position (file:line[:column])
        location: ParsedLocation,

        /// Rule id of the diagnostic
        #[arg(long, default_value = RULE_CA2235)]
        rule: String,
    },

    /// Apply one fix
    Apply {
        /// Flagged position (file:line[:column])
        location: ParsedLocation,

        /// Fix index from `fixes list` (0-based)
        #[arg(long)]
        index: usize,

        /// Rule id of the diagnostic
        #[arg(long, default_value = RULE_CA2235)]
        rule: String,

        /// Write the changes (default: dry-run printing the new file contents)
        #[arg(long)]
        execute: bool,
    },
}

#[derive(Serialize)]
struct FixesListResponse {
    location: String,
    rule: String,
    count: usize,
    fixes: Vec<FixOutput>,
}

#[derive(Serialize)]
struct FixOutput {
    index: usize,
    title: String,
    equivalence_key: String,
}

impl TextRender for FixesListResponse {
    fn render_text(&self) -> String {
        if self.fixes.is_empty() {
            return format!("{} ({}): no fixes", self.location, self.rule);
        }
        let mut out = format!("{} ({}):", self.location, self.rule);
        for fix in &self.fixes {
            out.push_str(&format!("\n  [{}] {}", fix.index, fix.title));
        }
        out
    }
}

#[derive(Serialize)]
struct ApplyResponse {
    fix: String,
    dry_run: bool,
    changes: Vec<FileChangeOutput>,
}

#[derive(Serialize)]
struct FileChangeOutput {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_text: Option<String>,
}

impl TextRender for ApplyResponse {
    fn render_text(&self) -> String {
        let verb = if self.dry_run { "would change" } else { "changed" };
        let mut out = format!("{}: {} {} file(s)", self.fix, verb, self.changes.len());
        for change in &self.changes {
            out.push_str(&format!("\n--- {}", change.file));
            if let Some(text) = &change.new_text {
                out.push('\n');
                out.push_str(text);
            }
        }
        out
    }
}

async fn compute(
    app: &App,
    location: &ParsedLocation,
    rule: &str,
) -> Result<(Workspace, Vec<CodeAction>)> {
    let workspace = app.load_workspace().await?;
    let context = app.fix_context(
        &workspace,
        rule,
        &location.file,
        location.line,
        location.column,
    )?;
    let actions = app.fixes.fixes_for(&context).await?;
    Ok((workspace, actions))
}

fn select_fix<'a>(
    actions: &'a [CodeAction],
    index: usize,
    location: &ParsedLocation,
) -> Result<&'a CodeAction> {
    match actions.get(index) {
        Some(action) => Ok(action),
        None => bail!(
            "Fix index {} out of range ({} fix(es) available at {})",
            index,
            actions.len(),
            location
        ),
    }
}

pub async fn execute(args: FixesArgs, app: &App) -> Result<()> {
    let ctx = &app.output;

    match args.command {
        FixesCommand::List { location, rule } => {
            let (_, actions) = compute(app, &location, &rule).await?;
            let response = FixesListResponse {
                location: location.to_string(),
                rule,
                count: actions.len(),
                fixes: actions
                    .iter()
                    .enumerate()
                    .map(|(index, action)| FixOutput {
                        index,
                        title: action.title().to_string(),
                        equivalence_key: action.equivalence_key().to_string(),
                    })
                    .collect(),
            };
            ctx.print_success(&response);
        }

        FixesCommand::Apply {
            location,
            index,
            rule,
            execute: do_execute,
        } => {
            let (workspace, actions) = compute(app, &location, &rule).await?;
            let action = select_fix(&actions, index, &location)?;

            let mut changes = Vec::new();
            if do_execute {
                let applied = action.apply(workspace.solution())?;
                for id in applied.changed_documents(workspace.solution()) {
                    let Some(document) = applied.document(id) else {
                        continue;
                    };
                    let path = workspace.write_document(document).await?;
                    changes.push(FileChangeOutput {
                        file: ctx.relative_path(&path),
                        new_text: None,
                    });
                }
            } else {
                for document in action.changed_documents()? {
                    changes.push(FileChangeOutput {
                        file: document.path().display().to_string(),
                        new_text: Some(document.text()),
                    });
                }
            }

            let response = ApplyResponse {
                fix: action.title().to_string(),
                dry_run: !do_execute,
                changes,
            };
            ctx.print_success(&response);
        }
    }

    Ok(())
}
