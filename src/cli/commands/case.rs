use std::cell::Cell;

use clap::Subcommand;
use serde_json::json;

use crate::api::format::{doc_status_label, format_currency, format_date_time, format_optional_currency};
use crate::api::{ApiClient, CaseApi};
use crate::cases::stage::render_stepper;
use crate::cases::{CaseAction, CaseActionError, CaseView};
use crate::cli::config::{load_profile, require_user, CliProfile};
use crate::cli::utils::{output_empty_collection, output_error, output_success, output_value, render_table};
use crate::cli::OutputFormat;
use crate::types::{Case, RecordId};

#[derive(Subcommand)]
pub enum CaseCommands {
    #[command(about = "List cases visible to the current user")]
    List,

    #[command(about = "Show a case with its stage, payments summary and documents")]
    Show {
        #[arg(help = "Case ID")]
        id: String,
    },

    #[command(about = "Show the stage progression of a case")]
    Stages {
        #[arg(help = "Case ID")]
        id: String,
    },

    #[command(about = "List payments recorded against a case")]
    Payments {
        #[arg(help = "Case ID")]
        id: String,
    },

    #[command(about = "Close a case (no todo, in-progress or done documents may remain)")]
    Close {
        #[arg(help = "Case ID")]
        id: String,
    },

    #[command(about = "Dismiss a case")]
    Dismiss {
        #[arg(help = "Case ID")]
        id: String,
    },

    #[command(about = "Archive a completed or dismissed case (admins only)")]
    Archive {
        #[arg(help = "Case ID")]
        id: String,
    },
}

pub async fn handle(cmd: CaseCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut profile = load_profile()?;
    let api = profile.client()?;

    match cmd {
        CaseCommands::List => {
            let cases = api.list_cases().await?;
            if cases.is_empty() {
                return output_empty_collection(&output_format, "cases", "No cases found");
            }

            output_value(&output_format, &cases, || {
                let rows: Vec<Vec<String>> = cases
                    .iter()
                    .map(|c| {
                        vec![
                            c.case_id.to_string(),
                            c.ct_name.clone().unwrap_or_default(),
                            c.client_fullname.clone().unwrap_or_default(),
                            c.case_status.to_string(),
                            crate::cases::stage_badge(c.case_stage.as_deref()).label.to_string(),
                            format_optional_currency(c.case_balance),
                        ]
                    })
                    .collect();
                render_table(&["id", "type", "client", "status", "stage", "balance"], &rows)
            })
        }
        CaseCommands::Show { id } => {
            let user = require_user(api.clone(), &mut profile).await?;
            let case = find_case(&api, &id).await?;
            let mut view = CaseView::new(api, case, user);
            view.open().await;

            let case = view.case();
            let summary = view.payment_summary();
            let data = json!({
                "case": case,
                "stage": view.stage_badge(),
                "payments": summary,
                "lawyer": view.lawyer_name(),
                "assignment": view.assignment_note(),
                "actions": view.available_actions(),
                "documents": view.documents(),
            });

            output_value(&output_format, &data, || {
                let mut lines = vec![
                    format!("Case {}: {}", case.case_id, case.ct_name.as_deref().unwrap_or("-")),
                    format!("Client:   {}", case.client_fullname.as_deref().unwrap_or("-")),
                    format!("Category: {}", case.cc_name.as_deref().unwrap_or("-")),
                    format!("Branch:   {}", case.branch_name.as_deref().unwrap_or("-")),
                    format!("Status:   {}", case.case_status),
                    view.stage_badge().title,
                    format!("Lawyer:   {}", view.lawyer_name()),
                ];
                if let Some(note) = view.assignment_note() {
                    lines.push(note);
                }
                if let Some(verdict) = case.visible_verdict() {
                    lines.push(format!("Verdict:  {}", verdict));
                }
                if let Some(filed) = case.case_date_filed.as_deref() {
                    lines.push(format!("Filed:    {}", format_date_time(filed)));
                }
                if let Some(remarks) = case.case_remarks.as_deref().filter(|r| !r.is_empty()) {
                    lines.push(format!("Remarks:  {}", remarks));
                }

                lines.push(String::new());
                for (label, amount) in summary.formatted() {
                    lines.push(format!("{:<11} {}", format!("{}:", label), amount));
                }

                lines.push(String::new());
                if view.documents().is_empty() {
                    lines.push("No documents".to_string());
                } else {
                    let rows: Vec<Vec<String>> = view
                        .documents()
                        .iter()
                        .map(|d| {
                            vec![
                                d.doc_id.to_string(),
                                d.display_name().to_string(),
                                doc_status_label(d.doc_status.as_ref()).to_string(),
                                view.submitter_name(d.doc_submitted_by.as_ref()),
                                if view.can_reject(d) { "reject" } else { "" }.to_string(),
                            ]
                        })
                        .collect();
                    lines.extend(render_table(&["id", "name", "status", "submitted by", ""], &rows));
                }

                let actions = view.available_actions();
                if !actions.is_empty() {
                    lines.push(String::new());
                    let names: Vec<&str> = actions.iter().map(|a| a.as_str()).collect();
                    lines.push(format!("Actions:  {}", names.join(", ")));
                }
                lines
            })
        }
        CaseCommands::Stages { id } => {
            let case = find_case(&api, &id).await?;
            let badge = crate::cases::stage_badge(case.case_stage.as_deref());
            let steps = crate::cases::stepper(&crate::cases::CASE_STAGES, case.case_stage.as_deref());

            output_value(&output_format, &json!({ "stage": badge, "steps": steps }), || {
                vec![badge.title.clone(), render_stepper(&steps)]
            })
        }
        CaseCommands::Payments { id } => {
            let case = find_case(&api, &id).await?;
            let payments = api.case_payments(&case.case_id).await?;
            if payments.is_empty() {
                return output_empty_collection(&output_format, "payments", "No payments recorded");
            }

            output_value(&output_format, &payments, || {
                let rows: Vec<Vec<String>> = payments
                    .iter()
                    .map(|p| {
                        vec![
                            p.payment_id.to_string(),
                            p.payment_date.as_deref().map(format_date_time).unwrap_or_default(),
                            p.payment_type.clone().unwrap_or_default(),
                            p.payment_amount.map(format_currency).unwrap_or_default(),
                        ]
                    })
                    .collect();
                render_table(&["id", "date", "type", "amount"], &rows)
            })
        }
        CaseCommands::Close { id } => perform(api, &mut profile, &id, CaseAction::Close, output_format).await,
        CaseCommands::Dismiss { id } => perform(api, &mut profile, &id, CaseAction::Dismiss, output_format).await,
        CaseCommands::Archive { id } => perform(api, &mut profile, &id, CaseAction::Archive, output_format).await,
    }
}

async fn find_case(api: &ApiClient, id: &str) -> anyhow::Result<Case> {
    let case_id = RecordId::from(id);
    api.list_cases()
        .await?
        .into_iter()
        .find(|c| c.case_id == case_id)
        .ok_or_else(|| anyhow::anyhow!("Case {} not found", case_id))
}

async fn perform(
    api: ApiClient,
    profile: &mut CliProfile,
    id: &str,
    action: CaseAction,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let user = require_user(api.clone(), profile).await?;
    let case = find_case(&api, id).await?;
    let mut view = CaseView::new(api.clone(), case, user);
    view.refresh_documents().await;

    let updated = Cell::new(false);
    let result = view.perform(action, || updated.set(true)).await.map(|case| case.clone());

    match result {
        Ok(case) => {
            if updated.get() {
                // Parent list refresh; the new status should be visible there too
                match api.list_cases().await {
                    Ok(cases) => tracing::debug!("Reloaded {} cases", cases.len()),
                    Err(e) => tracing::warn!("Failed to reload cases: {}", e),
                }
            }
            output_success(
                &output_format,
                action.success_message(),
                Some(json!({ "case_id": case.case_id, "case_status": case.case_status })),
            )
        }
        Err(CaseActionError::UnresolvedDocuments { count }) => output_error(
            &output_format,
            &format!(
                "{} ({} unresolved)",
                CaseActionError::UnresolvedDocuments { count },
                count
            ),
            Some("UNRESOLVED_DOCUMENTS"),
        ),
        Err(e @ CaseActionError::Forbidden { .. }) => output_error(&output_format, &e.to_string(), Some("FORBIDDEN")),
        Err(e @ CaseActionError::NotAvailable { .. }) => {
            output_error(&output_format, &e.to_string(), Some("NOT_AVAILABLE"))
        }
        Err(e @ CaseActionError::DocumentsUnavailable) => {
            output_error(&output_format, &e.to_string(), Some("DOCUMENTS_UNAVAILABLE"))
        }
        Err(e @ CaseActionError::Update(_)) => output_error(&output_format, &e.to_string(), Some("UPDATE_FAILED")),
    }
}
