use clap::Subcommand;
use serde_json::json;

use crate::api::format::{doc_status_label, format_date_time};
use crate::api::ApiClient;
use crate::cli::config::load_profile;
use crate::cli::prompt::Prompt;
use crate::cli::utils::{output_empty_collection, output_error, output_value, render_table};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::documents::{
    DocumentAccess, DocumentError, DocumentList, OpenedFile, TempFileViewer, ViewOutcome,
};
use crate::types::{Document, RecordId};

#[derive(Subcommand)]
pub enum DocumentCommands {
    #[command(about = "List documents with a file attached, one page at a time")]
    List {
        #[arg(long, short, help = "Filter by name, type, tag, case, submitter or tasker")]
        search: Option<String>,

        #[arg(long, short, default_value_t = 1, help = "Page number (1-based)")]
        page: usize,
    },

    #[command(about = "Download one or more documents and keep them available for viewing")]
    View {
        #[arg(required = true, help = "Document IDs")]
        ids: Vec<String>,

        #[arg(long, help = "Password to try first for protected documents")]
        password: Option<String>,
    },
}

type Access = DocumentAccess<ApiClient, TempFileViewer>;

pub async fn handle(cmd: DocumentCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let profile = load_profile()?;
    let documents_config = &config().documents;
    let mut access = DocumentAccess::with_list(
        profile.client()?,
        TempFileViewer::from_config(documents_config),
        DocumentList::new(documents_config.page_size),
    );
    access.load().await?;

    match cmd {
        DocumentCommands::List { search, page } => {
            let list = access.documents_mut();
            if let Some(term) = search {
                list.set_search(term);
            }
            list.set_page(page);

            let items: Vec<Document> = list.page_items().into_iter().cloned().collect();
            if items.is_empty() {
                return output_empty_collection(&output_format, "documents", "No documents found");
            }

            let list = access.documents();
            let footer = format!("Page {} of {}", list.page(), list.total_pages());
            output_value(&output_format, &items, || {
                let rows: Vec<Vec<String>> = items.iter().map(document_row).collect();
                let mut lines = render_table(
                    &["id", "name", "type", "status", "tag", "case", "due", "locked"],
                    &rows,
                );
                lines.push(String::new());
                lines.push(footer);
                lines
            })
        }
        DocumentCommands::View { ids, password } => {
            let mut prompt = Prompt::new();
            let mut opened: Vec<OpenedFile> = Vec::new();

            for raw in ids {
                let doc_id = RecordId::from(raw.as_str());
                let outcome = match access.view_by_id(&doc_id).await {
                    Ok(Some(outcome)) => outcome,
                    Ok(None) => {
                        output_error(
                            &output_format,
                            &format!("Document {} not found", doc_id),
                            Some("NOT_FOUND"),
                        )?;
                        continue;
                    }
                    Err(e) => {
                        output_error(&output_format, &e.to_string(), None)?;
                        continue;
                    }
                };

                let result = match outcome {
                    ViewOutcome::Opened(file) => Ok(Some(file)),
                    ViewOutcome::PasswordRequired => {
                        answer_challenge(&mut access, &mut prompt, password.clone()).await
                    }
                };

                match result {
                    Ok(Some(file)) => opened.push(file),
                    Ok(None) => eprintln!("Skipped document {}", doc_id),
                    Err(e) => output_error(&output_format, &e.to_string(), None)?,
                }
            }

            if opened.is_empty() {
                return Ok(());
            }

            let summary: Vec<_> = opened
                .iter()
                .map(|f| {
                    json!({
                        "path": f.path,
                        "size": f.size,
                        "release_at": f.release_at,
                    })
                })
                .collect();
            output_value(&output_format, &summary, || {
                opened
                    .iter()
                    .map(|f| format!("✓ {} ({} bytes)", f.path.display(), f.size))
                    .collect()
            })?;

            let delay = documents_config.viewer_release_delay();
            prompt
                .wait_for_enter(
                    &format!("Press Enter to release (auto-release in {}s)", delay.as_secs()),
                    delay,
                )
                .await?;
            for file in &opened {
                access.viewer().release_now(file);
            }
            Ok(())
        }
    }
}

/// Keep asking until the document opens or the user gives up (empty line or
/// EOF), which cancels the challenge.
async fn answer_challenge(
    access: &mut Access,
    prompt: &mut Prompt,
    mut first_try: Option<String>,
) -> Result<Option<OpenedFile>, DocumentError> {
    loop {
        let Some(challenge) = access.challenge() else {
            return Ok(None);
        };
        let label = format!("Password for \"{}\": ", challenge.document.display_name());
        if let Some(message) = &challenge.error {
            eprintln!("{}", message);
        }

        let attempt = match first_try.take() {
            Some(password) => password,
            None => match prompt.ask(&label).await {
                Ok(Some(line)) if !line.is_empty() => line,
                Ok(_) => {
                    access.cancel_challenge();
                    return Ok(None);
                }
                Err(e) => {
                    access.cancel_challenge();
                    return Err(DocumentError::VerificationFailed(e.to_string()));
                }
            },
        };

        match access.submit_password(&attempt).await {
            Ok(ViewOutcome::Opened(file)) => return Ok(Some(file)),
            Ok(ViewOutcome::PasswordRequired) => continue,
            Err(DocumentError::InvalidPassword) | Err(DocumentError::VerificationFailed(_)) => continue,
            Err(e) => {
                access.cancel_challenge();
                return Err(e);
            }
        }
    }
}

fn document_row(doc: &Document) -> Vec<String> {
    vec![
        doc.doc_id.to_string(),
        doc.display_name().to_string(),
        doc.doc_type.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        doc_status_label(doc.doc_status.as_ref()).to_string(),
        doc.doc_tag.clone().unwrap_or_default(),
        doc.case_id.as_ref().map(|c| c.to_string()).unwrap_or_default(),
        doc.doc_due_date.as_deref().map(format_date_time).unwrap_or_default(),
        if doc.requires_password_for_current_user { "yes" } else { "" }.to_string(),
    ]
}
