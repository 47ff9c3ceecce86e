use crate::cli::config::{load_profile, require_user};
use crate::cli::utils::{output_empty_collection, output_value};
use crate::cli::OutputFormat;
use crate::nav::links_for;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let mut profile = load_profile()?;
    let user = require_user(profile.client()?, &mut profile).await?;

    let links = links_for(user.user_role.as_ref());
    if links.is_empty() {
        return output_empty_collection(&output_format, "links", "No sections available for this role");
    }

    output_value(&output_format, &links, || {
        links
            .iter()
            .map(|l| format!("{:<14} {}", l.label, l.path))
            .collect()
    })
}
