use anyhow::{Context, bail};
use clap::Args;
use cmis_client::prelude::*;

use super::scratch_name;
use crate::TRACING_TARGET_COMMAND;

#[derive(Debug, Clone, Args)]
pub struct BulkUpdateArgs {
    /// Number of documents to create.
    #[arg(long, default_value_t = 10)]
    pub count: usize,

    /// Description written to every document.
    #[arg(long, default_value = "Bulk update description")]
    pub description: String,

    /// Delete the scratch folder when done.
    #[arg(long)]
    pub cleanup: bool,
}

pub async fn run(session: &Session, args: &BulkUpdateArgs) -> anyhow::Result<()> {
    let root = session.root_folder().await?;
    let folder = root
        .create_folder(Properties::for_create("cmis:folder", scratch_name("bulkUpdate")))
        .await
        .context("failed to create the scratch folder")?;
    println!("Created folder: {} ({})", folder.name(), folder.id());

    let result = update(session, &folder, args).await;

    if args.cleanup {
        folder
            .delete(true)
            .await
            .context("failed to delete the scratch folder")?;
        tracing::info!(target: TRACING_TARGET_COMMAND, folder_id = %folder.id(), "Scratch folder deleted");
    }

    result
}

async fn update(session: &Session, folder: &Folder, args: &BulkUpdateArgs) -> anyhow::Result<()> {
    let factory = session.object_factory();

    let mut documents = Vec::with_capacity(args.count);
    for i in 0..args.count {
        let name = format!("bulk-{i}.txt");
        let content = format!("Bulk document {i}");
        let stream = factory.create_content_stream(
            name.as_str(),
            content.len() as u64,
            "text/plain",
            content,
        )?;
        let document = folder
            .create_document(
                Properties::for_create("cmis:document", name.as_str()),
                Some(stream),
                VersioningState::Major,
            )
            .await
            .with_context(|| format!("failed to create {name}"))?;
        documents.push(document);
    }
    println!("Created {} documents", documents.len());

    let diff = Properties::new().with(property_ids::DESCRIPTION, args.description.as_str());
    match session.bulk_update_properties(&documents, &diff, &[], &[]).await {
        Ok(()) => {
            println!("Updated {} documents", documents.len());
            Ok(())
        }
        Err(err) if err.kind != ErrorKind::PartialFailure => Err(err).context("bulk update failed"),
        Err(err) => {
            let Some(outcome) = err.partial_failure_details() else {
                bail!("bulk update failed: {err}");
            };

            println!("Updated {} documents", outcome.succeeded.len());
            for (id, failure) in &outcome.failed {
                println!("  failed {id}: {failure}");
            }
            bail!("bulk update failed for {} of {} documents", outcome.failed.len(), documents.len())
        }
    }
}
