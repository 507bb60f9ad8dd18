use anyhow::Context;
use clap::Args;
use cmis_client::prelude::*;

use super::scratch_name;
use crate::TRACING_TARGET_COMMAND;

const MIME_TYPE: &str = "text/plain; charset=UTF-8";

#[derive(Debug, Clone, Args)]
pub struct CheckoutCycleArgs {
    /// Name of the document created in the scratch folder.
    #[arg(long, default_value = "test.txt")]
    pub file_name: String,

    /// Delete the scratch folder when done.
    #[arg(long)]
    pub cleanup: bool,
}

pub async fn run(session: &Session, args: &CheckoutCycleArgs) -> anyhow::Result<()> {
    let root = session.root_folder().await?;
    let folder = root
        .create_folder(Properties::for_create("cmis:folder", scratch_name("testFolder")))
        .await
        .context("failed to create the scratch folder")?;
    println!("Created folder: {} ({})", folder.name(), folder.id());

    let result = cycle(session, &folder, &args.file_name).await;

    if args.cleanup {
        folder
            .delete(true)
            .await
            .context("failed to delete the scratch folder")?;
        tracing::info!(target: TRACING_TARGET_COMMAND, folder_id = %folder.id(), "Scratch folder deleted");
    }

    result
}

async fn cycle(session: &Session, folder: &Folder, file_name: &str) -> anyhow::Result<()> {
    let factory = session.object_factory();

    let content = "This is some test content.";
    let stream = factory.create_content_stream(file_name, content.len() as u64, MIME_TYPE, content)?;
    let document = folder
        .create_document(
            Properties::for_create("cmis:document", file_name),
            Some(stream),
            VersioningState::Major,
        )
        .await
        .context("failed to create the document")?;
    println!(
        "Created document: {} version {}",
        document.id(),
        document.version_label().unwrap_or("?")
    );

    let pwc_id = document
        .check_out()
        .await
        .context("failed to check out the document")?;
    println!("Checked out: {pwc_id}");

    let pwc = session.document(&pwc_id).await?;

    let updated = "Updated content for version 1.1.";
    let stream = factory.create_content_stream(file_name, updated.len() as u64, MIME_TYPE, updated)?;
    let version = pwc
        .check_in(CheckIn::new(false, "v1.1").with_content(stream))
        .await
        .context("failed to check in the working copy")?;
    println!(
        "Checked in: {} version {}",
        version.id(),
        version.version_label().unwrap_or("?")
    );

    let versions = version
        .all_versions()
        .await
        .context("failed to list versions")?;
    println!("Number of versions: {}", versions.len());
    for entry in &versions {
        println!(
            "  {} {}",
            entry.version_label().unwrap_or("?"),
            entry.checkin_comment().unwrap_or_default()
        );
    }

    Ok(())
}
