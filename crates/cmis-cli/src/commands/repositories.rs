use anyhow::Context;

use crate::config::Cli;

pub async fn run(cli: &Cli) -> anyhow::Result<()> {
    let repositories = cli
        .factory()
        .get_repositories(&cli.connection.to_parameters())
        .await
        .context("failed to list repositories")?;

    if repositories.is_empty() {
        println!("No repositories found.");
        return Ok(());
    }

    for repository in &repositories {
        println!("Found repository: {}", repository.id);
        println!("  name:        {}", repository.name);
        println!("  root folder: {}", repository.root_folder_id);
        if let Some(product) = &repository.product_name {
            let version = repository.product_version.as_deref().unwrap_or_default();
            println!("  product:     {product} {version}");
        }
        if let Some(cmis_version) = &repository.cmis_version {
            println!("  cmis:        {cmis_version}");
        }
    }

    Ok(())
}
