use anyhow::Context;
use cmis_client::Session;
use futures::TryStreamExt;

pub async fn run(session: &Session) -> anyhow::Result<()> {
    let root = session
        .root_folder()
        .await
        .context("failed to fetch the root folder")?;
    println!("Root folder: {}", root.name());

    let children = root.children();
    match children.total_num_items().await? {
        Some(total) => println!("Number of children: {total}"),
        None => println!("Number of children: unknown"),
    }

    let mut stream = children.iter();
    while let Some(child) = stream
        .try_next()
        .await
        .context("failed to list the root folder")?
    {
        println!("  {} ({})", child.name(), child.object_type_id());
    }

    Ok(())
}
