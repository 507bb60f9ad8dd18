use anyhow::Context;
use clap::Args;
use cmis_client::Session;

#[derive(Debug, Clone, Args)]
pub struct TypeArgs {
    /// Type ids to look up, e.g. cmis:document or P:exif:exif.
    #[arg(required = true, value_name = "TYPE_ID")]
    pub type_ids: Vec<String>,

    /// Also print every property definition.
    #[arg(long)]
    pub properties: bool,
}

pub async fn run(session: &Session, args: &TypeArgs) -> anyhow::Result<()> {
    for type_id in &args.type_ids {
        let definition = session
            .type_definition(type_id)
            .await
            .with_context(|| format!("failed to fetch type definition {type_id}"))?;

        println!("{}: {}", definition.id, definition.display_name);
        println!("  base type:  {}", definition.base_type);
        if let Some(parent) = &definition.parent_type_id {
            println!("  parent:     {parent}");
        }
        if let Some(description) = &definition.description {
            println!("  about:      {description}");
        }
        println!("  properties: {}", definition.property_definitions.len());

        if args.properties {
            for property in definition.property_definitions.values() {
                println!(
                    "    {} [{} {} {}]{}",
                    property.id,
                    property.property_type,
                    property.cardinality,
                    property.updatability,
                    if property.required { " required" } else { "" },
                );
            }
        }
    }

    Ok(())
}
