//! Command-line companion for the GraphQL translation core.
//!
//! Validates schema files, shows the criteria a request would produce and
//! converts pagination cursors.

mod cli;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use entity_graphql_core::result::cursor;
use entity_graphql_core::schema::SchemaParser;
use entity_graphql_core::{
    AssociationPlanner, CriteriaBuilder, GatewayConfig, SchemaRegistry, SelectionSet,
};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, CursorAction};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Schema { schema } => {
            let registry = load_registry(&schema)?;
            print!("{}", describe_registry(&registry));
        }
        Commands::Explain {
            schema,
            entity,
            args,
            selection,
            config,
        } => {
            let registry = load_registry(&schema)?;
            let config = load_config(config.as_deref())?;
            let args = read_json(&args)?;
            let Value::Object(args) = args else {
                anyhow::bail!("Arguments file must hold a JSON object");
            };
            let selection: SelectionSet = match selection {
                Some(path) => serde_json::from_value(read_json(&path)?)
                    .context("Selection file is not a valid selection tree")?,
                None => SelectionSet::new(),
            };
            let explained = explain(&registry, &config, &entity, &args, &selection)?;
            println!("{}", serde_json::to_string_pretty(&explained)?);
        }
        Commands::Cursor { action } => match action {
            CursorAction::Encode { position } => println!("{}", cursor::encode(position)),
            CursorAction::Decode { cursor: raw } => {
                let position = cursor::try_decode(&raw)
                    .with_context(|| format!("Failed to decode cursor '{}'", raw))?;
                println!("{}", position);
            }
        },
    }

    Ok(())
}

fn load_registry(path: &Path) -> Result<SchemaRegistry> {
    SchemaParser::from_file(path)
        .with_context(|| format!("Failed to load schema from {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<GatewayConfig> {
    let mut config = match path {
        Some(path) => GatewayConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GatewayConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("Invalid configuration override in environment")?;
    Ok(config)
}

fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn describe_registry(registry: &SchemaRegistry) -> String {
    let mut out = String::new();
    for schema in registry.iter() {
        out.push_str(&format!(
            "{} ({} fields)\n",
            schema.entity_name(),
            schema.fields().len()
        ));
        for relation in schema.relations() {
            out.push_str(&format!(
                "  {} -> {} [{}]\n",
                relation.name,
                relation.kind.reference().unwrap_or("?"),
                relation.kind.tag()
            ));
        }
    }
    out
}

/// Criteria for `args` and `selection` on `entity`, as JSON.
fn explain(
    registry: &SchemaRegistry,
    config: &GatewayConfig,
    entity: &str,
    args: &Map<String, Value>,
    selection: &SelectionSet,
) -> Result<Value> {
    let schema = registry.get(entity)?;
    let mut criteria = CriteriaBuilder::new(config)
        .build(args, &schema)
        .context("Invalid field arguments")?;
    AssociationPlanner::new(registry, config).attach(&mut criteria, selection, &schema)?;
    Ok(serde_json::to_value(&criteria)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const SCHEMA: &str = r#"
        [entities.product]
        fields = [
            { name = "id", kind = "identifier", primary_key = true },
            { name = "prices", kind = "one_to_many", reference = "product_price" },
        ]

        [entities.product_price]
        fields = [{ name = "id", kind = "identifier", primary_key = true }]
    "#;

    #[test]
    fn test_describe_registry_lists_relations() {
        let registry = SchemaParser::from_string(SCHEMA).unwrap();
        let out = describe_registry(&registry);
        assert!(out.contains("product (2 fields)"));
        assert!(out.contains("prices -> product_price [one_to_many]"));
    }

    #[test]
    fn test_explain() {
        let registry = SchemaParser::from_string(SCHEMA).unwrap();
        let Value::Object(args) = json!({"first": 10, "sortBy": "id"}) else {
            unreachable!()
        };
        let selection: SelectionSet = serde_json::from_value(json!({
            "edges": {"fields": {"node": {"fields": {"prices": {"fields": {"id": {}}}}}}}
        }))
        .unwrap();

        let explained =
            explain(&registry, &GatewayConfig::default(), "product", &args, &selection).unwrap();
        assert_eq!(explained["limit"], json!(10));
        assert_eq!(explained["totalCountMode"], json!("exact"));
        assert!(explained["associations"]["prices"].is_object());
    }

    #[test]
    fn test_demo_request() {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
        let registry = load_registry(&demos.join("catalog.toml")).unwrap();
        let Value::Object(args) = read_json(&demos.join("product_args.json")).unwrap() else {
            panic!("demo args must be an object");
        };
        let selection: SelectionSet =
            serde_json::from_value(read_json(&demos.join("product_selection.json")).unwrap())
                .unwrap();

        let explained =
            explain(&registry, &GatewayConfig::default(), "product", &args, &selection).unwrap();
        assert_eq!(explained["offset"], json!(10));
        assert_eq!(explained["filters"][0]["type"], json!("multi"));
        assert_eq!(explained["aggregations"].as_array().map(Vec::len), Some(2));
        assert_eq!(explained["associations"]["prices"]["limit"], json!(3));
        assert!(explained["associations"]["manufacturer"].is_object());
    }

    #[test]
    fn test_read_json_reports_bad_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = read_json(file.path()).unwrap_err();
        assert!(err.to_string().contains("is not valid JSON"));
    }
}
