use anyhow::Result;

use crate::config::AppConfig;
use crate::llm::{schema, ProviderKind};
use crate::tools::all_declarations;

pub fn run_tools(config: &AppConfig, model: Option<String>) -> Result<()> {
    let model = model.unwrap_or_else(|| config.default_model.clone());
    let kind = ProviderKind::for_model(&model);

    eprintln!("🧰 Tools for {} ({})", model, kind.display_name());
    let tools = schema::tools_for(kind, all_declarations());
    println!("{}", serde_json::to_string_pretty(&tools)?);
    Ok(())
}
