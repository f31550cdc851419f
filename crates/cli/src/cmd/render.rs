//! Implementation of the `idconverge render` command.

use std::path::Path;

use anyhow::{Context, Result, bail};
use idconverge_lib::recipe::IdentityRecipe;
use idconverge_lib::template::{Renderer, TemplateStore};

use super::{layout, load_node_file, template_store};
use crate::TargetArgs;
use crate::output::{OutputFormat, print_json};

/// Print the recipe's templates rendered against the node file.
///
/// Nothing is written; the output is what apply would install.
pub fn cmd_render(node_path: &Path, template: Option<&str>, target: &TargetArgs, output: OutputFormat) -> Result<()> {
  if let Some(name) = template
    && !TemplateStore::names().any(|n| n == name)
  {
    let known: Vec<_> = TemplateStore::names().collect();
    bail!("Unknown template: {} (available: {})", name, known.join(", "));
  }

  let node_file = load_node_file(node_path)?;
  let layout = layout(target);
  let recipe = IdentityRecipe::new(&node_file.node, &node_file.topology, &layout);
  let inputs = recipe.resolve().context("Failed to resolve recipe inputs")?;
  let store = template_store(target)?;

  let mut rendered = Vec::new();
  for (name, variables) in recipe.template_variables(&inputs) {
    if template.is_some_and(|wanted| wanted != name) {
      continue;
    }
    let content = store
      .render(name, &variables)
      .with_context(|| format!("Failed to render template: {}", name))?;
    rendered.push((name, content));
  }

  if output.is_json() {
    let by_name: serde_json::Map<_, _> = rendered
      .into_iter()
      .map(|(name, content)| (name.to_string(), serde_json::Value::String(content)))
      .collect();
    return print_json(&by_name);
  }

  let single = rendered.len() == 1;
  for (name, content) in &rendered {
    if !single {
      println!("# ---- {} ----", name);
    }
    print!("{}", content);
  }

  Ok(())
}
