mod apply;
mod plan;
mod render;

pub use apply::cmd_apply;
pub use plan::cmd_plan;
pub use render::cmd_render;

use std::path::Path;

use anyhow::{Context, Result};
use idconverge_lib::execute::{ExecuteConfig, Executor, RunReport};
use idconverge_lib::node::NodeFile;
use idconverge_lib::platform::Layout;
use idconverge_lib::recipe::IdentityRecipe;
use idconverge_lib::template::TemplateStore;

use crate::{RunArgs, TargetArgs};

pub(crate) fn load_node_file(path: &Path) -> Result<NodeFile> {
  NodeFile::load(path).with_context(|| format!("Failed to load node file: {}", path.display()))
}

pub(crate) fn layout(target: &TargetArgs) -> Layout {
  match &target.root {
    Some(root) => Layout::with_root(root),
    None => Layout::from_env(),
  }
}

pub(crate) fn template_store(target: &TargetArgs) -> Result<TemplateStore> {
  match &target.templates {
    Some(dir) => TemplateStore::with_overrides(dir)
      .with_context(|| format!("Failed to load templates from {}", dir.display())),
    None => TemplateStore::builtin().context("Failed to load built-in templates"),
  }
}

/// Build the identity recipe for `node_file` and converge it.
pub(crate) fn converge(node_file: &NodeFile, run: &RunArgs, dry_run: bool) -> Result<RunReport> {
  let layout = layout(&run.target);
  let resources = IdentityRecipe::new(&node_file.node, &node_file.topology, &layout)
    .resources()
    .context("Failed to build identity recipe")?;

  let executor = Executor::new(
    template_store(&run.target)?,
    ExecuteConfig {
      dry_run,
      shell: None,
      timeout: run.command_timeout,
    },
  );

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(executor.converge(&resources)).context("Convergence failed")
}
