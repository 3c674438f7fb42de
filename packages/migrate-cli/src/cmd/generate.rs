//! `generate-config`: publish the bundled config template

use anyhow::Result;
use std::path::Path;

use crate::config::{self, config_path};
use crate::context::AppContext;

pub fn run(ctx: &AppContext, config: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path(&ctx.work_dir, config);
    config::generate(&path, force)?;
    ctx.print_success(&format!("Config file published to {}", path.display()));
    Ok(())
}
