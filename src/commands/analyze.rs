//! `analyze` - application profile only

use anyhow::Result;
use autodeploy::infrastructure::SystemCommandRunner;
use autodeploy::presentation::factory::create_analysis_use_case;

use super::{prepare_repository, CommandContext};
use crate::ui::json::{emit, tagged};
use crate::ui::views::render_profile;

pub fn cmd_analyze(ctx: &CommandContext, repo: &str) -> Result<()> {
    let scratch = tempfile::tempdir()?;
    let (_, root) = prepare_repository(&SystemCommandRunner::new(), repo, scratch.path())?;

    let profile = create_analysis_use_case(&ctx.config.backend).profile(&root)?;

    if ctx.json {
        emit(tagged("profile", "profile", &profile))?;
    } else {
        print!("{}", render_profile(&profile));
    }
    Ok(())
}
