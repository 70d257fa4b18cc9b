//! Azure Functions binding extensions of a backend project
//!
//! A backend declares its binding extensions in `extensions.csproj`; they are
//! built into `bin/` with the resolved .NET SDK before the backend can start.

use crate::checker::CheckerContext;
use crate::error::DepsCheckerError;
use crate::runner::CommandSpec;
use std::path::Path;

/// Project file listing the binding extensions
pub const EXTENSIONS_PROJECT: &str = "extensions.csproj";

/// Output directory of the extension build, relative to the backend root
const OUTPUT_DIR: &str = "bin";

/// Build the backend's binding extensions with `dotnet`
///
/// Returns `Ok(false)` without running anything when the backend has no
/// `extensions.csproj`.
pub async fn install_backend_extension(
    ctx: &CheckerContext,
    backend_root: &Path,
    dotnet: &str,
) -> Result<bool, DepsCheckerError> {
    if !backend_root.join(EXTENSIONS_PROJECT).is_file() {
        ctx.logger.debug(&format!(
            "no {} in {}, skipping backend extensions",
            EXTENSIONS_PROJECT,
            backend_root.display()
        ));
        return Ok(false);
    }

    let spec = CommandSpec::new(dotnet)
        .args([
            "build",
            EXTENSIONS_PROJECT,
            "-o",
            OUTPUT_DIR,
            "--ignore-failed-sources",
        ])
        .cwd(backend_root)
        .timeout(ctx.config.install_timeout);

    ctx.logger.info(&format!(
        "Installing backend extensions in {}...",
        backend_root.display()
    ));

    let output = ctx
        .runner
        .run(&spec)
        .await
        .map_err(|e| DepsCheckerError::extension_install_failure(backend_root, e.to_string()))?;

    if !output.success() {
        let err = DepsCheckerError::extension_install_failure(backend_root, output.combined());
        ctx.logger.error(&format!("{} (see {})", err, err.help_link()));
        return Err(err);
    }

    ctx.logger.info("Backend extensions installed");
    Ok(true)
}
