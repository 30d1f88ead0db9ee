//! SASM command line tool
//!
//! Loads a shader manifest, assembles it and writes the GLSL to stdout or a
//! file. With `--watch`, re-assembles whenever an input changes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use sasm::{BuildOptions, MacroOverride, Pipeline};
use sasm_config::{Config, ManifestEvent, ManifestWatcher};

/// How long to block waiting for a watch event before polling again
const WATCH_POLL: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "sasm", version, about = "Assemble GLSL shader source from a manifest")]
struct Cli {
    /// Shader manifest (TOML)
    manifest: PathBuf,

    /// Write the assembled code here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Re-assemble whenever the manifest or a shader file changes
    #[arg(long)]
    watch: bool,

    /// Do not emit the built-in prelude
    #[arg(long)]
    no_prelude: bool,

    /// Override the #version directive ("" removes it)
    #[arg(long = "glsl-version", value_name = "VERSION")]
    glsl_version: Option<String>,

    /// Define a macro after the manifest's macros; -D and -U apply in the order given
    #[arg(short = 'D', value_name = "NAME[=VALUE]")]
    define: Vec<String>,

    /// Undefine a macro after the manifest's macros; -D and -U apply in the order given
    #[arg(short = 'U', value_name = "NAME")]
    undef: Vec<String>,

    /// Configuration file (default: ~/.sasm/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Overrides, with `-D` and `-U` interleaved in command line order
    fn build_options(&self, matches: &ArgMatches) -> BuildOptions {
        let defines = matches
            .indices_of("define")
            .into_iter()
            .flatten()
            .zip(self.define.iter().map(|d| MacroOverride::define(d)));
        let undefs = matches
            .indices_of("undef")
            .into_iter()
            .flatten()
            .zip(self.undef.iter().map(|u| MacroOverride::undef(u)));

        let mut macros: Vec<(usize, MacroOverride)> = defines.chain(undefs).collect();
        macros.sort_by_key(|(index, _)| *index);

        BuildOptions {
            version: self.glsl_version.clone(),
            no_prelude: self.no_prelude,
            macros: macros.into_iter().map(|(_, op)| op).collect(),
        }
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path)
                .with_context(|| format!("Failed to load config {:?}", path)),
            None => Ok(Config::load().unwrap_or_else(|e| {
                log::warn!("Using default configuration: {}", e);
                Config::default()
            })),
        }
    }
}

/// Assemble and write the output, returning the manifest directories visited
fn emit(pipeline: &Pipeline, output: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
    let assembly = pipeline.run()?;
    let code = &assembly.code;
    match output {
        Some(path) => {
            fs::write(path, code).with_context(|| format!("Failed to write {:?}", path))?;
            log::info!("Wrote {} bytes to {:?}", code.len(), path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(code.as_bytes()).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }
    Ok(assembly.manifest_dirs)
}

/// Emit, then pick up library directories added since the last build
fn rebuild(pipeline: &Pipeline, output: Option<&Path>, watcher: &mut ManifestWatcher) {
    match emit(pipeline, output) {
        Ok(dirs) => {
            for dir in &dirs {
                if let Err(e) = watcher.watch_dir(dir) {
                    log::warn!("{}", e);
                }
            }
        }
        Err(e) => log::error!("{:#}", e),
    }
}

fn watch(pipeline: &Pipeline, output: Option<&Path>) -> anyhow::Result<()> {
    let mut watcher = ManifestWatcher::new(pipeline.manifest(), pipeline.config())?;
    let own_output = output.and_then(|path| path.canonicalize().ok());

    rebuild(pipeline, output, &mut watcher);

    loop {
        match watcher.recv_timeout(WATCH_POLL) {
            Some(ManifestEvent::Changed(path)) => {
                // Our own output landing in a watched directory
                if own_output.as_deref() == Some(path.as_path()) {
                    continue;
                }
                rebuild(pipeline, output, &mut watcher);
            }
            Some(ManifestEvent::WatchError(msg)) => log::warn!("Watcher: {}", msg),
            None => {}
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,sasm=info"))
        .init();

    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let config = cli.load_config()?;
    let pipeline = Pipeline::new(&cli.manifest, config, cli.build_options(&matches));

    if cli.watch {
        log::info!("Watching {:?}", cli.manifest);
        // Make sure the output exists so it can be recognized among watch events
        if let Some(path) = &cli.output {
            if !path.exists() {
                fs::write(path, "").with_context(|| format!("Failed to create {:?}", path))?;
            }
        }
        watch(&pipeline, cli.output.as_deref())
    } else {
        emit(&pipeline, cli.output.as_deref()).map(|_| ())
    }
}
