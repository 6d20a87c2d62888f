// src/cli/handlers/info.rs

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::cli::InfoArgs;
use crate::core::{manifest, paths};
use crate::models::{ConfigSnapshot, ProjectMode};
use crate::state::AppState;

#[derive(Serialize)]
struct InfoReport<'a> {
    workspace: String,
    mode: &'static str,
    manifest: bool,
    legacy_makefile: bool,
    active_file: Option<String>,
    shell: String,
    subsystem_bin: String,
    config: &'a ConfigSnapshot,
}

pub fn handle(args: &InfoArgs, state: &AppState) -> Result<()> {
    let config = state.snapshot()?;
    let context = manifest::detect_context(state.workspace_root(), None)?;

    let report = InfoReport {
        workspace: state.workspace_root().display().to_string(),
        mode: match context.mode {
            ProjectMode::Project => "project",
            ProjectMode::SingleFile => "single file",
        },
        manifest: manifest::has_build_manifest(state.workspace_root()),
        legacy_makefile: context.has_legacy_makefile,
        active_file: context.active_file.as_ref().map(|f| f.file_name()),
        shell: state.shell().program.display().to_string(),
        subsystem_bin: paths::subsystem_bin_dir(&config.msys2.root, &config.msys2.environment),
        config: &config,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n{}", "Workspace".bold());
    println!("  root:            {}", report.workspace);
    println!("  mode:            {}", report.mode.cyan());
    if let Some(file) = &report.active_file {
        println!("  active file:     {file}");
    }
    println!("  CMakeLists.txt:  {}", presence(report.manifest));
    println!("  Makefile:        {}", presence(report.legacy_makefile));

    println!("\n{}", "Toolchain".bold());
    println!("  msys2 root:   {}", config.msys2.root);
    println!("  environment:  {}", config.msys2.environment.cyan());
    println!("  shell:        {}", report.shell);
    println!("  bin dir:      {}", report.subsystem_bin);

    println!("\n{}", "Build".bold());
    println!("  compiler:   {}", config.build.compiler);
    println!("  standard:   {}", config.build.cpp_standard);
    println!("  flags:      {}", or_unset(&config.build.flags));
    println!("  libraries:  {}", or_unset(&config.build.libraries));
    println!("  generator:  {}", config.build.generator);

    println!("\n{}", "GTK".bold());
    println!("  renderer:     {}", or_unset(&config.gtk.renderer));
    println!("  theme:        {}", or_unset(&config.gtk.theme));
    println!("  debug flags:  {}", or_unset(&config.gtk.debug_flags));

    if !config.env.custom.is_empty() {
        println!("\n{}", "Custom environment".bold());
        for (name, value) in &config.env.custom {
            println!("  {name} = {value}");
        }
    }

    let android = &config.android;
    if !android.ndk_root.is_empty() || !android.sdk_root.is_empty() || !android.api_level.is_empty()
    {
        println!("\n{}", "Android".bold());
        println!("  ndk root:   {}", or_unset(&android.ndk_root));
        println!("  sdk root:   {}", or_unset(&android.sdk_root));
        println!("  api level:  {}", or_unset(&android.api_level));
    }

    Ok(())
}

fn presence(present: bool) -> colored::ColoredString {
    if present {
        "present".green()
    } else {
        "absent".dimmed()
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(unset)" } else { value }
}
