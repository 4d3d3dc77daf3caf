//! Command dispatch

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, IoResultExt};
use crate::cli::args::{Cli, Commands, ConfigCommands, DrawArgs, Format};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, DrawOptions, Settings};
use crate::domain::{layout, TreeBuilder};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::html::render_page;
use crate::infrastructure::InfraError;
use crate::tree_traits::{LayoutView, TreeNodeConvert};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;

    match &cli.command {
        Some(Commands::Draw(args)) => cmd_draw(&project_dir, args),
        Some(Commands::Tree { input }) => cmd_tree(input),
        Some(Commands::Layout {
            input,
            spacing,
            vertical_gap,
        }) => cmd_layout(&project_dir, input, *spacing, *vertical_gap),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(&project_dir),
            ConfigCommands::Path => cmd_config_path(&project_dir),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `syntree --help`".to_string(),
        )),
    }
}

fn resolve_project_dir(dir: Option<&Path>) -> CliResult<PathBuf> {
    match dir {
        Some(d) => Ok(d.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| CliError::Infra(InfraError::io("current directory", e))),
    }
}

/// Read a tree literal from a file, or from stdin for `-`.
fn read_input(input: &Path) -> CliResult<String> {
    if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| CliError::Infra(InfraError::io("read stdin", e)))?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(input).with_path_context("read tree", input)?)
}

fn page_title(input: &Path) -> String {
    input
        .file_stem()
        .filter(|_| input != Path::new("-"))
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "syntree".to_string())
}

#[instrument(skip(args))]
fn cmd_draw(project_dir: &Path, args: &DrawArgs) -> CliResult<()> {
    let settings = Settings::load(Some(project_dir))?;
    let container = args
        .container
        .clone()
        .unwrap_or_else(|| settings.container.clone());
    let interactive = settings.interactive;
    let services = ServiceContainer::new(settings);
    let mut service = services.draw_service(&container, !args.no_animation);
    if let Some(levels) = args.max_depth {
        service = service.with_builder(TreeBuilder::new().with_max_depth(levels));
    }

    let options = DrawOptions {
        spacing: args.spacing,
        vertical_gap: args.vertical_gap,
        animation_duration: args.animation_duration,
        width: args.width,
        height: args.height,
        fit: args.fit,
    };
    let input = read_input(&args.input)?;
    let mut diagram = service.draw_json(&input, &container, &options)?;

    if !args.no_animation {
        for warning in diagram.warnings() {
            output::warning(warning);
        }
    }

    for label in &args.collapse {
        if diagram.collapse_label(label) == 0 {
            output::warning(&format!("no expandable node labeled '{}'", label));
        }
    }
    if !diagram.settle() {
        output::warning("some transitions did not settle");
    }

    let svg = diagram.to_svg();
    let rendered = match args.format {
        Format::Svg => svg,
        Format::Html => {
            let duration = options
                .animation_duration
                .unwrap_or(service.settings().animation_duration);
            render_page(&page_title(&args.input), &container, &svg, interactive, duration)
        }
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered).with_path_context("write diagram", path)?;
            output::action("Wrote", &path.display());
        }
        None => output::info(&rendered),
    }
    Ok(())
}

#[instrument]
fn cmd_tree(input: &Path) -> CliResult<()> {
    let text = read_input(input)?;
    let tree = TreeBuilder::new().build_from_json(&text).map_err(ApplicationError::from)?;
    debug!("tree depth {}", tree.depth());
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument]
fn cmd_layout(
    project_dir: &Path,
    input: &Path,
    spacing: Option<f64>,
    vertical_gap: Option<f64>,
) -> CliResult<()> {
    let settings = Settings::load(Some(project_dir))?.with_options(&DrawOptions {
        spacing,
        vertical_gap,
        ..DrawOptions::default()
    });
    settings.validate()?;
    let text = read_input(input)?;
    let tree = TreeBuilder::new().build_from_json(&text).map_err(ApplicationError::from)?;

    let style = settings.svg_style();
    let tree_layout = layout(&tree, 0.0, 0.0, &settings.layout_config(), |label| {
        style.text_width(label)
    });
    let (width, height) = tree_layout.extent(settings.font_size * 1.5);

    output::info(
        &LayoutView {
            tree: &tree,
            layout: &tree_layout,
        }
        .to_tree_string(),
    );
    output::detail(&format!("extent: {}x{}", width, height));
    Ok(())
}

fn cmd_config_show(project_dir: &Path) -> CliResult<()> {
    let settings = Settings::load(Some(project_dir))?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path(project_dir: &Path) -> CliResult<()> {
    output::header("Config files");
    match global_config_path() {
        Some(p) => output::detail(&format!(
            "global: {} {}",
            p.display(),
            if p.exists() { "(exists)" } else { "(not found)" }
        )),
        None => output::detail("global: unavailable"),
    }
    let local = local_config_path(project_dir);
    output::detail(&format!(
        "local:  {} {}",
        local.display(),
        if local.exists() { "(exists)" } else { "(not found)" }
    ));
    Ok(())
}
