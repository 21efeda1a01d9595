use crate::errors::CliError;
use crate::println_pad;
use crate::utils;
use clap::ValueEnum;
use colored::Colorize;
use lumpstack::{DiagnosticLog, ImageRecord, ParserCache, ResourceStack};
use miette::Result;
use std::collections::BTreeSet;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Palette,
    Colormap,
    Textures,
    Flats,
    Sprites,
    Hires,
    Colormaps,
    SpriteNames,
    VoxelNames,
    All,
}

pub struct InspectStackArgs {
    pub stack: Option<String>,
    pub category: Category,
    pub verbose: bool,
}

pub fn inspect_stack(args: InspectStackArgs, log: &DiagnosticLog) -> Result<()> {
    let path = utils::resolve_stack_path(args.stack)?;
    let mut stack =
        ResourceStack::load(&path).map_err(|e| CliError::stack_load_failed(path.clone(), e))?;
    let mut cache = ParserCache::new();

    println_pad!(
        "{} {} ({} location(s), game: {:?})",
        "🗂️  Stack:".bright_blue().bold(),
        path.as_str().bright_cyan().bold(),
        stack.len(),
        stack.game()
    );
    for engine in stack.engines() {
        println_pad!(
            "   {} {} {}",
            "•".bright_cyan(),
            engine.display_name().bright_white(),
            format!("({} embedded)", engine.sub_readers().len()).dimmed()
        );
    }

    let all = args.category == Category::All;
    let wants = |category: Category| all || args.category == category;

    if wants(Category::Palette) {
        match stack.load_palette().map_err(CliError::from)? {
            Some(palette) => {
                let first = palette.color(0);
                println_pad!(
                    "\n{} found (color 0: #{:02x}{:02x}{:02x})",
                    "🎨 Palette:".bright_magenta().bold(),
                    first.r,
                    first.g,
                    first.b
                );
            }
            None => println_pad!("\n{} {}", "🎨 Palette:".bright_magenta().bold(), "none".dimmed()),
        }
    }

    if wants(Category::Colormap) {
        match stack.load_main_colormap().map_err(CliError::from)? {
            Some(colormap) => println_pad!(
                "\n{} {} light table(s)",
                "🌗 Colormap:".bright_magenta().bold(),
                colormap.tables().len()
            ),
            None => println_pad!("\n{} {}", "🌗 Colormap:".bright_magenta().bold(), "none".dimmed()),
        }
    }

    if wants(Category::Textures) {
        let textures = stack.load_textures(&mut cache).map_err(CliError::from)?;
        print_images("🧱 Textures:", &textures, args.verbose);
    }
    if wants(Category::Flats) {
        let flats = stack.load_flats(&mut cache).map_err(CliError::from)?;
        print_images("⬛ Flats:", &flats, args.verbose);
    }
    if wants(Category::Sprites) {
        let sprites = stack.load_sprites(&mut cache).map_err(CliError::from)?;
        print_images("👾 Sprites:", &sprites, args.verbose);
    }
    if wants(Category::Hires) {
        let hires = stack.load_hires_textures().map_err(CliError::from)?;
        print_images("🖼️  Hi-res textures:", &hires, args.verbose);
    }
    if wants(Category::Colormaps) {
        let colormaps = stack.load_colormaps().map_err(CliError::from)?;
        print_images("🌈 Colormap images:", &colormaps, args.verbose);
    }
    if wants(Category::SpriteNames) {
        let names = stack.sprite_names().map_err(CliError::from)?;
        print_names("🔤 Sprite names:", &names);
    }
    if wants(Category::VoxelNames) {
        let names = stack.voxel_names().map_err(CliError::from)?;
        print_names("🧊 Voxel names:", &names);
    }

    stack.dispose();
    super::print_diagnostics(log);
    Ok(())
}

fn print_images(title: &str, images: &[ImageRecord], verbose: bool) {
    println_pad!("\n{} {}", title.bright_magenta().bold(), images.len());
    if !verbose {
        return;
    }

    for image in images {
        let origin = if image.is_composite() {
            format!("(composite, {})", image.reader_name)
        } else {
            format!("({})", image.reader_name)
        };
        println_pad!(
            "   {} {} {}",
            "•".bright_cyan(),
            image.long_name.as_str().bright_white(),
            origin.dimmed()
        );
    }
}

fn print_names(title: &str, names: &BTreeSet<String>) {
    println_pad!("\n{} {}", title.bright_magenta().bold(), names.len());
    if !names.is_empty() {
        let joined = names.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
        println_pad!("   {}", joined.bright_white());
    }
}
