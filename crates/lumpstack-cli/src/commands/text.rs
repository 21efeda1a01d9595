use crate::errors::CliError;
use crate::println_pad;
use crate::utils;
use colored::Colorize;
use lumpstack::{DiagnosticLog, ResourceStack, ScriptType, TextResourceData};
use miette::Result;
use std::str::FromStr;

pub struct ListTextArgs {
    pub stack: Option<String>,
    pub lump: String,
    /// Name or path handed to DECORATE/ZSCRIPT/MODELDEF lookups.
    pub name: Option<String>,
    pub show_text: bool,
}

pub fn list_text(args: ListTextArgs, log: &DiagnosticLog) -> Result<()> {
    let script_type = ScriptType::from_str(&args.lump).map_err(|_| {
        let expected = ScriptType::ALL
            .iter()
            .map(|t| t.lump_name())
            .collect::<Vec<_>>()
            .join(", ");
        CliError::unknown_text_lump(args.lump.clone(), expected)
    })?;

    let path = utils::resolve_stack_path(args.stack)?;
    let mut stack =
        ResourceStack::load(&path).map_err(|e| CliError::stack_load_failed(path.clone(), e))?;

    let name = args.name.unwrap_or_else(|| script_type.lump_name().to_string());
    let resources = match script_type {
        ScriptType::Decorate => stack.decorate_data(&name),
        ScriptType::Zscript => stack.zscript_data(&name),
        ScriptType::Modeldef => stack.modeldef_data(&name),
        ScriptType::Mapinfo => stack.mapinfo_data(),
        ScriptType::Gldefs => stack.gldefs_data(),
        ScriptType::Dehacked => stack.dehacked_data(),
        ScriptType::Iwadinfo => stack.iwadinfo_data(),
        other => stack.text_lump_data(other, false, false),
    }
    .map_err(CliError::from)?;

    println_pad!(
        "{} {} ({} found)",
        "📜 Text lumps:".bright_blue().bold(),
        script_type.to_string().bright_cyan().bold(),
        resources.len()
    );
    for resource in &resources {
        print_resource(resource, args.show_text);
    }

    stack.dispose();
    super::print_diagnostics(log);
    Ok(())
}

fn print_resource(resource: &TextResourceData, show_text: bool) {
    println_pad!(
        "   {} {} {}",
        "•".bright_cyan(),
        resource.path.bright_white(),
        format!("({}, {} bytes)", resource.reader_name, resource.data.len()).dimmed()
    );
    if show_text {
        println_pad!("{}", resource.text());
    }
}
