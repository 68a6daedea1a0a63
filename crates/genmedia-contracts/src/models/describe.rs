use std::fmt::{self, Write as _};

use super::capability::{CapabilityLimits, MediaFamily, ModelCapability};
use super::registry::CapabilityRegistry;

/// Human-readable model listing advertised as tool discovery metadata.
///
/// Models are emitted in lexicographic order of canonical id, never catalog
/// order, so the text is stable across runs and catalog edits that only
/// reorder entries.
pub fn describe_family(registry: &CapabilityRegistry, family: MediaFamily) -> String {
    let mut out = String::new();
    out.push_str(header(family));
    out.push('\n');
    for id in registry.sorted_ids(family) {
        if let Some(model) = registry.lookup(family, id) {
            // Writing into a String cannot fail.
            let _ = write_model_line(&mut out, model);
        }
    }
    out
}

fn header(family: MediaFamily) -> &'static str {
    match family {
        MediaFamily::Image => {
            "Model for image generation. Can be a full model ID or a common name. Supported models:"
        }
        MediaFamily::Video => {
            "Model for video generation. Can be a full model ID or a common name. Supported models:"
        }
        MediaFamily::Multimodal => {
            "Model for content generation. Can be a full model ID or a common name. Supported models:"
        }
    }
}

fn write_model_line(out: &mut String, model: &ModelCapability) -> fmt::Result {
    let id = model.canonical_id.as_str();
    match &model.limits {
        CapabilityLimits::Image {
            max_outputs,
            aspect_ratios,
            output_sizes,
        } => {
            write!(
                out,
                "- *{id}* (Max Images: {max_outputs}, Ratios: {})",
                aspect_ratios.join(", ")
            )?;
            if !output_sizes.is_empty() {
                write!(out, " (Sizes: {})", output_sizes.join(", "))?;
            }
            write_aliases(out, &model.aliases, false)?;
        }
        CapabilityLimits::Video {
            max_outputs,
            aspect_ratios,
            durations,
            ..
        } => {
            let durations = durations
                .iter()
                .map(u32::to_string)
                .collect::<Vec<String>>()
                .join(", ");
            write!(
                out,
                "- *{id}* (Durations: [{durations}]s, Max Videos: {max_outputs}, Ratios: {})",
                aspect_ratios.join(", ")
            )?;
            write_aliases(out, &model.aliases, false)?;
        }
        CapabilityLimits::Multimodal { description } => {
            write!(out, "- *{id}*: {description}")?;
            write_aliases(out, &model.aliases, true)?;
        }
    }
    out.push('\n');
    Ok(())
}

fn write_aliases(out: &mut String, aliases: &[String], parenthesized: bool) -> fmt::Result {
    if aliases.is_empty() {
        return Ok(());
    }
    let joined = aliases.join("*, *");
    if parenthesized {
        write!(out, " (Aliases: *{joined}*)")
    } else {
        write!(out, " Aliases: *{joined}*")
    }
}
