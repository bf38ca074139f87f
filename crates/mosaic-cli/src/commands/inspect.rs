//! `mosaic inspect`: Show how a sample class was composed.

use crate::catalog;
use crate::output::StyledOutput;
use mosaic_core::{ClassRef, Entity, RuntimeConfig, TypeRef};

pub fn execute(name: &str, config: &RuntimeConfig, out: &mut StyledOutput) -> anyhow::Result<()> {
    let runtime = catalog::runtime(config.clone())?;
    let class = match runtime.lookup(name) {
        Some(TypeRef::Class(class)) => class,
        Some(TypeRef::Interface(iface)) => {
            out.info(&iface.to_string());
            out.newline();
            field(out, "Requires", &join(iface.requires().iter().map(|r| r.entity_name().to_string())));
            let members = iface
                .members()
                .iter()
                .map(|(name, desc)| format!("{} ({})", name, desc.slot.kind()));
            field(out, "Members", &join(members));
            out.flush();
            return Ok(());
        }
        None => anyhow::bail!(
            "No sample named '{}'. Available: {}",
            name,
            runtime.names().join(", ")
        ),
    };

    print_class(&class, out);
    out.flush();
    Ok(())
}

fn print_class(class: &ClassRef, out: &mut StyledOutput) {
    out.info(&class.to_string());
    out.newline();

    let chain = class.ancestors();
    field(out, "Chain", &join_with(chain.iter().map(|c| c.name().to_string()), " < "));
    field(out, "Metaclass", class.metaclass().name());
    field(out, "Abstract", if class.is_abstract() { "yes" } else { "no" });
    field(out, "Implements", &join(class.interfaces().iter().map(|i| i.name().to_string())));

    out.bold("Members:");
    out.newline();
    for name in class.member_names() {
        let owner = chain
            .iter()
            .find(|c| {
                c.own_members()
                    .get(name)
                    .is_some_and(|desc| !desc.is_unimplemented())
            })
            .map(|c| c.name())
            .unwrap_or("?");
        let kind = class.resolve(name).map(|d| d.slot.kind()).unwrap_or("?");
        out.plain(&format!("  {:<20}", name));
        out.dim(&format!("{} from {}", kind, owner));
        out.newline();
    }
}

fn field(out: &mut StyledOutput, label: &str, value: &str) {
    out.bold(&format!("{:<12}", format!("{}:", label)));
    out.plain(value);
    out.newline();
}

fn join_with(items: impl Iterator<Item = String>, separator: &str) -> String {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(separator)
    }
}

fn join(items: impl Iterator<Item = String>) -> String {
    join_with(items, ", ")
}
