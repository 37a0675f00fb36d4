//! Node catalog listing and details.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use patchbay_core::Direction;
use patchbay_registry::{NodeCategory, NodeRegistry};

#[derive(Args)]
pub struct NodesArgs {
    /// Show ports and controls for one node kind
    #[arg(value_name = "KIND")]
    kind: Option<String>,
}

pub fn run(args: NodesArgs) -> anyhow::Result<()> {
    let registry = NodeRegistry::new();

    let Some(id) = &args.kind else {
        println!("Available Nodes");
        println!("===============");
        for category in NodeCategory::ALL {
            let nodes = registry.nodes_in_category(category);
            if nodes.is_empty() {
                continue;
            }
            println!();
            println!("{} - {}", category.name(), category.description());
            for node in nodes {
                println!("  {:10} - {}", node.id, node.description);
            }
        }
        println!();
        println!("Use 'patchbay nodes <kind>' for ports and controls.");
        return Ok(());
    };

    let node = registry
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Unknown node kind: {}", id))?;
    let kind = node.kind;

    println!("{} ({})", node.name, node.id);
    println!("{}", "=".repeat(node.name.len() + node.id.len() + 3));
    println!();
    println!("{}", node.description);

    for (title, direction) in [("Inputs", Direction::Input), ("Outputs", Direction::Output)] {
        let ports = kind.ports(direction);
        println!();
        if ports.is_empty() {
            println!("{title}: none");
            continue;
        }
        println!("{title}:");
        for port in ports {
            let note = match (direction, port.required) {
                (Direction::Input, true) => "required",
                (Direction::Input, false) => "optional",
                (Direction::Output, _) => "",
            };
            println!("  {:10}  {:10}  {}", port.name, port.socket.tag(), note);
        }
    }

    println!();
    if kind.controls().is_empty() {
        println!("Controls: none");
        return Ok(());
    }
    println!("Controls:");
    println!("  {:14}  {:12}  {}", "Name", "Default", "Range");
    println!("  {:14}  {:12}  {}", "----", "-------", "-----");
    for control in kind.controls() {
        println!(
            "  {:14}  {:12}  {} to {}",
            control.name,
            control.format_value(control.default),
            control.format_value(control.min),
            control.format_value(control.max)
        );
    }
    Ok(())
}
