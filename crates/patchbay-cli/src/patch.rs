//! The factory patch and command-line edits applied to it.
//!
//! Edits address nodes by kind id (`attack`, `vco`, ...) and apply to every
//! node of that kind in the patch.

use std::str::FromStr;

use anyhow::{Context, bail};
use patchbay_core::{NodeId, NodeKind};
use patchbay_sync::PatchSession;

/// Builds the default patch: four envelope stages into an ADSR, a keyboard
/// driving the VCO pitch and the envelope gate, the VCO through a VCA
/// shaped by the envelope, and VCA plus noise into a mixer.
pub fn build_factory_patch(session: &mut PatchSession) -> anyhow::Result<()> {
    let adsr = session.create_kind(NodeKind::Adsr)?;
    for (kind, port) in [
        (NodeKind::Attack, "attack"),
        (NodeKind::Decay, "decay"),
        (NodeKind::Sustain, "sustain"),
        (NodeKind::Release, "release"),
    ] {
        let stage = session.create_kind(kind)?;
        session.add_connection(stage, "value", adsr, port)?;
    }

    let keyboard = session.create_kind(NodeKind::MonophonicKeyboard)?;
    let vco = session.create_kind(NodeKind::Vco)?;
    let vca = session.create_kind(NodeKind::Vca)?;
    let noise = session.create_kind(NodeKind::Noise)?;
    let mixer = session.create_kind(NodeKind::Mixer)?;

    session.add_connection(keyboard, "pitch", vco, "pitch")?;
    session.add_connection(keyboard, "duration", adsr, "gate")?;
    session.add_connection(vco, "audio", vca, "audio")?;
    session.add_connection(adsr, "envelope", vca, "cv")?;
    session.add_connection(vca, "audio", mixer, "osc1")?;
    session.add_connection(noise, "noise", mixer, "noise")?;
    Ok(())
}

/// `kind.control=value`
#[derive(Clone, Debug, PartialEq)]
pub struct SetControl {
    pub kind: String,
    pub control: String,
    pub value: f32,
}

impl FromStr for SetControl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, value) = s
            .split_once('=')
            .with_context(|| format!("expected kind.control=value, got '{s}'"))?;
        let (kind, control) = split_dotted(target)?;
        let value = value
            .trim()
            .parse::<f32>()
            .with_context(|| format!("invalid value in '{s}'"))?;
        Ok(Self {
            kind,
            control,
            value,
        })
    }
}

/// `kind.port`, an input port to disconnect.
#[derive(Clone, Debug, PartialEq)]
pub struct Unwire {
    pub kind: String,
    pub port: String,
}

impl FromStr for Unwire {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, port) = split_dotted(s)?;
        Ok(Self { kind, port })
    }
}

/// `kind.port=kind.port`, output to input.
#[derive(Clone, Debug, PartialEq)]
pub struct Connect {
    pub source: (String, String),
    pub target: (String, String),
}

impl FromStr for Connect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, target) = s
            .split_once('=')
            .with_context(|| format!("expected kind.output=kind.input, got '{s}'"))?;
        Ok(Self {
            source: split_dotted(source)?,
            target: split_dotted(target)?,
        })
    }
}

fn split_dotted(s: &str) -> anyhow::Result<(String, String)> {
    match s.trim().split_once('.') {
        Some((a, b)) if !a.is_empty() && !b.is_empty() => Ok((a.to_string(), b.to_string())),
        _ => bail!("expected kind.name, got '{s}'"),
    }
}

/// Nodes of the kind named `id`, lowest id first. Fails if none exist.
fn nodes_of(session: &PatchSession, id: &str) -> anyhow::Result<Vec<NodeId>> {
    let kind = session
        .registry()
        .get(id)
        .map(|d| d.kind)
        .with_context(|| format!("unknown node kind '{id}'"))?;
    let nodes: Vec<NodeId> = session
        .graph()
        .nodes()
        .filter(|(_, node)| node.kind() == kind)
        .map(|(id, _)| id)
        .collect();
    if nodes.is_empty() {
        bail!("the patch has no {kind} node");
    }
    Ok(nodes)
}

/// Sets a control on every node of the kind.
pub fn apply_set(session: &mut PatchSession, edit: &SetControl) -> anyhow::Result<()> {
    for node in nodes_of(session, &edit.kind)? {
        let stored = session
            .set_control(node, &edit.control, edit.value)
            .with_context(|| format!("--set {}.{}", edit.kind, edit.control))?;
        if stored != edit.value {
            tracing::warn!(node = %node, "{}.{} clamped to {stored}", edit.kind, edit.control);
        }
    }
    Ok(())
}

/// Removes the incoming connection of the port on every node of the kind.
/// Returns how many connections were removed.
pub fn apply_unwire(session: &mut PatchSession, edit: &Unwire) -> anyhow::Result<usize> {
    let mut removed = 0;
    for node in nodes_of(session, &edit.kind)? {
        let Some((id, _)) = session.graph().incoming(node, &edit.port) else {
            continue;
        };
        session.remove_connection(id)?;
        removed += 1;
    }
    if removed == 0 {
        tracing::warn!("--unwire {}.{}: nothing was connected", edit.kind, edit.port);
    }
    Ok(removed)
}

/// Connects the first node of the source kind to the first node of the
/// target kind.
pub fn apply_connect(session: &mut PatchSession, edit: &Connect) -> anyhow::Result<()> {
    let source = nodes_of(session, &edit.source.0)?[0];
    let target = nodes_of(session, &edit.target.0)?[0];
    session
        .add_connection(source, &edit.source.1, target, &edit.target.1)
        .with_context(|| {
            format!(
                "--connect {}.{}={}.{}",
                edit.source.0, edit.source.1, edit.target.0, edit.target.1
            )
        })?;
    Ok(())
}
