//! Built-in layer filters.
//!
//! A filter answers two questions per entity: should it be tessellated, and
//! should the walk descend into its children (pads under modules, drills
//! under pads and vias). The shell can pass any closure; these cover the
//! standard viewer layers.

use rustc_hash::FxHashSet;

use crate::parser::node::Node;
use crate::parser::pcb::{check_layer, Face, LayerClass, NodeType};
use crate::render::RenderContext;

/// Decides which board entities participate in a layer.
pub trait LayerFilter {
    /// Returns `(emit this entity, descend into its children)`. `stack`
    /// holds the ancestry, innermost (the entity itself) last.
    fn test(&self, ctx: &RenderContext<'_>, node: &Node, stack: &[&Node]) -> (bool, bool);
}

/// Plain closures work as filters when they need no board context.
impl<F> LayerFilter for F
where
    F: Fn(&Node, &[&Node]) -> (bool, bool),
{
    fn test(&self, _ctx: &RenderContext<'_>, node: &Node, stack: &[&Node]) -> (bool, bool) {
        self(node, stack)
    }
}

/// Matches entities by face and layer class.
#[derive(Clone, Copy, Debug)]
pub struct StandardFilter {
    pub face: Face,
    pub class: LayerClass,
}

impl LayerFilter for StandardFilter {
    fn test(&self, ctx: &RenderContext<'_>, node: &Node, _stack: &[&Node]) -> (bool, bool) {
        (
            check_layer(node, ctx.interner, ctx.keywords, self.face, self.class),
            true,
        )
    }
}

/// Copper entities, optionally restricted by net id and with zones pruned.
#[derive(Clone, Debug, Default)]
pub struct CopperFilter {
    pub face: Face,
    pub skip_zones: bool,
    pub skip_nets: Option<FxHashSet<u32>>,
    pub include_nets: Option<FxHashSet<u32>>,
}

impl LayerFilter for CopperFilter {
    fn test(&self, ctx: &RenderContext<'_>, node: &Node, _stack: &[&Node]) -> (bool, bool) {
        let ty = ctx.keywords.node_type(node);
        if self.skip_zones && ty == NodeType::Zone {
            return (false, false);
        }

        if self.skip_nets.is_some() || self.include_nets.is_some() {
            if let Some(net) = node.find(ctx.keywords.tags.net) {
                if net.len() >= 2 {
                    let id = net.number_at(1).unwrap_or(0.0) as u32;
                    if let Some(skip) = &self.skip_nets {
                        if skip.contains(&id) {
                            return (false, false);
                        }
                    }
                    if let Some(include) = &self.include_nets {
                        if !include.contains(&id) {
                            return (false, false);
                        }
                    }
                }
            } else if self.include_nets.is_some() {
                return (false, true);
            }
        }

        (
            check_layer(node, ctx.interner, ctx.keywords, self.face, LayerClass::Copper),
            true,
        )
    }
}

/// Module pads (and optionally courtyards) that sit under a module ancestor.
#[derive(Clone, Copy, Debug)]
pub struct ModuleFilter {
    pub face: Face,
    pub include_court: bool,
}

impl LayerFilter for ModuleFilter {
    fn test(&self, ctx: &RenderContext<'_>, node: &Node, stack: &[&Node]) -> (bool, bool) {
        let kw = ctx.keywords;
        let is_pad = check_layer(node, ctx.interner, kw, self.face, LayerClass::Copper)
            && kw.node_type(node) == NodeType::Pad;
        let is_court = self.include_court
            && check_layer(node, ctx.interner, kw, self.face, LayerClass::Courtyard);

        if is_pad || is_court {
            if stack.len() < 2 {
                return (false, true);
            }
            let inside_module = stack
                .iter()
                .rev()
                .skip(1)
                .any(|n| kw.node_type(n) == NodeType::Module);
            return (inside_module, true);
        }

        (false, true)
    }
}

/// Drill holes only.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoleFilter;

impl LayerFilter for HoleFilter {
    fn test(&self, ctx: &RenderContext<'_>, node: &Node, _stack: &[&Node]) -> (bool, bool) {
        (ctx.keywords.node_type(node) == NodeType::Drill, true)
    }
}
