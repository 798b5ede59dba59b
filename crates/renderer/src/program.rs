//! Links a vertex and a fragment shader into one [`Program`].
//!
//! Linking checks that both stages compiled, that each exposes a `main` entry
//! point for its stage, that every fragment input is fed by a vertex output of
//! the same type, and that uniform blocks shared by both stages agree. The
//! uniform table is reflected from the IR so callers can look locations up by
//! member name.

use std::collections::BTreeMap;

use naga::{AddressSpace, Binding, Handle, Module, Type, TypeInner};
use tracing::error;

use crate::compile::{CompileError, CompiledShader, ShaderKind};

/// Byte offset of a uniform block member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(u32);

impl UniformLocation {
    pub fn offset(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformMember {
    pub location: UniformLocation,
    pub size: u32,
}

/// A reflected `uniform` block and its members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformBlock {
    pub group: u32,
    pub binding: u32,
    /// Size in bytes the shader expects to be bound.
    pub size: u32,
    members: BTreeMap<String, UniformMember>,
}

impl UniformBlock {
    pub fn member(&self, name: &str) -> Option<UniformMember> {
        self.members.get(name).copied()
    }

    pub fn members(&self) -> impl Iterator<Item = (&str, UniformMember)> {
        self.members
            .iter()
            .map(|(name, member)| (name.as_str(), *member))
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LinkError {
    #[error("{kind} shader was not compiled")]
    ShaderNotCompiled {
        kind: ShaderKind,
        #[source]
        cause: CompileError,
    },
    #[error("the {expected} slot holds a {found:?} shader")]
    StageMismatch {
        expected: ShaderKind,
        found: naga::ShaderStage,
    },
    #[error("{kind} shader has no `main` entry point")]
    MissingEntryPoint { kind: ShaderKind },
    #[error("fragment input at location {location} {detail}")]
    InterfaceMismatch { location: u32, detail: String },
    #[error("uniform block at group {group} binding {binding} differs between stages")]
    UniformBlockMismatch { group: u32, binding: u32 },
    #[error("render pipeline creation failed: {log}")]
    Pipeline { log: String },
}

/// A successfully linked vertex + fragment pair.
#[derive(Debug, Clone)]
pub struct Program {
    vertex: Module,
    fragment: Module,
    uniform_blocks: Vec<UniformBlock>,
}

impl Program {
    /// Looks up a uniform block member by name. `None` means the program does
    /// not declare it.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniform_blocks
            .iter()
            .find_map(|block| block.member(name))
            .map(|member| member.location)
    }

    pub fn uniform_blocks(&self) -> &[UniformBlock] {
        &self.uniform_blocks
    }

    pub fn uniform_block(&self, group: u32, binding: u32) -> Option<&UniformBlock> {
        self.uniform_blocks
            .iter()
            .find(|block| block.group == group && block.binding == binding)
    }

    pub(crate) fn vertex_module(&self) -> &Module {
        &self.vertex
    }

    pub(crate) fn fragment_module(&self) -> &Module {
        &self.fragment
    }
}

/// Outcome of [`ProgramLinker::link_and_debug`].
#[derive(Debug)]
pub struct LinkReport {
    pub result: Result<Program, LinkError>,
    /// Full link log, present only for failed links with debugging enabled.
    pub diagnostic: Option<String>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProgramLinker {
    debug: bool,
}

impl ProgramLinker {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Links without logging anything.
    pub fn link(
        &self,
        vertex: &CompiledShader,
        fragment: &CompiledShader,
    ) -> Result<Program, LinkError> {
        let vertex_module = stage_module(vertex, ShaderKind::Vertex)?;
        let fragment_module = stage_module(fragment, ShaderKind::Fragment)?;

        check_interface(vertex_module, fragment_module)?;
        let uniform_blocks = merge_uniform_blocks(
            reflect_uniform_blocks(vertex_module),
            reflect_uniform_blocks(fragment_module),
        )?;

        Ok(Program {
            vertex: vertex_module.clone(),
            fragment: fragment_module.clone(),
            uniform_blocks,
        })
    }

    /// Links and, when debugging is enabled, logs and returns the link log of a
    /// failed link.
    pub fn link_and_debug(&self, vertex: &CompiledShader, fragment: &CompiledShader) -> LinkReport {
        let result = self.link(vertex, fragment);
        let diagnostic = match &result {
            Err(err) => self.report(err),
            Ok(_) => None,
        };
        LinkReport { result, diagnostic }
    }

    /// Logs `err` and its causes if debugging is enabled and returns the
    /// rendered log.
    pub fn report(&self, err: &LinkError) -> Option<String> {
        if !self.debug {
            return None;
        }
        let mut log = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            log.push('\n');
            log.push_str(&cause.to_string());
            source = cause.source();
        }
        error!("program linking failed\n{log}");
        Some(log)
    }
}

fn stage_module(shader: &CompiledShader, expected: ShaderKind) -> Result<&Module, LinkError> {
    if shader.kind() != expected {
        return Err(LinkError::StageMismatch {
            expected,
            found: shader.kind().naga_stage(),
        });
    }
    let module = shader
        .module()
        .map_err(|cause| LinkError::ShaderNotCompiled {
            kind: expected,
            cause: cause.clone(),
        })?;

    let stage = expected.naga_stage();
    if module
        .entry_points
        .iter()
        .any(|entry| entry.name == "main" && entry.stage == stage)
    {
        return Ok(module);
    }
    match module.entry_points.first() {
        Some(entry) if entry.stage != stage => Err(LinkError::StageMismatch {
            expected,
            found: entry.stage,
        }),
        _ => Err(LinkError::MissingEntryPoint { kind: expected }),
    }
}

fn entry_function(module: &Module, stage: naga::ShaderStage) -> Option<&naga::Function> {
    module
        .entry_points
        .iter()
        .find(|entry| entry.name == "main" && entry.stage == stage)
        .map(|entry| &entry.function)
}

fn check_interface(vertex: &Module, fragment: &Module) -> Result<(), LinkError> {
    let mut outputs = BTreeMap::new();
    if let Some(result) =
        entry_function(vertex, naga::ShaderStage::Vertex).and_then(|function| function.result.as_ref())
    {
        collect_locations(vertex, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut inputs = BTreeMap::new();
    if let Some(function) = entry_function(fragment, naga::ShaderStage::Fragment) {
        for argument in &function.arguments {
            collect_locations(fragment, argument.ty, argument.binding.as_ref(), &mut inputs);
        }
    }

    for (location, input) in &inputs {
        match outputs.get(location) {
            None => {
                return Err(LinkError::InterfaceMismatch {
                    location: *location,
                    detail: "is not written by the vertex stage".to_string(),
                })
            }
            Some(output) if output != input => {
                return Err(LinkError::InterfaceMismatch {
                    location: *location,
                    detail: format!("expects {input:?} but the vertex stage writes {output:?}"),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

// Flattens struct-typed arguments/results into their located members.
fn collect_locations(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut BTreeMap<u32, TypeInner>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.insert(*location, module.types[ty].inner.clone());
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn reflect_uniform_blocks(module: &Module) -> Vec<UniformBlock> {
    module
        .global_variables
        .iter()
        .filter(|(_, variable)| variable.space == AddressSpace::Uniform)
        .filter_map(|(_, variable)| {
            let binding = variable.binding.as_ref()?;
            let TypeInner::Struct { members, span } = &module.types[variable.ty].inner else {
                return None;
            };
            let members = members
                .iter()
                .filter_map(|member| {
                    let name = member.name.clone()?;
                    let size = module.types[member.ty].inner.size(module.to_ctx());
                    Some((
                        name,
                        UniformMember {
                            location: UniformLocation(member.offset),
                            size,
                        },
                    ))
                })
                .collect();
            Some(UniformBlock {
                group: binding.group,
                binding: binding.binding,
                size: *span,
                members,
            })
        })
        .collect()
}

fn merge_uniform_blocks(
    mut blocks: Vec<UniformBlock>,
    other: Vec<UniformBlock>,
) -> Result<Vec<UniformBlock>, LinkError> {
    for block in other {
        match blocks
            .iter()
            .find(|existing| existing.group == block.group && existing.binding == block.binding)
        {
            Some(existing) if *existing != block => {
                return Err(LinkError::UniformBlockMismatch {
                    group: block.group,
                    binding: block.binding,
                })
            }
            Some(_) => {}
            None => blocks.push(block),
        }
    }
    Ok(blocks)
}
