//! Compiled field trees.
//!
//! A [`Schema`] is an arena of [`FieldNode`]s rooted at the target struct.
//! Nodes are immutable once compiled and shared between calls through the
//! schema cache.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::generators::Generator;
use crate::mockable::{FloatWidth, IntWidth, Shape, TypeInfo};
use crate::tags::TagSet;

pub(crate) mod cache;
pub(crate) mod compiler;

/// Path segment used for the representative element of a sequence.
pub const ELEMENT_SEGMENT: &str = "0";

/// Kind of a field after pointer layers are stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int(IntWidth),
    Uint(IntWidth),
    Float(FloatWidth),
    String,
    Slice,
    Struct,
}

impl Kind {
    /// Kind of a pointer-free type, or the name of the unsupported kind.
    pub fn of(info: &TypeInfo) -> Result<Kind, &'static str> {
        match info.shape {
            Shape::Bool => Ok(Kind::Bool),
            Shape::Int(width) => Ok(Kind::Int(width)),
            Shape::Uint(width) => Ok(Kind::Uint(width)),
            Shape::Float(width) => Ok(Kind::Float(width)),
            Shape::String => Ok(Kind::String),
            Shape::Slice(_) => Ok(Kind::Slice),
            Shape::Struct(_) => Ok(Kind::Struct),
            Shape::Pointer(_) => Err("pointer"),
            Shape::Unsupported(kind) => Err(kind),
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Kind::Int(_) | Kind::Uint(_))
    }

    pub fn is_float(self) -> bool {
        matches!(self, Kind::Float(_))
    }

    pub fn is_composite(self) -> bool {
        matches!(self, Kind::Slice | Kind::Struct)
    }

    /// Inclusive value range of integer kinds.
    pub fn int_bounds(self) -> Option<(i128, i128)> {
        let bounds = match self {
            Kind::Int(IntWidth::W8) => (i128::from(i8::MIN), i128::from(i8::MAX)),
            Kind::Int(IntWidth::W16) => (i128::from(i16::MIN), i128::from(i16::MAX)),
            Kind::Int(IntWidth::W32) => (i128::from(i32::MIN), i128::from(i32::MAX)),
            Kind::Int(IntWidth::W64) => (i128::from(i64::MIN), i128::from(i64::MAX)),
            Kind::Int(IntWidth::Size) => (isize::MIN as i128, isize::MAX as i128),
            Kind::Uint(IntWidth::W8) => (0, i128::from(u8::MAX)),
            Kind::Uint(IntWidth::W16) => (0, i128::from(u16::MAX)),
            Kind::Uint(IntWidth::W32) => (0, i128::from(u32::MAX)),
            Kind::Uint(IntWidth::W64) => (0, i128::from(u64::MAX)),
            Kind::Uint(IntWidth::Size) => (0, usize::MAX as i128),
            _ => return None,
        };
        Some(bounds)
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int(IntWidth::W8) => "i8",
            Kind::Int(IntWidth::W16) => "i16",
            Kind::Int(IntWidth::W32) => "i32",
            Kind::Int(IntWidth::W64) => "i64",
            Kind::Int(IntWidth::Size) => "isize",
            Kind::Uint(IntWidth::W8) => "u8",
            Kind::Uint(IntWidth::W16) => "u16",
            Kind::Uint(IntWidth::W32) => "u32",
            Kind::Uint(IntWidth::W64) => "u64",
            Kind::Uint(IntWidth::Size) => "usize",
            Kind::Float(FloatWidth::F32) => "f32",
            Kind::Float(FloatWidth::F64) => "f64",
            Kind::String => "string",
            Kind::Slice => "slice",
            Kind::Struct => "struct",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A generator resolved at compile time.
#[derive(Clone)]
pub struct BoundGenerator {
    pub(crate) key: String,
    pub(crate) generator: Arc<dyn Generator>,
}

impl BoundGenerator {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }
}

impl fmt::Debug for BoundGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundGenerator").field("key", &self.key).finish()
    }
}

#[derive(Debug, Clone)]
pub struct FieldNode {
    pub(crate) index: usize,
    pub(crate) name: &'static str,
    pub(crate) type_name: &'static str,
    pub(crate) kind: Kind,
    pub(crate) is_ptr: bool,
    pub(crate) alias: String,
    pub(crate) tags: TagSet,
    pub(crate) generator: Option<BoundGenerator>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl FieldNode {
    /// Declaration position within the parent struct.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Declared name; empty for the root and for sequence elements.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_ptr(&self) -> bool {
        self.is_ptr
    }

    /// Dotted path from the root, e.g. `hobbies.0.id`.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    pub fn generator(&self) -> Option<&BoundGenerator> {
        self.generator.as_ref()
    }

    pub fn generator_key(&self) -> Option<&str> {
        self.generator.as_ref().map(BoundGenerator::key)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug)]
pub struct Schema {
    type_name: &'static str,
    nodes: Vec<FieldNode>,
}

impl Schema {
    pub(crate) fn new(type_name: &'static str, nodes: Vec<FieldNode>) -> Self {
        Self { type_name, nodes }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn root(&self) -> FieldRef<'_> {
        self.field(NodeId(0))
    }

    pub fn field(&self, id: NodeId) -> FieldRef<'_> {
        FieldRef { schema: self, id }
    }

    pub fn node(&self, id: NodeId) -> &FieldNode {
        &self.nodes[id.0]
    }

    /// Finds a node by its dotted alias.
    pub fn lookup(&self, alias: &str) -> Option<FieldRef<'_>> {
        self.nodes
            .iter()
            .position(|node| node.alias == alias)
            .map(|index| self.field(NodeId(index)))
    }

    /// Every compiled node in pre-order, root first.
    pub fn walk(&self) -> Vec<FieldRef<'_>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId(0)];
        while let Some(id) = stack.pop() {
            out.push(self.field(id));
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A node together with the schema it belongs to, for tree navigation.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    schema: &'a Schema,
    id: NodeId,
}

impl<'a> FieldRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &'a FieldNode {
        self.schema.node(self.id)
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn parent(&self) -> Option<FieldRef<'a>> {
        self.node().parent.map(|id| self.schema.field(id))
    }

    pub fn children(&self) -> impl Iterator<Item = FieldRef<'a>> + 'a {
        let schema = self.schema;
        self.node().children.iter().map(move |id| schema.field(*id))
    }
}

impl Deref for FieldRef<'_> {
    type Target = FieldNode;

    fn deref(&self) -> &FieldNode {
        self.node()
    }
}
