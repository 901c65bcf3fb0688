use crate::context::Context;
use crate::errors::SchemaError;
use crate::generators;
use crate::mockable::{Shape, TypeInfo};
use crate::registry::{GeneratorRegistry, TagParserRegistry};
use crate::schema::{BoundGenerator, ELEMENT_SEGMENT, FieldNode, Kind, NodeId, Schema};
use crate::tags::{self, INTO, KEY, ParsedTag, SKIP, TagSet, TagSplitter};

/// Builds a [`Schema`] from a type description. One compiler per schema.
pub(crate) struct Compiler<'a> {
    marker: &'a str,
    splitter: &'a TagSplitter,
    generators: &'a GeneratorRegistry,
    tag_parsers: &'a TagParserRegistry,
    context: &'a Context,
    nodes: Vec<FieldNode>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(
        marker: &'a str,
        splitter: &'a TagSplitter,
        generators: &'a GeneratorRegistry,
        tag_parsers: &'a TagParserRegistry,
        context: &'a Context,
    ) -> Self {
        Self {
            marker,
            splitter,
            generators,
            tag_parsers,
            context,
            nodes: Vec::new(),
        }
    }

    /// Compiles a pointer-free struct type.
    pub(crate) fn compile(mut self, info: TypeInfo) -> Result<Schema, SchemaError> {
        let (info, is_ptr) = info.strip_pointers();
        self.nodes.push(FieldNode {
            index: 0,
            name: "",
            type_name: info.name,
            kind: Kind::Struct,
            is_ptr,
            alias: String::new(),
            tags: TagSet::default(),
            generator: None,
            parent: None,
            children: Vec::new(),
        });
        self.compile_fields(NodeId(0), info)?;
        Ok(Schema::new(info.name, self.nodes))
    }

    fn compile_fields(&mut self, parent: NodeId, info: TypeInfo) -> Result<(), SchemaError> {
        self.context.check()?;
        let Shape::Struct(fields) = info.shape else {
            return Ok(());
        };
        for field in fields() {
            let Some(raw) = field.tag(self.marker).filter(|raw| !raw.is_empty()) else {
                continue;
            };
            let tokens = self.splitter.split(raw);
            let (id, ty) = self.push_node(parent, field.index, field.name, (field.ty)())?;
            self.compile_node(id, ty, &tokens)?;
            self.nodes[parent.0].children.push(id);
        }
        Ok(())
    }

    fn push_node(
        &mut self,
        parent: NodeId,
        index: usize,
        name: &'static str,
        ty: TypeInfo,
    ) -> Result<(NodeId, TypeInfo), SchemaError> {
        let (ty, is_ptr) = ty.strip_pointers();
        let alias = self.alias_for(parent, name);
        let kind = Kind::of(&ty).map_err(|kind| SchemaError::UnsupportedKind {
            field: alias.clone(),
            kind,
        })?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(FieldNode {
            index,
            name,
            type_name: ty.name,
            kind,
            is_ptr,
            alias,
            tags: TagSet::default(),
            generator: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        Ok((id, ty))
    }

    fn alias_for(&self, parent: NodeId, name: &str) -> String {
        let parent = &self.nodes[parent.0];
        let mut alias = parent.alias.clone();
        if parent.kind == Kind::Slice {
            push_segment(&mut alias, ELEMENT_SEGMENT);
        }
        if !name.is_empty() {
            push_segment(&mut alias, name);
        }
        alias
    }

    fn compile_node(
        &mut self,
        id: NodeId,
        ty: TypeInfo,
        tokens: &[&'static str],
    ) -> Result<(), SchemaError> {
        let deferred = self.parse_tokens(id, tokens)?;
        let node = &self.nodes[id.0];
        if node.tags.contains(SKIP) {
            return Ok(());
        }
        let kind = node.kind;
        match kind {
            Kind::Slice => self.compile_slice(id, ty, deferred),
            Kind::Struct => self.compile_struct(id, ty, deferred),
            kind => self.bind(id, generators::default_key(kind)),
        }
    }

    /// Parses tokens into the node's tag set. Tokens after `into` are
    /// returned for the element or nested struct.
    fn parse_tokens(
        &mut self,
        id: NodeId,
        tokens: &[&'static str],
    ) -> Result<Option<Vec<&'static str>>, SchemaError> {
        for (position, &token) in tokens.iter().enumerate() {
            let (key, raw) = tags::split_token(token);
            let node = &self.nodes[id.0];
            let parser = self
                .tag_parsers
                .get(key)
                .ok_or_else(|| SchemaError::UnknownTag {
                    field: node.alias.clone(),
                    key: key.to_string(),
                })?;
            let value = parser
                .parse(node.kind, key, raw)
                .map_err(|err| SchemaError::InvalidTag {
                    field: node.alias.clone(),
                    key: key.to_string(),
                    value: raw.to_string(),
                    reason: err.to_string(),
                })?;
            self.nodes[id.0].tags.insert(ParsedTag::new(key, raw, value));
            if key == INTO {
                return Ok(Some(tokens[position + 1..].to_vec()));
            }
        }
        Ok(None)
    }

    fn compile_slice(
        &mut self,
        id: NodeId,
        ty: TypeInfo,
        deferred: Option<Vec<&'static str>>,
    ) -> Result<(), SchemaError> {
        self.bind(id, Some(generators::SLICE))?;
        let (Some(deferred), Shape::Slice(element)) = (deferred, ty.shape) else {
            return Ok(());
        };
        let element = element();
        let tokens = match (deferred.is_empty(), element.strip_pointers().0.is_struct()) {
            (false, _) => deferred,
            (true, true) => vec![INTO],
            (true, false) => return Ok(()),
        };
        let (child, child_ty) = self.push_node(id, 0, "", element)?;
        self.compile_node(child, child_ty, &tokens)?;
        self.nodes[id.0].children.push(child);
        Ok(())
    }

    fn compile_struct(
        &mut self,
        id: NodeId,
        ty: TypeInfo,
        deferred: Option<Vec<&'static str>>,
    ) -> Result<(), SchemaError> {
        let fallback = self.nodes[id.0].is_ptr.then_some(generators::STRUCT);
        self.bind(id, fallback)?;
        if deferred.is_none() {
            return Ok(());
        }
        self.compile_fields(id, ty)
    }

    /// Binds the generator named by `key`, or `fallback` when the tag is absent.
    fn bind(&mut self, id: NodeId, fallback: Option<&str>) -> Result<(), SchemaError> {
        let node = &self.nodes[id.0];
        let key = match node.tags.get(KEY) {
            Some(tag) => tag.raw().to_string(),
            None => match fallback {
                Some(key) => key.to_string(),
                None => return Ok(()),
            },
        };
        let generator = self
            .generators
            .get(&key)
            .ok_or_else(|| SchemaError::UnknownGenerator {
                field: node.alias.clone(),
                key: key.clone(),
            })?;
        self.nodes[id.0].generator = Some(BoundGenerator { key, generator });
        Ok(())
    }
}

fn push_segment(alias: &mut String, segment: &str) {
    if !alias.is_empty() {
        alias.push('.');
    }
    alias.push_str(segment);
}
