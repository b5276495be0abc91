//! Arena-backed parameter tree.
//!
//! Nodes are stored in declaration order and addressed by [`NodeId`]; types
//! are shared between nodes through [`TypeId`]. Paths and offsets are fixed
//! when the tree is built.

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};

use crate::parameter::{
    AccessContext, AccessError, ArrayParameter, Parameter, ParameterType, PathNavigator,
    SchemaError,
};

/// Handle to a node of a [`ParameterTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Handle to a type declared in a [`ParameterTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Block { children: Vec<NodeId> },
    Scalar { offset: usize, ty: TypeId },
    Array { offset: usize, ty: TypeId },
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    path: String,
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// A resolved node.
#[derive(Debug, Clone, Copy)]
pub enum Element<'t> {
    Block(Block<'t>),
    Parameter(Parameter<'t>),
    Array(ArrayParameter<'t>),
}

impl<'t> Element<'t> {
    pub fn name(&self) -> &'t str {
        match self {
            Element::Block(block) => block.name(),
            Element::Parameter(param) => param.name(),
            Element::Array(array) => array.name(),
        }
    }

    pub fn path(&self) -> &'t str {
        match self {
            Element::Block(block) => block.path(),
            Element::Parameter(param) => param.path(),
            Element::Array(array) => array.path(),
        }
    }

    /// Bytes of blackboard covered by this node and its descendants.
    pub fn footprint(&self) -> usize {
        match self {
            Element::Block(block) => block.footprint(),
            Element::Parameter(param) => param.size(),
            Element::Array(array) => array.footprint(),
        }
    }

    /// Continues a text access on this node.
    ///
    /// Blocks hold no value, so any access stopping at a block fails with
    /// `PathNotFound`.
    pub fn access_value(
        &self,
        navigator: &mut PathNavigator<'_>,
        value: &mut String,
        is_set: bool,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        match self {
            Element::Block(block) => Err(AccessError::path_not_found(format!(
                "Path not found: {} is not a parameter",
                block.path()
            ))),
            Element::Parameter(param) => param.access_value(navigator, value, is_set, ctx),
            Element::Array(array) => array.access_value(navigator, value, is_set, ctx),
        }
    }
}

/// A structural node grouping other nodes.
#[derive(Debug, Clone, Copy)]
pub struct Block<'t> {
    tree: &'t ParameterTree,
    id: NodeId,
}

impl<'t> Block<'t> {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'t str {
        &self.tree.node(self.id).name
    }

    pub fn path(&self) -> &'t str {
        &self.tree.node(self.id).path
    }

    pub fn children(&self) -> &'t [NodeId] {
        self.tree.children(self.id)
    }

    pub fn footprint(&self) -> usize {
        self.children()
            .iter()
            .map(|&child| self.tree.element(child).footprint())
            .sum()
    }
}

/// Immutable tree of blocks and parameters with their blackboard layout.
#[derive(Debug, Clone)]
pub struct ParameterTree {
    nodes: Vec<Node>,
    types: Vec<ParameterType>,
    footprint: usize,
}

impl ParameterTree {
    /// Starts a tree whose root block is named `root`.
    pub fn builder(root: &str) -> Result<ParameterTreeBuilder, SchemaError> {
        ParameterTreeBuilder::new(root)
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Total bytes of blackboard the tree lays out.
    #[inline]
    pub fn footprint(&self) -> usize {
        self.footprint
    }

    pub fn parameter_type(&self, id: TypeId) -> &ParameterType {
        &self.types[id.0]
    }

    pub fn types(&self) -> &[ParameterType] {
        &self.types
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> Element<'_> {
        let node = self.node(id);
        match node.kind {
            NodeKind::Block { .. } => Element::Block(Block { tree: self, id }),
            NodeKind::Scalar { offset, ty } => Element::Parameter(Parameter::new(
                &node.name,
                &node.path,
                offset,
                self.parameter_type(ty),
            )),
            NodeKind::Array { offset, ty } => Element::Array(ArrayParameter::new(
                &node.name,
                &node.path,
                offset,
                self.parameter_type(ty),
            )),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Children in declaration order; empty for parameters.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match &self.node(id).kind {
            NodeKind::Block { children } => children.as_slice(),
            _ => &[],
        }
    }

    fn child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.node(child).name == name)
    }

    /// Walks `navigator` from the root down to the first parameter or to the
    /// deepest block the path names.
    ///
    /// The navigator is left just past the returned node, so array index
    /// components stay unconsumed.
    pub fn resolve(&self, navigator: &mut PathNavigator<'_>) -> Result<Element<'_>, AccessError> {
        navigator.navigate_through(&self.node(self.root()).name)?;

        let mut current = self.root();
        loop {
            let element = self.element(current);
            if !matches!(element, Element::Block(_)) {
                return Ok(element);
            }
            let Some(token) = navigator.next() else {
                return Ok(element);
            };
            current = self.child_named(current, token).ok_or_else(|| {
                AccessError::path_not_found(format!(
                    "Path not found: {}",
                    navigator.current_path()
                ))
            })?;
        }
    }

    /// Finds the node at exactly `path`.
    pub fn find(&self, path: &str) -> Result<NodeId, AccessError> {
        let mut navigator = PathNavigator::new(path)?;
        navigator.navigate_through(&self.node(self.root()).name)?;

        let mut current = self.root();
        for token in navigator {
            current = self.child_named(current, token).ok_or_else(|| {
                AccessError::path_not_found(format!("Path not found: {path}"))
            })?;
        }
        Ok(current)
    }

    /// Reads or writes the value at `path` as text.
    pub fn access_value(
        &self,
        path: &str,
        value: &mut String,
        is_set: bool,
        ctx: &mut AccessContext<'_>,
    ) -> Result<(), AccessError> {
        let mut navigator = PathNavigator::new(path)?;
        let element = self.resolve(&mut navigator)?;
        element.access_value(&mut navigator, value, is_set, ctx)
    }

    /// Every parameter and array, in declaration order.
    pub fn parameters(&self) -> impl Iterator<Item = Element<'_>> + '_ {
        (0..self.nodes.len())
            .map(|idx| self.element(NodeId(idx)))
            .filter(|element| !matches!(element, Element::Block(_)))
    }

    /// Loads every parameter's default value without marking dirty.
    pub fn set_default_values(&self, ctx: &mut AccessContext<'_>) {
        for element in self.parameters() {
            match element {
                Element::Parameter(param) => param.set_default_values(ctx),
                Element::Array(array) => array.set_default_values(ctx),
                Element::Block(_) => {}
            }
        }
    }

    /// Renders every parameter as one `path = value` line.
    pub fn dump(&self, ctx: &AccessContext<'_>) -> String {
        let mut out = String::new();
        for element in self.parameters() {
            let value = match element {
                Element::Parameter(param) => param.log_value(ctx),
                Element::Array(array) => array.log_value(ctx),
                Element::Block(_) => continue,
            };
            out.push_str(element.path());
            out.push_str(" = ");
            out.push_str(&value);
            out.push('\n');
        }
        out
    }
}

/// Declares types and nodes, packing parameters in declaration order.
///
/// Each parameter is placed right after the previous one; arrays take
/// `size * array_length` bytes.
#[derive(Debug, Clone)]
pub struct ParameterTreeBuilder {
    nodes: Vec<Node>,
    types: Vec<ParameterType>,
    next_offset: usize,
}

impl ParameterTreeBuilder {
    pub fn new(root: &str) -> Result<Self, SchemaError> {
        check_name(root)?;
        let mut path = String::from("/");
        path.push_str(root);
        Ok(Self {
            nodes: alloc::vec![Node {
                name: root.to_string(),
                path,
                parent: None,
                kind: NodeKind::Block {
                    children: Vec::new(),
                },
            }],
            types: Vec::new(),
            next_offset: 0,
        })
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Validates and registers a type.
    pub fn add_type(&mut self, ty: ParameterType) -> Result<TypeId, SchemaError> {
        ty.validate()?;
        self.types.push(ty);
        Ok(TypeId(self.types.len() - 1))
    }

    pub fn add_block(&mut self, parent: NodeId, name: &str) -> Result<NodeId, SchemaError> {
        self.add_node(
            parent,
            name,
            NodeKind::Block {
                children: Vec::new(),
            },
        )
    }

    /// Adds a scalar or, when the type has an array length, an array.
    ///
    /// Fails with [`SchemaError::FootprintTooLarge`] if the layout no longer
    /// fits in the address space.
    pub fn add_parameter(
        &mut self,
        parent: NodeId,
        name: &str,
        ty: TypeId,
    ) -> Result<NodeId, SchemaError> {
        let declared = self.types.get(ty.0).ok_or(SchemaError::UnknownType)?;
        let offset = self.next_offset;
        let (kind, footprint) = match declared.array_length() {
            0 => (NodeKind::Scalar { offset, ty }, Some(declared.size())),
            length => (NodeKind::Array { offset, ty }, declared.size().checked_mul(length)),
        };
        let next_offset = footprint
            .and_then(|footprint| offset.checked_add(footprint))
            .ok_or(SchemaError::FootprintTooLarge)?;

        let id = self.add_node(parent, name, kind)?;
        self.next_offset = next_offset;
        Ok(id)
    }

    fn add_node(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
    ) -> Result<NodeId, SchemaError> {
        check_name(name)?;
        let id = NodeId(self.nodes.len());

        let parent_node = self.nodes.get(parent.0).ok_or(SchemaError::UnknownParent)?;
        let NodeKind::Block { children } = &parent_node.kind else {
            return Err(SchemaError::ParentNotBlock);
        };
        if children.iter().any(|c| self.nodes[c.0].name == name) {
            return Err(SchemaError::DuplicateName);
        }
        let path = format!("{}/{}", parent_node.path, name);

        if let NodeKind::Block { children } = &mut self.nodes[parent.0].kind {
            children.push(id);
        }
        self.nodes.push(Node {
            name: name.to_string(),
            path,
            parent: Some(parent),
            kind,
        });
        Ok(id)
    }

    pub fn build(self) -> ParameterTree {
        ParameterTree {
            nodes: self.nodes,
            types: self.types,
            footprint: self.next_offset,
        }
    }
}

fn check_name(name: &str) -> Result<(), SchemaError> {
    if name.is_empty() || name.contains('/') {
        Err(SchemaError::InvalidName)
    } else {
        Ok(())
    }
}
