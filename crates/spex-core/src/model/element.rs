use crate::{
    model::{Schema, TypeExpr, TypeKind},
    value::{COUNT_MEMBER, casefold},
};
use spex_primitives::TypeGroup;

/// Index of a property inside its element's arena.
pub type PropertyId = usize;

/// Name of the root property.
pub const THIS: &str = "This";

const ROOT: PropertyId = 0;

///
/// Property
///
/// One node of an element's descriptor tree. `path` is empty for the root
/// and unique within the element.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    path: String,
    name: String,
    origin: String,
    ty: TypeExpr,
    group: TypeGroup,
    options: Vec<String>,
    children: Vec<PropertyId>,
}

impl Property {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the type that declares this property.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[must_use]
    pub const fn ty(&self) -> &TypeExpr {
        &self.ty
    }

    #[must_use]
    pub const fn group(&self) -> TypeGroup {
        self.group
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

///
/// Element
///
/// Descriptor tree for one domain type, built once from the schema and
/// shared read-only afterwards. Properties live in an arena; index 0 is
/// the `This` root.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Element {
    ty: TypeExpr,
    is_component: bool,
    properties: Vec<Property>,
}

impl Element {
    /// Build the tree for `ty`, expanding at most `max_depth` path segments.
    ///
    /// Self-referencing records (`Widget.Parent: Widget`) repeat their fields
    /// under each new prefix; `max_depth` is what ends the recursion.
    pub(crate) fn build(schema: &Schema, ty: &TypeExpr, max_depth: usize) -> Self {
        let is_component = match ty {
            TypeExpr::Named(name) => schema.get(name).is_some_and(|def| def.is_component()),
            TypeExpr::List(_) => false,
        };

        let mut builder = Builder {
            schema,
            max_depth,
            properties: Vec::new(),
        };
        builder.push(None, THIS, ty.root_name(), ty.clone());
        builder.expand(ROOT, 0);

        Self {
            ty: ty.clone(),
            is_component,
            properties: builder.properties,
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.ty.to_string()
    }

    #[must_use]
    pub const fn ty(&self) -> &TypeExpr {
        &self.ty
    }

    #[must_use]
    pub const fn is_component(&self) -> bool {
        self.is_component
    }

    #[must_use]
    pub fn group(&self) -> TypeGroup {
        self.this().group
    }

    /// Root property (empty path).
    #[must_use]
    pub fn this(&self) -> &Property {
        &self.properties[ROOT]
    }

    /// Resolve a dotted path. Returns `None` when any segment is unmatched.
    #[must_use]
    pub fn property(&self, path: &str) -> Option<&Property> {
        let mut current = self.this();
        if path.is_empty() {
            return Some(current);
        }

        for segment in path.split('.') {
            current = self.children(current).find(|child| child.name == segment)?;
        }

        Some(current)
    }

    /// Every descendant property, root excluded, in depth-first order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().skip(1)
    }

    pub fn children<'a>(&'a self, property: &'a Property) -> impl Iterator<Item = &'a Property> {
        property.children.iter().map(|id| &self.properties[*id])
    }

    /// Descendants whose path contains `fragment`, ignoring case.
    pub fn search<'a>(&'a self, fragment: &str) -> impl Iterator<Item = &'a Property> {
        let fragment = casefold(fragment);

        self.properties()
            .filter(move |property| casefold(&property.path).contains(&fragment))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.len() <= 1
    }
}

///
/// Builder
///

struct Builder<'a> {
    schema: &'a Schema,
    max_depth: usize,
    properties: Vec<Property>,
}

impl Builder<'_> {
    fn push(&mut self, parent: Option<PropertyId>, name: &str, origin: &str, ty: TypeExpr) -> PropertyId {
        let path = match parent {
            None => String::new(),
            Some(parent) if self.properties[parent].path.is_empty() => name.to_string(),
            Some(parent) => format!("{}.{name}", self.properties[parent].path),
        };

        let id = self.properties.len();
        self.properties.push(Property {
            path,
            name: name.to_string(),
            origin: origin.to_string(),
            group: self.schema.group_of(&ty),
            options: self.schema.options_of(&ty),
            ty,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.properties[parent].children.push(id);
        }

        id
    }

    fn expand(&mut self, id: PropertyId, depth: usize) {
        if depth >= self.max_depth {
            return;
        }

        match self.properties[id].ty.clone() {
            TypeExpr::List(_) => {
                let origin = self.properties[id].origin.clone();
                self.push(Some(id), COUNT_MEMBER, &origin, TypeExpr::named("Int"));
            }
            TypeExpr::Named(name) => {
                let fields = match self.schema.get(&name).map(|def| &def.kind) {
                    Some(TypeKind::Record { fields, .. }) => fields.clone(),
                    _ => return,
                };

                for field in fields {
                    let child = self.push(Some(id), &field.name, &name, field.ty);
                    self.expand(child, depth + 1);
                }
            }
        }
    }
}
