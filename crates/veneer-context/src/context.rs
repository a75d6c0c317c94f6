//! Projection Context
//!
//! A [`ProjectionContext`] projects real type-system entities into proxies
//! that report the context's attribute overlay. Every entity a proxy hands
//! out is projected through the same context, so a consumer holding only
//! projected references never reaches a real one.
//!
//! Types and assemblies are memoized. The caches hold weak references keyed
//! by the real entity's identity; first-time projection goes through the
//! shard-locked entry API, so at most one live proxy exists per real entity
//! and concurrent callers all observe it. Once every strong reference to a
//! proxy is gone the next projection creates an equal replacement in the
//! same slot; dead slots are removed only by
//! [`sweep`](ProjectionContext::sweep).
//!
//! Members and parameters are not memoized. Their proxies compare equal by
//! identity, which is the wrapped entity's identity extended by this
//! context's id. Stacked projections of one entity therefore keep distinct
//! identities.

use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::{debug, trace};
use veneer_table::CustomAttributeTable;
use veneer_types::{
    matches_kind, AssemblyDescription, AssemblyIdentity, AssemblyRef, Attribute, AttributeKind,
    AttributeRef, ContextId, EventRef, FieldRef, MemberRef, MethodRef, ParameterDescription,
    ParameterRef, PropertyRef, TypeDescription, TypeIdentity, TypeRef,
};

use crate::projected::{
    ProjectedAssembly, ProjectedEvent, ProjectedField, ProjectedMethod, ProjectedParameter,
    ProjectedProperty, ProjectedType,
};

/// Options for creating a [`ProjectionContext`]
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    /// Name attached to log events and to the context marker
    pub label: Option<String>,
}

impl ContextOptions {
    /// Options with a label
    pub fn labeled(label: impl Into<String>) -> Self {
        ContextOptions {
            label: Some(label.into()),
        }
    }
}

/// Real entity whose attributes are queried through a context
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    /// Type
    Type(&'a dyn TypeDescription),
    /// Assembly
    Assembly(&'a dyn AssemblyDescription),
    /// Member of any kind
    Member(&'a MemberRef),
    /// Parameter or return value
    Parameter(&'a dyn ParameterDescription),
}

impl Entity<'_> {
    fn own_attributes(&self, kind: Option<&AttributeKind>, inherit: bool) -> Vec<AttributeRef> {
        match self {
            Entity::Type(ty) => ty.custom_attributes(kind, inherit),
            Entity::Assembly(assembly) => assembly.custom_attributes(kind, inherit),
            Entity::Member(member) => member.custom_attributes(kind, inherit),
            Entity::Parameter(parameter) => parameter.custom_attributes(kind, inherit),
        }
    }

    fn defines(&self, kind: &AttributeKind, inherit: bool) -> bool {
        match self {
            Entity::Type(ty) => ty.is_defined(kind, inherit),
            Entity::Assembly(assembly) => assembly.is_defined(kind, inherit),
            Entity::Member(member) => member.is_defined(kind, inherit),
            Entity::Parameter(parameter) => parameter.is_defined(kind, inherit),
        }
    }
}

struct ContextInner {
    id: ContextId,
    options: ContextOptions,
    table: Arc<dyn CustomAttributeTable>,
    marker: AttributeRef,
    types: DashMap<TypeIdentity, Weak<ProjectedType>>,
    assemblies: DashMap<AssemblyIdentity, Weak<ProjectedAssembly>>,
}

/// Attribute overlay session over a type-system graph
///
/// Cloning is cheap and yields a handle to the same context.
#[derive(Clone)]
pub struct ProjectionContext {
    inner: Arc<ContextInner>,
}

impl ProjectionContext {
    /// Create a context over `table` with default options
    pub fn new(table: Arc<dyn CustomAttributeTable>) -> Self {
        Self::with_options(table, ContextOptions::default())
    }

    /// Create a context over `table` with specific options
    pub fn with_options(table: Arc<dyn CustomAttributeTable>, options: ContextOptions) -> Self {
        let id = ContextId::new();
        let marker = Attribute::context_marker(id, options.label.as_deref()).into_ref();
        debug!(context = %id, label = options.label.as_deref(), "projection context created");

        ProjectionContext {
            inner: Arc::new(ContextInner {
                id,
                options,
                table,
                marker,
                types: DashMap::new(),
                assemblies: DashMap::new(),
            }),
        }
    }

    /// Get the context ID
    pub fn id(&self) -> ContextId {
        self.inner.id
    }

    /// Label from the creation options
    pub fn label(&self) -> Option<&str> {
        self.inner.options.label.as_deref()
    }

    /// Options the context was created with
    pub fn options(&self) -> &ContextOptions {
        &self.inner.options
    }

    /// Overlay table
    pub fn table(&self) -> &dyn CustomAttributeTable {
        self.inner.table.as_ref()
    }

    /// Marker attribute reported on every entity this context produces
    pub fn marker(&self) -> &AttributeRef {
        &self.inner.marker
    }

    fn owns(&self, context: Option<ContextId>) -> bool {
        context == Some(self.inner.id)
    }

    // ------------------------------------------------------------------------
    // Types and assemblies
    // ------------------------------------------------------------------------

    /// Projected stand-in for `ty`
    ///
    /// Repeated calls while the proxy is alive return the same instance. A
    /// type already projected by this context is returned as is.
    pub fn map_type(&self, ty: &TypeRef) -> TypeRef {
        if self.owns(ty.context()) {
            return Arc::clone(ty);
        }
        self.memoized::<_, ProjectedType>(&self.inner.types, ty.identity(), || self.new_type(ty))
    }

    fn new_type(&self, ty: &TypeRef) -> Arc<ProjectedType> {
        debug!(
            context = %self.inner.id,
            label = self.label(),
            ty = %ty.handle(),
            "projected type created"
        );
        Arc::new(ProjectedType::new(Arc::clone(ty), self.clone()))
    }

    /// Projected stand-in for an optional type; `None` passes through
    pub fn map_type_opt(&self, ty: Option<TypeRef>) -> Option<TypeRef> {
        ty.map(|ty| self.map_type(&ty))
    }

    /// Order-preserving projection of a sequence of types
    pub fn map_types(&self, types: impl IntoIterator<Item = TypeRef>) -> Vec<TypeRef> {
        types.into_iter().map(|ty| self.map_type(&ty)).collect()
    }

    /// Projected stand-in for `assembly`, memoized like [`map_type`](Self::map_type)
    pub fn map_assembly(&self, assembly: &AssemblyRef) -> AssemblyRef {
        if self.owns(assembly.context()) {
            return Arc::clone(assembly);
        }
        self.memoized::<_, ProjectedAssembly>(&self.inner.assemblies, assembly.identity(), || {
            self.new_assembly(assembly)
        })
    }

    fn new_assembly(&self, assembly: &AssemblyRef) -> Arc<ProjectedAssembly> {
        debug!(
            context = %self.inner.id,
            label = self.label(),
            assembly = %assembly.name(),
            "projected assembly created"
        );
        Arc::new(ProjectedAssembly::new(Arc::clone(assembly), self.clone()))
    }

    /// Live proxy cached under `key`, or a new one from `create`
    ///
    /// Reads take the shard read lock; creation holds the shard write lock
    /// so concurrent first projections agree on one proxy.
    fn memoized<K, P>(
        &self,
        cache: &DashMap<K, Weak<P>>,
        key: K,
        create: impl FnOnce() -> Arc<P>,
    ) -> Arc<P>
    where
        K: Eq + Hash + fmt::Debug,
    {
        if let Some(proxy) = cache.get(&key).and_then(|cached| cached.upgrade()) {
            trace!(context = %self.inner.id, key = ?key, "projection cache hit");
            return proxy;
        }

        let mut slot = cache.entry(key).or_default();
        if let Some(proxy) = slot.upgrade() {
            return proxy;
        }
        let proxy = create();
        *slot = Arc::downgrade(&proxy);
        proxy
    }

    /// Strip this context's projection from a type passed back as an argument
    pub fn unwrap_type(&self, ty: &TypeRef) -> TypeRef {
        if self.owns(ty.context()) {
            if let Some(real) = ty.projected_from() {
                return real;
            }
        }
        Arc::clone(ty)
    }

    /// Strip this context's projection from every type of a slice
    pub fn unwrap_types(&self, types: &[TypeRef]) -> Vec<TypeRef> {
        types.iter().map(|ty| self.unwrap_type(ty)).collect()
    }

    /// Strip this context's projection from an assembly
    pub fn unwrap_assembly(&self, assembly: &AssemblyRef) -> AssemblyRef {
        if self.owns(assembly.context()) {
            if let Some(real) = assembly.projected_from() {
                return real;
            }
        }
        Arc::clone(assembly)
    }

    /// Number of projected types currently alive
    pub fn live_types(&self) -> usize {
        self.inner
            .types
            .iter()
            .filter(|cached| cached.value().strong_count() > 0)
            .count()
    }

    /// Number of projected assemblies currently alive
    pub fn live_assemblies(&self) -> usize {
        self.inner
            .assemblies
            .iter()
            .filter(|cached| cached.value().strong_count() > 0)
            .count()
    }

    /// Drop cache slots whose proxy is gone, returning how many were removed
    pub fn sweep(&self) -> usize {
        let mut removed = 0;
        self.inner.types.retain(|_, cached| {
            let alive = cached.strong_count() > 0;
            removed += usize::from(!alive);
            alive
        });
        self.inner.assemblies.retain(|_, cached| {
            let alive = cached.strong_count() > 0;
            removed += usize::from(!alive);
            alive
        });
        debug!(context = %self.inner.id, removed, "projection caches swept");
        removed
    }

    // ------------------------------------------------------------------------
    // Members and parameters
    // ------------------------------------------------------------------------

    /// Projected stand-in for a member of any kind
    ///
    /// Nested types go through [`map_type`](Self::map_type); custom members
    /// pass through unchanged.
    pub fn map_member(&self, member: &MemberRef) -> MemberRef {
        match member {
            MemberRef::Field(field) => MemberRef::Field(self.map_field(field)),
            MemberRef::Property(property) => MemberRef::Property(self.map_property(property)),
            MemberRef::Method(method) => MemberRef::Method(self.map_method(method)),
            MemberRef::Constructor(ctor) => MemberRef::Constructor(self.map_method(ctor)),
            MemberRef::Event(event) => MemberRef::Event(self.map_event(event)),
            MemberRef::NestedType(ty) => MemberRef::NestedType(self.map_type(ty)),
            MemberRef::Custom(custom) => MemberRef::Custom(Arc::clone(custom)),
        }
    }

    /// Order-preserving projection of a sequence of members
    pub fn map_members(&self, members: impl IntoIterator<Item = MemberRef>) -> Vec<MemberRef> {
        members
            .into_iter()
            .map(|member| self.map_member(&member))
            .collect()
    }

    /// Projected stand-in for a field
    pub fn map_field(&self, field: &FieldRef) -> FieldRef {
        if self.owns(field.context()) {
            return Arc::clone(field);
        }
        Arc::new(ProjectedField::new(Arc::clone(field), self.clone()))
    }

    /// Projected stand-in for a property
    pub fn map_property(&self, property: &PropertyRef) -> PropertyRef {
        if self.owns(property.context()) {
            return Arc::clone(property);
        }
        Arc::new(ProjectedProperty::new(Arc::clone(property), self.clone()))
    }

    /// Projected stand-in for a method or constructor
    pub fn map_method(&self, method: &MethodRef) -> MethodRef {
        if self.owns(method.context()) {
            return Arc::clone(method);
        }
        Arc::new(ProjectedMethod::new(Arc::clone(method), self.clone()))
    }

    /// Order-preserving projection of a sequence of methods
    pub fn map_methods(&self, methods: impl IntoIterator<Item = MethodRef>) -> Vec<MethodRef> {
        methods
            .into_iter()
            .map(|method| self.map_method(&method))
            .collect()
    }

    /// Projected stand-in for an event
    pub fn map_event(&self, event: &EventRef) -> EventRef {
        if self.owns(event.context()) {
            return Arc::clone(event);
        }
        Arc::new(ProjectedEvent::new(Arc::clone(event), self.clone()))
    }

    /// Projected stand-in for a parameter or return value
    pub fn map_parameter(&self, parameter: &ParameterRef) -> ParameterRef {
        if self.owns(parameter.context()) {
            return Arc::clone(parameter);
        }
        Arc::new(ProjectedParameter::new(Arc::clone(parameter), self.clone()))
    }

    /// Order-preserving projection of a sequence of parameters
    pub fn map_parameters(&self, parameters: impl IntoIterator<Item = ParameterRef>) -> Vec<ParameterRef> {
        parameters
            .into_iter()
            .map(|parameter| self.map_parameter(&parameter))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    fn overlay<'a>(&'a self, entity: Entity<'_>) -> &'a [AttributeRef] {
        let table = self.inner.table.as_ref();
        match entity {
            Entity::Type(ty) => table.type_attributes(ty),
            Entity::Member(member) => table.member_attributes(member),
            Entity::Parameter(parameter) => table.parameter_attributes(parameter),
            Entity::Assembly(_) => &[],
        }
    }

    fn marker_requested(&self, kind: Option<&AttributeKind>) -> bool {
        kind.map_or(true, |kind| kind.is_assignable_from(self.inner.marker.kind()))
    }

    /// Attributes of `entity` as seen through this context
    ///
    /// The entity's own attributes come first (honoring `inherit` exactly as
    /// the entity does), followed by the overlay registered for it. When
    /// `kind` admits the marker kind, this context's marker is appended.
    pub fn custom_attributes(
        &self,
        entity: Entity<'_>,
        kind: Option<&AttributeKind>,
        inherit: bool,
    ) -> Vec<AttributeRef> {
        let mut attributes = entity.own_attributes(kind, inherit);
        let overlay = self.overlay(entity);
        trace!(
            context = %self.inner.id,
            overlay = overlay.len(),
            "merging overlay attributes"
        );
        attributes.extend(
            overlay
                .iter()
                .filter(|attr| matches_kind(attr, kind))
                .cloned(),
        );

        let marked = attributes
            .iter()
            .any(|attr| attr.context_id() == Some(self.inner.id));
        if self.marker_requested(kind) && !marked {
            attributes.push(Arc::clone(&self.inner.marker));
        }
        attributes
    }

    /// Whether `entity` carries an attribute of `kind` as seen through this
    /// context; always true for kinds the marker is an instance of
    pub fn is_attribute_defined(&self, entity: Entity<'_>, kind: &AttributeKind, inherit: bool) -> bool {
        kind.is_assignable_from(self.inner.marker.kind())
            || entity.defines(kind, inherit)
            || self
                .overlay(entity)
                .iter()
                .any(|attr| attr.is_instance_of(kind))
    }
}

impl fmt::Debug for ProjectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionContext")
            .field("id", &self.inner.id)
            .field("label", &self.inner.options.label)
            .field("types", &self.inner.types.len())
            .field("assemblies", &self.inner.assemblies.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veneer_table::{AttributeTable, AttributeTableBuilder};
    use veneer_types::{TypeKind, UniverseBuilder};

    fn context() -> ProjectionContext {
        ProjectionContext::new(Arc::new(AttributeTable::empty()))
    }

    #[test]
    fn test_contexts_have_unique_ids() {
        let a = context();
        let b = context();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
        assert_eq!(a.marker().context_id(), Some(a.id()));
    }

    #[test]
    fn test_label_reaches_marker() {
        let ctx = ProjectionContext::with_options(
            Arc::new(AttributeTable::empty()),
            ContextOptions::labeled("docs"),
        );
        assert_eq!(ctx.label(), Some("docs"));
        assert_eq!(
            ctx.marker().named_argument("label"),
            Some(&veneer_types::AttributeValue::Str("docs".to_string()))
        );
    }

    #[test]
    fn test_dropped_proxies_are_recreated() {
        let mut builder = UniverseBuilder::new();
        let asm = builder.add_assembly("Lib", Default::default());
        let foo = builder.add_type(asm, "Lib", "Foo", TypeKind::Class);
        let universe = builder.build().unwrap();
        let foo = universe.ty(foo).unwrap();

        let ctx = context();
        let first = ctx.map_type(&foo);
        assert_eq!(ctx.live_types(), 1);
        let again = ctx.map_type(&foo);
        assert!(Arc::ptr_eq(&first, &again));

        drop(first);
        drop(again);
        assert_eq!(ctx.live_types(), 0);

        let replacement = ctx.map_type(&foo);
        assert_eq!(ctx.live_types(), 1);
        assert_eq!(replacement.context(), Some(ctx.id()));
    }

    #[test]
    fn test_sweep_removes_dead_slots_only() {
        let mut builder = UniverseBuilder::new();
        let asm = builder.add_assembly("Lib", Default::default());
        let foo = builder.add_type(asm, "Lib", "Foo", TypeKind::Class);
        let bar = builder.add_type(asm, "Lib", "Bar", TypeKind::Class);
        let universe = builder.build().unwrap();
        let foo = universe.ty(foo).unwrap();
        let bar = universe.ty(bar).unwrap();

        let ctx = context();
        let kept = ctx.map_type(&foo);
        let dropped = ctx.map_type(&bar);
        let assembly = dropped.assembly();
        assert!(Arc::ptr_eq(&assembly, &kept.assembly()));
        drop(dropped);
        drop(assembly);

        assert_eq!(ctx.sweep(), 2);
        assert_eq!(ctx.sweep(), 0);
        assert_eq!(ctx.live_types(), 1);
        assert!(Arc::ptr_eq(&ctx.map_type(&foo), &kept));
        assert_eq!(&ctx.map_type(&bar), &ctx.map_type(&bar));
    }

    #[test]
    fn test_overlay_follows_own_attributes() {
        let mut builder = UniverseBuilder::new();
        let asm = builder.add_assembly("Lib", Default::default());
        let foo = builder.add_type(asm, "Lib", "Foo", TypeKind::Class);
        builder.add_type_attribute(foo, Attribute::new(AttributeKind::new("Real")));
        let universe = builder.build().unwrap();
        let foo = universe.ty(foo).unwrap();

        let mut table = AttributeTableBuilder::new();
        table.add_type_attributes(foo.as_ref(), [Attribute::new(AttributeKind::new("Overlay"))]);
        let ctx = ProjectionContext::new(Arc::new(table.build()));

        let names: Vec<String> = ctx
            .custom_attributes(Entity::Type(foo.as_ref()), None, true)
            .iter()
            .map(|attr| attr.kind().name().to_string())
            .collect();
        assert_eq!(names, ["Real", "Overlay", "ContextIdentifierAttribute"]);

        let filtered = ctx.custom_attributes(
            Entity::Type(foo.as_ref()),
            Some(&AttributeKind::new("Overlay")),
            false,
        );
        assert_eq!(filtered.len(), 1);
        assert!(ctx.is_attribute_defined(
            Entity::Type(foo.as_ref()),
            &AttributeKind::new("Overlay"),
            false
        ));
        assert!(!ctx.is_attribute_defined(
            Entity::Type(foo.as_ref()),
            &AttributeKind::new("Missing"),
            true
        ));
    }
}
