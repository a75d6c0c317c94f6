//! Collection of overlay registrations before freezing

use rustc_hash::FxHashMap;
use tracing::debug;
use veneer_types::{
    resolve_member, AccessExpr, AttributeRef, MemberDescription, MemberKey, MemberRef, MetaError,
    MetaResult, MethodDescription, MethodKey, ParameterDescription, TypeDescription, TypeHandle,
};

use crate::metadata::{MethodMetadata, TypeMetadata};
use crate::table::AttributeTable;

/// Mutable collector of overlay attributes, frozen by [`build`](Self::build)
///
/// Members are keyed through their declaring type, so registering a member
/// obtained from a derived type updates the declaring type's metadata.
#[derive(Debug, Default)]
pub struct AttributeTableBuilder {
    metadata: FxHashMap<TypeHandle, TypeMetadata>,
}

impl AttributeTableBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    fn type_metadata(&mut self, ty: TypeHandle) -> &mut TypeMetadata {
        self.metadata.entry(ty).or_default()
    }

    fn declaring_handle(member: &dyn MemberDescription) -> MetaResult<TypeHandle> {
        member
            .declaring_type()
            .map(|ty| ty.handle())
            .ok_or_else(|| {
                MetaError::invalid_argument(format!(
                    "member '{}' has no declaring type",
                    member.name()
                ))
            })
    }

    fn method_metadata(&mut self, method: &dyn MethodDescription) -> MetaResult<&mut MethodMetadata> {
        let declaring = Self::declaring_handle(method)?;
        let count = method.parameters().len();
        Ok(self
            .type_metadata(declaring)
            .method_mut(MethodKey::of(method), count))
    }

    fn simple_member(
        &mut self,
        member: &dyn MemberDescription,
        attributes: Vec<AttributeRef>,
    ) -> MetaResult<()> {
        let declaring = Self::declaring_handle(member)?;
        self.type_metadata(declaring)
            .member_attributes_mut(MemberKey::of(member))
            .extend(attributes);
        Ok(())
    }

    /// Register attributes on a type
    pub fn add_type_attributes<I>(&mut self, ty: &dyn TypeDescription, attributes: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<AttributeRef>,
    {
        self.type_metadata(ty.handle())
            .type_attributes_mut()
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Register attributes on a member of any supported kind
    ///
    /// Nested types register on the type itself. Custom members cannot carry
    /// an overlay and are rejected.
    pub fn add_member_attributes<I>(&mut self, member: &MemberRef, attributes: I) -> MetaResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<AttributeRef>,
    {
        let attributes: Vec<AttributeRef> = attributes.into_iter().map(Into::into).collect();
        match member {
            MemberRef::Field(field) => self.simple_member(field.as_ref(), attributes)?,
            MemberRef::Property(property) => self.simple_member(property.as_ref(), attributes)?,
            MemberRef::Event(event) => self.simple_member(event.as_ref(), attributes)?,
            MemberRef::Method(method) | MemberRef::Constructor(method) => self
                .method_metadata(method.as_ref())?
                .method_attributes_mut()
                .extend(attributes),
            MemberRef::NestedType(ty) => {
                self.add_type_attributes(ty.as_ref(), attributes);
            }
            MemberRef::Custom(custom) => {
                return Err(MetaError::invalid_argument(format!(
                    "member '{}' of kind {} cannot carry overlay attributes",
                    custom.name(),
                    custom.kind()
                )))
            }
        }
        Ok(self)
    }

    /// Register attributes on the parameter at `position`, or on the return
    /// value when `position` is -1
    pub fn add_parameter_attributes<I>(
        &mut self,
        method: &dyn MethodDescription,
        position: i32,
        attributes: I,
    ) -> MetaResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<AttributeRef>,
    {
        if position == -1 {
            return self.add_return_attributes(method, attributes);
        }

        let count = method.parameters().len();
        let index = usize::try_from(position)
            .ok()
            .filter(|&index| index < count)
            .ok_or_else(|| {
                MetaError::invalid_argument(format!(
                    "method '{}' has {} parameters, position {} is out of range",
                    method.name(),
                    count,
                    position
                ))
            })?;

        let slot = self
            .method_metadata(method)?
            .parameter_attributes_mut(index)
            .ok_or_else(|| {
                MetaError::invalid_operation(format!(
                    "overlay of '{}' was registered with a different parameter count",
                    method.name()
                ))
            })?;
        slot.extend(attributes.into_iter().map(Into::into));
        Ok(self)
    }

    /// Register attributes on the return value of a method
    pub fn add_return_attributes<I>(
        &mut self,
        method: &dyn MethodDescription,
        attributes: I,
    ) -> MetaResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<AttributeRef>,
    {
        if method.return_parameter().is_none() {
            return Err(MetaError::invalid_argument(format!(
                "'{}' has no return value",
                method.name()
            )));
        }
        self.method_metadata(method)?
            .return_attributes_mut()
            .extend(attributes.into_iter().map(Into::into));
        Ok(self)
    }

    /// Register attributes on a parameter description
    pub fn add_attributes_to_parameter<I>(
        &mut self,
        parameter: &dyn ParameterDescription,
        attributes: I,
    ) -> MetaResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<AttributeRef>,
    {
        match parameter.member() {
            MemberRef::Method(method) | MemberRef::Constructor(method) => {
                self.add_parameter_attributes(method.as_ref(), parameter.position(), attributes)
            }
            other => Err(MetaError::invalid_argument(format!(
                "parameters of {} '{}' cannot carry overlay attributes",
                other.kind(),
                other.name()
            ))),
        }
    }

    /// Register attributes on the member an access expression denotes
    pub fn add_access_attributes<I>(&mut self, expr: &AccessExpr, attributes: I) -> MetaResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<AttributeRef>,
    {
        let member = resolve_member(expr, false)?;
        self.add_member_attributes(&member, attributes)
    }

    /// Freeze the registrations into an immutable table
    pub fn build(self) -> AttributeTable {
        debug!(types = self.metadata.len(), "attribute table frozen");
        AttributeTable::from_metadata(self.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CustomAttributeTable;
    use veneer_types::{Attribute, AttributeKind, TypeKind, UniverseBuilder};

    fn attr(name: &str) -> Attribute {
        Attribute::new(AttributeKind::new(name))
    }

    #[test]
    fn test_parameter_positions_are_validated() {
        let mut universe = UniverseBuilder::new();
        let asm = universe.add_assembly("Lib", Default::default());
        let int = universe.add_type(asm, "System", "Int32", TypeKind::Struct);
        let foo = universe.add_type(asm, "Lib", "Foo", TypeKind::Class);
        let bar = universe.add_method(foo, "Bar", &[("a", int.into()), ("b", int.into())], None);
        let ctor = universe.add_constructor(foo, &[]);
        let universe = universe.build().unwrap();
        let bar = universe.method(bar).unwrap();
        let ctor = universe.method(ctor).unwrap();

        let mut builder = AttributeTableBuilder::new();
        assert!(builder.add_parameter_attributes(bar.as_ref(), 0, [attr("X")]).is_ok());
        assert!(builder.add_parameter_attributes(bar.as_ref(), 1, [attr("Y")]).is_ok());
        assert!(builder.add_parameter_attributes(bar.as_ref(), -1, [attr("R")]).is_ok());
        assert!(matches!(
            builder.add_parameter_attributes(bar.as_ref(), 2, [attr("Z")]),
            Err(MetaError::InvalidArgument { .. })
        ));
        assert!(matches!(
            builder.add_parameter_attributes(bar.as_ref(), -2, [attr("Z")]),
            Err(MetaError::InvalidArgument { .. })
        ));
        assert!(matches!(
            builder.add_return_attributes(ctor.as_ref(), [attr("Z")]),
            Err(MetaError::InvalidArgument { .. })
        ));

        let table = builder.build();
        let params = bar.parameters();
        assert_eq!(table.parameter_attributes(params[0].as_ref())[0].kind().name(), "X");
        assert_eq!(table.parameter_attributes(params[1].as_ref())[0].kind().name(), "Y");
        let ret = bar.return_parameter().unwrap();
        assert_eq!(table.parameter_attributes(ret.as_ref())[0].kind().name(), "R");
    }

    #[test]
    fn test_registrations_accumulate_in_order() {
        let mut universe = UniverseBuilder::new();
        let asm = universe.add_assembly("Lib", Default::default());
        let foo = universe.add_type(asm, "Lib", "Foo", TypeKind::Class);
        let universe = universe.build().unwrap();
        let foo = universe.ty(foo).unwrap();

        let mut builder = AttributeTableBuilder::new();
        builder
            .add_type_attributes(foo.as_ref(), [attr("A")])
            .add_type_attributes(foo.as_ref(), [attr("B"), attr("C")]);
        let table = builder.build();

        let names: Vec<_> = table
            .type_attributes(foo.as_ref())
            .iter()
            .map(|attr| attr.kind().name().to_string())
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }
}
