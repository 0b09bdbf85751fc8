/// Implement [`Node`](crate::domain::Node) and [`Property`](crate::domain::Property)
/// for an [`Aggregate`](crate::domain::Aggregate) by delegating to its registry.
///
/// The type must implement `Aggregate`, `Clone` and `Debug`.
#[macro_export]
macro_rules! aggregate_node {
    ($ty:ty) => {
        impl $crate::domain::Node for $ty {
            fn name(&self) -> ::std::option::Option<&str> {
                $crate::domain::Node::name($crate::domain::Aggregate::registry(self))
            }

            fn clone_node(&self) -> ::std::boxed::Box<dyn $crate::domain::Node> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            fn assign(
                &mut self,
                other: &dyn $crate::domain::Node,
            ) -> $crate::domain::DomainResult<()> {
                $crate::domain::Node::assign($crate::domain::Aggregate::registry_mut(self), other)
            }

            fn load(&mut self, doc: &$crate::domain::Document) -> $crate::domain::DomainResult<()> {
                $crate::domain::Node::load($crate::domain::Aggregate::registry_mut(self), doc)
            }

            fn save_contents(&self) -> $crate::domain::DomainResult<$crate::domain::Document> {
                $crate::domain::Node::save_contents($crate::domain::Aggregate::registry(self))
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn as_registry(&self) -> ::std::option::Option<&$crate::domain::Registry> {
                ::std::option::Option::Some($crate::domain::Aggregate::registry(self))
            }

            fn as_registry_mut(&mut self) -> ::std::option::Option<&mut $crate::domain::Registry> {
                ::std::option::Option::Some($crate::domain::Aggregate::registry_mut(self))
            }
        }

        impl $crate::domain::Property for $ty {
            type Value = $ty;

            fn value(&self) -> &$ty {
                self
            }

            fn value_mut(&mut self) -> &mut $ty {
                self
            }
        }
    };
}
