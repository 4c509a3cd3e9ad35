//! Utility macros for reducing filter boilerplate

/// Implement [`ResourceFilter`](crate::ResourceFilter) for a filter struct
/// that embeds a `BaseFilter` field.
///
/// # Example
/// ```ignore
/// impl_resource_filter!(TopicFilter, base);
/// // Expands to:
/// impl crate::ResourceFilter for TopicFilter {
///     fn base(&self) -> &crate::BaseFilter { &self.base }
///     fn base_mut(&mut self) -> &mut crate::BaseFilter { &mut self.base }
/// }
/// ```
#[macro_export]
macro_rules! impl_resource_filter {
    ($type:ty, $base_field:ident) => {
        impl $crate::ResourceFilter for $type {
            fn base(&self) -> &$crate::BaseFilter {
                &self.$base_field
            }

            fn base_mut(&mut self) -> &mut $crate::BaseFilter {
                &mut self.$base_field
            }
        }
    };
}

/// Implement both [`ResourceFilter`](crate::ResourceFilter) and
/// [`OwnedFilter`](crate::OwnedFilter) for a filter struct with `base`,
/// `ownership`, and `visibilities` fields.
#[macro_export]
macro_rules! impl_owned_filter {
    ($type:ty) => {
        $crate::impl_resource_filter!($type, base);

        impl $crate::OwnedFilter for $type {
            fn ownership(&self) -> &$crate::Ownership {
                &self.ownership
            }

            fn ownership_mut(&mut self) -> &mut $crate::Ownership {
                &mut self.ownership
            }

            fn visibilities_mut(
                &mut self,
            ) -> &mut std::collections::BTreeSet<$crate::Visibility> {
                &mut self.visibilities
            }
        }
    };
}
