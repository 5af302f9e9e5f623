use crate::schema::MemberInfo;

/// Selects the members of a structured type that take part in conversion.
///
/// Closures taking a [`MemberInfo`] are filters too.
pub trait NodeFilter: Send + Sync {
    fn include(&self, member: &MemberInfo) -> bool;
}

impl<F> NodeFilter for F
where
    F: Fn(&MemberInfo) -> bool + Send + Sync,
{
    #[inline]
    fn include(&self, member: &MemberInfo) -> bool {
        self(member)
    }
}

/// Includes every member not marked `#[config(ignore)]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNodeFilter;

impl NodeFilter for DefaultNodeFilter {
    #[inline]
    fn include(&self, member: &MemberInfo) -> bool {
        !member.is_ignored()
    }
}

// -----------------------------------------------------------------------------
// Tests
