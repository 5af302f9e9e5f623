use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::fmt;

use crate::schema::{KeyCase, KeyFormatter, Member, MemberInfo, NodeCodec};
use crate::tree::Comments;

/// Formats the key of a member.
///
/// The member's own case wins over the case of its declaring type, which
/// wins over `fallback`. The explicit key, if any, replaces the name before
/// formatting.
///
/// # Examples
///
/// ```
/// use vc_bind::schema::{KeyCase, MemberInfo, format_key};
///
/// let info = MemberInfo::new::<u16>("maxPlayers");
/// assert_eq!(format_key(&info, None, &KeyCase::Kebab), "max-players");
/// assert_eq!(format_key(&info, Some(KeyCase::Snake), &KeyCase::Kebab), "max_players");
///
/// let info = info.with_key("slots").with_key_format(KeyCase::Upper);
/// assert_eq!(format_key(&info, Some(KeyCase::Snake), &KeyCase::Kebab), "SLOTS");
/// ```
pub fn format_key(info: &MemberInfo, type_format: Option<KeyCase>, fallback: &dyn KeyFormatter) -> String {
    match info.key_format().or(type_format) {
        Some(case) => case.format(info.key()),
        None => fallback.format(info.key()),
    }
}

/// A member of `S` resolved against one set of properties.
pub struct ConfigNode<S: 'static> {
    member: &'static dyn Member<S>,
    key: String,
    codec: Box<dyn NodeCodec<S>>,
}

impl<S: 'static> ConfigNode<S> {
    #[inline]
    pub fn new(member: &'static dyn Member<S>, key: String, codec: Box<dyn NodeCodec<S>>) -> Self {
        Self { member, key, codec }
    }

    #[inline]
    pub fn member(&self) -> &'static dyn Member<S> {
        self.member
    }

    #[inline]
    pub fn info(&self) -> &'static MemberInfo {
        self.member.info()
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.info().name()
    }

    /// The formatted key.
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn codec(&self) -> &dyn NodeCodec<S> {
        &*self.codec
    }

    /// The member's comments as tree metadata.
    ///
    /// Empty lines become blank separators.
    pub fn comments(&self) -> Comments {
        let info = self.info();
        Comments {
            lines: info
                .comments()
                .iter()
                .map(|line| (!line.is_empty()).then(|| line.to_string()))
                .collect(),
            inline: info.inline_comment().map(ToString::to_string),
        }
    }
}

impl<S: 'static> fmt::Debug for ConfigNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigNode")
            .field("name", &self.name())
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
