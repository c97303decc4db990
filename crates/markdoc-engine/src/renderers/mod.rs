//! Serializers for render trees produced by [crate::transform].

pub mod html;
