//! Fieldless enums as scalars and dictionary keys.

/// Declares a fieldless enum usable as a bound scalar and as a dictionary key.
///
/// As a scalar the variant name matches case-insensitively; as a dictionary
/// key it must match exactly, and a key naming no variant fails the bind.
///
/// ```
/// dragon_bind::config_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
///     pub enum Level {
///         Debug,
///         Info,
///     }
/// }
///
/// use dragon_bind::reflect::FromConfigStr;
/// assert_eq!(Level::from_config_str("info"), Ok(Level::Info));
/// ```
#[macro_export]
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($(#[$variant_meta])* $variant),*
        }

        impl $name {
            /// Variant names in declaration order.
            pub const VARIANTS: &'static [&'static str] = &[$(stringify!($variant)),*];
        }

        impl $crate::reflect::FromConfigStr for $name {
            fn from_config_str(value: &str) -> ::std::result::Result<Self, ::std::string::String> {
                let value = value.trim();
                $(
                    if value.eq_ignore_ascii_case(stringify!($variant)) {
                        return ::std::result::Result::Ok($name::$variant);
                    }
                )*
                ::std::result::Result::Err(::std::format!(
                    "'{}' is not one of {:?}",
                    value,
                    Self::VARIANTS
                ))
            }
        }

        impl $crate::reflect::DictionaryKey for $name {
            const KIND: $crate::reflect::KeyKind = $crate::reflect::KeyKind::Enum;

            fn from_key(key: &str) -> ::std::option::Option<Self> {
                $(
                    if key == stringify!($variant) {
                        return ::std::option::Option::Some($name::$variant);
                    }
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::reflect::Reflect for $name {
            fn type_info() -> $crate::reflect::TypeInfo {
                $crate::reflect::TypeInfo::scalar::<Self>()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::reflect::{DictionaryKey, FromConfigStr, KeyKind, Reflect};

    crate::config_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        enum Color {
            Red,
            Green,
        }
    }

    #[test]
    fn test_scalar_parse_ignores_case() {
        assert_eq!(Color::from_config_str(" GREEN "), Ok(Color::Green));
        assert!(Color::from_config_str("blue").is_err());
    }

    #[test]
    fn test_key_parse_is_exact() {
        assert_eq!(Color::KIND, KeyKind::Enum);
        assert_eq!(Color::from_key("Red"), Some(Color::Red));
        assert_eq!(Color::from_key("red"), None);
    }

    #[test]
    fn test_is_scalar() {
        assert!(Color::type_info().is_scalar());
        assert_eq!(Color::VARIANTS, &["Red", "Green"]);
    }
}
