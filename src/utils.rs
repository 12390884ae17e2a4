// Copyright 2017 Dmitry Tantsur <divius.inside@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Various utilities.

/// Define an enumeration that maps to string values in the API.
///
/// With `= Default`, unknown values deserialize into the default variant,
/// otherwise they are rejected.
macro_rules! protocol_enum {
    {@define $(#[$attr:meta])* $name:ident {
        $($(#[$iattr:meta])* $item:ident = $val:literal),+
    }} => (
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$iattr])* $item),+
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                match self {
                    $($name::$item => $val),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                String::from(value.as_ref())
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str(self.as_ref())
            }
        }
    );

    {$(#[$attr:meta])* enum $name:ident = $dflt:ident {
        $($(#[$iattr:meta])* $item:ident = $val:literal),+
    }} => (
        protocol_enum! {
            @define $(#[$attr])* $name { $($(#[$iattr])* $item = $val),+ }
        }

        impl Default for $name {
            fn default() -> $name {
                $name::$dflt
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<$name, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let value: String = ::serde::Deserialize::deserialize(deserializer)?;
                Ok(match value.as_str() {
                    $($val => $name::$item,)+
                    other => {
                        trace!("Unknown {} value {}", stringify!($name), other);
                        $name::$dflt
                    }
                })
            }
        }
    );

    {$(#[$attr:meta])* enum $name:ident {
        $($(#[$iattr:meta])* $item:ident = $val:literal),+
    }} => (
        protocol_enum! {
            @define $(#[$attr])* $name { $($(#[$iattr])* $item = $val),+ }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<$name, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let value: String = ::serde::Deserialize::deserialize(deserializer)?;
                match value.as_str() {
                    $($val => Ok($name::$item),)+
                    other => Err(::serde::de::Error::custom(format!(
                        "unknown {} value {}",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    );
}

/// Define a read-only property that is passed through from the inner structure.
macro_rules! transparent_property {
    ($(#[$attr:meta])* $name:ident: ref $type:ty) => (
        $(#[$attr])*
        #[inline]
        pub fn $name(&self) -> &$type {
            &self.inner.$name
        }
    );

    ($(#[$attr:meta])* $name:ident: $type:ty) => (
        $(#[$attr])*
        #[inline]
        pub fn $name(&self) -> $type {
            self.inner.$name
        }
    );
}

/// Define a setter and a builder-style method for a field of a creation request.
macro_rules! creation_inner_field {
    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: optional $type:ty) => (
        $(#[$attr])*
        pub fn $set_func<S: Into<$type>>(&mut self, value: S) {
            self.inner.$name = Some(value.into());
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<S: Into<$type>>(mut self, value: S) -> Self {
            self.$set_func(value);
            self
        }
    );

    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: copy $type:ty) => (
        $(#[$attr])*
        pub fn $set_func(&mut self, value: $type) {
            self.inner.$name = value;
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func(mut self, value: $type) -> Self {
            self.$set_func(value);
            self
        }
    );

    ($(#[$attr:meta])* $set_func:ident, $with_func:ident -> $name:ident: $type:ty) => (
        $(#[$attr])*
        pub fn $set_func<S: Into<$type>>(&mut self, value: S) {
            self.inner.$name = value.into();
        }

        $(#[$attr])*
        #[inline]
        pub fn $with_func<S: Into<$type>>(mut self, value: S) -> Self {
            self.$set_func(value);
            self
        }
    );
}

protocol_enum! {
    /// Sorting direction.
    enum SortDir {
        /// Ascending order.
        Asc = "asc",
        /// Descending order.
        Desc = "desc"
    }
}

/// Sorting request: a key and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort<T> {
    /// Sort by the key in ascending order.
    Asc(T),
    /// Sort by the key in descending order.
    Desc(T),
}

impl<T> Sort<T> {
    /// Split the sorting request into the key and the direction.
    #[inline]
    pub fn unwrap(self) -> (T, SortDir) {
        match self {
            Sort::Asc(key) => (key, SortDir::Asc),
            Sort::Desc(key) => (key, SortDir::Desc),
        }
    }
}

pub mod url {
    //! Handy primitives for working with URLs.

    use reqwest::Url;

    use crate::{Error, ErrorKind, Result};

    /// Append path segments to the URL.
    ///
    /// Segments are percent-encoded, a trailing slash of the base is dropped.
    pub fn extend<I>(mut url: Url, segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let _ = url
            .path_segments_mut()
            .map_err(|()| {
                Error::new(
                    ErrorKind::InvalidConfig,
                    "Endpoint URL cannot be used as a base",
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
