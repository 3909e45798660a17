/// Declares `Copy` tokens over raw engine pointers.
macro_rules! handles {
    ($(
        $(#[$($meta:meta)+])*
        pub struct $name:ident(*const ffi::$ffi:ident);
    )*) => {
        $(
            $(#[$($meta)+])*
            #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
            pub struct $name {
                raw: *const ffi::$ffi,
            }

            // The token is only an address. Whatever the engine does with it
            // from other threads is the engine's business.
            unsafe impl Send for $name {}
            unsafe impl Sync for $name {}

            impl $name {
                /// Wraps a raw engine pointer.
                ///
                /// The pointer must refer to a live engine object for as long as the
                /// token is handed to the relay.
                pub unsafe fn from_raw(raw: *const ffi::$ffi) -> Self {
                    Self { raw }
                }

                pub fn as_raw(&self) -> *const ffi::$ffi {
                    self.raw
                }

                pub fn handle(&self) -> $crate::handle::Handle {
                    $crate::handle::Handle::from_ptr(self.raw)
                }
            }

            impl $crate::handle::AsHandle for $name {
                fn as_handle(&self) -> $crate::handle::Handle {
                    self.handle()
                }
            }

            impl From<$name> for $crate::handle::Handle {
                fn from(token: $name) -> Self {
                    token.handle()
                }
            }
        )*
    }
}

/// Declares one handler trait per persistent callback kind, with a blanket
/// implementation for closures of the same shape.
macro_rules! handlers {
    ($(
        $(#[$($meta:meta)+])*
        pub trait $name:ident {
            fn $method:ident(&self $(, $arg:ident : $ty:ty)*) $(-> $ret:ty)?;
        }
    )*) => {
        $(
            $(#[$($meta)+])*
            pub trait $name: Send + Sync {
                fn $method(&self $(, $arg: $ty)*) $(-> $ret)?;
            }

            impl<F> $name for F
            where
                F: Fn($($ty),*) $(-> $ret)? + Send + Sync,
            {
                #[inline]
                fn $method(&self $(, $arg: $ty)*) $(-> $ret)? {
                    (self)($($arg),*)
                }
            }
        )*
    }
}
