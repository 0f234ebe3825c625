//! Generator for unit generators whose arguments are all plain signal inputs.
//!
//! Each invocation produces an options struct with one public `Signal` field
//! per argument, a `Default` impl holding the documented defaults, a chained
//! setter per field, one constructor method per supported rate, and the
//! [`UGen`](crate::UGen) impl. Every argument slot is expandable and inputs
//! are written in declaration order.

macro_rules! ugen {
    (@rate ar) => { ::synthdef_core::Rate::Audio };
    (@rate kr) => { ::synthdef_core::Rate::Control };
    (@rate ir) => { ::synthdef_core::Rate::Scalar };
    (@rate dr) => { ::synthdef_core::Rate::Demand };

    (@method ar) => {
        /// Creates the node at audio rate.
        pub fn ar(self, builder: &mut ::synthdef_core::Builder) -> ::synthdef_core::Result<::synthdef_core::Signal> {
            $crate::UGen::build(self, builder, ::synthdef_core::Rate::Audio)
        }
    };
    (@method kr) => {
        /// Creates the node at control rate.
        pub fn kr(self, builder: &mut ::synthdef_core::Builder) -> ::synthdef_core::Result<::synthdef_core::Signal> {
            $crate::UGen::build(self, builder, ::synthdef_core::Rate::Control)
        }
    };
    (@method ir) => {
        /// Creates the node at scalar rate.
        pub fn ir(self, builder: &mut ::synthdef_core::Builder) -> ::synthdef_core::Result<::synthdef_core::Signal> {
            $crate::UGen::build(self, builder, ::synthdef_core::Rate::Scalar)
        }
    };
    (@method dr) => {
        /// Creates the node at demand rate.
        pub fn dr(self, builder: &mut ::synthdef_core::Builder) -> ::synthdef_core::Result<::synthdef_core::Signal> {
            $crate::UGen::build(self, builder, ::synthdef_core::Rate::Demand)
        }
    };

    (
        $(#[$meta:meta])*
        $name:ident {
            outputs: $outputs:literal,
            rates: [$($rate:ident),+ $(,)?],
            args: {
                $(
                    $(#[$arg_meta:meta])*
                    $field:ident ($arg:literal) = $default:expr
                ),* $(,)?
            } $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name {
            $(
                $(#[$arg_meta])*
                #[doc = ""]
                #[doc = concat!("Argument `", $arg, "`, default `", stringify!($default), "`.")]
                pub $field: ::synthdef_core::Signal,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $($field: ::synthdef_core::Signal::from($default),)*
                }
            }
        }

        impl $name {
            /// Options with every argument at its default.
            pub fn new() -> Self {
                Self::default()
            }

            $(
                #[doc = concat!("Sets `", $arg, "`.")]
                pub fn $field(mut self, value: impl Into<::synthdef_core::Signal>) -> Self {
                    self.$field = value.into();
                    self
                }
            )*

            $(ugen!(@method $rate);)+
        }

        impl $crate::UGen for $name {
            const NAME: &'static str = stringify!($name);
            const RATES: &'static [::synthdef_core::Rate] = &[$(ugen!(@rate $rate)),+];
            const ARGS: &'static [$crate::ArgSpec] = &[$($crate::ArgSpec::input($arg, $default)),*];
            const OUTPUTS: $crate::Outputs = $crate::Outputs::Fixed($outputs);

            fn from_args(args: &$crate::UGenArgs) -> ::std::result::Result<Self, $crate::UGenError> {
                args.check(Self::NAME, Self::ARGS)?;
                Ok(Self {
                    $(
                        $field: args
                            .signal(Self::NAME, $arg)?
                            .unwrap_or_else(|| ::synthdef_core::Signal::from($default)),
                    )*
                })
            }

            fn build(
                self,
                builder: &mut ::synthdef_core::Builder,
                rate: ::synthdef_core::Rate,
            ) -> ::synthdef_core::Result<::synthdef_core::Signal> {
                $crate::check_rate::<Self>(rate)?;
                let args: Vec<::synthdef_core::Signal> = vec![$(self.$field),*];
                let spec = ::synthdef_core::NodeSpec::new(Self::NAME, rate).outputs($outputs);
                builder.expand(&spec, &args, &$crate::args::all_slots(args.len()))
            }
        }
    };
}
