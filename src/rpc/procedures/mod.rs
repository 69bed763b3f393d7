use crate::domain::locale::Locales;
use crate::error::ConfigurationError;
use crate::rpc::{ProcedureGroup, RouterTree, compose};
use public::{Greeting, Ping, SupportedLocales};
use viewer::Me;

pub mod public;
pub mod viewer;

pub const PUBLIC: &str = "public";
pub const VIEWER: &str = "viewer";

/// Declares the application's router tree in one place.
///
/// Every listed procedure is composed under its group and marked
/// [`Routed`](crate::rpc::Routed), so a procedure becomes callable through
/// [`RpcClient`](crate::rpc::RpcClient) only by being listed here.
macro_rules! router_tree {
    ($locales:ident => { $($group:expr => [$($procedure:ty = $build:expr),+ $(,)?]),+ $(,)? }) => {
        $($(
            impl crate::rpc::procedure::sealed::Sealed for $procedure {}
            impl crate::rpc::Routed for $procedure {}
        )+)+

        /// The application's router tree. Adding a group means listing it here.
        ///
        /// # Errors
        /// Propagates composition errors; startup must abort on them.
        pub fn app_router_tree($locales: &Locales) -> Result<RouterTree, ConfigurationError> {
            compose([$(($group, ProcedureGroup::new()$(.procedure::<$procedure>($build))+)),+])
        }

        /// Paths of every procedure marked routed, in declaration order.
        #[cfg(test)]
        fn routed_paths() -> Vec<String> {
            vec![$($(<$procedure as crate::rpc::Procedure>::path()),+),+]
        }
    };
}

router_tree!(locales => {
    PUBLIC => [
        Ping = Ping,
        Greeting = Greeting,
        SupportedLocales = SupportedLocales::new(locales),
    ],
    VIEWER => [
        Me = Me,
    ],
});
