/// Emit a `tracing` event only when the scope filter lets `$level` through.
#[macro_export]
macro_rules! scoped_log {
    ($level:ident, $scope:expr, $($arg:tt)*) => {{
        let scope: $crate::logging::LogScope = $scope;
        if $crate::logging::get_log_config().should_log(scope, $crate::logging::Level::$level) {
            ::tracing::event!(
                target: "handvr",
                $crate::logging::Level::$level,
                scope = scope.as_str(),
                $($arg)*
            );
        }
    }};
}

#[macro_export]
macro_rules! hand_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, $crate::logging::LogScope::Hand, $($arg)*)
    };
}

#[macro_export]
macro_rules! teleport_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, $crate::logging::LogScope::Teleport, $($arg)*)
    };
}

#[macro_export]
macro_rules! replication_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, $crate::logging::LogScope::Replication, $($arg)*)
    };
}

#[macro_export]
macro_rules! physics_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, $crate::logging::LogScope::Physics, $($arg)*)
    };
}

#[macro_export]
macro_rules! input_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, $crate::logging::LogScope::Input, $($arg)*)
    };
}
