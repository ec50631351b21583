/// Invoke a macro once per tuple arity, peeling the head identifier off on each step.
///
/// `for_every_tuple!(m !! A, B, C)` expands to `m!(A, B, C); m!(B, C); m!(C);`.
#[macro_export]
#[doc(hidden)]
macro_rules! for_every_tuple {
    ($m:ident !! $head:ident) => {
        $m!($head);
    };
    ($m:ident !! $head:ident, $($tail:ident),+) => {
        $m!($head, $($tail),+);
        $crate::for_every_tuple!($m !! $($tail),+);
    };
}

/// Apply a macro to every tuple arity from 1 to 26 (identifiers `A` through `Z`).
#[macro_export]
#[doc(hidden)]
macro_rules! all_tuples {
    ($m:ident) => {
        $crate::for_every_tuple!($m !! A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P, Q, R, S, T, U, V, W, X, Y, Z);
    };
}
