//! Native reference routines for the canonical Fibonacci fixture.
//!
//! The fixture programs under `tests/programs/` compute Fibonacci numbers
//! two ways and compare the results. These functions are the same
//! computations written natively, bit-for-bit equivalent to interpreting
//! the fixture, so tests and benchmarks can cross-check the pipeline
//! against them.

/// Wrapping integer addition.
///
/// Defined for all `i32` inputs; overflow wraps and is neither masked nor
/// checked.
pub fn add(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

/// The n-th Fibonacci number, computed with a bounded loop.
///
/// O(n) steps, constant space, no recursion. Mirrors the fixture's loop
/// exactly, including its boundary behavior: for `n <= 1` the loop never
/// runs and the result is the initial `1`. `fibonacci_iterative(0)` is
/// therefore `1` rather than the conventional `F(0) = 0`, and disagrees
/// with [`fibonacci_recursive`] there; the two agree for every `n >= 1`.
pub fn fibonacci_iterative(n: i32) -> i32 {
    let mut first = 0;
    let mut second = 1;
    let mut i = 1;
    while i < n {
        second = add(first, second);
        // The old `second`, shifted down.
        first = second.wrapping_sub(first);
        i += 1;
    }
    second
}

/// The n-th Fibonacci number, computed by naive double recursion.
///
/// Conventional base cases: `fibonacci_recursive(0) == 0` and
/// `fibonacci_recursive(1) == 1`. The call count grows exponentially and
/// the recursion depth linearly with `n`; no bound on `n` is enforced, so
/// large inputs exhaust the stack or take impractically long.
pub fn fibonacci_recursive(n: i32) -> i32 {
    if n < 2 {
        return n;
    }
    add(fibonacci_recursive(n - 1), fibonacci_recursive(n - 2))
}

/// Whether the iterative and recursive algorithms agree on the 10th
/// Fibonacci number.
///
/// The native twin of the fixture's `start` driver: both routines yield
/// `55` for `n = 10`, so the check holds. Agreement is only guaranteed for
/// `n >= 1`; at `n = 0` the iterative routine's boundary quirk makes the
/// two differ.
pub fn check() -> bool {
    let n = 10;
    fibonacci_iterative(n) == fibonacci_recursive(n)
}
