//! Built-in prelude injected after the `#version` line
//!
//! Provides bit-field helpers and a no-op function that shaders assembled by
//! this crate can rely on without adding a source block for them.

/// Bit-field helper functions and their `uint`-casting macro wrappers.
///
/// - `sasm_mask(num_bits)`: uint with the low `num_bits` bits set
/// - `sasm_extract_bits(bit0, num_bits, src)`: the named bits of `src`
/// - `sasm_do_nothing()`: empty body
/// - `SASM_MASK(bit0, num_bits)`, `SASM_EXTRACT_BITS(bit0, num_bits, src)`
pub const PRE_ADDED_SOURCE: &str = "\
uint sasm_mask(uint num_bits) { return (uint(1) << num_bits) - uint(1); }
uint sasm_extract_bits(uint bit0, uint num_bits, uint src) {
    return (src >> bit0) & sasm_mask(num_bits);
}
#define SASM_MASK(bit0, num_bits) (sasm_mask(uint(num_bits)) << uint(bit0))
#define SASM_EXTRACT_BITS(bit0, num_bits, src) \\
    sasm_extract_bits(uint(bit0), uint(num_bits), uint(src))
void sasm_do_nothing(void) {}
";
