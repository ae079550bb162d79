//! Number formatting utilities
//!
//! Rust's `{:e}` formatting differs from C's `%e` (no exponent sign, no
//! zero padding). GDAL sidecars are written with `%24.16e`, so the helpers
//! here reproduce that layout.

/// Format `value` like C's `printf("%*.*e", width, precision, value)`
///
/// # Arguments
/// * `value` - The number to format
/// * `precision` - Digits after the decimal point of the mantissa
/// * `width` - Minimum field width, right-aligned with spaces
///
/// # Returns
/// The formatted string, e.g. `"  4.5000000000000000e+05"`
pub fn format_c_scientific(value: f64, precision: usize, width: usize) -> String {
    let rust_formatted = format!("{:.*e}", precision, value);

    // NaN and infinities carry no exponent
    let c_formatted = match rust_formatted.split_once('e') {
        Some((mantissa, exponent)) => match exponent.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{}e{}{:02}", mantissa, sign, exp.abs())
            }
            Err(_) => rust_formatted.clone(),
        },
        None => rust_formatted.clone(),
    };

    format!("{:>width$}", c_formatted, width = width)
}

/// Format `value` with a fixed number of decimals, like C's `%.*f`
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}
