/// Format a length in metres as centimetres with `precision` decimal places.
///
/// Scaling happens in `f64` so large or finely specified lengths keep their digits.
pub fn meters_to_formatted_cm(meters: impl Into<f64>, precision: usize) -> String {
    format!("{:.*}", precision, meters.into() * 100.0)
}
