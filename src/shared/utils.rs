//! Utility functions and helpers

/// Format a raw token amount with its decimal precision
pub fn format_amount(amount: u64, decimals: u8) -> String {
    let value = amount as f64 / 10_f64.powi(decimals as i32);
    format!("{:.6}", value)
}

/// Raw token amount as a UI float
pub fn ui_amount(amount: u64, decimals: u8) -> f64 {
    amount as f64 / 10_f64.powi(decimals as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_500_000_000, 9), "1.500000");
        assert_eq!(format_amount(250_000, 6), "0.250000");
    }

    #[test]
    fn test_ui_amount() {
        assert_eq!(ui_amount(1_000_000_000, 9), 1.0);
        assert_eq!(ui_amount(0, 6), 0.0);
    }
}
