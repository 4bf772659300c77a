//! Common utilities and helpers

pub mod logging;
pub mod time;

/// Display helpers shared by the CLI
pub struct Utils;

impl Utils {
    /// Format file size for display
    pub fn format_file_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Megabyte figure reported by the service, e.g. `121.3 MB`
    pub fn format_megabytes(size_mb: Option<f64>) -> String {
        match size_mb {
            Some(size) => format!("{:.1} MB", size),
            None => "unknown size".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(Utils::format_file_size(512), "512 B");
        assert_eq!(Utils::format_file_size(1536), "1.50 KB");
        assert_eq!(Utils::format_file_size(48 * 1024 * 1024), "48.00 MB");
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(Utils::format_megabytes(Some(121.34)), "121.3 MB");
        assert_eq!(Utils::format_megabytes(None), "unknown size");
    }
}
